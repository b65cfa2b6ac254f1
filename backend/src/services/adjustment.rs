//! Adjustment request service
//!
//! Requests propose an absolute stock level for an item. Approval turns a
//! request into an `adjustment` ledger record, so stock still only moves
//! through the ledger.

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{
    Action, AdjustmentRequest, AdjustmentRequestType, AdjustmentStatus, CreateAdjustmentInput,
    DiscrepancyType, Resource, TransactionDetails, TransactionRecord, TransactionType,
};
use shared::policy::{ApprovalPolicy, ApprovalSubject};
use shared::types::Actor;
use shared::validation::{self, ValidationError};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::require;
use crate::store::{EngineState, InventoryStore};

/// Adjustment request service
#[derive(Clone)]
pub struct AdjustmentService {
    store: InventoryStore,
    policy: ApprovalPolicy,
}

impl AdjustmentService {
    pub fn new(store: InventoryStore, policy: ApprovalPolicy) -> Self {
        Self { store, policy }
    }

    /// File a new request against the item's current stock
    pub fn create_request(
        &self,
        actor: &Actor,
        input: CreateAdjustmentInput,
    ) -> AppResult<AdjustmentRequest> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Adjustments, Action::Create)?;
        validation::validate_required_text("reason", &input.reason)?;
        if input.value.map_or(false, |v| v < Decimal::ZERO) {
            return Err(ValidationError::InvalidField {
                field: "value".into(),
                message: "cannot be negative".into(),
            }
            .into());
        }

        let mut state = self.store.write()?;
        if let Some(audit_id) = input.audit_id {
            state.audit(audit_id)?;
        }
        self.file(&mut state, actor, input)
    }

    /// Turn an open audit discrepancy into a request
    pub fn raise_from_discrepancy(
        &self,
        actor: &Actor,
        discrepancy_id: Uuid,
    ) -> AppResult<AdjustmentRequest> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Adjustments, Action::Create)?;

        let mut state = self.store.write()?;
        let audit_id = state.discrepancy_audit(discrepancy_id)?;
        let discrepancy = state
            .audit(audit_id)?
            .discrepancies
            .iter()
            .find(|d| d.id == discrepancy_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Discrepancy".into()))?;

        if !discrepancy.is_open() {
            return Err(AppError::conflict(
                "discrepancy",
                format!("discrepancy {} is already resolved", discrepancy_id),
            ));
        }
        if let Some(existing) = discrepancy.adjustment_request_id {
            return Err(AppError::conflict(
                "discrepancy",
                format!("adjustment request {} was already raised", existing),
            ));
        }

        let current = state.item(discrepancy.item_id)?.current_stock;
        let q = discrepancy.quantity;
        let (request_type, proposed_stock) = match discrepancy.discrepancy_type {
            DiscrepancyType::Shortage => (
                AdjustmentRequestType::StockAdjustment,
                (current - q).max(Decimal::ZERO),
            ),
            DiscrepancyType::Excess => {
                let proposed = current.checked_add(q).ok_or_else(|| {
                    ValidationError::InvalidTransaction("resulting stock is out of range".into())
                })?;
                (AdjustmentRequestType::StockAdjustment, proposed)
            }
            DiscrepancyType::Damaged | DiscrepancyType::Expired => {
                if current.is_zero() {
                    return Err(AppError::conflict(
                        "item",
                        format!("item {} has no stock left to write off", discrepancy.item_id),
                    ));
                }
                (AdjustmentRequestType::WriteOff, (current - q).max(Decimal::ZERO))
            }
        };

        let input = CreateAdjustmentInput {
            item_id: discrepancy.item_id,
            request_type,
            proposed_stock,
            reason: format!(
                "Audit discrepancy: {} of {}",
                discrepancy.discrepancy_type.as_str(),
                q
            ),
            priority: None,
            audit_id: Some(audit_id),
            value: None,
        };
        let request = self.file(&mut state, actor, input)?;

        if let Some(d) = state
            .audit_mut(audit_id)?
            .discrepancies
            .iter_mut()
            .find(|d| d.id == discrepancy_id)
        {
            d.adjustment_request_id = Some(request.id);
        }
        Ok(request)
    }

    /// Approve an open request and apply it through the ledger
    pub fn approve_request(
        &self,
        actor: &Actor,
        id: Uuid,
        note: Option<String>,
    ) -> AppResult<AdjustmentRequest> {
        require(actor, Resource::Adjustments, Action::Approve)?;

        let mut state = self.store.write()?;
        let mut request = open_request(&state, id)?;
        apply_approval(&mut state, &mut request, actor, note)?;
        *state.adjustment_mut(id)? = request.clone();

        tracing::info!(
            request_id = %id,
            item_id = %request.item_id,
            approved_by = %actor.user_id,
            "Approved adjustment request"
        );
        Ok(request)
    }

    pub fn reject_request(
        &self,
        actor: &Actor,
        id: Uuid,
        note: Option<String>,
    ) -> AppResult<AdjustmentRequest> {
        require(actor, Resource::Adjustments, Action::Approve)?;

        let mut state = self.store.write()?;
        open_request(&state, id)?;
        let request = state.adjustment_mut(id)?;
        request.status = AdjustmentStatus::Rejected;
        request.decided_by = Some(actor.user_id);
        request.decided_at = Some(Utc::now());
        request.decision_note = note;

        tracing::info!(request_id = %id, rejected_by = %actor.user_id, "Rejected adjustment request");
        Ok(request.clone())
    }

    pub fn get_request(&self, actor: &Actor, id: Uuid) -> AppResult<AdjustmentRequest> {
        require(actor, Resource::Adjustments, Action::View)?;
        let state = self.store.read()?;
        state.adjustment(id).cloned()
    }

    /// Requests, oldest first
    pub fn list_requests(&self, actor: &Actor) -> AppResult<Vec<AdjustmentRequest>> {
        require(actor, Resource::Adjustments, Action::View)?;
        let state = self.store.read()?;
        let mut requests: Vec<AdjustmentRequest> = state.adjustments().cloned().collect();
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    /// Build, decide and store a request inside an open critical section
    fn file(
        &self,
        state: &mut EngineState,
        actor: &Actor,
        input: CreateAdjustmentInput,
    ) -> AppResult<AdjustmentRequest> {
        let item = state.item(input.item_id)?;
        validation::validate_proposed_stock(input.request_type, item.current_stock, input.proposed_stock)?;

        let unit_cost = item.cost;
        let declared_value = input.value;
        let mut request = AdjustmentRequest::new(input, item.current_stock, actor.user_id);

        let subject = ApprovalSubject {
            item_id: Some(request.item_id),
            action: Some(request.request_type.into()),
            quantity: Some(request.variance.abs()),
            unit_cost,
            declared_value,
        };

        if !self.policy.requires_approval(&subject, actor)? {
            apply_approval(state, &mut request, actor, None)?;
        } else if self.policy.exceeds_threshold(&subject)? {
            request.status = AdjustmentStatus::RequiresReview;
        }

        let request = state.insert_adjustment(request).clone();
        tracing::info!(
            request_id = %request.id,
            item_id = %request.item_id,
            variance = %request.variance,
            status = request.status.as_str(),
            "Filed adjustment request"
        );
        Ok(request)
    }
}

fn open_request(state: &EngineState, id: Uuid) -> AppResult<AdjustmentRequest> {
    let request = state.adjustment(id)?;
    if !request.status.is_open() {
        tracing::warn!(request_id = %id, status = request.status.as_str(), "Request already decided");
        return Err(AppError::conflict(
            "adjustment",
            format!("adjustment request {} is already {}", id, request.status.as_str()),
        ));
    }
    Ok(request.clone())
}

/// Mark `request` approved, appending an approved ledger record when the
/// stock actually changes. Fails without side effects if the item moved
/// since the request was filed.
fn apply_approval(
    state: &mut EngineState,
    request: &mut AdjustmentRequest,
    approver: &Actor,
    note: Option<String>,
) -> AppResult<()> {
    let item = state.item(request.item_id)?;
    if item.current_stock != request.current_stock {
        tracing::warn!(request_id = %request.id, "Adjustment request is stale");
        return Err(AppError::conflict(
            "item",
            format!(
                "item {} stock is {}, the request was filed against {}",
                item.id, item.current_stock, request.current_stock
            ),
        ));
    }

    if request.changes_stock() {
        let mut record = TransactionRecord::new(
            item.id,
            TransactionType::Adjustment,
            request.proposed_stock,
            item.current_stock,
            item.version,
            Some(request.reason.clone()),
            TransactionDetails::default(),
            approver,
            true,
        );
        record.adjustment_request_id = Some(request.id);
        let record = state.append_transaction(record)?;
        request.transaction_id = Some(record.id);
    }

    request.status = AdjustmentStatus::Approved;
    request.decided_by = Some(approver.user_id);
    request.decided_at = Some(Utc::now());
    request.decision_note = note;
    Ok(())
}
