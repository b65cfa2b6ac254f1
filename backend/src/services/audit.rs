//! Audit service: counts, discrepancies and the audit lifecycle

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{
    Action, AuditCount, AuditRecord, AuditStatus, CreateAuditInput, Discrepancy,
    RecordCountInput, Resource,
};
use shared::types::Actor;
use shared::validation;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::require;
use crate::store::InventoryStore;

/// Audit service
#[derive(Clone)]
pub struct AuditService {
    store: InventoryStore,
    review_score_floor: Decimal,
}

impl AuditService {
    pub fn new(store: InventoryStore, review_score_floor: Decimal) -> Self {
        Self {
            store,
            review_score_floor,
        }
    }

    /// Open a new audit
    pub fn create_audit(&self, actor: &Actor, input: CreateAuditInput) -> AppResult<AuditRecord> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Audits, Action::Create)?;
        input.validate()?;
        validation::validate_scope(&input.scope)?;

        let mut state = self.store.write()?;
        let audit = state
            .insert_audit(AuditRecord::new(input, actor.user_id))
            .clone();

        tracing::info!(audit_id = %audit.id, "Opened audit {}", audit.name);
        Ok(audit)
    }

    /// Record an expected-vs-actual count.
    ///
    /// Returns the discrepancy the count produced, or `None` when the
    /// count matched.
    pub fn record_count(
        &self,
        actor: &Actor,
        audit_id: Uuid,
        input: RecordCountInput,
    ) -> AppResult<Option<Discrepancy>> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Audits, Action::Create)?;
        validation::validate_count(&input)?;

        let mut state = self.store.write()?;
        let category = state.item(input.item_id)?.category.clone();

        let audit = state.audit_mut(audit_id)?;
        if !audit.status.accepts_counts() {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot record counts on a {} audit",
                audit.status.as_str()
            )));
        }
        if !audit.scope.covers_category(&category) {
            return Err(AppError::Validation {
                field: "itemId".into(),
                message: format!("category '{}' is outside the audit scope", category),
            });
        }

        let count = AuditCount {
            item_id: input.item_id,
            expected_stock: input.expected_stock,
            actual_stock: input.actual_stock,
            notes: input.notes,
            counted_by: actor.user_id,
            counted_at: Utc::now(),
        };
        let discrepancy = Discrepancy::from_count(audit.id, &count, input.discrepancy_type);
        audit.counts.push(count);
        if let Some(d) = &discrepancy {
            audit.discrepancies.push(d.clone());
        }
        audit.refresh_score();

        if let Some(d) = &discrepancy {
            state.index_discrepancy(d.id, audit_id);
            tracing::info!(
                audit_id = %audit_id,
                item_id = %d.item_id,
                kind = d.discrepancy_type.as_str(),
                quantity = %d.quantity,
                "Discrepancy recorded"
            );
        } else {
            tracing::debug!(audit_id = %audit_id, item_id = %input.item_id, "Count matched");
        }
        Ok(discrepancy)
    }

    /// Close a discrepancy. Resolution is one-way.
    pub fn resolve_discrepancy(
        &self,
        actor: &Actor,
        discrepancy_id: Uuid,
        resolution: String,
    ) -> AppResult<Discrepancy> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Audits, Action::Edit)?;
        validation::validate_required_text("resolution", &resolution)?;

        let mut state = self.store.write()?;
        let audit_id = state.discrepancy_audit(discrepancy_id)?;
        let audit = state.audit_mut(audit_id)?;
        let discrepancy = audit
            .discrepancies
            .iter_mut()
            .find(|d| d.id == discrepancy_id)
            .ok_or_else(|| AppError::NotFound("Discrepancy".into()))?;

        if !discrepancy.is_open() {
            tracing::warn!(discrepancy_id = %discrepancy_id, "Discrepancy already resolved");
            return Err(AppError::conflict(
                "discrepancy",
                format!("discrepancy {} is already resolved", discrepancy_id),
            ));
        }

        discrepancy.resolution = Some(resolution);
        discrepancy.resolved_by = Some(actor.user_id);
        discrepancy.resolved_at = Some(Utc::now());
        let resolved = discrepancy.clone();
        audit.refresh_score();

        tracing::info!(discrepancy_id = %discrepancy_id, audit_id = %audit_id, "Resolved discrepancy");
        Ok(resolved)
    }

    /// Finish counting. Audits scoring under the floor go to review.
    pub fn complete_audit(&self, actor: &Actor, audit_id: Uuid) -> AppResult<AuditRecord> {
        require(actor, Resource::Audits, Action::Edit)?;

        let mut state = self.store.write()?;
        let audit = state.audit_mut(audit_id)?;
        if !matches!(audit.status, AuditStatus::InProgress | AuditStatus::RequiresReview) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot complete a {} audit",
                audit.status.as_str()
            )));
        }

        audit.status = AuditStatus::Completed;
        audit.completed_at = Some(Utc::now());
        audit.review_reason = None;
        audit.refresh_score();

        if audit.compliance_score < self.review_score_floor {
            audit.review_reason = Some(format!(
                "compliance score {} is below {}",
                audit.compliance_score, self.review_score_floor
            ));
            audit.status = AuditStatus::RequiresReview;
            audit.refresh_score();
        }

        tracing::info!(audit_id = %audit_id, status = audit.status.as_str(), "Audit completed");
        Ok(audit.clone())
    }

    pub fn approve_audit(&self, actor: &Actor, audit_id: Uuid) -> AppResult<AuditRecord> {
        require(actor, Resource::Audits, Action::Approve)?;

        let mut state = self.store.write()?;
        let audit = state.audit_mut(audit_id)?;
        if audit.status != AuditStatus::Completed {
            return Err(AppError::InvalidStateTransition(format!(
                "only completed audits can be approved, this one is {}",
                audit.status.as_str()
            )));
        }

        audit.status = AuditStatus::Approved;
        audit.approved_by = Some(actor.user_id);
        audit.approved_at = Some(Utc::now());
        audit.refresh_score();

        tracing::info!(audit_id = %audit_id, score = %audit.compliance_score, "Audit approved");
        Ok(audit.clone())
    }

    pub fn flag_for_review(
        &self,
        actor: &Actor,
        audit_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<AuditRecord> {
        require(actor, Resource::Audits, Action::Edit)?;

        let mut state = self.store.write()?;
        let audit = state.audit_mut(audit_id)?;
        if !matches!(audit.status, AuditStatus::InProgress | AuditStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot send a {} audit to review",
                audit.status.as_str()
            )));
        }

        audit.status = AuditStatus::RequiresReview;
        audit.review_reason = reason;
        audit.refresh_score();

        tracing::info!(audit_id = %audit_id, "Audit flagged for review");
        Ok(audit.clone())
    }

    pub fn get_audit(&self, actor: &Actor, audit_id: Uuid) -> AppResult<AuditRecord> {
        require(actor, Resource::Audits, Action::View)?;
        let state = self.store.read()?;
        state.audit(audit_id).cloned()
    }

    /// Audits, oldest first
    pub fn list_audits(&self, actor: &Actor) -> AppResult<Vec<AuditRecord>> {
        require(actor, Resource::Audits, Action::View)?;
        let state = self.store.read()?;
        let mut audits: Vec<AuditRecord> = state.audits().cloned().collect();
        audits.sort_by_key(|a| a.created_at);
        Ok(audits)
    }
}
