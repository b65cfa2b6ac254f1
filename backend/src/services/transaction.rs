//! Transaction service: recording, approving and rejecting ledger records

use shared::models::{
    Action, RecordTransactionInput, Resource, TransactionDetails, TransactionRecord,
};
use shared::policy::{ApprovalPolicy, ApprovalSubject};
use shared::types::Actor;
use shared::validation;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::require;
use crate::store::InventoryStore;

/// Transaction service for the stock ledger
#[derive(Clone)]
pub struct TransactionService {
    store: InventoryStore,
    policy: ApprovalPolicy,
}

impl TransactionService {
    pub fn new(store: InventoryStore, policy: ApprovalPolicy) -> Self {
        Self { store, policy }
    }

    /// Record a stock transaction.
    ///
    /// The record is approved on the spot when the approval policy allows
    /// it, and the item's stock moves in the same critical section.
    /// Otherwise it waits in the pending set.
    pub fn record_transaction(
        &self,
        actor: &Actor,
        input: RecordTransactionInput,
    ) -> AppResult<TransactionRecord> {
        validation::validate_actor(actor)?;
        require(actor, Resource::Transactions, Action::Create)?;
        let valid = validation::validate_transaction(&input)?;

        let mut state = self.store.write()?;
        let item = state.item(valid.item_id)?;

        if let Some(expected) = input.expected_version {
            if expected != item.version {
                tracing::warn!(
                    item_id = %item.id,
                    expected,
                    actual = item.version,
                    "Stale transaction refused"
                );
                return Err(AppError::conflict(
                    "item",
                    format!(
                        "item {} is at version {}, not {}",
                        item.id, item.version, expected
                    ),
                ));
            }
        }

        validation::check_stock_headroom(valid.transaction_type, valid.quantity, item.current_stock)?;

        let subject = ApprovalSubject {
            item_id: Some(valid.item_id),
            action: Some(valid.transaction_type.into()),
            quantity: Some(valid.quantity),
            unit_cost: item.cost,
            declared_value: input.value,
        };
        let needs_approval = self.policy.requires_approval(&subject, actor)?;

        let details = TransactionDetails {
            supplier: input.supplier,
            batch_number: input.batch_number,
            expiration_date: input.expiration_date,
            destination: input.destination,
            value: input.value,
        };
        let record = TransactionRecord::new(
            item.id,
            valid.transaction_type,
            valid.quantity,
            item.current_stock,
            item.version,
            input.reason,
            details,
            actor,
            !needs_approval,
        );

        let record = state.append_transaction(record)?;
        tracing::info!(
            transaction_id = %record.id,
            item_id = %record.item_id,
            kind = record.transaction_type.as_str(),
            quantity = %record.quantity,
            approved = record.approved,
            "Recorded transaction"
        );
        Ok(record)
    }

    /// Approve a pending record and apply it to its item
    pub fn approve_transaction(&self, actor: &Actor, id: Uuid) -> AppResult<TransactionRecord> {
        require(actor, Resource::Transactions, Action::Approve)?;

        let mut state = self.store.write()?;
        let record = state.approve_transaction(id, actor).map_err(|e| {
            if matches!(e, AppError::Conflict { .. }) {
                tracing::warn!(transaction_id = %id, "Approval refused: {}", e);
            }
            e
        })?;

        tracing::info!(
            transaction_id = %record.id,
            item_id = %record.item_id,
            approved_by = %actor.user_id,
            new_stock = %record.new_stock,
            "Approved transaction"
        );
        Ok(record)
    }

    /// Reject a pending record. Stock is not touched.
    pub fn reject_transaction(
        &self,
        actor: &Actor,
        id: Uuid,
        reason: Option<String>,
    ) -> AppResult<TransactionRecord> {
        require(actor, Resource::Transactions, Action::Approve)?;

        let mut state = self.store.write()?;
        let record = state.reject_transaction(id, actor, reason).map_err(|e| {
            if matches!(e, AppError::Conflict { .. }) {
                tracing::warn!(transaction_id = %id, "Rejection refused: {}", e);
            }
            e
        })?;

        tracing::info!(transaction_id = %record.id, rejected_by = %actor.user_id, "Rejected transaction");
        Ok(record)
    }

    pub fn get_transaction(&self, actor: &Actor, id: Uuid) -> AppResult<TransactionRecord> {
        require(actor, Resource::Transactions, Action::View)?;
        let state = self.store.read()?;
        state
            .ledger()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Transaction".into()))
    }

    /// Ledger records in append order, optionally for one item
    pub fn list_transactions(
        &self,
        actor: &Actor,
        item_id: Option<Uuid>,
    ) -> AppResult<Vec<TransactionRecord>> {
        require(actor, Resource::Transactions, Action::View)?;
        let state = self.store.read()?;
        Ok(state
            .ledger()
            .iter()
            .filter(|r| item_id.map_or(true, |id| r.item_id == id))
            .cloned()
            .collect())
    }

    /// Records awaiting approval, oldest first
    pub fn pending_transactions(&self, actor: &Actor) -> AppResult<Vec<TransactionRecord>> {
        require(actor, Resource::Transactions, Action::View)?;
        let state = self.store.read()?;
        Ok(state.ledger().pending().cloned().collect())
    }
}
