//! In-memory engine state
//!
//! All items, ledger records, audits and adjustment requests live behind
//! one `RwLock`. An operation takes the write guard once, validates, then
//! mutates, so a failed call leaves nothing behind and concurrent calls
//! are serialised.

mod ledger;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use shared::models::{AdjustmentRequest, AuditRecord, InventoryItem, TransactionRecord};
use shared::types::Actor;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub use ledger::{LedgerError, TransactionLedger};

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => AppError::NotFound("Transaction".into()),
            other => AppError::conflict("transaction", other.to_string()),
        }
    }
}

/// Everything the engine knows
#[derive(Debug, Default)]
pub struct EngineState {
    items: HashMap<Uuid, InventoryItem>,
    ledger: TransactionLedger,
    audits: HashMap<Uuid, AuditRecord>,
    /// discrepancy id -> owning audit id
    discrepancy_index: HashMap<Uuid, Uuid>,
    adjustments: HashMap<Uuid, AdjustmentRequest>,
}

impl EngineState {
    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub fn insert_item(&mut self, item: InventoryItem) -> &InventoryItem {
        let id = item.id;
        self.items.entry(id).or_insert(item)
    }

    pub fn item(&self, id: Uuid) -> AppResult<&InventoryItem> {
        self.items
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Item".into()))
    }

    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    // ------------------------------------------------------------------
    // Ledger
    // ------------------------------------------------------------------

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Append a record. Approved records are applied to their item in the
    /// same step; pending ones leave stock alone.
    pub fn append_transaction(&mut self, record: TransactionRecord) -> AppResult<TransactionRecord> {
        if record.approved {
            self.check_version(&record)?;
        } else {
            self.item(record.item_id)?;
        }

        let stored = self.ledger.append(record)?.clone();
        if stored.approved {
            self.apply_record(&stored)?;
        }
        Ok(stored)
    }

    /// Approve a pending record and apply it.
    ///
    /// The record must still describe the item it was computed from; if
    /// the item moved on since, the record stays pending and the caller
    /// gets a conflict.
    pub fn approve_transaction(&mut self, id: Uuid, approver: &Actor) -> AppResult<TransactionRecord> {
        let record = self.ledger.ensure_pending(id)?.clone();
        self.check_version(&record)?;

        let approved = self
            .ledger
            .mark_approved(id, approver.user_id, Utc::now())?
            .clone();
        self.apply_record(&approved)?;
        Ok(approved)
    }

    pub fn reject_transaction(
        &mut self,
        id: Uuid,
        rejected_by: &Actor,
        reason: Option<String>,
    ) -> AppResult<TransactionRecord> {
        Ok(self
            .ledger
            .mark_rejected(id, rejected_by.user_id, reason, Utc::now())?
            .clone())
    }

    fn check_version(&self, record: &TransactionRecord) -> AppResult<()> {
        let item = self.item(record.item_id)?;
        if item.version != record.item_version {
            return Err(AppError::conflict(
                "item",
                format!(
                    "item {} changed since the transaction was recorded (version {} != {})",
                    item.id, item.version, record.item_version
                ),
            ));
        }
        Ok(())
    }

    /// The only place stock levels change
    fn apply_record(&mut self, record: &TransactionRecord) -> AppResult<()> {
        let item = self
            .items
            .get_mut(&record.item_id)
            .ok_or_else(|| AppError::NotFound("Item".into()))?;
        item.current_stock = record.new_stock;
        item.version += 1;
        item.updated_at = Utc::now();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Audits
    // ------------------------------------------------------------------

    pub fn insert_audit(&mut self, audit: AuditRecord) -> &AuditRecord {
        let id = audit.id;
        self.audits.entry(id).or_insert(audit)
    }

    pub fn audit(&self, id: Uuid) -> AppResult<&AuditRecord> {
        self.audits
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Audit".into()))
    }

    pub fn audit_mut(&mut self, id: Uuid) -> AppResult<&mut AuditRecord> {
        self.audits
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Audit".into()))
    }

    pub fn audits(&self) -> impl Iterator<Item = &AuditRecord> {
        self.audits.values()
    }

    pub fn index_discrepancy(&mut self, discrepancy_id: Uuid, audit_id: Uuid) {
        self.discrepancy_index.insert(discrepancy_id, audit_id);
    }

    /// Audit that owns a discrepancy
    pub fn discrepancy_audit(&self, discrepancy_id: Uuid) -> AppResult<Uuid> {
        self.discrepancy_index
            .get(&discrepancy_id)
            .copied()
            .ok_or_else(|| AppError::NotFound("Discrepancy".into()))
    }

    // ------------------------------------------------------------------
    // Adjustment requests
    // ------------------------------------------------------------------

    pub fn insert_adjustment(&mut self, request: AdjustmentRequest) -> &AdjustmentRequest {
        let id = request.id;
        self.adjustments.entry(id).or_insert(request)
    }

    pub fn adjustment(&self, id: Uuid) -> AppResult<&AdjustmentRequest> {
        self.adjustments
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Adjustment request".into()))
    }

    pub fn adjustment_mut(&mut self, id: Uuid) -> AppResult<&mut AdjustmentRequest> {
        self.adjustments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Adjustment request".into()))
    }

    pub fn adjustments(&self) -> impl Iterator<Item = &AdjustmentRequest> {
        self.adjustments.values()
    }
}

/// Shared handle to the engine state
#[derive(Clone, Default)]
pub struct InventoryStore {
    state: Arc<RwLock<EngineState>>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> AppResult<RwLockReadGuard<'_, EngineState>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("inventory state lock poisoned".into()))
    }

    pub fn write(&self) -> AppResult<RwLockWriteGuard<'_, EngineState>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("inventory state lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{NewItem, Role, TransactionDetails, TransactionType};

    fn item() -> InventoryItem {
        InventoryItem::new(NewItem {
            name: "Bath towel".into(),
            category: "linen".into(),
            unit: "pcs".into(),
            restock_threshold: Decimal::from(10),
            max_stock: None,
            cost: None,
        })
    }

    fn record(item: &InventoryItem, t: TransactionType, qty: i64, approved: bool) -> TransactionRecord {
        let actor = Actor::new(Uuid::new_v4(), Role::InventoryController);
        TransactionRecord::new(
            item.id,
            t,
            Decimal::from(qty),
            item.current_stock,
            item.version,
            None,
            TransactionDetails::default(),
            &actor,
            approved,
        )
    }

    #[test]
    fn approved_append_applies_stock_and_bumps_version() {
        let mut state = EngineState::default();
        let it = state.insert_item(item()).clone();
        state
            .append_transaction(record(&it, TransactionType::StockIn, 30, true))
            .unwrap();
        let after = state.item(it.id).unwrap();
        assert_eq!(after.current_stock, Decimal::from(30));
        assert_eq!(after.version, 1);
    }

    #[test]
    fn pending_append_leaves_stock_alone() {
        let mut state = EngineState::default();
        let it = state.insert_item(item()).clone();
        state
            .append_transaction(record(&it, TransactionType::StockIn, 30, false))
            .unwrap();
        assert_eq!(state.item(it.id).unwrap().current_stock, Decimal::ZERO);
        assert_eq!(state.ledger().pending_count(), 1);
    }

    #[test]
    fn stale_approval_conflicts_and_stays_pending() {
        let mut state = EngineState::default();
        let it = state.insert_item(item()).clone();
        let pending = state
            .append_transaction(record(&it, TransactionType::StockOut, 5, false))
            .unwrap();
        state
            .append_transaction(record(&it, TransactionType::StockIn, 10, true))
            .unwrap();

        let approver = Actor::new(Uuid::new_v4(), Role::InventoryController);
        let err = state.approve_transaction(pending.id, &approver).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(state.ledger().get(pending.id).unwrap().is_pending());
        assert_eq!(state.item(it.id).unwrap().current_stock, Decimal::from(10));
    }

    #[test]
    fn unknown_item_is_not_found() {
        let mut state = EngineState::default();
        let orphan = record(&item(), TransactionType::StockIn, 1, false);
        assert!(matches!(
            state.append_transaction(orphan),
            Err(AppError::NotFound(_))
        ));
        assert!(state.ledger().is_empty());
    }
}
