//! Append-only transaction ledger with a pending-approval index

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use shared::models::{TransactionRecord, TransactionStatus};
use uuid::Uuid;

/// Ways a ledger update can be refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transaction {0} not found")]
    NotFound(Uuid),

    #[error("transaction {0} is already approved")]
    AlreadyApproved(Uuid),

    #[error("transaction {0} was rejected")]
    AlreadyRejected(Uuid),

    #[error("transaction {0} is already in the ledger")]
    DuplicateId(Uuid),
}

/// Records in append order. Positions never move; `pending` holds the
/// positions of records still awaiting a decision.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    records: Vec<TransactionRecord>,
    index: HashMap<Uuid, usize>,
    pending: BTreeSet<usize>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record at the end of the ledger
    pub fn append(&mut self, record: TransactionRecord) -> Result<&TransactionRecord, LedgerError> {
        if self.index.contains_key(&record.id) {
            return Err(LedgerError::DuplicateId(record.id));
        }

        let position = self.records.len();
        self.index.insert(record.id, position);
        if record.is_pending() {
            self.pending.insert(position);
        }
        self.records.push(record);

        Ok(&self.records[position])
    }

    pub fn get(&self, id: Uuid) -> Option<&TransactionRecord> {
        self.index.get(&id).map(|&position| &self.records[position])
    }

    /// All records, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    /// Records awaiting approval, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.pending.iter().map(|&position| &self.records[position])
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check that `id` is still pending without touching it
    pub fn ensure_pending(&self, id: Uuid) -> Result<&TransactionRecord, LedgerError> {
        let record = self.get(id).ok_or(LedgerError::NotFound(id))?;
        match record.status() {
            TransactionStatus::Pending => Ok(record),
            TransactionStatus::Approved => Err(LedgerError::AlreadyApproved(id)),
            TransactionStatus::Rejected => Err(LedgerError::AlreadyRejected(id)),
        }
    }

    /// Pending -> approved, exactly once
    pub fn mark_approved(
        &mut self,
        id: Uuid,
        approver: Uuid,
        at: DateTime<Utc>,
    ) -> Result<&TransactionRecord, LedgerError> {
        let position = self.pending_position(id)?;
        let record = &mut self.records[position];
        record.approved = true;
        record.approved_by = Some(approver);
        record.approved_at = Some(at);
        self.pending.remove(&position);
        Ok(&self.records[position])
    }

    /// Pending -> rejected, exactly once
    pub fn mark_rejected(
        &mut self,
        id: Uuid,
        rejected_by: Uuid,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<&TransactionRecord, LedgerError> {
        let position = self.pending_position(id)?;
        let record = &mut self.records[position];
        record.rejected_by = Some(rejected_by);
        record.rejected_at = Some(at);
        record.rejection_reason = reason;
        self.pending.remove(&position);
        Ok(&self.records[position])
    }

    fn pending_position(&self, id: Uuid) -> Result<usize, LedgerError> {
        self.ensure_pending(id)?;
        self.index.get(&id).copied().ok_or(LedgerError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{Role, TransactionDetails, TransactionType};
    use shared::types::Actor;

    fn record(auto_approve: bool) -> TransactionRecord {
        let actor = Actor::new(Uuid::new_v4(), Role::KitchenStaff);
        TransactionRecord::new(
            Uuid::new_v4(),
            TransactionType::StockIn,
            Decimal::from(4),
            Decimal::from(1),
            0,
            None,
            TransactionDetails::default(),
            &actor,
            auto_approve,
        )
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut ledger = TransactionLedger::new();
        let ids: Vec<Uuid> = (0..5)
            .map(|i| ledger.append(record(i % 2 == 0)).unwrap().id)
            .collect();
        let stored: Vec<Uuid> = ledger.iter().map(|r| r.id).collect();
        assert_eq!(ids, stored);
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn pending_index_tracks_unapproved_records() {
        let mut ledger = TransactionLedger::new();
        let a = ledger.append(record(false)).unwrap().id;
        ledger.append(record(true)).unwrap();
        let c = ledger.append(record(false)).unwrap().id;

        let pending: Vec<Uuid> = ledger.pending().map(|r| r.id).collect();
        assert_eq!(pending, vec![a, c]);

        ledger.mark_approved(a, Uuid::new_v4(), Utc::now()).unwrap();
        let pending: Vec<Uuid> = ledger.pending().map(|r| r.id).collect();
        assert_eq!(pending, vec![c]);
    }

    #[test]
    fn approval_happens_once() {
        let mut ledger = TransactionLedger::new();
        let id = ledger.append(record(false)).unwrap().id;
        let approver = Uuid::new_v4();
        let first_at = ledger
            .mark_approved(id, approver, Utc::now())
            .unwrap()
            .approved_at;

        let err = ledger.mark_approved(id, Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyApproved(id));
        let stored = ledger.get(id).unwrap();
        assert_eq!(stored.approved_by, Some(approver));
        assert_eq!(stored.approved_at, first_at);
    }

    #[test]
    fn rejected_records_cannot_be_approved() {
        let mut ledger = TransactionLedger::new();
        let id = ledger.append(record(false)).unwrap().id;
        ledger
            .mark_rejected(id, Uuid::new_v4(), Some("wrong item".into()), Utc::now())
            .unwrap();
        assert_eq!(
            ledger.mark_approved(id, Uuid::new_v4(), Utc::now()).unwrap_err(),
            LedgerError::AlreadyRejected(id)
        );
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let mut ledger = TransactionLedger::new();
        let r = record(false);
        ledger.append(r.clone()).unwrap();
        assert!(matches!(ledger.append(r), Err(LedgerError::DuplicateId(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let ledger = TransactionLedger::new();
        let id = Uuid::new_v4();
        assert_eq!(ledger.ensure_pending(id).unwrap_err(), LedgerError::NotFound(id));
    }
}
