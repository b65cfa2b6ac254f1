//! Stock transactions and the stock arithmetic behind them

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Actor;

/// Types of stock transactions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionType {
    StockIn,
    StockOut,
    /// Absolute set, not a delta
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::StockIn => "stock-in",
            TransactionType::StockOut => "stock-out",
            TransactionType::Adjustment => "adjustment",
        }
    }
}

/// Compute the stock level that results from applying a transaction.
///
/// Stock-out clamps at zero instead of failing on over-withdrawal and
/// stock-in saturates at `Decimal::MAX`. Quantity preconditions and
/// headroom are enforced by validation, not here.
pub fn calculate_new_stock(
    transaction_type: TransactionType,
    quantity: Decimal,
    previous_stock: Decimal,
) -> Decimal {
    match transaction_type {
        TransactionType::StockIn => previous_stock.saturating_add(quantity),
        TransactionType::StockOut => previous_stock.saturating_sub(quantity).max(Decimal::ZERO),
        TransactionType::Adjustment => quantity,
    }
}

/// Request body for recording a transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionInput {
    pub item_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub quantity: Option<Decimal>,
    pub reason: Option<String>,
    pub supplier: Option<String>,
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub destination: Option<String>,
    /// Declared monetary value; overrides quantity x unit cost
    pub value: Option<Decimal>,
    /// Reject unless the item is still at this version
    pub expected_version: Option<u64>,
}

/// Free-form context carried on a ledger record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub supplier: Option<String>,
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub destination: Option<String>,
    pub value: Option<Decimal>,
}

/// Where a record sits in the approval workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

/// An entry in the transaction ledger.
///
/// Everything except the approval and rejection fields is fixed at
/// creation; those move once, out of the pending state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    /// Item version `previous_stock` was read at
    pub item_version: u64,
    pub reason: Option<String>,
    pub details: TransactionDetails,
    pub performed_by: Uuid,
    pub performed_by_role: crate::models::Role,
    pub approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    /// Adjustment request this record settles, if any
    pub adjustment_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Build a new record against the item state it was computed from.
    /// When `auto_approve` is set the record is approved by its author.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        item_id: Uuid,
        transaction_type: TransactionType,
        quantity: Decimal,
        previous_stock: Decimal,
        item_version: u64,
        reason: Option<String>,
        details: TransactionDetails,
        performed_by: &Actor,
        auto_approve: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_id,
            transaction_type,
            quantity,
            previous_stock,
            new_stock: calculate_new_stock(transaction_type, quantity, previous_stock),
            item_version,
            reason,
            details,
            performed_by: performed_by.user_id,
            performed_by_role: performed_by.role,
            approved: auto_approve,
            approved_by: auto_approve.then_some(performed_by.user_id),
            approved_at: auto_approve.then_some(now),
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            adjustment_request_id: None,
            created_at: now,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        if self.approved {
            TransactionStatus::Approved
        } else if self.rejected_at.is_some() {
            TransactionStatus::Rejected
        } else {
            TransactionStatus::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TransactionStatus::Pending
    }
}
