//! Stock adjustment requests

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of adjustment request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentRequestType {
    StockAdjustment,
    WriteOff,
    ConditionUpdate,
}

/// Adjustment request workflow state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
    RequiresReview,
}

impl AdjustmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
            AdjustmentStatus::RequiresReview => "requires-review",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AdjustmentStatus::Pending | AdjustmentStatus::RequiresReview)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Request body for a new adjustment request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentInput {
    pub item_id: Uuid,
    pub request_type: AdjustmentRequestType,
    pub proposed_stock: Decimal,
    pub reason: String,
    pub priority: Option<Priority>,
    pub audit_id: Option<Uuid>,
    pub value: Option<Decimal>,
}

/// A proposed change to an item's stock, awaiting a decision.
///
/// `variance` is fixed at construction as `proposed_stock - current_stock`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub request_type: AdjustmentRequestType,
    pub current_stock: Decimal,
    pub proposed_stock: Decimal,
    pub variance: Decimal,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub priority: Priority,
    pub audit_id: Option<Uuid>,
    pub requested_by: Uuid,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_note: Option<String>,
    /// Ledger record that applied this request
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AdjustmentRequest {
    pub fn new(
        input: CreateAdjustmentInput,
        current_stock: Decimal,
        requested_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: input.item_id,
            request_type: input.request_type,
            current_stock,
            proposed_stock: input.proposed_stock,
            variance: input.proposed_stock - current_stock,
            reason: input.reason,
            status: AdjustmentStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            audit_id: input.audit_id,
            requested_by,
            decided_by: None,
            decided_at: None,
            decision_note: None,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }

    /// Whether approving this request changes the stock level
    pub fn changes_stock(&self) -> bool {
        !self.variance.is_zero()
    }
}
