//! Approval-requirement policy
//!
//! The single place that decides whether a stock change needs a second
//! approver. Callers never branch on role themselves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Action, AdjustmentRequestType, Resource, TransactionType};
use crate::types::Actor;
use crate::validation::{self, ValidationError};

/// Default monetary threshold above which even controllers need approval
pub const DEFAULT_VALUE_THRESHOLD: i64 = 5000;

/// What is being asked for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalAction {
    StockIn,
    StockOut,
    Adjustment,
    WriteOff,
    ConditionUpdate,
}

impl ApprovalAction {
    /// Adjustments and write-offs stay under value control for everyone
    fn is_value_controlled(&self) -> bool {
        matches!(self, ApprovalAction::Adjustment | ApprovalAction::WriteOff)
    }

    fn resource(&self) -> Resource {
        match self {
            ApprovalAction::StockIn | ApprovalAction::StockOut | ApprovalAction::Adjustment => {
                Resource::Transactions
            }
            ApprovalAction::WriteOff | ApprovalAction::ConditionUpdate => Resource::Adjustments,
        }
    }
}

impl From<TransactionType> for ApprovalAction {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::StockIn => ApprovalAction::StockIn,
            TransactionType::StockOut => ApprovalAction::StockOut,
            TransactionType::Adjustment => ApprovalAction::Adjustment,
        }
    }
}

impl From<AdjustmentRequestType> for ApprovalAction {
    fn from(value: AdjustmentRequestType) -> Self {
        match value {
            AdjustmentRequestType::StockAdjustment => ApprovalAction::Adjustment,
            AdjustmentRequestType::WriteOff => ApprovalAction::WriteOff,
            AdjustmentRequestType::ConditionUpdate => ApprovalAction::ConditionUpdate,
        }
    }
}

/// The facts the policy decides on
#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovalSubject {
    pub item_id: Option<Uuid>,
    pub action: Option<ApprovalAction>,
    pub quantity: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    /// Explicit value; takes precedence over quantity x unit cost
    pub declared_value: Option<Decimal>,
}

impl ApprovalSubject {
    /// Monetary value of the change. Fails when quantity x unit cost
    /// does not fit in a decimal.
    pub fn value(&self) -> Result<Decimal, ValidationError> {
        match (self.declared_value, self.quantity, self.unit_cost) {
            (Some(value), _, _) => Ok(value),
            (None, Some(quantity), Some(cost)) => quantity.checked_mul(cost).ok_or_else(|| {
                ValidationError::InvalidTransaction("quantity x unit cost is out of range".into())
            }),
            _ => Ok(Decimal::ZERO),
        }
    }
}

/// Threshold-based approval policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalPolicy {
    pub value_threshold: Decimal,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            value_threshold: Decimal::from(DEFAULT_VALUE_THRESHOLD),
        }
    }
}

impl ApprovalPolicy {
    pub fn new(value_threshold: Decimal) -> Self {
        Self { value_threshold }
    }

    /// Decide whether `subject` needs a second approver when raised by `actor`.
    ///
    /// Actors holding the approve permission for the subject's resource
    /// self-approve, except for adjustments and write-offs whose value
    /// exceeds the threshold. Everyone else always needs approval.
    pub fn requires_approval(
        &self,
        subject: &ApprovalSubject,
        actor: &Actor,
    ) -> Result<bool, ValidationError> {
        let action = self.validate_subject(subject)?;
        validation::validate_actor(actor)?;
        let exceeds = self.exceeds_threshold(subject)?;

        if !actor.can(action.resource(), Action::Approve) {
            return Ok(true);
        }

        Ok(action.is_value_controlled() && exceeds)
    }

    /// Whether the subject's value is above the threshold
    pub fn exceeds_threshold(&self, subject: &ApprovalSubject) -> Result<bool, ValidationError> {
        Ok(subject.value()? > self.value_threshold)
    }

    fn validate_subject(&self, subject: &ApprovalSubject) -> Result<ApprovalAction, ValidationError> {
        if subject.item_id.map_or(true, |id| id.is_nil()) {
            return Err(ValidationError::InvalidTransaction("itemId is required".into()));
        }
        let action = subject
            .action
            .ok_or_else(|| ValidationError::InvalidTransaction("type is required".into()))?;
        let quantity = subject
            .quantity
            .ok_or_else(|| ValidationError::InvalidTransaction("quantity is required".into()))?;

        match action {
            ApprovalAction::StockIn => validation::check_quantity(TransactionType::StockIn, quantity)?,
            ApprovalAction::StockOut => {
                validation::check_quantity(TransactionType::StockOut, quantity)?
            }
            _ if quantity < Decimal::ZERO => {
                return Err(ValidationError::InvalidTransaction(
                    "quantity cannot be negative".into(),
                ))
            }
            _ => {}
        }
        Ok(action)
    }
}
