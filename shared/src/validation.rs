//! Validation utilities for the inventory engine
//!
//! Every check here runs before any state is touched, so a rejected
//! request never leaves partial effects behind.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    AdjustmentRequestType, AuditScope, RecordCountInput, RecordTransactionInput, TransactionType,
};
use crate::types::Actor;

/// Validation failures, reported before any state change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("Invalid user data: {0}")]
    InvalidUser(String),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A transaction input with its required fields present and sane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidTransaction {
    pub item_id: Uuid,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
}

// ============================================================================
// Transaction and user checks
// ============================================================================

/// Check the fields every transaction needs.
///
/// Adjustment quantities may be zero (absolute set); stock-in and
/// stock-out need a strictly positive quantity.
pub fn validate_transaction(
    input: &RecordTransactionInput,
) -> Result<ValidTransaction, ValidationError> {
    let item_id = input
        .item_id
        .filter(|id| !id.is_nil())
        .ok_or_else(|| ValidationError::InvalidTransaction("itemId is required".into()))?;

    let transaction_type = input
        .transaction_type
        .ok_or_else(|| ValidationError::InvalidTransaction("type is required".into()))?;

    let quantity = input
        .quantity
        .ok_or_else(|| ValidationError::InvalidTransaction("quantity is required".into()))?;

    check_quantity(transaction_type, quantity)?;

    if let Some(value) = input.value {
        if value < Decimal::ZERO {
            return Err(ValidationError::InvalidTransaction(
                "value cannot be negative".into(),
            ));
        }
    }

    Ok(ValidTransaction {
        item_id,
        transaction_type,
        quantity,
    })
}

/// Quantity preconditions per transaction type
pub fn check_quantity(
    transaction_type: TransactionType,
    quantity: Decimal,
) -> Result<(), ValidationError> {
    if quantity < Decimal::ZERO {
        return Err(ValidationError::InvalidTransaction(
            "quantity cannot be negative".into(),
        ));
    }
    match transaction_type {
        TransactionType::StockIn | TransactionType::StockOut if quantity.is_zero() => {
            Err(ValidationError::InvalidTransaction(format!(
                "{} quantity must be greater than zero",
                transaction_type.as_str()
            )))
        }
        _ => Ok(()),
    }
}

/// A stock-in must leave a representable stock level
pub fn check_stock_headroom(
    transaction_type: TransactionType,
    quantity: Decimal,
    previous_stock: Decimal,
) -> Result<(), ValidationError> {
    if transaction_type == TransactionType::StockIn && previous_stock.checked_add(quantity).is_none() {
        return Err(ValidationError::InvalidTransaction(
            "resulting stock is out of range".into(),
        ));
    }
    Ok(())
}

/// The caller must be identified
pub fn validate_actor(actor: &Actor) -> Result<(), ValidationError> {
    if actor.user_id.is_nil() {
        return Err(ValidationError::InvalidUser("user id is required".into()));
    }
    Ok(())
}

// ============================================================================
// Audit and adjustment checks
// ============================================================================

/// Sampling must be a percentage in (0, 100]
pub fn validate_scope(scope: &AuditScope) -> Result<(), ValidationError> {
    if scope.sampling_percent <= Decimal::ZERO || scope.sampling_percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::field(
            "samplingPercent",
            "must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

/// Counts are physical quantities and cannot be negative
pub fn validate_count(input: &RecordCountInput) -> Result<(), ValidationError> {
    if input.expected_stock < Decimal::ZERO {
        return Err(ValidationError::field("expectedStock", "cannot be negative"));
    }
    if input.actual_stock < Decimal::ZERO {
        return Err(ValidationError::field("actualStock", "cannot be negative"));
    }
    if let Some(kind) = input.discrepancy_type {
        if !kind.is_explicit() {
            return Err(ValidationError::field(
                "discrepancyType",
                "only damaged or expired may be set; shortage and excess are inferred",
            ));
        }
    }
    Ok(())
}

/// A proposed stock level must be reachable for the request type
pub fn validate_proposed_stock(
    request_type: AdjustmentRequestType,
    current_stock: Decimal,
    proposed_stock: Decimal,
) -> Result<(), ValidationError> {
    if proposed_stock < Decimal::ZERO {
        return Err(ValidationError::field("proposedStock", "cannot be negative"));
    }
    if request_type == AdjustmentRequestType::WriteOff && proposed_stock >= current_stock {
        return Err(ValidationError::field(
            "proposedStock",
            "a write-off must reduce the current stock",
        ));
    }
    Ok(())
}

/// Free-text fields that must carry something
pub fn validate_required_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, "is required"));
    }
    Ok(())
}
