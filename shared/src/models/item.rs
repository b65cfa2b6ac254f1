//! Inventory item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A stocked item (linen, amenity, food and beverage, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Never negative. Changes only when a ledger record is applied.
    pub current_stock: Decimal,
    pub unit: String,
    pub restock_threshold: Decimal,
    pub max_stock: Option<Decimal>,
    /// Unit cost, used to value transactions
    pub cost: Option<Decimal>,
    /// Bumped on every applied stock change
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new item
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    pub restock_threshold: Decimal,
    pub max_stock: Option<Decimal>,
    pub cost: Option<Decimal>,
}

impl InventoryItem {
    /// Build a fresh item with zero stock. Opening balances go through
    /// the ledger as stock-in transactions.
    pub fn new(input: NewItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            current_stock: Decimal::ZERO,
            unit: input.unit,
            restock_threshold: input.restock_threshold,
            max_stock: input.max_stock,
            cost: input.cost,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.restock_threshold
    }
}
