//! Inventory item service: registration and stock lookups

use rust_decimal::Decimal;
use shared::models::{Action, InventoryItem, NewItem, Resource};
use shared::types::Actor;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::require;
use crate::store::InventoryStore;

/// Inventory service for registering and reading items
#[derive(Clone)]
pub struct InventoryService {
    store: InventoryStore,
}

impl InventoryService {
    pub fn new(store: InventoryStore) -> Self {
        Self { store }
    }

    /// Register a new item with zero stock
    pub fn register_item(&self, actor: &Actor, input: NewItem) -> AppResult<InventoryItem> {
        require(actor, Resource::Inventory, Action::Create)?;
        input.validate()?;
        non_negative("restockThreshold", Some(input.restock_threshold))?;
        non_negative("maxStock", input.max_stock)?;
        non_negative("cost", input.cost)?;

        let mut state = self.store.write()?;
        let item = state.insert_item(InventoryItem::new(input)).clone();

        tracing::info!(item_id = %item.id, category = %item.category, "Registered item {}", item.name);
        Ok(item)
    }

    pub fn get_item(&self, actor: &Actor, item_id: Uuid) -> AppResult<InventoryItem> {
        require(actor, Resource::Inventory, Action::View)?;
        let state = self.store.read()?;
        state.item(item_id).cloned()
    }

    /// Items sorted by name, optionally limited to one category
    pub fn list_items(&self, actor: &Actor, category: Option<&str>) -> AppResult<Vec<InventoryItem>> {
        require(actor, Resource::Inventory, Action::View)?;
        let state = self.store.read()?;
        let mut items: Vec<InventoryItem> = state
            .items()
            .filter(|item| category.map_or(true, |c| item.category == c))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(items)
    }

    /// Items at or below their restock threshold
    pub fn low_stock_items(&self, actor: &Actor) -> AppResult<Vec<InventoryItem>> {
        let mut items = self.list_items(actor, None)?;
        items.retain(InventoryItem::is_low_stock);
        Ok(items)
    }
}

fn non_negative(field: &str, value: Option<Decimal>) -> AppResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(AppError::Validation {
            field: field.to_string(),
            message: "cannot be negative".to_string(),
        }),
        _ => Ok(()),
    }
}
