//! Inventory item tests
//!
//! Tests for the item store including:
//! - Property 17: New items start empty at version zero
//! - Property 18: Low-stock alerts match the restock threshold

use hotel_inventory_backend::error::AppError;
use hotel_inventory_backend::services::{InventoryService, TransactionService};
use hotel_inventory_backend::InventoryStore;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{NewItem, RecordTransactionInput, Role, TransactionType};
use shared::policy::ApprovalPolicy;
use shared::types::Actor;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn controller() -> Actor {
    Actor::new(Uuid::new_v4(), Role::InventoryController)
}

fn new_item(name: &str, category: &str, threshold: &str) -> NewItem {
    NewItem {
        name: name.into(),
        category: category.into(),
        unit: "pcs".into(),
        restock_threshold: dec(threshold),
        max_stock: None,
        cost: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Registration starts at zero stock
    #[test]
    fn test_register_item() {
        let items = InventoryService::new(InventoryStore::new());
        let item = items
            .register_item(&controller(), new_item("Pillow case", "linen", "30"))
            .unwrap();
        assert_eq!(item.current_stock, Decimal::ZERO);
        assert_eq!(item.version, 0);
        assert!(item.is_low_stock());
    }

    /// Blank names and negative thresholds are refused
    #[test]
    fn test_register_validation() {
        let items = InventoryService::new(InventoryStore::new());
        assert!(matches!(
            items.register_item(&controller(), new_item("", "linen", "1")),
            Err(AppError::Validation { .. })
        ));
        let err = items
            .register_item(&controller(), new_item("Sheet", "linen", "-1"))
            .unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "restockThreshold"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Only controllers register; everyone can view
    #[test]
    fn test_register_permissions() {
        let items = InventoryService::new(InventoryStore::new());
        let staff = Actor::new(Uuid::new_v4(), Role::KitchenStaff);
        assert!(matches!(
            items.register_item(&staff, new_item("Shortbread biscuits", "food-and-beverage", "100")),
            Err(AppError::PermissionDenied { .. })
        ));
        let item = items
            .register_item(&controller(), new_item("Shortbread biscuits", "food-and-beverage", "100"))
            .unwrap();
        assert_eq!(items.get_item(&staff, item.id).unwrap().id, item.id);
    }

    /// Category filter and name ordering
    #[test]
    fn test_list_by_category() {
        let items = InventoryService::new(InventoryStore::new());
        let c = controller();
        items.register_item(&c, new_item("Towel", "linen", "1")).unwrap();
        items.register_item(&c, new_item("Tea sachets", "food-and-beverage", "1")).unwrap();
        items.register_item(&c, new_item("Bathrobe", "linen", "1")).unwrap();

        let linen: Vec<String> = items
            .list_items(&c, Some("linen"))
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(linen, vec!["Bathrobe".to_string(), "Towel".to_string()]);
        assert_eq!(items.list_items(&c, None).unwrap().len(), 3);
    }

    /// Unknown items are not found
    #[test]
    fn test_get_unknown_item() {
        let items = InventoryService::new(InventoryStore::new());
        assert!(matches!(
            items.get_item(&controller(), Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 18: an item is on the low-stock list exactly when its
        /// stock is at or below the threshold
        #[test]
        fn prop_low_stock_matches_threshold(threshold in 0u32..100, stock in 0u32..200) {
            let store = InventoryStore::new();
            let items = InventoryService::new(store.clone());
            let ledger = TransactionService::new(store, ApprovalPolicy::default());
            let c = controller();

            let item = items
                .register_item(&c, new_item("Slippers", "amenities", &threshold.to_string()))
                .unwrap();
            if stock > 0 {
                ledger
                    .record_transaction(
                        &c,
                        RecordTransactionInput {
                            item_id: Some(item.id),
                            transaction_type: Some(TransactionType::StockIn),
                            quantity: Some(Decimal::from(stock)),
                            ..Default::default()
                        },
                    )
                    .unwrap();
            }

            let low = items.low_stock_items(&c).unwrap();
            prop_assert_eq!(low.iter().any(|i| i.id == item.id), stock <= threshold);
        }
    }
}
