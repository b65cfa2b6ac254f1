//! Role-permission table tests
//!
//! Tests for permission lookup including:
//! - Property 9: Lookup is total over arbitrary strings
//! - Property 10: Inventory controller holds a superset of every other role

use proptest::prelude::*;
use shared::models::{check_permission, Action, Resource, Role};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Kitchen staff can record but not approve or export
    #[test]
    fn test_kitchen_staff_permissions() {
        assert!(check_permission("kitchen-staff", "transactions", "create"));
        assert!(check_permission("kitchen-staff", "adjustments", "create"));
        assert!(!check_permission("kitchen-staff", "transactions", "approve"));
        assert!(!check_permission("kitchen-staff", "transactions", "export"));
        assert!(!check_permission("kitchen-staff", "audits", "view"));
    }

    /// Purchasing officers own purchase orders and deliveries but approve nothing
    #[test]
    fn test_purchasing_officer_permissions() {
        assert!(check_permission("purchasing-officer", "purchase-orders", "edit"));
        assert!(check_permission("purchasing-officer", "deliveries", "create"));
        assert!(check_permission("purchasing-officer", "reports", "export"));
        assert!(!check_permission("purchasing-officer", "purchase-orders", "delete"));
        for resource in Resource::ALL {
            assert!(!Role::PurchasingOfficer.can(resource, Action::Approve));
        }
    }

    /// Controllers may do everything
    #[test]
    fn test_controller_has_every_permission() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(Role::InventoryController.can(resource, action));
            }
        }
    }

    /// Null-ish inputs are simply denied
    #[test]
    fn test_empty_inputs_denied() {
        assert!(!check_permission("", "", ""));
        assert!(!check_permission("inventory-controller", "", "view"));
        assert!(!check_permission("inventory-controller", "inventory", ""));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn arb_resource() -> impl Strategy<Value = Resource> {
        prop::sample::select(Resource::ALL.to_vec())
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 9: arbitrary strings never panic and are denied unless
        /// they spell a table entry
        #[test]
        fn prop_lookup_is_total(role in ".{0,24}", resource in ".{0,24}", action in ".{0,12}") {
            let allowed = check_permission(&role, &resource, &action);
            let known = role.parse::<Role>().is_ok()
                && resource.parse::<Resource>().is_ok()
                && action.parse::<Action>().is_ok();
            prop_assert!(!allowed || known);
        }

        /// Slug lookup and typed lookup agree
        #[test]
        fn prop_slug_matches_typed(role in arb_role(), resource in arb_resource(), action in arb_action()) {
            prop_assert_eq!(
                check_permission(role.as_str(), resource.as_str(), action.as_str()),
                role.can(resource, action)
            );
        }

        /// Property 10: whatever another role may do, the controller may too
        #[test]
        fn prop_controller_superset(role in arb_role(), resource in arb_resource(), action in arb_action()) {
            if role.can(resource, action) {
                prop_assert!(Role::InventoryController.can(resource, action));
            }
        }
    }
}
