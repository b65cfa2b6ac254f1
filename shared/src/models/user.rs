//! Roles, resources and the static role-permission table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Staff roles recognised by the inventory engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    InventoryController,
    PurchasingOfficer,
    KitchenStaff,
}

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Inventory,
    Transactions,
    Audits,
    Adjustments,
    PurchaseOrders,
    Deliveries,
    Reports,
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Approve,
    Export,
}

/// A permission granting a set of actions on a resource
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub actions: &'static [Action],
}

const ALL_ACTIONS: &[Action] = &[
    Action::View,
    Action::Create,
    Action::Edit,
    Action::Delete,
    Action::Approve,
    Action::Export,
];

const INVENTORY_CONTROLLER: &[Permission] = &[
    Permission { resource: Resource::Inventory, actions: ALL_ACTIONS },
    Permission { resource: Resource::Transactions, actions: ALL_ACTIONS },
    Permission { resource: Resource::Audits, actions: ALL_ACTIONS },
    Permission { resource: Resource::Adjustments, actions: ALL_ACTIONS },
    Permission { resource: Resource::PurchaseOrders, actions: ALL_ACTIONS },
    Permission { resource: Resource::Deliveries, actions: ALL_ACTIONS },
    Permission { resource: Resource::Reports, actions: ALL_ACTIONS },
];

const PURCHASING_OFFICER: &[Permission] = &[
    Permission { resource: Resource::Inventory, actions: &[Action::View] },
    Permission { resource: Resource::Transactions, actions: &[Action::View, Action::Create] },
    Permission {
        resource: Resource::PurchaseOrders,
        actions: &[Action::View, Action::Create, Action::Edit],
    },
    Permission {
        resource: Resource::Deliveries,
        actions: &[Action::View, Action::Create, Action::Edit],
    },
    Permission { resource: Resource::Audits, actions: &[Action::View] },
    Permission { resource: Resource::Adjustments, actions: &[Action::View, Action::Create] },
    Permission { resource: Resource::Reports, actions: &[Action::View, Action::Export] },
];

const KITCHEN_STAFF: &[Permission] = &[
    Permission { resource: Resource::Inventory, actions: &[Action::View] },
    Permission { resource: Resource::Transactions, actions: &[Action::View, Action::Create] },
    Permission { resource: Resource::Deliveries, actions: &[Action::View] },
    Permission { resource: Resource::Adjustments, actions: &[Action::View, Action::Create] },
];

impl Role {
    pub const ALL: [Role; 3] = [
        Role::InventoryController,
        Role::PurchasingOfficer,
        Role::KitchenStaff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::InventoryController => "inventory-controller",
            Role::PurchasingOfficer => "purchasing-officer",
            Role::KitchenStaff => "kitchen-staff",
        }
    }

    /// Row of the permission table for this role
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::InventoryController => INVENTORY_CONTROLLER,
            Role::PurchasingOfficer => PURCHASING_OFFICER,
            Role::KitchenStaff => KITCHEN_STAFF,
        }
    }

    /// Check whether this role may perform `action` on `resource`
    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.permissions()
            .iter()
            .find(|p| p.resource == resource)
            .is_some_and(|p| p.actions.contains(&action))
    }
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Inventory,
        Resource::Transactions,
        Resource::Audits,
        Resource::Adjustments,
        Resource::PurchaseOrders,
        Resource::Deliveries,
        Resource::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Inventory => "inventory",
            Resource::Transactions => "transactions",
            Resource::Audits => "audits",
            Resource::Adjustments => "adjustments",
            Resource::PurchaseOrders => "purchase-orders",
            Resource::Deliveries => "deliveries",
            Resource::Reports => "reports",
        }
    }
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
        Action::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Export => "export",
        }
    }
}

/// Error returned when a role, resource or action slug is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownSlug {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Role {
    type Err = UnknownSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownSlug { kind: "role", value: s.to_string() })
    }
}

impl FromStr for Resource {
    type Err = UnknownSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownSlug { kind: "resource", value: s.to_string() })
    }
}

impl FromStr for Action {
    type Err = UnknownSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownSlug { kind: "action", value: s.to_string() })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the permission table by slug.
///
/// Total over its input: any unknown or empty role, resource or action
/// yields `false`.
pub fn check_permission(role: &str, resource: &str, action: &str) -> bool {
    match (role.parse::<Role>(), resource.parse::<Resource>(), action.parse::<Action>()) {
        (Ok(role), Ok(resource), Ok(action)) => role.can(resource, action),
        _ => false,
    }
}
