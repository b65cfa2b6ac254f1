//! Shared types and rules for the hotel inventory engine
//!
//! This crate holds the pure parts of the engine: domain models, the
//! role-permission table, stock arithmetic, the approval policy and input
//! validation. It performs no I/O.

pub mod models;
pub mod policy;
pub mod types;
pub mod validation;

pub use models::*;
pub use policy::*;
pub use types::*;
pub use validation::*;
