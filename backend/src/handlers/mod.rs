//! HTTP request handlers for the hotel inventory engine

pub mod adjustment;
pub mod audit;
pub mod health;
pub mod inventory;
pub mod reporting;
pub mod transaction;

pub use adjustment::*;
pub use audit::*;
pub use health::*;
pub use inventory::*;
pub use reporting::*;
pub use transaction::*;
