//! Business logic services for the hotel inventory engine
//!
//! Every operation takes the acting user explicitly and checks its
//! permission before touching the store.

pub mod adjustment;
pub mod audit;
pub mod inventory;
pub mod reporting;
pub mod transaction;

pub use adjustment::AdjustmentService;
pub use audit::AuditService;
pub use inventory::InventoryService;
pub use reporting::ReportingService;
pub use transaction::TransactionService;
