//! Domain models for the hotel inventory engine

mod adjustment;
mod audit;
mod item;
mod transaction;
mod user;

pub use adjustment::*;
pub use audit::*;
pub use item::*;
pub use transaction::*;
pub use user::*;
