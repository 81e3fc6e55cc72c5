//! Ledger module containing the append-only store and its specializations

pub mod append;
pub mod bank;
pub mod chart;
pub mod general;
pub mod period;
pub mod purchase;
pub mod sales;

pub use append::*;
pub use bank::*;
pub use chart::*;
pub use general::*;
pub use period::*;
pub use purchase::*;
pub use sales::*;
