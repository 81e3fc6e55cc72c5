//! # Bookkeeping Core
//!
//! A double-entry bookkeeping engine built on append-only ledgers that
//! must stay mutually reconciled.
//!
//! ## Features
//!
//! - **Append-only ledgers**: bank, purchase, and sales ledgers with
//!   unique, strictly increasing transaction and batch identifiers
//! - **General Ledger posting**: balanced journals only, enforced
//!   atomically before any row is persisted
//! - **Accounting periods**: a monthly period calendar driving reversing
//!   journals and prepayment amortization schedules
//! - **Inter-ledger dispersal**: unposted sub-ledger items translated
//!   into balanced control-account journals, tracked so each item moves
//!   at most once
//! - **Control-account reconciliation**: end-of-period agreement checks
//!   between the General Ledger and its sub-ledgers
//!
//! ## Quick Start
//!
//! ```rust
//! use bookkeeping_core::{
//!     ChartOfAccounts, GeneralLedger, GeneralLedgerTransactions, Journal, JournalLine,
//!     MonthlyCalendar,
//! };
//! use chrono::NaiveDate;
//!
//! let ledger = GeneralLedger::new(
//!     GeneralLedgerTransactions::new(),
//!     ChartOfAccounts::new(),
//!     MonthlyCalendar::for_year(2021),
//! );
//!
//! let date = NaiveDate::from_ymd_opt(2021, 1, 1);
//! let journal = Journal::new(
//!     "gnl",
//!     date,
//!     vec![
//!         JournalLine::new("bank_contra", "opening cash", 100_000, date),
//!         JournalLine::new("capital", "opening cash", -100_000, date),
//!     ],
//! );
//! ledger.add_journal(&journal).unwrap();
//! assert_eq!(ledger.transactions.balance(), 0);
//! ```

pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
