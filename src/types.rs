//! Core types and data structures for the bookkeeping system

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::traits::{LedgerRow, LedgerTransaction};

/// Identifier assigned to every row stored in a ledger.
///
/// Transaction ids are unique for the lifetime of a ledger, strictly
/// increasing in insertion order, and never reused.
pub type TransactionId = u64;

/// Identifier shared by all rows inserted by one logical operation.
pub type BatchId = u32;

/// Identifier shared by all lines of one General Ledger journal.
pub type JournalId = u64;

/// Identifier carried over from an external source record.
pub type RawId = i64;

/// Monetary amount in minor currency units (e.g. pence).
///
/// All double-entry arithmetic is integer arithmetic; rounding decisions
/// are made explicitly where amounts are split (see prepayment journals).
pub type Amount = i64;

/// Accounting period number, 1 through 12 for a monthly calendar.
pub type PeriodId = i32;

/// Period assigned to rows whose transaction date is unknown.
pub const PERIOD_UNKNOWN: PeriodId = -1;

/// Suffix on a journal type that requests an automatic reversing journal
/// in the following period.
pub const REVERSAL_SUFFIX: &str = "_rev";

/// Whether a sub-ledger row has been extracted to the General Ledger.
///
/// `Unposted -> PostedToGl` is the only transition and it is terminal.
/// Rows only change state through the owning ledger's
/// `mark_extracted_to_gl`, never by direct field mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingState {
    /// Not yet represented in the General Ledger.
    Unposted,
    /// Extracted to the General Ledger; must never be dispersed again.
    PostedToGl,
}

impl PostingState {
    /// True once the row has been extracted to the General Ledger.
    pub fn is_posted(self) -> bool {
        matches!(self, PostingState::PostedToGl)
    }
}

/// One debit or credit line of a General Ledger journal.
///
/// Amounts are signed: debits positive, credits negative. The sign
/// convention only matters in aggregate; a journal is accepted when its
/// lines sum to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Nominal account the line posts to.
    pub nominal: String,
    /// Free-text narrative for the line.
    pub description: String,
    /// Signed amount in minor units.
    pub amount: Amount,
    /// Date the underlying event occurred, when known.
    pub transaction_date: Option<NaiveDate>,
}

impl JournalLine {
    /// Create a new journal line.
    pub fn new(
        nominal: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
        transaction_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            nominal: nominal.into(),
            description: description.into(),
            amount,
            transaction_date,
        }
    }
}

/// A balanced set of lines posted together to the General Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Short tag describing the journal's origin, e.g. `"gnl"`, `"pi"`,
    /// `"bank"`. A `_rev` suffix requests an automatic reversal in the
    /// following period.
    pub jnl_type: String,
    /// Date used to assign the journal's accounting period.
    pub transaction_date: Option<NaiveDate>,
    /// Ordered lines; persisted in exactly this order.
    pub lines: Vec<JournalLine>,
}

impl Journal {
    /// Create a new journal.
    pub fn new(
        jnl_type: impl Into<String>,
        transaction_date: Option<NaiveDate>,
        lines: Vec<JournalLine>,
    ) -> Self {
        Self {
            jnl_type: jnl_type.into(),
            transaction_date,
            lines,
        }
    }

    /// Sum of all line amounts.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Check the zero-sum invariant.
    ///
    /// This runs before any row is persisted, so a rejected journal leaves
    /// the ledger untouched.
    pub fn validate(&self) -> LedgerResult<()> {
        let total = self.total();
        if total != 0 {
            return Err(LedgerError::JournalBalance {
                jnl_type: self.jnl_type.clone(),
                total,
            });
        }
        Ok(())
    }

    /// True when posting this journal must also post its opposite in the
    /// following period.
    pub fn is_reversing(&self) -> bool {
        self.jnl_type.ends_with(REVERSAL_SUFFIX)
    }
}

/// A journal line as persisted in the General Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerTransaction {
    /// Unique, strictly increasing row identifier.
    pub transaction_id: TransactionId,
    /// Journal identifier shared by all lines posted in one `add_journal`.
    pub jnl_id: JournalId,
    /// Nominal account posted to.
    pub nominal: String,
    /// Journal type tag of the posting journal.
    pub jnl_type: String,
    /// Signed amount in minor units.
    pub amount: Amount,
    /// Line narrative.
    pub description: String,
    /// Date of the underlying event, when known.
    pub transaction_date: Option<NaiveDate>,
    /// Accounting period derived from the journal date, or
    /// [`PERIOD_UNKNOWN`] when the journal carried no date.
    pub period: PeriodId,
}

impl LedgerTransaction for GeneralLedgerTransaction {
    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

impl LedgerRow for GeneralLedgerTransaction {
    fn assign_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = id;
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

/// Errors that can occur in the bookkeeping system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A journal's lines did not sum to zero; nothing was persisted.
    #[error("journal '{jnl_type}' does not balance: lines sum to {total}")]
    JournalBalance {
        /// Type tag of the rejected journal.
        jnl_type: String,
        /// The non-zero total that caused the rejection.
        total: Amount,
    },
    /// A nominal account name was registered twice.
    #[error("nominal account '{0}' already exists")]
    DuplicateNominal(String),
    /// A nominal account lookup failed.
    #[error("nominal account not found: {0}")]
    NominalNotFound(String),
    /// No period in the calendar covers the given date.
    #[error("no accounting period covers {0}")]
    PeriodNotFound(NaiveDate),
    /// The calendar has no period with the given number.
    #[error("no accounting period numbered {0}")]
    UnknownPeriod(PeriodId),
    /// The calendar has no period after the given one.
    #[error("no accounting period follows period {0}")]
    NoNextPeriod(PeriodId),
    /// A dispersal operation named a ledger that was never registered.
    #[error("ledger not registered: {0}")]
    LedgerNotRegistered(String),
    /// A journal was structurally unusable, e.g. a reversing journal
    /// without a transaction date.
    #[error("invalid journal: {0}")]
    InvalidJournal(String),
    /// A validation rule outside the core invariants failed.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn journal_total_sums_lines() {
        let journal = Journal::new(
            "gnl",
            Some(date(2021, 1, 1)),
            vec![
                JournalLine::new("abc", "description for abc", 123, Some(date(2021, 1, 1))),
                JournalLine::new("def", "description for def", 500, Some(date(2021, 1, 1))),
                JournalLine::new("ghi", "description for ghi", -623, Some(date(2021, 1, 1))),
            ],
        );
        assert_eq!(journal.total(), 0);
        assert!(journal.validate().is_ok());
    }

    #[test]
    fn journal_validate_rejects_unbalanced() {
        let journal = Journal::new(
            "gnl",
            Some(date(2021, 1, 1)),
            vec![
                JournalLine::new("abc", "a", 123, None),
                JournalLine::new("def", "b", -100, None),
            ],
        );
        let err = journal.validate().unwrap_err();
        match err {
            LedgerError::JournalBalance { jnl_type, total } => {
                assert_eq!(jnl_type, "gnl");
                assert_eq!(total, 23);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reversal_marker_detected_by_suffix() {
        let journal = Journal::new("gnl_rev", None, vec![]);
        assert!(journal.is_reversing());
        let journal = Journal::new("gnl", None, vec![]);
        assert!(!journal.is_reversing());
    }

    #[test]
    fn posting_state_transition_is_observable() {
        assert!(!PostingState::Unposted.is_posted());
        assert!(PostingState::PostedToGl.is_posted());
    }
}
