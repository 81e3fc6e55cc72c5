//! Traits for ledger storage rows, dispersal sources, and extensibility

use chrono::NaiveDate;

use crate::ledger::period::Period;
use crate::types::*;

/// Anything that carries a ledger transaction identifier.
///
/// This is the minimal surface the dispersal machinery needs; it is kept
/// separate from [`LedgerRow`] so read-only consumers never see the
/// id-assignment hook.
pub trait LedgerTransaction {
    /// The row's unique identifier within its ledger.
    fn transaction_id(&self) -> TransactionId;
}

/// A row that can be stored in an [`AppendOnlyLedger`].
///
/// Rows arrive at `append` without a transaction id; the store assigns one
/// from its monotonic counter before the row becomes visible. After
/// insertion a row is never mutated except for its posting state, which
/// only the owning ledger may advance.
///
/// [`AppendOnlyLedger`]: crate::ledger::AppendOnlyLedger
pub trait LedgerRow: LedgerTransaction {
    /// Called exactly once, by the store, while appending.
    fn assign_transaction_id(&mut self, id: TransactionId);

    /// The row's signed amount in minor units.
    fn amount(&self) -> Amount;
}

/// Read-only provider of a ledger's full transaction list.
///
/// Sub-ledgers implement this so the [`DispersalsLogger`] can be handed a
/// cheap clone of the ledger at registration time and read it later
/// without taking ownership.
///
/// [`DispersalsLogger`]: crate::reconciliation::DispersalsLogger
pub trait TransactionSource<T> {
    /// All transactions in insertion order.
    fn list_transactions(&self) -> Vec<T>;
}

/// Calendar mapping dates to accounting periods.
///
/// The calendar is injected into the General Ledger so the "no next
/// period" case surfaces as an explicit error instead of an unguarded
/// lookup. The stock implementation is
/// [`MonthlyCalendar`](crate::ledger::MonthlyCalendar).
pub trait PeriodCalendar {
    /// Look up a period by its number.
    fn period(&self, id: PeriodId) -> LedgerResult<Period>;

    /// The period covering the given date.
    fn period_for(&self, date: NaiveDate) -> LedgerResult<Period>;

    /// The period immediately following `current`.
    fn next_period(&self, current: PeriodId) -> LedgerResult<Period>;
}

/// Additional journal checks run before posting.
///
/// The zero-sum invariant is enforced unconditionally by
/// `GeneralLedgerTransactions::add_journal` and cannot be relaxed here;
/// validators add rules on top of it.
pub trait JournalValidator: Send + Sync {
    /// Validate a journal before it is posted.
    fn validate_journal(&self, journal: &Journal) -> LedgerResult<()>;
}

/// Default validator: no rules beyond the core invariants.
pub struct DefaultJournalValidator;

impl JournalValidator for DefaultJournalValidator {
    fn validate_journal(&self, _journal: &Journal) -> LedgerResult<()> {
        Ok(())
    }
}
