//! General Ledger: the canonical journal-line store and its orchestrator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ledger::append::AppendOnlyLedger;
use crate::ledger::chart::ChartOfAccounts;
use crate::ledger::period::period_for_date;
use crate::traits::{DefaultJournalValidator, JournalValidator, PeriodCalendar};
use crate::types::*;

/// Nominal account holding prepaid costs awaiting release.
pub const PREPAYMENTS_NOMINAL: &str = "prepayments";

/// Journal type tag for prepayment journals.
pub const PREPAYMENT_JNL_TYPE: &str = "prepay";

#[derive(Debug, Default)]
struct GeneralLedgerStore {
    ledger: AppendOnlyLedger<GeneralLedgerTransaction>,
    next_journal_id: JournalId,
}

/// The canonical append-only store of General Ledger journal lines.
///
/// Cloning is cheap and shares the underlying store. A write guard is held
/// for the whole of `add_journal`, so readers never observe a partially
/// appended journal.
#[derive(Debug, Clone, Default)]
pub struct GeneralLedgerTransactions {
    inner: Arc<RwLock<GeneralLedgerStore>>,
}

impl GeneralLedgerTransactions {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next posted journal will receive.
    pub fn next_journal_id(&self) -> JournalId {
        self.inner.read().unwrap().next_journal_id
    }

    /// Post a journal, returning the assigned transaction ids in line
    /// order.
    ///
    /// The zero-sum invariant is checked before anything is written, so a
    /// rejected journal leaves the store untouched. All lines share one
    /// newly allocated journal id and the period derived from the
    /// journal's transaction date.
    pub fn add_journal(&self, journal: &Journal) -> LedgerResult<Vec<TransactionId>> {
        journal.validate()?;

        let mut store = self.inner.write().unwrap();
        let jnl_id = store.next_journal_id;
        store.next_journal_id += 1;
        let period = period_for_date(journal.transaction_date);
        let rows = journal
            .lines
            .iter()
            .map(|line| GeneralLedgerTransaction {
                transaction_id: 0,
                jnl_id,
                nominal: line.nominal.clone(),
                jnl_type: journal.jnl_type.clone(),
                amount: line.amount,
                description: line.description.clone(),
                transaction_date: line.transaction_date,
                period,
            })
            .collect();
        let ids = store.ledger.append(rows);
        tracing::debug!(
            jnl_id,
            jnl_type = %journal.jnl_type,
            period,
            lines = ids.len(),
            "journal posted"
        );
        Ok(ids)
    }

    /// All journal lines in insertion order.
    pub fn list_transactions(&self) -> Vec<GeneralLedgerTransaction> {
        self.inner.read().unwrap().ledger.rows().to_vec()
    }

    /// Sum of all amounts; zero for a ledger that has only ever accepted
    /// balanced journals.
    pub fn balance(&self) -> Amount {
        self.inner.read().unwrap().ledger.balance()
    }

    /// Amounts summed by nominal account.
    pub fn balances(&self) -> HashMap<String, Amount> {
        let store = self.inner.read().unwrap();
        let mut balances: HashMap<String, Amount> = HashMap::new();
        for row in store.ledger.rows() {
            *balances.entry(row.nominal.clone()).or_default() += row.amount;
        }
        balances
    }
}

/// Build the journal that undoes another: same nominals, descriptions and
/// dates, every amount negated, lines in the same order.
pub fn create_opposite_journal(journal: &Journal) -> Journal {
    Journal {
        jnl_type: journal.jnl_type.clone(),
        transaction_date: journal.transaction_date,
        lines: journal
            .lines
            .iter()
            .map(|line| JournalLine {
                nominal: line.nominal.clone(),
                description: line.description.clone(),
                amount: -line.amount,
                transaction_date: line.transaction_date,
            })
            .collect(),
    }
}

/// A prepaid cost to be released over a number of periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrepayment {
    /// Nominal account the cost was originally posted to.
    pub nominal: String,
    /// Full prepaid amount in minor units.
    pub amount: Amount,
    /// Period the release schedule starts in.
    pub period_start: PeriodId,
    /// Number of periods the amount is released over.
    pub periods: u32,
    /// Narrative for the initial reclass journal.
    pub description: String,
    /// Narrative for each release journal.
    pub description_recurring: String,
}

/// Orchestrates journal posting against the transaction store and the
/// chart of accounts.
///
/// Owns the period calendar, which makes reversing and prepayment dating
/// explicit: a missing next period is a recoverable error, never an
/// unguarded lookup.
pub struct GeneralLedger<C: PeriodCalendar> {
    /// The journal-line store.
    pub transactions: GeneralLedgerTransactions,
    /// Registry of nominal accounts.
    pub chart_of_accounts: ChartOfAccounts,
    calendar: C,
    validator: Box<dyn JournalValidator>,
}

impl<C: PeriodCalendar> GeneralLedger<C> {
    /// Create a general ledger over the given store, chart and calendar.
    pub fn new(
        transactions: GeneralLedgerTransactions,
        chart_of_accounts: ChartOfAccounts,
        calendar: C,
    ) -> Self {
        Self {
            transactions,
            chart_of_accounts,
            calendar,
            validator: Box::new(DefaultJournalValidator),
        }
    }

    /// Create a general ledger with a custom journal validator.
    pub fn with_validator(
        transactions: GeneralLedgerTransactions,
        chart_of_accounts: ChartOfAccounts,
        calendar: C,
        validator: Box<dyn JournalValidator>,
    ) -> Self {
        Self {
            transactions,
            chart_of_accounts,
            calendar,
            validator,
        }
    }

    /// The period calendar in use.
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Post a journal, returning the assigned transaction ids.
    ///
    /// A journal whose type carries the `_rev` suffix also posts its
    /// opposite, dated to the start of the period following the journal's
    /// own. The following period is resolved before anything is written,
    /// so a reversal that cannot be dated rejects the whole operation with
    /// nothing persisted.
    pub fn add_journal(&self, journal: &Journal) -> LedgerResult<Vec<TransactionId>> {
        self.validator.validate_journal(journal)?;

        let reversal = if journal.is_reversing() {
            let date = journal.transaction_date.ok_or_else(|| {
                LedgerError::InvalidJournal(
                    "reversing journal has no transaction date".to_string(),
                )
            })?;
            let current = self.calendar.period_for(date)?;
            let next = self.calendar.next_period(current.period)?;
            let mut opposite = create_opposite_journal(journal);
            opposite.transaction_date = Some(next.date_start);
            for line in &mut opposite.lines {
                line.transaction_date = Some(next.date_start);
            }
            Some(opposite)
        } else {
            None
        };

        let mut ids = self.transactions.add_journal(journal)?;
        if let Some(opposite) = reversal {
            ids.extend(self.transactions.add_journal(&opposite)?);
        }
        Ok(ids)
    }

    /// Build the journals that amortize a prepaid cost.
    ///
    /// Produces `periods + 1` balanced journals: an initial reclass of the
    /// full amount out of the target nominal into the prepayments suspense
    /// nominal, then one release per period moving `amount / periods` back
    /// out, dated at the start of each period from `period_start` onward.
    /// The integer-division remainder is folded entirely into the first
    /// release, so the suspense nominal sums to exactly zero across the
    /// whole set.
    pub fn create_prepayment_journal(
        &self,
        prepayment: &NewPrepayment,
    ) -> LedgerResult<Vec<Journal>> {
        if prepayment.periods == 0 {
            return Err(LedgerError::InvalidJournal(
                "prepayment must release over at least one period".to_string(),
            ));
        }

        let start = self.calendar.period(prepayment.period_start)?;
        let mut journals = Vec::with_capacity(prepayment.periods as usize + 1);
        journals.push(Journal::new(
            PREPAYMENT_JNL_TYPE,
            Some(start.date_start),
            vec![
                JournalLine::new(
                    prepayment.nominal.clone(),
                    prepayment.description.clone(),
                    -prepayment.amount,
                    Some(start.date_start),
                ),
                JournalLine::new(
                    PREPAYMENTS_NOMINAL,
                    prepayment.description.clone(),
                    prepayment.amount,
                    Some(start.date_start),
                ),
            ],
        ));

        let per_period = prepayment.amount / prepayment.periods as Amount;
        let remainder = prepayment.amount - per_period * prepayment.periods as Amount;
        for offset in 0..prepayment.periods {
            let period = self
                .calendar
                .period(prepayment.period_start + offset as PeriodId)?;
            let release = if offset == 0 {
                per_period + remainder
            } else {
                per_period
            };
            journals.push(Journal::new(
                PREPAYMENT_JNL_TYPE,
                Some(period.date_start),
                vec![
                    JournalLine::new(
                        PREPAYMENTS_NOMINAL,
                        prepayment.description_recurring.clone(),
                        -release,
                        Some(period.date_start),
                    ),
                    JournalLine::new(
                        prepayment.nominal.clone(),
                        prepayment.description_recurring.clone(),
                        release,
                        Some(period.date_start),
                    ),
                ],
            ));
        }
        Ok(journals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::period::MonthlyCalendar;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, d).unwrap()
    }

    fn general_ledger() -> GeneralLedger<MonthlyCalendar> {
        GeneralLedger::new(
            GeneralLedgerTransactions::new(),
            ChartOfAccounts::new(),
            MonthlyCalendar::for_year(2021),
        )
    }

    fn two_line_journal(jnl_type: &str, day: NaiveDate) -> Journal {
        Journal::new(
            jnl_type,
            Some(day),
            vec![
                JournalLine::new("abc", "description for abc", 123, Some(day)),
                JournalLine::new("def", "description for def", -123, Some(day)),
            ],
        )
    }

    #[test]
    fn add_journal_persists_lines_in_order() {
        let ledger = general_ledger();
        let journal = two_line_journal("gnl", date(1, 1));
        let ids = ledger.add_journal(&journal).unwrap();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(ledger.transactions.balance(), 0);
        assert_eq!(
            ledger.transactions.list_transactions(),
            vec![
                GeneralLedgerTransaction {
                    transaction_id: 0,
                    jnl_id: 0,
                    nominal: "abc".to_string(),
                    jnl_type: "gnl".to_string(),
                    amount: 123,
                    description: "description for abc".to_string(),
                    transaction_date: Some(date(1, 1)),
                    period: 1,
                },
                GeneralLedgerTransaction {
                    transaction_id: 1,
                    jnl_id: 0,
                    nominal: "def".to_string(),
                    jnl_type: "gnl".to_string(),
                    amount: -123,
                    description: "description for def".to_string(),
                    transaction_date: Some(date(1, 1)),
                    period: 1,
                },
            ]
        );
    }

    #[test]
    fn balances_group_by_nominal() {
        let ledger = general_ledger();
        ledger.add_journal(&two_line_journal("gnl", date(1, 1))).unwrap();
        let balances = ledger.transactions.balances();
        assert_eq!(balances["abc"], 123);
        assert_eq!(balances["def"], -123);
    }

    #[test]
    fn unbalanced_journal_rejected_with_no_partial_write() {
        let ledger = general_ledger();
        let journal = Journal::new(
            "gnl",
            Some(date(1, 1)),
            vec![
                JournalLine::new("abc", "a", 123, Some(date(1, 1))),
                JournalLine::new("def", "b", -100, Some(date(1, 1))),
            ],
        );
        assert!(matches!(
            ledger.add_journal(&journal),
            Err(LedgerError::JournalBalance { .. })
        ));
        assert!(ledger.transactions.list_transactions().is_empty());
        assert_eq!(ledger.transactions.next_journal_id(), 0);
    }

    #[test]
    fn three_line_journal_summing_to_zero_is_accepted() {
        let ledger = general_ledger();
        let journal = Journal::new(
            "gnl",
            Some(date(1, 1)),
            vec![
                JournalLine::new("abc", "a", 123, Some(date(1, 1))),
                JournalLine::new("def", "b", 500, Some(date(1, 1))),
                JournalLine::new("ghi", "c", -623, Some(date(1, 1))),
            ],
        );
        assert_eq!(ledger.add_journal(&journal).unwrap().len(), 3);
    }

    #[test]
    fn journal_without_date_gets_unknown_period() {
        let ledger = general_ledger();
        let journal = Journal::new(
            "gnl",
            None,
            vec![
                JournalLine::new("abc", "a", 123, None),
                JournalLine::new("def", "b", -123, None),
            ],
        );
        ledger.add_journal(&journal).unwrap();
        let rows = ledger.transactions.list_transactions();
        assert!(rows.iter().all(|row| row.period == PERIOD_UNKNOWN));
    }

    #[test]
    fn journal_ids_are_monotonic_per_journal() {
        let ledger = general_ledger();
        ledger.add_journal(&two_line_journal("gnl", date(1, 1))).unwrap();
        ledger.add_journal(&two_line_journal("gnl", date(2, 1))).unwrap();
        let jnl_ids: Vec<_> = ledger
            .transactions
            .list_transactions()
            .iter()
            .map(|row| row.jnl_id)
            .collect();
        assert_eq!(jnl_ids, vec![0, 0, 1, 1]);
    }

    #[test]
    fn opposite_journal_negates_amounts_and_keeps_everything_else() {
        let journal = Journal::new(
            "gnl",
            Some(date(1, 1)),
            vec![
                JournalLine::new("abc", "description for abc", 123, Some(date(1, 1))),
                JournalLine::new("def", "description for def", 500, Some(date(1, 1))),
                JournalLine::new("ghi", "description for ghi", -623, Some(date(1, 1))),
            ],
        );
        let opposite = create_opposite_journal(&journal);
        assert_eq!(opposite.lines.len(), journal.lines.len());
        assert_eq!(opposite.jnl_type, journal.jnl_type);
        for (line, opposite_line) in journal.lines.iter().zip(&opposite.lines) {
            assert_eq!(line.nominal, opposite_line.nominal);
            assert_eq!(line.description, opposite_line.description);
            assert_eq!(line.amount, -opposite_line.amount);
            assert_eq!(line.transaction_date, opposite_line.transaction_date);
        }
    }

    #[test]
    fn reversing_journal_posts_negated_copy_in_following_period() {
        let ledger = general_ledger();
        let journal = two_line_journal("gnl_rev", date(1, 1));
        let ids = ledger.add_journal(&journal).unwrap();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        let rows = ledger.transactions.list_transactions();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].amount, 123);
        assert_eq!(rows[0].period, 1);
        assert_eq!(rows[2].nominal, "abc");
        assert_eq!(rows[2].amount, -123);
        assert_eq!(rows[2].transaction_date, Some(date(2, 1)));
        assert_eq!(rows[2].period, 2);
        assert_eq!(rows[3].nominal, "def");
        assert_eq!(rows[3].amount, 123);
        assert_eq!(rows[3].period, 2);
        assert_eq!(ledger.transactions.balance(), 0);
    }

    #[test]
    fn reversing_journal_in_final_period_is_rejected_atomically() {
        let ledger = general_ledger();
        let journal = two_line_journal("gnl_rev", date(12, 15));
        assert!(matches!(
            ledger.add_journal(&journal),
            Err(LedgerError::NoNextPeriod(12))
        ));
        assert!(ledger.transactions.list_transactions().is_empty());
    }

    #[test]
    fn reversing_journal_without_date_is_rejected() {
        let ledger = general_ledger();
        let journal = Journal::new(
            "gnl_rev",
            None,
            vec![
                JournalLine::new("abc", "a", 123, None),
                JournalLine::new("def", "b", -123, None),
            ],
        );
        assert!(matches!(
            ledger.add_journal(&journal),
            Err(LedgerError::InvalidJournal(_))
        ));
        assert!(ledger.transactions.list_transactions().is_empty());
    }

    #[test]
    fn prepayment_releases_sum_to_zero_per_nominal() {
        let ledger = general_ledger();
        let journals = ledger
            .create_prepayment_journal(&NewPrepayment {
                nominal: "abc".to_string(),
                amount: 700,
                period_start: 2,
                periods: 3,
                description: "insurance paid in advance".to_string(),
                description_recurring: "insurance release".to_string(),
            })
            .unwrap();
        assert_eq!(journals.len(), 4);
        for journal in &journals {
            assert_eq!(journal.total(), 0);
        }

        let mut by_nominal: HashMap<String, Amount> = HashMap::new();
        for line in journals.iter().flat_map(|journal| &journal.lines) {
            *by_nominal.entry(line.nominal.clone()).or_default() += line.amount;
        }
        assert_eq!(by_nominal[PREPAYMENTS_NOMINAL], 0);
        assert_eq!(by_nominal["abc"], 0);
    }

    #[test]
    fn prepayment_remainder_goes_to_first_release() {
        let ledger = general_ledger();
        let journals = ledger
            .create_prepayment_journal(&NewPrepayment {
                nominal: "abc".to_string(),
                amount: 700,
                period_start: 2,
                periods: 3,
                description: "initial".to_string(),
                description_recurring: "release".to_string(),
            })
            .unwrap();
        // 700 / 3 == 233 remainder 1; the first release absorbs it.
        let releases: Vec<_> = journals[1..]
            .iter()
            .map(|journal| journal.lines[1].amount)
            .collect();
        assert_eq!(releases, vec![234, 233, 233]);
    }

    #[test]
    fn prepayment_releases_start_at_period_start() {
        let ledger = general_ledger();
        let journals = ledger
            .create_prepayment_journal(&NewPrepayment {
                nominal: "abc".to_string(),
                amount: 600,
                period_start: 2,
                periods: 3,
                description: "initial".to_string(),
                description_recurring: "release".to_string(),
            })
            .unwrap();
        let dates: Vec<_> = journals
            .iter()
            .map(|journal| journal.transaction_date.unwrap())
            .collect();
        assert_eq!(
            dates,
            vec![date(2, 1), date(2, 1), date(3, 1), date(4, 1)]
        );
    }

    #[test]
    fn prepayment_past_final_period_is_an_error() {
        let ledger = general_ledger();
        let result = ledger.create_prepayment_journal(&NewPrepayment {
            nominal: "abc".to_string(),
            amount: 600,
            period_start: 11,
            periods: 3,
            description: "initial".to_string(),
            description_recurring: "release".to_string(),
        });
        assert!(matches!(result, Err(LedgerError::UnknownPeriod(13))));
    }

    #[test]
    fn prepayment_over_zero_periods_is_an_error() {
        let ledger = general_ledger();
        let result = ledger.create_prepayment_journal(&NewPrepayment {
            nominal: "abc".to_string(),
            amount: 600,
            period_start: 2,
            periods: 0,
            description: "initial".to_string(),
            description_recurring: "release".to_string(),
        });
        assert!(matches!(result, Err(LedgerError::InvalidJournal(_))));
    }
}
