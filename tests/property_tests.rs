//! Property-based tests for bookkeeping-core.
//!
//! These tests verify the ledger invariants hold for arbitrary inputs
//! using proptest.

use std::collections::{HashMap, HashSet};

use bookkeeping_core::{
    AppendOnlyLedger, Amount, BatchId, ChartOfAccounts, GeneralLedger,
    GeneralLedgerTransactions, Journal, JournalLine, LedgerRow, LedgerTransaction,
    MonthlyCalendar, NewPrepayment, TransactionId, PREPAYMENTS_NOMINAL,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct TestRow {
    transaction_id: TransactionId,
    batch_id: BatchId,
    amount: Amount,
}

impl LedgerTransaction for TestRow {
    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

impl LedgerRow for TestRow {
    fn assign_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = id;
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

fn arb_amount() -> impl Strategy<Value = Amount> {
    -1_000_000i64..1_000_000i64
}

fn arb_batch_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..8, 1..10)
}

fn arb_line_amounts() -> impl Strategy<Value = Vec<Amount>> {
    prop::collection::vec(arb_amount(), 1..8)
}

proptest! {
    #[test]
    fn transaction_ids_unique_and_strictly_increasing(batch_sizes in arb_batch_sizes()) {
        let mut ledger = AppendOnlyLedger::new();
        let mut all_ids = Vec::new();
        for size in batch_sizes {
            let batch_id = ledger.allocate_batch_id();
            let rows = (0..size)
                .map(|i| TestRow { transaction_id: 0, batch_id, amount: i as Amount })
                .collect();
            all_ids.extend(ledger.append(rows));
        }

        let unique: HashSet<_> = all_ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), all_ids.len());
        for pair in all_ids.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        prop_assert_eq!(ledger.next_transaction_id(), all_ids.len() as TransactionId);
    }

    #[test]
    fn batches_never_shared_between_calls(batch_sizes in arb_batch_sizes()) {
        let mut ledger = AppendOnlyLedger::new();
        for size in batch_sizes.iter().copied() {
            let batch_id = ledger.allocate_batch_id();
            let rows = (0..size)
                .map(|_| TestRow { transaction_id: 0, batch_id, amount: 0 })
                .collect();
            ledger.append(rows);
        }

        // Rows from one call share a batch id; ids never repeat across calls.
        let mut seen: HashMap<BatchId, usize> = HashMap::new();
        for row in ledger.rows() {
            *seen.entry(row.batch_id).or_default() += 1;
        }
        let nonempty_calls = batch_sizes.iter().filter(|&&s| s > 0).count();
        prop_assert_eq!(seen.len(), nonempty_calls);
    }

    #[test]
    fn journal_accepted_iff_lines_sum_to_zero(amounts in arb_line_amounts()) {
        let store = GeneralLedgerTransactions::new();
        let lines = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| JournalLine::new(format!("n{i}"), "line", amount, None))
            .collect();
        let journal = Journal::new("gnl", None, lines);

        let total: Amount = amounts.iter().sum();
        let result = store.add_journal(&journal);
        if total == 0 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(store.list_transactions().len(), amounts.len());
        } else {
            prop_assert!(result.is_err());
            prop_assert!(store.list_transactions().is_empty());
            prop_assert_eq!(store.next_journal_id(), 0);
        }
        prop_assert_eq!(store.balance(), 0);
    }

    #[test]
    fn balanced_tail_makes_any_journal_acceptable(amounts in arb_line_amounts()) {
        // Appending a balancing line always yields an accepted journal and
        // a zero ledger balance.
        let store = GeneralLedgerTransactions::new();
        let total: Amount = amounts.iter().sum();
        let mut lines: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| JournalLine::new(format!("n{i}"), "line", amount, None))
            .collect();
        lines.push(JournalLine::new("balancing", "balancing line", -total, None));
        let journal = Journal::new("gnl", None, lines);

        prop_assert!(store.add_journal(&journal).is_ok());
        prop_assert_eq!(store.balance(), 0);
    }

    #[test]
    fn prepayment_always_washes_to_zero(
        amount in -1_000_000i64..1_000_000i64,
        period_start in 1i32..=6,
        periods in 1u32..=6,
    ) {
        let ledger = GeneralLedger::new(
            GeneralLedgerTransactions::new(),
            ChartOfAccounts::new(),
            MonthlyCalendar::for_year(2021),
        );
        let journals = ledger
            .create_prepayment_journal(&NewPrepayment {
                nominal: "target".to_string(),
                amount,
                period_start,
                periods,
                description: "initial".to_string(),
                description_recurring: "release".to_string(),
            })
            .unwrap();

        prop_assert_eq!(journals.len(), periods as usize + 1);
        for journal in &journals {
            prop_assert_eq!(journal.total(), 0);
        }

        let mut by_nominal: HashMap<&str, Amount> = HashMap::new();
        for line in journals.iter().flat_map(|journal| &journal.lines) {
            *by_nominal.entry(line.nominal.as_str()).or_default() += line.amount;
        }
        prop_assert_eq!(by_nominal[PREPAYMENTS_NOMINAL], 0);
        prop_assert_eq!(by_nominal["target"], 0);
    }
}
