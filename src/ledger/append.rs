//! Generic append-only transaction store

use crate::traits::LedgerRow;
use crate::types::{Amount, BatchId, TransactionId};

/// Append-only store assigning monotonically increasing transaction and
/// batch identifiers to rows.
///
/// Identifiers come from explicit per-ledger counters; an empty store
/// starts both sequences at 0. Rows are only ever added; corrections are
/// made with new offsetting rows.
#[derive(Debug, Clone)]
pub struct AppendOnlyLedger<T> {
    rows: Vec<T>,
    next_transaction_id: TransactionId,
    next_batch_id: BatchId,
}

impl<T> Default for AppendOnlyLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AppendOnlyLedger<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_transaction_id: 0,
            next_batch_id: 0,
        }
    }

    /// The id the next appended row will receive.
    pub fn next_transaction_id(&self) -> TransactionId {
        self.next_transaction_id
    }

    /// The id the next allocated batch will receive.
    pub fn next_batch_id(&self) -> BatchId {
        self.next_batch_id
    }

    /// Reserve a batch id for one logical operation.
    ///
    /// Allocation consumes the id, so two operations can never share a
    /// batch even if one of them ends up appending no rows.
    pub fn allocate_batch_id(&mut self) -> BatchId {
        let id = self.next_batch_id;
        self.next_batch_id += 1;
        id
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Mutable row access for the owning ledger's state transitions.
    pub(crate) fn rows_mut(&mut self) -> &mut [T] {
        &mut self.rows
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: LedgerRow> AppendOnlyLedger<T> {
    /// Append rows in the given order, assigning each the next transaction
    /// id, and return the assigned ids in the same order.
    pub fn append(&mut self, mut rows: Vec<T>) -> Vec<TransactionId> {
        let mut assigned = Vec::with_capacity(rows.len());
        for row in &mut rows {
            let id = self.next_transaction_id;
            self.next_transaction_id += 1;
            row.assign_transaction_id(id);
            assigned.push(id);
        }
        self.rows.extend(rows);
        assigned
    }

    /// Sum of all stored amounts.
    pub fn balance(&self) -> Amount {
        self.rows.iter().map(|row| row.amount()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerTransaction;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        transaction_id: TransactionId,
        batch_id: BatchId,
        amount: Amount,
    }

    impl LedgerTransaction for Row {
        fn transaction_id(&self) -> TransactionId {
            self.transaction_id
        }
    }

    impl LedgerRow for Row {
        fn assign_transaction_id(&mut self, id: TransactionId) {
            self.transaction_id = id;
        }

        fn amount(&self) -> Amount {
            self.amount
        }
    }

    fn row(batch_id: BatchId, amount: Amount) -> Row {
        Row {
            transaction_id: 0,
            batch_id,
            amount,
        }
    }

    #[test]
    fn empty_store_starts_both_sequences_at_zero() {
        let ledger: AppendOnlyLedger<Row> = AppendOnlyLedger::new();
        assert_eq!(ledger.next_transaction_id(), 0);
        assert_eq!(ledger.next_batch_id(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn append_assigns_contiguous_ids_in_order() {
        let mut ledger = AppendOnlyLedger::new();
        let ids = ledger.append(vec![row(0, 10), row(0, -10), row(0, 5)]);
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(ledger.next_transaction_id(), 3);
        let stored: Vec<_> = ledger.rows().iter().map(|r| r.transaction_id).collect();
        assert_eq!(stored, vec![0, 1, 2]);
    }

    #[test]
    fn ids_are_unique_and_increasing_across_appends() {
        let mut ledger = AppendOnlyLedger::new();
        let mut all = ledger.append(vec![row(0, 1), row(0, 2)]);
        all.extend(ledger.append(vec![row(1, 3)]));
        all.extend(ledger.append(vec![row(2, 4), row(2, 5)]));
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(all, sorted);
    }

    #[test]
    fn batch_allocation_never_repeats() {
        let mut ledger: AppendOnlyLedger<Row> = AppendOnlyLedger::new();
        let a = ledger.allocate_batch_id();
        let b = ledger.allocate_batch_id();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(ledger.next_batch_id(), 2);
    }

    #[test]
    fn balance_sums_all_amounts() {
        let mut ledger = AppendOnlyLedger::new();
        ledger.append(vec![row(0, 100), row(0, -40)]);
        assert_eq!(ledger.balance(), 60);
    }
}
