//! Dispersal tracking: which transactions have already moved downstream

use std::collections::{BTreeMap, BTreeSet};

use crate::traits::{LedgerTransaction, TransactionSource};
use crate::types::{LedgerError, LedgerResult, TransactionId};

/// Tracks, per named ledger, which transaction ids have already been
/// dispersed to a downstream ledger, so each transaction's financial
/// effect moves at most once.
///
/// Dispersed ids are a true set: logging the same transactions twice is a
/// no-op, never a duplicate entry.
pub struct DispersalsLogger<T> {
    ledgers: BTreeMap<String, Box<dyn TransactionSource<T>>>,
    dispersed_ids: BTreeMap<String, BTreeSet<TransactionId>>,
}

impl<T> Default for DispersalsLogger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DispersalsLogger<T> {
    /// Create a logger with no registered ledgers.
    pub fn new() -> Self {
        Self {
            ledgers: BTreeMap::new(),
            dispersed_ids: BTreeMap::new(),
        }
    }

    /// Associate a name with a read-only transaction-list provider.
    ///
    /// Registering a name that already exists replaces the provider and
    /// resets its dispersed set.
    pub fn register_ledger<S>(&mut self, name: impl Into<String>, ledger: S)
    where
        S: TransactionSource<T> + 'static,
    {
        let name = name.into();
        self.ledgers.insert(name.clone(), Box::new(ledger));
        self.dispersed_ids.insert(name, BTreeSet::new());
    }

    /// Registered ledger names in sorted order.
    pub fn ledger_names(&self) -> Vec<String> {
        self.ledgers.keys().cloned().collect()
    }
}

impl<T: LedgerTransaction> DispersalsLogger<T> {
    /// All of the named ledger's transactions not yet logged as dispersed,
    /// in the ledger's native order.
    pub fn undispersed_transactions(&self, name: &str) -> LedgerResult<Vec<T>> {
        let ledger = self
            .ledgers
            .get(name)
            .ok_or_else(|| LedgerError::LedgerNotRegistered(name.to_string()))?;
        let dispersed = &self.dispersed_ids[name];
        Ok(ledger
            .list_transactions()
            .into_iter()
            .filter(|transaction| !dispersed.contains(&transaction.transaction_id()))
            .collect())
    }

    /// Record the given transactions as dispersed for the named ledger.
    pub fn log_dispersal(&mut self, name: &str, transactions: &[T]) -> LedgerResult<()> {
        let dispersed = self
            .dispersed_ids
            .get_mut(name)
            .ok_or_else(|| LedgerError::LedgerNotRegistered(name.to_string()))?;
        dispersed.extend(transactions.iter().map(|t| t.transaction_id()));
        tracing::debug!(
            ledger = name,
            logged = transactions.len(),
            total = dispersed.len(),
            "dispersal logged"
        );
        Ok(())
    }
}
