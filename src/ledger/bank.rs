//! Bank ledger holding raw bank statement movements

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::ledger::append::AppendOnlyLedger;
use crate::traits::{LedgerRow, LedgerTransaction, TransactionSource};
use crate::types::*;

/// What a bank movement was matched against during import.
///
/// Drives the nominal the movement is dispersed to: creditor matches go to
/// the purchase control account, debtor matches to the sales control
/// account, and everything else to the bank contra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedType {
    /// Payment matched to a purchase ledger creditor.
    Creditor,
    /// Receipt matched to a sales ledger debtor.
    Debtor,
    /// Movement matched directly to a balance sheet item.
    BalanceSheet,
    /// No match found.
    Unmatched,
}

/// A bank movement as supplied by an external loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBankTransaction {
    /// Identifier of the source record.
    pub raw_id: RawId,
    /// Code of the bank account the movement belongs to; also the name of
    /// the matching nominal account.
    pub bank_code: String,
    /// Date of the movement.
    pub date: NaiveDate,
    /// Bank statement transaction type, e.g. `"DD"`, `"FPO"`.
    pub transaction_type: String,
    /// Statement narrative.
    pub description: String,
    /// Signed amount in minor units; receipts positive, payments negative.
    pub amount: Amount,
    /// Transfer mechanism reported by the bank.
    pub transfer_type: String,
    /// Counterparty account matched during import, when any.
    pub matched_account: Option<String>,
    /// Kind of match made during import.
    pub matched_type: MatchedType,
}

/// A bank movement as stored in the bank ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique, strictly increasing row identifier.
    pub transaction_id: TransactionId,
    /// Batch the row was inserted with.
    pub batch_id: BatchId,
    /// Identifier of the source record.
    pub raw_id: RawId,
    /// Code of the bank account the movement belongs to.
    pub bank_code: String,
    /// Date of the movement.
    pub date: NaiveDate,
    /// Bank statement transaction type.
    pub transaction_type: String,
    /// Statement narrative.
    pub description: String,
    /// Signed amount in minor units.
    pub amount: Amount,
    /// Transfer mechanism reported by the bank.
    pub transfer_type: String,
    /// Counterparty account matched during import, when any.
    pub matched_account: Option<String>,
    /// Kind of match made during import.
    pub matched_type: MatchedType,
    /// Whether the row has been extracted to the General Ledger.
    pub posting: PostingState,
}

impl LedgerTransaction for BankTransaction {
    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

impl LedgerRow for BankTransaction {
    fn assign_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = id;
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

/// Append-only ledger of bank movements.
///
/// Cloning is cheap and shares the underlying store, so a clone can be
/// registered with the dispersals logger while the original keeps
/// receiving statements.
#[derive(Debug, Clone, Default)]
pub struct BankLedger {
    inner: Arc<RwLock<AppendOnlyLedger<BankTransaction>>>,
}

impl BankLedger {
    /// Create an empty bank ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw movements as one batch and return their assigned ids.
    pub fn add_transactions(&self, transactions: Vec<RawBankTransaction>) -> Vec<TransactionId> {
        let mut ledger = self.inner.write().unwrap();
        let batch_id = ledger.allocate_batch_id();
        let rows = transactions
            .into_iter()
            .map(|raw| BankTransaction {
                transaction_id: 0,
                batch_id,
                raw_id: raw.raw_id,
                bank_code: raw.bank_code,
                date: raw.date,
                transaction_type: raw.transaction_type,
                description: raw.description,
                amount: raw.amount,
                transfer_type: raw.transfer_type,
                matched_account: raw.matched_account,
                matched_type: raw.matched_type,
                posting: PostingState::Unposted,
            })
            .collect();
        let ids = ledger.append(rows);
        tracing::debug!(batch_id, rows = ids.len(), "bank transactions appended");
        ids
    }

    /// All movements in insertion order.
    pub fn list_transactions(&self) -> Vec<BankTransaction> {
        self.inner.read().unwrap().rows().to_vec()
    }

    /// Movements not yet extracted to the General Ledger.
    pub fn unposted_transactions(&self) -> Vec<BankTransaction> {
        self.inner
            .read()
            .unwrap()
            .rows()
            .iter()
            .filter(|row| !row.posting.is_posted())
            .cloned()
            .collect()
    }

    /// Mark the given rows as extracted to the General Ledger.
    ///
    /// Idempotent: rows already marked stay marked, unknown ids are
    /// ignored.
    pub fn mark_extracted_to_gl(&self, ids: &[TransactionId]) {
        let mut ledger = self.inner.write().unwrap();
        for row in ledger.rows_mut() {
            if ids.contains(&row.transaction_id) {
                row.posting = PostingState::PostedToGl;
            }
        }
    }

    /// Sum of all stored amounts.
    pub fn balance(&self) -> Amount {
        self.inner.read().unwrap().balance()
    }
}

impl TransactionSource<BankTransaction> for BankLedger {
    fn list_transactions(&self) -> Vec<BankTransaction> {
        BankLedger::list_transactions(self)
    }
}
