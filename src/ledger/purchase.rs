//! Purchase ledger: creditor invoices and bank payments

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::ledger::append::AppendOnlyLedger;
use crate::traits::{LedgerRow, LedgerTransaction, TransactionSource};
use crate::types::*;

/// Entry tag on a purchase ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseEntryType {
    /// An invoice received from a creditor.
    PurchaseInvoice,
    /// A payment made from a bank account.
    BankPayment,
}

/// One line of an incoming purchase invoice.
///
/// Amounts are creditor-signed: a normal invoice that increases the amount
/// owed carries a negative amount, so the ledger balance is the negated
/// sum outstanding and settlement pairs net to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseInvoiceLine {
    /// Profit-and-loss nominal the cost belongs to.
    pub nominal: String,
    /// Line narrative.
    pub description: String,
    /// Creditor-signed amount in minor units.
    pub amount: Amount,
    /// Invoice line date, when known.
    pub transaction_date: Option<NaiveDate>,
    /// Identifier of the source record.
    pub raw_id: RawId,
}

/// An incoming purchase invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseInvoice {
    /// Creditor the invoice was received from.
    pub creditor: String,
    /// Ordered invoice lines.
    pub lines: Vec<NewPurchaseInvoiceLine>,
}

impl NewPurchaseInvoice {
    /// Sum of all line amounts.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// One line of an unposted invoice reconstructed from the ledger.
///
/// Carries the source row's transaction id so the caller can mark the row
/// as extracted after dispersal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoiceLine {
    /// Transaction id of the source ledger row.
    pub transaction_id: TransactionId,
    /// Profit-and-loss nominal the cost belongs to.
    pub nominal: String,
    /// Line narrative.
    pub description: String,
    /// Profit-and-loss-signed amount (the negated stored row amount).
    pub amount: Amount,
    /// Invoice line date, when known.
    pub transaction_date: Option<NaiveDate>,
}

/// An unposted invoice ready for dispersal to the General Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    /// Creditor the invoice was received from.
    pub creditor: String,
    /// Ordered invoice lines.
    pub lines: Vec<PurchaseInvoiceLine>,
}

impl PurchaseInvoice {
    /// Sum of all line amounts.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Transaction ids of the source ledger rows.
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.lines.iter().map(|line| line.transaction_id).collect()
    }
}

/// A payment to a creditor from a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseLedgerPayment {
    /// Identifier of the source record.
    pub raw_id: RawId,
    /// Payment date.
    pub date: NaiveDate,
    /// Positive amount: a payment reduces the amount owed.
    pub amount: Amount,
    /// Creditor the payment settles.
    pub creditor: String,
    /// Bank account the payment was made from.
    pub bank_code: String,
}

/// A purchase ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLedgerTransaction {
    /// Unique, strictly increasing row identifier.
    pub transaction_id: TransactionId,
    /// Batch the row was inserted with.
    pub batch_id: BatchId,
    /// Identifier of the source record, when one exists.
    pub raw_id: Option<RawId>,
    /// Entry tag.
    pub entry_type: PurchaseEntryType,
    /// Creditor the row relates to.
    pub creditor: String,
    /// Event date, when known.
    pub date: Option<NaiveDate>,
    /// Creditor-signed amount in minor units.
    pub amount: Amount,
    /// Row narrative.
    pub notes: String,
    /// Whether the row has been extracted to the General Ledger.
    pub posting: PostingState,
    /// True when the row was created by a settlement pair.
    pub settled: bool,
    /// Profit-and-loss nominal for invoice rows; payments carry none.
    pub nominal: Option<String>,
}

impl LedgerTransaction for PurchaseLedgerTransaction {
    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

impl LedgerRow for PurchaseLedgerTransaction {
    fn assign_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = id;
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

/// Append-only ledger of creditor activity.
#[derive(Debug, Clone, Default)]
pub struct PurchaseLedger {
    inner: Arc<RwLock<AppendOnlyLedger<PurchaseLedgerTransaction>>>,
}

impl PurchaseLedger {
    /// Create an empty purchase ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append invoices, one batch per invoice, and return the assigned ids
    /// across all of them in insertion order.
    pub fn add_invoices(&self, invoices: Vec<NewPurchaseInvoice>) -> Vec<TransactionId> {
        let mut ledger = self.inner.write().unwrap();
        let mut transaction_ids = Vec::new();
        for invoice in invoices {
            let batch_id = ledger.allocate_batch_id();
            let rows = invoice
                .lines
                .into_iter()
                .map(|line| PurchaseLedgerTransaction {
                    transaction_id: 0,
                    batch_id,
                    raw_id: Some(line.raw_id),
                    entry_type: PurchaseEntryType::PurchaseInvoice,
                    creditor: invoice.creditor.clone(),
                    date: line.transaction_date,
                    amount: line.amount,
                    notes: line.description,
                    posting: PostingState::Unposted,
                    settled: false,
                    nominal: Some(line.nominal),
                })
                .collect();
            transaction_ids.extend(ledger.append(rows));
        }
        tracing::debug!(rows = transaction_ids.len(), "purchase invoices appended");
        transaction_ids
    }

    /// Append payments as one batch and return their assigned ids.
    pub fn add_payments(&self, payments: Vec<NewPurchaseLedgerPayment>) -> Vec<TransactionId> {
        let mut ledger = self.inner.write().unwrap();
        let batch_id = ledger.allocate_batch_id();
        let rows = payments
            .into_iter()
            .map(|payment| PurchaseLedgerTransaction {
                transaction_id: 0,
                batch_id,
                raw_id: Some(payment.raw_id),
                entry_type: PurchaseEntryType::BankPayment,
                creditor: payment.creditor,
                date: Some(payment.date),
                amount: payment.amount,
                notes: format!("bank payment {}", payment.bank_code),
                posting: PostingState::Unposted,
                settled: false,
                nominal: None,
            })
            .collect();
        ledger.append(rows)
    }

    /// Reconstruct unposted invoices, one per invoice row.
    ///
    /// Line amounts are negated relative to the stored rows: the stored
    /// amount is creditor-signed, the reconstructed line is
    /// profit-and-loss-signed. A control line of `-total` therefore
    /// reproduces the stored amounts on the control account.
    pub fn get_unposted_invoices(&self) -> Vec<PurchaseInvoice> {
        let ledger = self.inner.read().unwrap();
        ledger
            .rows()
            .iter()
            .filter(|row| {
                !row.posting.is_posted() && row.entry_type == PurchaseEntryType::PurchaseInvoice
            })
            .filter_map(|row| {
                let nominal = row.nominal.clone()?;
                Some(PurchaseInvoice {
                    creditor: row.creditor.clone(),
                    lines: vec![PurchaseInvoiceLine {
                        transaction_id: row.transaction_id,
                        nominal,
                        description: row.notes.clone(),
                        amount: -row.amount,
                        transaction_date: row.date,
                    }],
                })
            })
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

    /// All rows in insertion order.
    pub fn list_transactions(&self) -> Vec<PurchaseLedgerTransaction> {
        self.inner.read().unwrap().rows().to_vec()
    }

    /// Sum of all stored amounts.
    pub fn balance(&self) -> Amount {
        self.inner.read().unwrap().balance()
    }
}

impl TransactionSource<PurchaseLedgerTransaction> for PurchaseLedger {
    fn list_transactions(&self) -> Vec<PurchaseLedgerTransaction> {
        PurchaseLedger::list_transactions(self)
    }
}
