//! Sales ledger: debtor invoices, bank receipts, and settled pairs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::ledger::append::AppendOnlyLedger;
use crate::traits::{LedgerRow, LedgerTransaction, TransactionSource};
use crate::types::*;

/// Entry tag on a sales ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesEntryType {
    /// An invoice issued to a debtor.
    SaleInvoice,
    /// A receipt into a bank account.
    BankReceipt,
}

/// One line of an outgoing sales invoice.
///
/// Amounts are debtor-signed: a normal invoice that increases the amount
/// receivable carries a positive amount, so receipts (negative) settle
/// against it and the ledger balance is the amount outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalesInvoiceLine {
    /// Profit-and-loss nominal the revenue belongs to.
    pub nominal: String,
    /// Line narrative.
    pub description: String,
    /// Debtor-signed amount in minor units.
    pub amount: Amount,
    /// Invoice line date, when known.
    pub transaction_date: Option<NaiveDate>,
    /// Identifier of the source record.
    pub raw_id: RawId,
}

/// An outgoing sales invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalesInvoice {
    /// Debtor the invoice was issued to.
    pub debtor: String,
    /// Ordered invoice lines.
    pub lines: Vec<NewSalesInvoiceLine>,
}

impl NewSalesInvoice {
    /// Sum of all line amounts.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// One line of an unposted invoice reconstructed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoiceLine {
    /// Transaction id of the source ledger row.
    pub transaction_id: TransactionId,
    /// Profit-and-loss nominal the revenue belongs to.
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
pub struct SalesInvoice {
    /// Debtor the invoice was issued to.
    pub debtor: String,
    /// Ordered invoice lines.
    pub lines: Vec<SalesInvoiceLine>,
}

impl SalesInvoice {
    /// Sum of all line amounts.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Transaction ids of the source ledger rows.
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.lines.iter().map(|line| line.transaction_id).collect()
    }
}

/// A receipt from a debtor into a bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalesLedgerReceipt {
    /// Identifier of the source record.
    pub raw_id: RawId,
    /// Receipt date.
    pub date: NaiveDate,
    /// Negative amount: a receipt reduces the amount receivable.
    pub amount: Amount,
    /// Debtor the receipt settles.
    pub debtor: String,
    /// Bank account the receipt arrived in.
    pub bank_code: String,
}

/// An invoice that was settled in the same source record as its receipt.
///
/// Produces two linked rows in one batch: a `bank_receipt` row with the
/// negated amount and a `sale_invoice` row, both flagged settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSettledSalesInvoice {
    /// Identifier of the source record.
    pub raw_id: RawId,
    /// Settlement date.
    pub date: NaiveDate,
    /// Debtor-signed invoice amount in minor units.
    pub amount: Amount,
    /// Debtor the invoice was issued to.
    pub debtor: String,
    /// Profit-and-loss nominal the revenue belongs to.
    pub nominal: String,
    /// Invoice narrative.
    pub notes: String,
    /// Bank account the settlement arrived in.
    pub bank_code: String,
}

/// A sales ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesLedgerTransaction {
    /// Unique, strictly increasing row identifier.
    pub transaction_id: TransactionId,
    /// Batch the row was inserted with.
    pub batch_id: BatchId,
    /// Identifier of the source record, when one exists.
    pub raw_id: Option<RawId>,
    /// Entry tag.
    pub entry_type: SalesEntryType,
    /// Debtor the row relates to.
    pub debtor: String,
    /// Event date, when known.
    pub date: Option<NaiveDate>,
    /// Debtor-signed amount in minor units.
    pub amount: Amount,
    /// Row narrative.
    pub notes: String,
    /// Whether the row has been extracted to the General Ledger.
    pub posting: PostingState,
    /// True when the row was created by a settlement pair.
    pub settled: bool,
    /// Profit-and-loss nominal for invoice rows; receipts carry none.
    pub nominal: Option<String>,
}

impl LedgerTransaction for SalesLedgerTransaction {
    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

impl LedgerRow for SalesLedgerTransaction {
    fn assign_transaction_id(&mut self, id: TransactionId) {
        self.transaction_id = id;
    }

    fn amount(&self) -> Amount {
        self.amount
    }
}

/// Append-only ledger of debtor activity.
#[derive(Debug, Clone, Default)]
pub struct SalesLedger {
    inner: Arc<RwLock<AppendOnlyLedger<SalesLedgerTransaction>>>,
}

impl SalesLedger {
    /// Create an empty sales ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append invoices, one batch per invoice, and return the assigned ids
    /// across all of them in insertion order.
    pub fn add_invoices(&self, invoices: Vec<NewSalesInvoice>) -> Vec<TransactionId> {
        let mut ledger = self.inner.write().unwrap();
        let mut transaction_ids = Vec::new();
        for invoice in invoices {
            let batch_id = ledger.allocate_batch_id();
            let rows = invoice
                .lines
                .into_iter()
                .map(|line| SalesLedgerTransaction {
                    transaction_id: 0,
                    batch_id,
                    raw_id: Some(line.raw_id),
                    entry_type: SalesEntryType::SaleInvoice,
                    debtor: invoice.debtor.clone(),
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
        tracing::debug!(rows = transaction_ids.len(), "sales invoices appended");
        transaction_ids
    }

    /// Append receipts as one batch and return their assigned ids.
    pub fn add_receipts(&self, receipts: Vec<NewSalesLedgerReceipt>) -> Vec<TransactionId> {
        let mut ledger = self.inner.write().unwrap();
        let batch_id = ledger.allocate_batch_id();
        let rows = receipts
            .into_iter()
            .map(|receipt| SalesLedgerTransaction {
                transaction_id: 0,
                batch_id,
                raw_id: Some(receipt.raw_id),
                entry_type: SalesEntryType::BankReceipt,
                debtor: receipt.debtor,
                date: Some(receipt.date),
                amount: receipt.amount,
                notes: format!("bank receipt {}", receipt.bank_code),
                posting: PostingState::Unposted,
                settled: false,
                nominal: None,
            })
            .collect();
        ledger.append(rows)
    }

    /// Append invoices settled in the same source record as their receipt.
    ///
    /// Invoices are grouped by bank account; each group becomes one batch
    /// holding a receipt row and an invoice row per settlement, so the two
    /// legs of one settlement always share a batch id.
    pub fn add_settled_invoices(&self, settled: Vec<NewSettledSalesInvoice>) -> Vec<TransactionId> {
        let mut by_bank: BTreeMap<String, Vec<NewSettledSalesInvoice>> = BTreeMap::new();
        for invoice in settled {
            by_bank.entry(invoice.bank_code.clone()).or_default().push(invoice);
        }

        let mut ledger = self.inner.write().unwrap();
        let mut transaction_ids = Vec::new();
        for (bank_code, invoices) in by_bank {
            let batch_id = ledger.allocate_batch_id();
            let mut rows = Vec::with_capacity(invoices.len() * 2);
            for invoice in invoices {
                rows.push(SalesLedgerTransaction {
                    transaction_id: 0,
                    batch_id,
                    raw_id: Some(invoice.raw_id),
                    entry_type: SalesEntryType::BankReceipt,
                    debtor: invoice.debtor.clone(),
                    date: Some(invoice.date),
                    amount: -invoice.amount,
                    notes: format!("bank receipt {bank_code}"),
                    posting: PostingState::Unposted,
                    settled: true,
                    nominal: None,
                });
                rows.push(SalesLedgerTransaction {
                    transaction_id: 0,
                    batch_id,
                    raw_id: Some(invoice.raw_id),
                    entry_type: SalesEntryType::SaleInvoice,
                    debtor: invoice.debtor,
                    date: Some(invoice.date),
                    amount: invoice.amount,
                    notes: invoice.notes,
                    posting: PostingState::Unposted,
                    settled: true,
                    nominal: Some(invoice.nominal),
                });
            }
            transaction_ids.extend(ledger.append(rows));
        }
        transaction_ids
    }

    /// Reconstruct unposted invoices, one per invoice row.
    ///
    /// Line amounts are negated relative to the stored rows: the stored
    /// amount is debtor-signed, the reconstructed line is
    /// profit-and-loss-signed. A control line of `-total` therefore
    /// reproduces the stored amounts on the control account.
    pub fn get_unposted_invoices(&self) -> Vec<SalesInvoice> {
        let ledger = self.inner.read().unwrap();
        ledger
            .rows()
            .iter()
            .filter(|row| {
                !row.posting.is_posted() && row.entry_type == SalesEntryType::SaleInvoice
            })
            .filter_map(|row| {
                let nominal = row.nominal.clone()?;
                Some(SalesInvoice {
                    debtor: row.debtor.clone(),
                    lines: vec![SalesInvoiceLine {
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
    pub fn list_transactions(&self) -> Vec<SalesLedgerTransaction> {
        self.inner.read().unwrap().rows().to_vec()
    }

    /// Sum of all stored amounts.
    pub fn balance(&self) -> Amount {
        self.inner.read().unwrap().balance()
    }
}

impl TransactionSource<SalesLedgerTransaction> for SalesLedger {
    fn list_transactions(&self) -> Vec<SalesLedgerTransaction> {
        SalesLedger::list_transactions(self)
    }
}
