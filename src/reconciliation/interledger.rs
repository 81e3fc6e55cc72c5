//! Builds balanced General Ledger journals from unposted sub-ledger items

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::bank::{BankTransaction, MatchedType};
use crate::ledger::purchase::PurchaseInvoice;
use crate::ledger::sales::SalesInvoice;
use crate::types::{Amount, Journal, JournalLine, TransactionId};

/// Journal type tag for purchase ledger dispersals.
pub const PURCHASE_JNL_TYPE: &str = "pi";

/// Journal type tag for sales ledger dispersals.
pub const SALES_JNL_TYPE: &str = "si";

/// Journal type tag for bank ledger dispersals.
pub const BANK_JNL_TYPE: &str = "bank";

/// Nominal account names the inter-ledger journals post against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlAccounts {
    /// Control account mirroring the purchase ledger balance.
    pub purchase_control: String,
    /// Control account mirroring the sales ledger balance.
    pub sales_control: String,
    /// Contra account for bank movements with no sub-ledger match.
    pub bank_contra: String,
}

impl Default for ControlAccounts {
    fn default() -> Self {
        Self {
            purchase_control: "purchase_ledger_control_account".to_string(),
            sales_control: "sales_ledger_control_account".to_string(),
            bank_contra: "bank_contra".to_string(),
        }
    }
}

/// Translates unposted sub-ledger batches into balanced General Ledger
/// journals.
///
/// Every journal built here balances by construction; the General
/// Ledger's zero-sum check remains the safety net against grouping or
/// arithmetic bugs upstream.
#[derive(Debug, Clone, Default)]
pub struct InterLedgerJournalCreator {
    accounts: ControlAccounts,
}

impl InterLedgerJournalCreator {
    /// Create a journal creator using the default control account names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal creator posting against the given accounts.
    pub fn with_accounts(accounts: ControlAccounts) -> Self {
        Self { accounts }
    }

    /// The control account names in use.
    pub fn accounts(&self) -> &ControlAccounts {
        &self.accounts
    }

    /// Build the journal dispersing unposted purchase invoices.
    ///
    /// One line per invoice line plus a purchase-control line of the
    /// negated grand total, dated at the latest line date so the control
    /// posting is never dated earlier than its constituents. Returns the
    /// contributing source transaction ids so the caller can mark them as
    /// extracted. `None` when there is nothing to disperse.
    pub fn create_pl_to_gl_journal(
        &self,
        invoices: &[PurchaseInvoice],
    ) -> Option<(Journal, Vec<TransactionId>)> {
        if invoices.is_empty() {
            return None;
        }

        let mut lines = Vec::new();
        let mut source_ids = Vec::new();
        let mut total: Amount = 0;
        for invoice in invoices {
            total += invoice.total();
            source_ids.extend(invoice.transaction_ids());
            for line in &invoice.lines {
                lines.push(JournalLine::new(
                    line.nominal.clone(),
                    line.description.clone(),
                    line.amount,
                    line.transaction_date,
                ));
            }
        }
        let control_date = latest_date(&lines);
        lines.push(JournalLine::new(
            self.accounts.purchase_control.clone(),
            "purchase ledger dispersal",
            -total,
            control_date,
        ));

        Some((
            Journal::new(PURCHASE_JNL_TYPE, control_date, lines),
            source_ids,
        ))
    }

    /// Build the journal dispersing unposted sales invoices.
    ///
    /// Symmetric to [`create_pl_to_gl_journal`], posting the control line
    /// against the sales control account.
    ///
    /// [`create_pl_to_gl_journal`]: Self::create_pl_to_gl_journal
    pub fn create_sl_to_gl_journal(
        &self,
        invoices: &[SalesInvoice],
    ) -> Option<(Journal, Vec<TransactionId>)> {
        if invoices.is_empty() {
            return None;
        }

        let mut lines = Vec::new();
        let mut source_ids = Vec::new();
        let mut total: Amount = 0;
        for invoice in invoices {
            total += invoice.total();
            source_ids.extend(invoice.transaction_ids());
            for line in &invoice.lines {
                lines.push(JournalLine::new(
                    line.nominal.clone(),
                    line.description.clone(),
                    line.amount,
                    line.transaction_date,
                ));
            }
        }
        let control_date = latest_date(&lines);
        lines.push(JournalLine::new(
            self.accounts.sales_control.clone(),
            "sales ledger dispersal",
            -total,
            control_date,
        ));

        Some((Journal::new(SALES_JNL_TYPE, control_date, lines), source_ids))
    }

    /// Build the journals dispersing bank movements.
    ///
    /// Movements are grouped by bank account and match kind; each group
    /// becomes one two-line journal (bank nominal against the matched
    /// target nominal) dated at the group's latest movement.
    pub fn create_bank_to_gl_journals(&self, transactions: &[BankTransaction]) -> Vec<Journal> {
        let mut groups: BTreeMap<(String, MatchedType), Vec<&BankTransaction>> = BTreeMap::new();
        for transaction in transactions {
            groups
                .entry((transaction.bank_code.clone(), transaction.matched_type))
                .or_default()
                .push(transaction);
        }

        groups
            .into_iter()
            .map(|((bank_code, matched_type), group)| {
                let total: Amount = group.iter().map(|t| t.amount).sum();
                let date = group.iter().map(|t| t.date).max();
                let target = self.target_nominal(matched_type);
                Journal::new(
                    BANK_JNL_TYPE,
                    date,
                    vec![
                        JournalLine::new(
                            bank_code.clone(),
                            format!("bank movements {bank_code}"),
                            total,
                            date,
                        ),
                        JournalLine::new(
                            target,
                            format!("bank movements {bank_code}"),
                            -total,
                            date,
                        ),
                    ],
                )
            })
            .collect()
    }

    fn target_nominal(&self, matched_type: MatchedType) -> String {
        match matched_type {
            MatchedType::Creditor => self.accounts.purchase_control.clone(),
            MatchedType::Debtor => self.accounts.sales_control.clone(),
            MatchedType::BalanceSheet | MatchedType::Unmatched => {
                self.accounts.bank_contra.clone()
            }
        }
    }
}

fn latest_date(lines: &[JournalLine]) -> Option<NaiveDate> {
    lines.iter().filter_map(|line| line.transaction_date).max()
}
