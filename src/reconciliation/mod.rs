//! Inter-ledger reconciliation: dispersal tracking, journal creation, and
//! control-account agreement checks

pub mod dispersal;
pub mod interledger;

pub use dispersal::*;
pub use interledger::*;

use serde::{Deserialize, Serialize};

use crate::ledger::general::GeneralLedgerTransactions;
use crate::ledger::purchase::PurchaseLedger;
use crate::ledger::sales::SalesLedger;
use crate::types::Amount;

/// Result of the end-of-period control-account agreement checks.
///
/// A failed report indicates an upstream posting bug; the orchestrating
/// driver must treat it as fatal for the period rather than advancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// True when every check passed.
    pub is_valid: bool,
    /// Human-readable description of each failed check.
    pub issues: Vec<String>,
    /// Sum of all General Ledger amounts; zero when valid.
    pub gl_balance: Amount,
    /// General Ledger balance on the purchase control account.
    pub purchase_control_balance: Amount,
    /// Purchase ledger balance the control account must mirror.
    pub purchase_ledger_balance: Amount,
    /// General Ledger balance on the sales control account.
    pub sales_control_balance: Amount,
    /// Sales ledger balance the control account must mirror.
    pub sales_ledger_balance: Amount,
}

/// Check that the General Ledger balances to zero and that each control
/// account mirrors its sub-ledger.
pub fn reconcile_control_accounts(
    general: &GeneralLedgerTransactions,
    purchase: &PurchaseLedger,
    sales: &SalesLedger,
    accounts: &ControlAccounts,
) -> ReconciliationReport {
    let balances = general.balances();
    let gl_balance = general.balance();
    let purchase_control_balance = balances
        .get(&accounts.purchase_control)
        .copied()
        .unwrap_or(0);
    let purchase_ledger_balance = purchase.balance();
    let sales_control_balance = balances.get(&accounts.sales_control).copied().unwrap_or(0);
    let sales_ledger_balance = sales.balance();

    let mut issues = Vec::new();
    if gl_balance != 0 {
        issues.push(format!("general ledger does not balance: {gl_balance}"));
    }
    if purchase_control_balance != purchase_ledger_balance {
        issues.push(format!(
            "purchase control {purchase_control_balance} != purchase ledger {purchase_ledger_balance}"
        ));
    }
    if sales_control_balance != sales_ledger_balance {
        issues.push(format!(
            "sales control {sales_control_balance} != sales ledger {sales_ledger_balance}"
        ));
    }

    ReconciliationReport {
        is_valid: issues.is_empty(),
        issues,
        gl_balance,
        purchase_control_balance,
        purchase_ledger_balance,
        sales_control_balance,
        sales_ledger_balance,
    }
}
