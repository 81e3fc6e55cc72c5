//! Chart of accounts: the registry of nominal accounts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{LedgerError, LedgerResult};

/// Financial statement a nominal account reports under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// Balance sheet.
    #[serde(rename = "bs")]
    BalanceSheet,
    /// Profit and loss.
    #[serde(rename = "pl")]
    ProfitAndLoss,
}

/// The side a nominal account's balance is normally expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectedSign {
    /// Debit balance expected.
    #[serde(rename = "dr")]
    Debit,
    /// Credit balance expected.
    #[serde(rename = "cr")]
    Credit,
}

/// A named category of financial activity in the General Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalAccount {
    /// Unique account name, e.g. `"purchase_ledger_control_account"`.
    pub name: String,
    /// Statement the account reports under.
    pub statement: Statement,
    /// Report heading the account is grouped beneath.
    pub heading: String,
    /// Side the balance normally falls on.
    pub expected_sign: ExpectedSign,
    /// True when the balance must mirror a sub-ledger's balance.
    pub control_account: bool,
    /// True when the account represents a bank account.
    pub bank_account: bool,
}

/// Registry of nominal accounts.
///
/// Names are unique: registering a name twice is rejected rather than
/// silently shadowing the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    nominals: BTreeMap<String, NominalAccount>,
}

impl ChartOfAccounts {
    /// Create an empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a nominal account.
    pub fn add_nominal(&mut self, account: NominalAccount) -> LedgerResult<()> {
        if self.nominals.contains_key(&account.name) {
            return Err(LedgerError::DuplicateNominal(account.name));
        }
        self.nominals.insert(account.name.clone(), account);
        Ok(())
    }

    /// Look up a nominal account by name.
    pub fn nominal(&self, name: &str) -> Option<&NominalAccount> {
        self.nominals.get(name)
    }

    /// Look up a nominal account, erroring when absent.
    pub fn nominal_required(&self, name: &str) -> LedgerResult<&NominalAccount> {
        self.nominals
            .get(name)
            .ok_or_else(|| LedgerError::NominalNotFound(name.to_string()))
    }

    /// True when the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.nominals.contains_key(name)
    }

    /// All nominal accounts in name order.
    pub fn nominals(&self) -> impl Iterator<Item = &NominalAccount> {
        self.nominals.values()
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.nominals.len()
    }

    /// True when no accounts are registered.
    pub fn is_empty(&self) -> bool {
        self.nominals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_account(name: &str) -> NominalAccount {
        NominalAccount {
            name: name.to_string(),
            statement: Statement::BalanceSheet,
            heading: "current assets".to_string(),
            expected_sign: ExpectedSign::Debit,
            control_account: false,
            bank_account: true,
        }
    }

    #[test]
    fn add_nominal_registers_account() {
        let mut chart = ChartOfAccounts::new();
        chart.add_nominal(bank_account("nwa_ca")).unwrap();
        assert!(chart.contains("nwa_ca"));
        assert_eq!(chart.nominal("nwa_ca").unwrap().heading, "current assets");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut chart = ChartOfAccounts::new();
        chart.add_nominal(bank_account("nwa_ca")).unwrap();
        let err = chart.add_nominal(bank_account("nwa_ca")).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateNominal(name) if name == "nwa_ca"));
        assert_eq!(chart.len(), 1);
    }

    #[test]
    fn nominal_required_errors_when_absent() {
        let chart = ChartOfAccounts::new();
        assert!(matches!(
            chart.nominal_required("missing"),
            Err(LedgerError::NominalNotFound(_))
        ));
    }

    #[test]
    fn nominals_iterate_in_name_order() {
        let mut chart = ChartOfAccounts::new();
        chart.add_nominal(bank_account("zzz")).unwrap();
        chart.add_nominal(bank_account("aaa")).unwrap();
        let names: Vec<_> = chart.nominals().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["aaa", "zzz"]);
    }

    #[test]
    fn statement_and_sign_serialize_with_domain_tags() {
        let account = bank_account("nwa_ca");
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["statement"], "bs");
        assert_eq!(json["expected_sign"], "dr");
    }
}
