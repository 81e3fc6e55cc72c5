//! Period-end walkthrough: load raw activity, disperse it to the General
//! Ledger, and check the control accounts agree.

use bookkeeping_core::{
    reconcile_control_accounts, BankLedger, ChartOfAccounts, DispersalsLogger, ExpectedSign,
    GeneralLedger, GeneralLedgerTransactions, InterLedgerJournalCreator, MatchedType,
    MonthlyCalendar, NewPrepayment, NewPurchaseInvoice, NewPurchaseInvoiceLine,
    NewPurchaseLedgerPayment, NominalAccount, PurchaseLedger, RawBankTransaction, SalesLedger,
    Statement,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Bookkeeping Core - Period End Example\n");

    // 1. Chart of accounts
    println!("Setting up chart of accounts...");
    let mut chart = ChartOfAccounts::new();
    let accounts = [
        ("nwa_ca", Statement::BalanceSheet, "current assets", ExpectedSign::Debit, false, true),
        ("bank_contra", Statement::BalanceSheet, "current assets", ExpectedSign::Debit, false, false),
        ("prepayments", Statement::BalanceSheet, "current assets", ExpectedSign::Debit, false, false),
        ("purchase_ledger_control_account", Statement::BalanceSheet, "current liabilities", ExpectedSign::Credit, true, false),
        ("sales_ledger_control_account", Statement::BalanceSheet, "current assets", ExpectedSign::Debit, true, false),
        ("rent", Statement::ProfitAndLoss, "overheads", ExpectedSign::Debit, false, false),
        ("sales", Statement::ProfitAndLoss, "revenue", ExpectedSign::Credit, false, false),
    ];
    for (name, statement, heading, expected_sign, control_account, bank_account) in accounts {
        chart.add_nominal(NominalAccount {
            name: name.to_string(),
            statement,
            heading: heading.to_string(),
            expected_sign,
            control_account,
            bank_account,
        })?;
        println!("  registered nominal: {name}");
    }

    let bank_ledger = BankLedger::new();
    let purchase_ledger = PurchaseLedger::new();
    let sales_ledger = SalesLedger::new();
    let general_ledger = GeneralLedger::new(
        GeneralLedgerTransactions::new(),
        chart,
        MonthlyCalendar::for_year(2021),
    );
    let creator = InterLedgerJournalCreator::new();

    // 2. Raw activity for January
    println!("\nLoading January activity...");
    let jan = |d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap();
    bank_ledger.add_transactions(vec![RawBankTransaction {
        raw_id: 0,
        bank_code: "nwa_ca".to_string(),
        date: jan(4),
        transaction_type: "DD".to_string(),
        description: "office rent".to_string(),
        amount: -25_000,
        transfer_type: "direct_debit".to_string(),
        matched_account: Some("landlord".to_string()),
        matched_type: MatchedType::Creditor,
    }]);
    purchase_ledger.add_invoices(vec![NewPurchaseInvoice {
        creditor: "landlord".to_string(),
        lines: vec![NewPurchaseInvoiceLine {
            nominal: "rent".to_string(),
            description: "office rent january".to_string(),
            amount: -25_000,
            transaction_date: Some(jan(4)),
            raw_id: 0,
        }],
    }]);
    purchase_ledger.add_payments(vec![NewPurchaseLedgerPayment {
        raw_id: 0,
        date: jan(4),
        amount: 25_000,
        creditor: "landlord".to_string(),
        bank_code: "nwa_ca".to_string(),
    }]);
    println!("  bank ledger balance: {}", bank_ledger.balance());
    println!("  purchase ledger balance: {}", purchase_ledger.balance());

    // 3. Disperse to the General Ledger
    println!("\nDispersing to the General Ledger...");
    let invoices = purchase_ledger.get_unposted_invoices();
    if let Some((journal, source_ids)) = creator.create_pl_to_gl_journal(&invoices) {
        general_ledger.add_journal(&journal)?;
        purchase_ledger.mark_extracted_to_gl(&source_ids);
        println!("  posted purchase dispersal: {} lines", journal.lines.len());
    }

    let mut dispersals = DispersalsLogger::new();
    dispersals.register_ledger("bank", bank_ledger.clone());
    let movements = dispersals.undispersed_transactions("bank")?;
    for journal in creator.create_bank_to_gl_journals(&movements) {
        general_ledger.add_journal(&journal)?;
        println!("  posted bank dispersal: {} lines", journal.lines.len());
    }
    dispersals.log_dispersal("bank", &movements)?;

    // 4. A prepayment spread over three periods
    println!("\nAmortizing a prepaid cost...");
    let journals = general_ledger.create_prepayment_journal(&NewPrepayment {
        nominal: "rent".to_string(),
        amount: 700,
        period_start: 2,
        periods: 3,
        description: "rent paid in advance".to_string(),
        description_recurring: "rent prepayment release".to_string(),
    })?;
    for journal in &journals {
        general_ledger.add_journal(journal)?;
    }
    println!("  posted {} prepayment journals", journals.len());

    // 5. Period-end checks
    println!("\nReconciling...");
    let report = reconcile_control_accounts(
        &general_ledger.transactions,
        &purchase_ledger,
        &sales_ledger,
        creator.accounts(),
    );
    println!("  general ledger balance: {}", report.gl_balance);
    println!(
        "  purchase control {} vs purchase ledger {}",
        report.purchase_control_balance, report.purchase_ledger_balance
    );
    if report.is_valid {
        println!("  all control accounts agree");
    } else {
        for issue in &report.issues {
            println!("  ISSUE: {issue}");
        }
        return Err("control accounts do not reconcile".into());
    }

    Ok(())
}
