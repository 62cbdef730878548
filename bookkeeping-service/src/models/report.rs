//! Financial report structures derived from accounts and postings.

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

/// Supported report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    TrialBalance,
    GeneralLedger,
}

impl ReportType {
    pub fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "balance_sheet" => Ok(Self::BalanceSheet),
            "income_statement" => Ok(Self::IncomeStatement),
            "cash_flow" => Ok(Self::CashFlow),
            "trial_balance" => Ok(Self::TrialBalance),
            "general_ledger" => Ok(Self::GeneralLedger),
            _ => Err(AppError::BadRequest(anyhow!(
                "Invalid report type. Must be one of balance_sheet, income_statement, \
                 cash_flow, trial_balance, general_ledger"
            ))),
        }
    }
}

/// A generated report, dispatched by type.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    BalanceSheet(BalanceSheetReport),
    IncomeStatement(IncomeStatementReport),
    CashFlow(CashFlowReport),
    TrialBalance(TrialBalanceReport),
    GeneralLedger(GeneralLedgerReport),
}

/// Active account with its stored balance, as placed on the balance sheet.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BalanceSheetAccount {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BalanceSheetTotals {
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub equity: Decimal,
    pub liabilities_equity: Decimal,
}

/// Balance sheet. Groups follow the source system's literal classification:
/// Asset and Expense accounts under assets, Liability and Revenue under
/// liabilities, Equity alone under equity.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheetReport {
    pub as_of_date: NaiveDate,
    pub assets: Vec<BalanceSheetAccount>,
    pub liabilities: Vec<BalanceSheetAccount>,
    pub equity: Vec<BalanceSheetAccount>,
    pub totals: BalanceSheetTotals,
}

/// Per-account debit/credit activity over a date range.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountActivity {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub debits: Decimal,
    pub credits: Decimal,
}

/// Income statement line: activity plus the type-signed net amount.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatementLine {
    #[serde(flatten)]
    pub activity: AccountActivity,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncomeStatementTotals {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatementReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub revenue: Vec<IncomeStatementLine>,
    pub expenses: Vec<IncomeStatementLine>,
    pub totals: IncomeStatementTotals,
}

/// Net cash movement of one account over the range.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CashFlowLine {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashFlows {
    pub operating: Vec<CashFlowLine>,
    pub investing: Vec<CashFlowLine>,
    pub financing: Vec<CashFlowLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashFlowReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beginning_cash: Decimal,
    pub cash_flows: CashFlows,
    pub net_cash_flow: Decimal,
    pub ending_cash: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialBalanceTotals {
    pub debits: Decimal,
    pub credits: Decimal,
    /// Zero for any ledger produced solely by balanced postings.
    pub difference: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub accounts: Vec<AccountActivity>,
    pub totals: TrialBalanceTotals,
}

/// One posting in an account's ledger view, with the running balance after
/// applying it (`balance += debit - credit`).
#[derive(Debug, Clone, Serialize)]
pub struct GeneralLedgerLine {
    pub transaction_id: Uuid,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub created_by: Option<String>,
    pub balance: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneralLedgerAccountRef {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
}

/// Per-account section of the general ledger. `beginning_balance` is fixed
/// at zero; prior-period carry-forward is not computed.
#[derive(Debug, Clone, Serialize)]
pub struct GeneralLedgerAccount {
    pub account: GeneralLedgerAccountRef,
    pub beginning_balance: Decimal,
    pub transactions: Vec<GeneralLedgerLine>,
    pub ending_balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneralLedgerReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub accounts: Vec<GeneralLedgerAccount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_types() {
        assert_eq!(
            ReportType::from_str("balance_sheet").unwrap(),
            ReportType::BalanceSheet
        );
        assert_eq!(
            ReportType::from_str("general_ledger").unwrap(),
            ReportType::GeneralLedger
        );
        assert!(ReportType::from_str("profit_and_loss").is_err());
    }
}
