//! Financial report generation.
//!
//! Reports read committed postings and stored balances; they never write.
//! Only the two-sided transactions table feeds the range aggregations.

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use crate::models::report::{
    AccountActivity, BalanceSheetAccount, BalanceSheetReport, BalanceSheetTotals, CashFlowLine,
    CashFlowReport, CashFlows, GeneralLedgerAccount, GeneralLedgerAccountRef, GeneralLedgerLine,
    GeneralLedgerReport, IncomeStatementLine, IncomeStatementReport, IncomeStatementTotals, Report,
    ReportType, TrialBalanceReport, TrialBalanceTotals,
};
use crate::services::database::Database;
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;

#[derive(FromRow)]
struct LedgerLineRow {
    transaction_id: Uuid,
    date: NaiveDate,
    reference: String,
    description: String,
    debit: Decimal,
    credit: Decimal,
    created_by: Option<String>,
}

impl Database {
    /// Generate a report of the given type over the date range.
    ///
    /// The balance sheet ignores `start_date`; its snapshot date is
    /// `end_date`.
    #[instrument(skip(self), fields(report_type = ?report_type))]
    pub async fn generate_report(
        &self,
        report_type: ReportType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Report, AppError> {
        match report_type {
            ReportType::BalanceSheet => {
                Ok(Report::BalanceSheet(self.balance_sheet(end_date).await?))
            }
            ReportType::IncomeStatement => Ok(Report::IncomeStatement(
                self.income_statement(start_date, end_date).await?,
            )),
            ReportType::CashFlow => Ok(Report::CashFlow(
                self.cash_flow_statement(start_date, end_date).await?,
            )),
            ReportType::TrialBalance => Ok(Report::TrialBalance(
                self.trial_balance(start_date, end_date).await?,
            )),
            ReportType::GeneralLedger => Ok(Report::GeneralLedger(
                self.general_ledger(start_date, end_date).await?,
            )),
        }
    }

    /// Balance sheet from stored balances of active accounts.
    ///
    /// Grouping is the source system's literal classification: Expense
    /// accounts land under assets and Revenue under liabilities.
    async fn balance_sheet(&self, as_of_date: NaiveDate) -> Result<BalanceSheetReport, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["balance_sheet"])
            .start_timer();

        let accounts = sqlx::query_as::<_, BalanceSheetAccount>(
            r#"
            SELECT account_id, code, name, account_type, balance
            FROM accounts
            WHERE is_active = TRUE
            ORDER BY account_type, code
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to load accounts: {}", e)))?;

        timer.observe_duration();

        let mut report = BalanceSheetReport {
            as_of_date,
            assets: Vec::new(),
            liabilities: Vec::new(),
            equity: Vec::new(),
            totals: BalanceSheetTotals::default(),
        };

        for account in accounts {
            match account.account_type.as_str() {
                "asset" | "expense" => {
                    report.totals.assets += account.balance;
                    report.assets.push(account);
                }
                "liability" | "revenue" => {
                    report.totals.liabilities += account.balance;
                    report.liabilities.push(account);
                }
                "equity" => {
                    report.totals.equity += account.balance;
                    report.equity.push(account);
                }
                _ => {}
            }
        }
        report.totals.liabilities_equity = report.totals.liabilities + report.totals.equity;

        Ok(report)
    }

    /// Income statement: revenue and expense activity over the range.
    async fn income_statement(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<IncomeStatementReport, AppError> {
        let accounts = self
            .account_activity_by_type(
                start_date,
                end_date,
                &["revenue".to_string(), "expense".to_string()],
            )
            .await?;

        let mut report = IncomeStatementReport {
            start_date,
            end_date,
            revenue: Vec::new(),
            expenses: Vec::new(),
            totals: IncomeStatementTotals::default(),
        };

        for activity in accounts {
            if activity.account_type == "revenue" {
                let amount = activity.credits - activity.debits;
                report.totals.revenue += amount;
                report.revenue.push(IncomeStatementLine { activity, amount });
            } else {
                let amount = activity.debits - activity.credits;
                report.totals.expenses += amount;
                report.expenses.push(IncomeStatementLine { activity, amount });
            }
        }
        report.totals.net_income = report.totals.revenue - report.totals.expenses;

        Ok(report)
    }

    /// Cash flow statement over the range.
    ///
    /// Requires at least one active Asset account with "Cash" in its name.
    /// Beginning cash is derived backwards from the ending balance and the
    /// net flow.
    async fn cash_flow_statement(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CashFlowReport, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["cash_flow"])
            .start_timer();

        let cash_balances: Vec<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance
            FROM accounts
            WHERE account_type = 'asset' AND name LIKE '%Cash%' AND is_active = TRUE
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to load cash accounts: {}", e)))?;

        if cash_balances.is_empty() {
            return Err(AppError::NotFound(anyhow!("No cash accounts found")));
        }
        let ending_cash: Decimal = cash_balances.iter().sum();

        let operating = self
            .cash_flows_by_activity(
                start_date,
                end_date,
                &["revenue".to_string(), "expense".to_string()],
            )
            .await?;
        let investing = self
            .cash_flows_by_activity(start_date, end_date, &["asset".to_string()])
            .await?;
        let financing = self
            .cash_flows_by_activity(
                start_date,
                end_date,
                &["liability".to_string(), "equity".to_string()],
            )
            .await?;

        timer.observe_duration();

        let net_cash_flow: Decimal = operating
            .iter()
            .chain(investing.iter())
            .chain(financing.iter())
            .map(|line| line.amount)
            .sum();

        Ok(CashFlowReport {
            start_date,
            end_date,
            beginning_cash: ending_cash - net_cash_flow,
            cash_flows: CashFlows {
                operating,
                investing,
                financing,
            },
            net_cash_flow,
            ending_cash,
        })
    }

    /// Trial balance: all accounts with activity over the range.
    async fn trial_balance(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TrialBalanceReport, AppError> {
        let accounts = self.active_account_activity(start_date, end_date).await?;

        let mut totals = TrialBalanceTotals::default();
        for account in &accounts {
            totals.debits += account.debits;
            totals.credits += account.credits;
        }
        totals.difference = totals.debits - totals.credits;

        Ok(TrialBalanceReport {
            start_date,
            end_date,
            accounts,
            totals,
        })
    }

    /// General ledger: per-account posting history with running balances.
    /// Accounts with no activity in the range are omitted.
    async fn general_ledger(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<GeneralLedgerReport, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["general_ledger"])
            .start_timer();

        let accounts = sqlx::query_as::<_, GeneralLedgerAccountRef>(
            r#"
            SELECT account_id, code, name, account_type
            FROM accounts
            WHERE is_active = TRUE
            ORDER BY code
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to load accounts: {}", e)))?;

        let mut sections = Vec::new();
        for account in accounts {
            let rows = sqlx::query_as::<_, LedgerLineRow>(
                r#"
                SELECT t.transaction_id, t.date, t.reference, t.description,
                       CASE WHEN t.debit_account = $1 THEN t.amount ELSE 0 END AS debit,
                       CASE WHEN t.credit_account = $1 THEN t.amount ELSE 0 END AS credit,
                       u.username AS created_by
                FROM transactions t
                LEFT JOIN users u ON t.created_by = u.user_id
                WHERE (t.debit_account = $1 OR t.credit_account = $1)
                  AND t.date >= $2 AND t.date <= $3
                ORDER BY t.date, t.created_utc
                "#,
            )
            .bind(account.account_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to load postings: {}", e)))?;

            if rows.is_empty() {
                continue;
            }

            let mut balance = Decimal::ZERO;
            let transactions = rows
                .into_iter()
                .map(|row| {
                    balance += row.debit - row.credit;
                    GeneralLedgerLine {
                        transaction_id: row.transaction_id,
                        date: row.date,
                        reference: row.reference,
                        description: row.description,
                        debit: row.debit,
                        credit: row.credit,
                        created_by: row.created_by,
                        balance,
                    }
                })
                .collect();

            sections.push(GeneralLedgerAccount {
                account,
                beginning_balance: Decimal::ZERO,
                transactions,
                ending_balance: balance,
            });
        }

        timer.observe_duration();

        Ok(GeneralLedgerReport {
            start_date,
            end_date,
            accounts: sections,
        })
    }

    /// Per-account debit/credit totals over a date range for the given
    /// account types. Accounts with no postings in the range still appear,
    /// with zero totals.
    async fn account_activity_by_type(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        account_types: &[String],
    ) -> Result<Vec<AccountActivity>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["account_activity"])
            .start_timer();

        let accounts = sqlx::query_as::<_, AccountActivity>(
            r#"
            SELECT a.account_id, a.code, a.name, a.account_type,
                   COALESCE(SUM(CASE WHEN t.debit_account = a.account_id THEN t.amount ELSE 0 END), 0) AS debits,
                   COALESCE(SUM(CASE WHEN t.credit_account = a.account_id THEN t.amount ELSE 0 END), 0) AS credits
            FROM accounts a
            LEFT JOIN transactions t
                ON (t.debit_account = a.account_id OR t.credit_account = a.account_id)
               AND t.date >= $1 AND t.date <= $2
            WHERE a.account_type = ANY($3)
            GROUP BY a.account_id, a.code, a.name, a.account_type
            ORDER BY a.account_type, a.code
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(account_types)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to aggregate activity: {}", e)))?;

        timer.observe_duration();

        Ok(accounts)
    }

    /// Debit/credit totals for every active account that had postings in
    /// the range.
    async fn active_account_activity(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AccountActivity>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["account_activity"])
            .start_timer();

        let accounts = sqlx::query_as::<_, AccountActivity>(
            r#"
            SELECT a.account_id, a.code, a.name, a.account_type,
                   COALESCE(SUM(CASE WHEN t.debit_account = a.account_id THEN t.amount ELSE 0 END), 0) AS debits,
                   COALESCE(SUM(CASE WHEN t.credit_account = a.account_id THEN t.amount ELSE 0 END), 0) AS credits
            FROM accounts a
            LEFT JOIN transactions t
                ON (t.debit_account = a.account_id OR t.credit_account = a.account_id)
               AND t.date >= $1 AND t.date <= $2
            WHERE a.is_active = TRUE
            GROUP BY a.account_id, a.code, a.name, a.account_type
            HAVING COALESCE(SUM(CASE WHEN t.debit_account = a.account_id THEN t.amount ELSE 0 END), 0) != 0
                OR COALESCE(SUM(CASE WHEN t.credit_account = a.account_id THEN t.amount ELSE 0 END), 0) != 0
            ORDER BY a.account_type, a.code
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to aggregate activity: {}", e)))?;

        timer.observe_duration();

        Ok(accounts)
    }

    /// Net cash movement per account for one activity bucket.
    async fn cash_flows_by_activity(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        account_types: &[String],
    ) -> Result<Vec<CashFlowLine>, AppError> {
        let lines = sqlx::query_as::<_, CashFlowLine>(
            r#"
            SELECT a.account_id, a.code, a.name, a.account_type,
                   SUM(CASE WHEN t.debit_account = a.account_id THEN t.amount ELSE -t.amount END) AS amount
            FROM accounts a
            JOIN transactions t
                ON (t.debit_account = a.account_id OR t.credit_account = a.account_id)
            WHERE a.account_type = ANY($1)
              AND t.date >= $2 AND t.date <= $3
            GROUP BY a.account_id, a.code, a.name, a.account_type
            HAVING SUM(CASE WHEN t.debit_account = a.account_id THEN t.amount ELSE -t.amount END) != 0
            ORDER BY a.account_type, a.code
            "#,
        )
        .bind(account_types)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to aggregate cash flows: {}", e)))?;

        Ok(lines)
    }
}
