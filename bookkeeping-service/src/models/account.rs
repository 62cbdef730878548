//! Account model for the chart of accounts.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::transaction::Direction;

/// Account types following standard accounting categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    /// Parse from a string, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Whether the account carries a normal debit balance.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Balance impact of posting `amount` on the given side of an account
    /// of this type. Debits increase Asset/Expense balances and decrease
    /// Liability/Equity/Revenue balances; credits are the inverse.
    pub fn signed_delta(&self, direction: Direction, amount: Decimal) -> Decimal {
        match (direction, self.is_debit_normal()) {
            (Direction::Debit, true) | (Direction::Credit, false) => amount,
            _ => -amount,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger account.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub description: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Account {
    /// Get parsed account type.
    pub fn parsed_type(&self) -> Option<AccountType> {
        AccountType::from_str(&self.account_type)
    }
}

/// Account listing row with derived activity count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountSummary {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub description: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    pub transaction_count: i64,
}

/// Single account view with derived posting totals.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountDetail {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub description: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub current_balance: Decimal,
}

/// Input for creating a new account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub description: String,
    pub initial_balance: Decimal,
    pub is_active: bool,
}

impl CreateAccount {
    /// Account codes are numeric strings in 1..=9999 (e.g. 1000, 2000).
    pub fn validate_code(code: &str) -> Result<(), AppError> {
        let parsed: i64 = code
            .parse()
            .map_err(|_| AppError::BadRequest(anyhow!("Account code must be a number")))?;
        if !(1..=9999).contains(&parsed) {
            return Err(AppError::BadRequest(anyhow!(
                "Account code must be between 1 and 9999"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_account_types_case_insensitively() {
        assert_eq!(AccountType::from_str("asset"), Some(AccountType::Asset));
        assert_eq!(AccountType::from_str("Revenue"), Some(AccountType::Revenue));
        assert_eq!(AccountType::from_str("EXPENSE"), Some(AccountType::Expense));
        assert_eq!(AccountType::from_str("bank"), None);
    }

    #[test]
    fn debit_increases_asset_and_expense_balances() {
        let amount = dec!(100);
        assert_eq!(
            AccountType::Asset.signed_delta(Direction::Debit, amount),
            dec!(100)
        );
        assert_eq!(
            AccountType::Expense.signed_delta(Direction::Debit, amount),
            dec!(100)
        );
        assert_eq!(
            AccountType::Liability.signed_delta(Direction::Debit, amount),
            dec!(-100)
        );
        assert_eq!(
            AccountType::Revenue.signed_delta(Direction::Debit, amount),
            dec!(-100)
        );
    }

    #[test]
    fn credit_increases_credit_normal_balances() {
        let amount = dec!(100);
        assert_eq!(
            AccountType::Revenue.signed_delta(Direction::Credit, amount),
            dec!(100)
        );
        assert_eq!(
            AccountType::Equity.signed_delta(Direction::Credit, amount),
            dec!(100)
        );
        assert_eq!(
            AccountType::Asset.signed_delta(Direction::Credit, amount),
            dec!(-100)
        );
    }

    #[test]
    fn cash_sale_increases_both_balances() {
        // Debit Cash (asset), credit Sales (revenue): both go up by 100.
        let amount = dec!(100);
        assert_eq!(
            AccountType::Asset.signed_delta(Direction::Debit, amount),
            dec!(100)
        );
        assert_eq!(
            AccountType::Revenue.signed_delta(Direction::Credit, amount),
            dec!(100)
        );
    }

    #[test]
    fn rejects_non_numeric_account_code() {
        assert!(CreateAccount::validate_code("abc").is_err());
        assert!(CreateAccount::validate_code("").is_err());
        assert!(CreateAccount::validate_code("10.5").is_err());
    }

    #[test]
    fn rejects_out_of_range_account_code() {
        assert!(CreateAccount::validate_code("0").is_err());
        assert!(CreateAccount::validate_code("-1").is_err());
        assert!(CreateAccount::validate_code("10000").is_err());
        assert!(CreateAccount::validate_code("1").is_ok());
        assert!(CreateAccount::validate_code("9999").is_ok());
        assert!(CreateAccount::validate_code("1000").is_ok());
    }
}
