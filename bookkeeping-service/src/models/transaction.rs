//! Transaction models for double-entry postings.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

/// Posting side (debit or credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction lifecycle status. Immutable after creation; balances are
/// applied exactly once, at creation, only for posted transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Draft,
    Posted,
    Void,
}

impl TransactionStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction listing row enriched with account names and codes.
/// Only two-sided postings appear here; multi-entry journals carry their
/// legs in `transaction_entries`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionRow {
    pub transaction_id: Uuid,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub amount: Decimal,
    pub status: String,
    pub debit_account: Uuid,
    pub debit_account_name: String,
    pub debit_account_code: String,
    pub credit_account: Uuid,
    pub credit_account_name: String,
    pub credit_account_code: String,
    pub created_by: Uuid,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Single journal leg.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionEntry {
    pub entry_id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Full transaction view: header fields, joined account names/codes, the
/// creating username, and any journal legs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionDetail {
    pub transaction_id: Uuid,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub amount: Option<Decimal>,
    pub status: String,
    pub debit_account: Option<Uuid>,
    pub debit_account_name: Option<String>,
    pub debit_account_code: Option<String>,
    pub credit_account: Option<Uuid>,
    pub credit_account_name: Option<String>,
    pub credit_account_code: Option<String>,
    pub created_by: Uuid,
    pub created_by_username: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    #[sqlx(skip)]
    pub entries: Vec<TransactionEntry>,
}

/// Filter parameters for listing transactions. Unset filters are no-ops;
/// set filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ListTransactionsFilter {
    pub account_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

/// Input for posting a two-sided transaction.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub debit_account: Uuid,
    pub credit_account: Uuid,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_by: Uuid,
}

/// One leg of a multi-entry journal. Exactly one of `debit`/`credit` is
/// positive; the other is zero.
#[derive(Debug, Clone)]
pub struct JournalEntryInput {
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Input for posting a multi-entry journal.
#[derive(Debug, Clone)]
pub struct CreateJournal {
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub entries: Vec<JournalEntryInput>,
    pub status: TransactionStatus,
    pub created_by: Uuid,
}

/// Validate journal legs and return (debit total, credit total).
///
/// A journal needs at least two legs, each leg carries exactly one positive
/// side, and debits must equal credits. This check is the accounting
/// invariant the whole ledger exists to protect.
pub fn validate_journal_entries(
    entries: &[JournalEntryInput],
) -> Result<(Decimal, Decimal), AppError> {
    if entries.len() < 2 {
        return Err(AppError::BadRequest(anyhow!(
            "Transaction must have at least 2 entries"
        )));
    }

    let mut debit_sum = Decimal::ZERO;
    let mut credit_sum = Decimal::ZERO;

    for entry in entries {
        if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow!(
                "Entry amounts cannot be negative"
            )));
        }
        let has_debit = entry.debit > Decimal::ZERO;
        let has_credit = entry.credit > Decimal::ZERO;
        if has_debit == has_credit {
            return Err(AppError::BadRequest(anyhow!(
                "Each entry must carry either a debit or a credit amount"
            )));
        }
        debit_sum += entry.debit;
        credit_sum += entry.credit;
    }

    if debit_sum != credit_sum {
        return Err(AppError::BadRequest(anyhow!(
            "Unbalanced journal: debits ({}) != credits ({})",
            debit_sum,
            credit_sum
        )));
    }

    Ok((debit_sum, credit_sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(debit: Decimal, credit: Decimal) -> JournalEntryInput {
        JournalEntryInput {
            account_id: Uuid::new_v4(),
            debit,
            credit,
        }
    }

    #[test]
    fn accepts_balanced_journal() {
        let entries = vec![
            leg(dec!(60), Decimal::ZERO),
            leg(dec!(40), Decimal::ZERO),
            leg(Decimal::ZERO, dec!(100)),
        ];
        let (debits, credits) = validate_journal_entries(&entries).unwrap();
        assert_eq!(debits, dec!(100));
        assert_eq!(credits, dec!(100));
    }

    #[test]
    fn rejects_single_entry_journal() {
        let entries = vec![leg(dec!(100), Decimal::ZERO)];
        assert!(validate_journal_entries(&entries).is_err());
    }

    #[test]
    fn rejects_unbalanced_journal() {
        let entries = vec![leg(dec!(100), Decimal::ZERO), leg(Decimal::ZERO, dec!(90))];
        assert!(validate_journal_entries(&entries).is_err());
    }

    #[test]
    fn rejects_entry_with_both_sides() {
        let entries = vec![leg(dec!(100), dec!(100)), leg(Decimal::ZERO, dec!(100))];
        assert!(validate_journal_entries(&entries).is_err());
    }

    #[test]
    fn rejects_entry_with_neither_side() {
        let entries = vec![
            leg(Decimal::ZERO, Decimal::ZERO),
            leg(Decimal::ZERO, Decimal::ZERO),
        ];
        assert!(validate_journal_entries(&entries).is_err());
    }

    #[test]
    fn rejects_negative_amounts() {
        let entries = vec![leg(dec!(-50), Decimal::ZERO), leg(Decimal::ZERO, dec!(-50))];
        assert!(validate_journal_entries(&entries).is_err());
    }

    #[test]
    fn parses_status_strings() {
        assert_eq!(
            TransactionStatus::from_str("posted"),
            Some(TransactionStatus::Posted)
        );
        assert_eq!(
            TransactionStatus::from_str("Draft"),
            Some(TransactionStatus::Draft)
        );
        assert_eq!(TransactionStatus::from_str("pending"), None);
    }
}
