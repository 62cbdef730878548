use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Posting request. A body with `debit_account`/`credit_account`/`amount`
/// posts a two-sided transaction; a body with an `entries` array posts a
/// multi-entry journal.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateTransactionRequest {
    TwoSided {
        date: NaiveDate,
        reference: String,
        description: String,
        debit_account: Uuid,
        credit_account: Uuid,
        amount: Decimal,
        status: Option<String>,
    },
    Journal {
        date: NaiveDate,
        reference: Option<String>,
        description: Option<String>,
        entries: Vec<JournalEntryRequest>,
        status: Option<String>,
    },
}

/// One journal leg. Omitted sides default to zero.
#[derive(Debug, Deserialize)]
pub struct JournalEntryRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub account_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
