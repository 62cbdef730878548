use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dtos::{CreateTransactionRequest, CreatedResponse, TransactionListParams};
use crate::middleware::AuthUser;
use crate::models::{
    CreateJournal, CreateTransaction, JournalEntryInput, ListTransactionsFilter, TransactionStatus,
};
use crate::startup::AppState;
use service_core::error::AppError;

fn parse_status(raw: Option<&str>) -> Result<TransactionStatus, AppError> {
    match raw {
        Some(s) => TransactionStatus::from_str(s).ok_or_else(|| {
            AppError::BadRequest(anyhow!(
                "Invalid status. Must be one of draft, posted, void"
            ))
        }),
        None => Ok(TransactionStatus::Posted),
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let transaction_id = match request {
        CreateTransactionRequest::TwoSided {
            date,
            reference,
            description,
            debit_account,
            credit_account,
            amount,
            status,
        } => {
            let status = parse_status(status.as_deref())?;
            state
                .db
                .create_transaction(&CreateTransaction {
                    date,
                    reference,
                    description,
                    debit_account,
                    credit_account,
                    amount,
                    status,
                    created_by: user.user_id,
                })
                .await?
        }
        CreateTransactionRequest::Journal {
            date,
            reference,
            description,
            entries,
            status,
        } => {
            let status = parse_status(status.as_deref())?;
            let entries = entries
                .into_iter()
                .map(|e| JournalEntryInput {
                    account_id: e.account_id,
                    debit: e.debit,
                    credit: e.credit,
                })
                .collect();
            state
                .db
                .create_journal(&CreateJournal {
                    date,
                    reference: reference.unwrap_or_default(),
                    description: description.unwrap_or_default(),
                    entries,
                    status,
                    created_by: user.user_id,
                })
                .await?
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: transaction_id,
            message: "Transaction created successfully".to_string(),
        }),
    ))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<TransactionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ListTransactionsFilter {
        account_id: params.account_id,
        start_date: params.start_date,
        end_date: params.end_date,
        limit: params.limit.unwrap_or(100),
        offset: params.offset.unwrap_or(0),
    };

    let transactions = state.db.list_transactions(&filter).await?;
    Ok(Json(transactions))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.db.get_transaction(transaction_id).await?;
    Ok(Json(transaction))
}
