use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{AccountListParams, CreateAccountRequest, CreatedResponse};
use crate::middleware::AuthUser;
use crate::models::{AccountType, CreateAccount};
use crate::startup::AppState;
use service_core::error::AppError;

pub async fn create_account(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let account_type = AccountType::from_str(&request.account_type).ok_or_else(|| {
        AppError::BadRequest(anyhow!(
            "Invalid account type. Must be one of asset, liability, equity, revenue, expense"
        ))
    })?;

    let account = state
        .db
        .create_account(&CreateAccount {
            code: request.code,
            name: request.name,
            account_type,
            description: request.description,
            initial_balance: request.initial_balance,
            is_active: request.is_active,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: account.account_id,
            message: "Account created successfully".to_string(),
        }),
    ))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<AccountListParams>,
) -> Result<impl IntoResponse, AppError> {
    let account_type = match params.account_type.as_deref() {
        Some(raw) => Some(AccountType::from_str(raw).ok_or_else(|| {
            AppError::BadRequest(anyhow!(
                "Invalid account type. Must be one of asset, liability, equity, revenue, expense"
            ))
        })?),
        None => None,
    };

    let accounts = state
        .db
        .list_accounts(account_type, params.include_inactive)
        .await?;
    Ok(Json(accounts))
}

pub async fn get_account(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.db.get_account(account_id).await?;
    Ok(Json(account))
}
