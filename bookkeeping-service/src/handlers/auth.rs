use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::dtos::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::models::CreateUser;
use crate::services::AuthService;
use crate::startup::AppState;
use service_core::error::AppError;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let password_hash = AuthService::hash_password(&request.password)?;
    let user = state
        .db
        .create_user(&CreateUser {
            username: request.username,
            email: request.email,
            password_hash,
        })
        .await?;

    let token = state.auth.issue_token(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .get_user_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow!("Invalid username or password")))?;

    // Same error for unknown user and wrong password.
    if !AuthService::verify_password(&user.password_hash, &request.password)? {
        return Err(AppError::Unauthorized(anyhow!(
            "Invalid username or password"
        )));
    }

    let token = state.auth.issue_token(&user)?;

    Ok(Json(TokenResponse {
        token,
        user: UserResponse::from(user),
    }))
}
