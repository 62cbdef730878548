use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Datelike, NaiveDate, Utc};

use crate::dtos::ReportRequest;
use crate::middleware::AuthUser;
use crate::models::ReportType;
use crate::startup::AppState;
use service_core::error::AppError;

pub async fn generate_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let report_type = ReportType::from_str(&request.report_type)?;

    let today = Utc::now().date_naive();
    let start_date = request
        .start_date
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today));
    let end_date = request.end_date.unwrap_or(today);

    let report = state
        .db
        .generate_report(report_type, start_date, end_date)
        .await?;

    Ok(Json(report))
}
