use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dtos::{
    CreateInvoiceRequest, CreatedResponse, InvoiceListParams, MessageResponse,
    UpdateInvoiceStatusRequest,
};
use crate::middleware::AuthUser;
use crate::models::{CreateInvoice, InvoiceStatus, ListInvoicesFilter};
use crate::startup::AppState;
use service_core::error::AppError;

fn parse_status(raw: &str) -> Result<InvoiceStatus, AppError> {
    InvoiceStatus::from_str(raw).ok_or_else(|| {
        AppError::BadRequest(anyhow!(
            "Invalid status. Must be one of draft, sent, paid, overdue, cancelled"
        ))
    })
}

pub async fn list_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<InvoiceListParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params.status.as_deref().map(parse_status).transpose()?;

    let filter = ListInvoicesFilter {
        status,
        client_id: params.client_id,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let invoices = state.db.list_invoices(&filter).await?;
    Ok(Json(invoices))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.db.get_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = match request.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => InvoiceStatus::Draft,
    };

    let invoice_id = state
        .db
        .create_invoice(&CreateInvoice {
            invoice_number: request.invoice_number,
            client_id: request.client_id,
            date: request.date,
            due_date: request.due_date,
            items: request.items,
            tax_rate: request.tax_rate,
            discount: request.discount,
            notes: request.notes,
            status,
            created_by: user.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: invoice_id,
            message: "Invoice created successfully".to_string(),
        }),
    ))
}

pub async fn update_invoice_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = parse_status(&request.status)?;

    state
        .db
        .update_invoice_status(invoice_id, status, user.user_id, request.notes)
        .await?;

    Ok(Json(MessageResponse {
        message: "Invoice status updated successfully".to_string(),
    }))
}
