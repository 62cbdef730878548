//! Request and response shapes for the HTTP surface.

pub mod accounts;
pub mod auth;
pub mod invoices;
pub mod reports;
pub mod transactions;

pub use accounts::{AccountListParams, CreateAccountRequest};
pub use auth::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
pub use invoices::{CreateInvoiceRequest, InvoiceListParams, UpdateInvoiceStatusRequest};
pub use reports::ReportRequest;
pub use transactions::{CreateTransactionRequest, JournalEntryRequest, TransactionListParams};

use serde::Serialize;
use uuid::Uuid;

/// Standard creation response: the new row's id plus a human message.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
    pub message: String,
}

/// Standard message-only response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
