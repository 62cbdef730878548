use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::invoice::CreateInvoiceItem;

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<CreateInvoiceItem>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}
