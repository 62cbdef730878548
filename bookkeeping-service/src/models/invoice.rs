//! Invoice subledger models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice listing row enriched with client fields and completed payments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub notes: Option<String>,
    pub status: String,
    pub created_by: Uuid,
    pub created_utc: DateTime<Utc>,
}

/// Invoice line item; `amount` is always `quantity * unit_price`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceItem {
    pub item_id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub taxable: bool,
    pub amount: Decimal,
}

/// Append-only status history row. One row per transition, including the
/// creation event; history never shrinks.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceHistoryEntry {
    pub history_id: Uuid,
    pub invoice_id: Uuid,
    pub status: String,
    pub changed_by: Uuid,
    pub notes: String,
    pub changed_utc: DateTime<Utc>,
}

/// Full invoice view with items, status history, and creator username.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub created_by_username: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub history: Vec<InvoiceHistoryEntry>,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for one invoice line item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub taxable: bool,
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<CreateInvoiceItem>,
    pub tax_rate: Decimal,
    pub discount: Decimal,
    pub notes: Option<String>,
    pub status: InvoiceStatus,
    pub created_by: Uuid,
}

/// Derived invoice amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub taxable_subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Compute subtotal, tax, and total from line items. Tax applies to
    /// taxable items only; `total = subtotal + tax - discount`.
    pub fn compute(items: &[CreateInvoiceItem], tax_rate: Decimal, discount: Decimal) -> Self {
        let mut subtotal = Decimal::ZERO;
        let mut taxable_subtotal = Decimal::ZERO;

        for item in items {
            let amount = item.quantity * item.unit_price;
            subtotal += amount;
            if item.taxable {
                taxable_subtotal += amount;
            }
        }

        let tax_amount = taxable_subtotal * tax_rate;
        Self {
            subtotal,
            taxable_subtotal,
            tax_amount,
            total: subtotal + tax_amount - discount,
        }
    }
}
