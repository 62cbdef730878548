//! Invoice subledger operations.
//!
//! Invoices record receivables alongside the ledger without posting to it.
//! Every status change appends to `invoice_history`; `amount_paid` is always
//! derived from completed payments, never stored on the invoice.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    CreateInvoice, Invoice, InvoiceDetail, InvoiceHistoryEntry, InvoiceItem, InvoiceStatus,
    InvoiceTotals, ListInvoicesFilter,
};
use crate::services::database::Database;
use crate::services::metrics::{DB_QUERY_DURATION, INVOICES_CREATED};
use service_core::error::AppError;

#[derive(FromRow)]
struct InvoiceDetailRow {
    invoice_id: Uuid,
    invoice_number: String,
    client_id: Option<Uuid>,
    client_name: Option<String>,
    client_email: Option<String>,
    client_phone: Option<String>,
    client_address: Option<String>,
    date: NaiveDate,
    due_date: Option<NaiveDate>,
    subtotal: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    discount: Decimal,
    total: Decimal,
    amount_paid: Decimal,
    notes: Option<String>,
    status: String,
    created_by: Uuid,
    created_by_username: Option<String>,
    created_utc: DateTime<Utc>,
}

impl Database {
    /// List invoices with client fields and paid amounts, most recent first.
    #[instrument(skip(self, filter))]
    pub async fn list_invoices(
        &self,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT i.invoice_id, i.invoice_number, i.client_id, c.name AS client_name,
                   c.email AS client_email, i.date, i.due_date, i.subtotal, i.tax_rate,
                   i.tax_amount, i.discount, i.total,
                   COALESCE((SELECT SUM(p.amount) FROM payments p
                             WHERE p.invoice_id = i.invoice_id AND p.status = 'completed'
                            ), 0.00) AS amount_paid,
                   i.notes, i.status, i.created_by, i.created_utc
            FROM invoices i
            LEFT JOIN clients c ON i.client_id = c.client_id
            WHERE ($1::varchar IS NULL OR i.status = $1)
              AND ($2::uuid IS NULL OR i.client_id = $2)
              AND ($3::date IS NULL OR i.date >= $3)
              AND ($4::date IS NULL OR i.date <= $4)
            ORDER BY i.date DESC, i.invoice_number DESC
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.client_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Get an invoice with its line items.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<InvoiceDetail, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let row = sqlx::query_as::<_, InvoiceDetailRow>(
            r#"
            SELECT i.invoice_id, i.invoice_number, i.client_id, c.name AS client_name,
                   c.email AS client_email, c.phone AS client_phone, c.address AS client_address,
                   i.date, i.due_date, i.subtotal, i.tax_rate, i.tax_amount, i.discount, i.total,
                   COALESCE((SELECT SUM(p.amount) FROM payments p
                             WHERE p.invoice_id = i.invoice_id AND p.status = 'completed'
                            ), 0.00) AS amount_paid,
                   i.notes, i.status, i.created_by, u.username AS created_by_username,
                   i.created_utc
            FROM invoices i
            LEFT JOIN clients c ON i.client_id = c.client_id
            LEFT JOIN users u ON i.created_by = u.user_id
            WHERE i.invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get invoice: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow!("Invoice not found")))?;

        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT item_id, invoice_id, description, quantity, unit_price, taxable, amount
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY item_id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get invoice items: {}", e)))?;

        let history = sqlx::query_as::<_, InvoiceHistoryEntry>(
            r#"
            SELECT history_id, invoice_id, status, changed_by, notes, changed_utc
            FROM invoice_history
            WHERE invoice_id = $1
            ORDER BY changed_utc, history_id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to get invoice history: {}", e)))?;

        timer.observe_duration();

        Ok(InvoiceDetail {
            invoice: Invoice {
                invoice_id: row.invoice_id,
                invoice_number: row.invoice_number,
                client_id: row.client_id,
                client_name: row.client_name,
                client_email: row.client_email,
                date: row.date,
                due_date: row.due_date,
                subtotal: row.subtotal,
                tax_rate: row.tax_rate,
                tax_amount: row.tax_amount,
                discount: row.discount,
                total: row.total,
                amount_paid: row.amount_paid,
                notes: row.notes,
                status: row.status,
                created_by: row.created_by,
                created_utc: row.created_utc,
            },
            client_phone: row.client_phone,
            client_address: row.client_address,
            created_by_username: row.created_by_username,
            items,
            history,
        })
    }

    /// Create an invoice with its line items and initial history row.
    ///
    /// Totals are computed server-side from the items; client-supplied
    /// amounts are never trusted.
    #[instrument(skip(self, input), fields(invoice_number = %input.invoice_number))]
    pub async fn create_invoice(&self, input: &CreateInvoice) -> Result<Uuid, AppError> {
        if input.items.is_empty() {
            return Err(AppError::BadRequest(anyhow!(
                "Invoice must have at least one item"
            )));
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        if let Some(client_id) = input.client_id {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM clients WHERE client_id = $1")
                    .bind(client_id)
                    .fetch_optional(self.pool())
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(anyhow!("Failed to check client: {}", e))
                    })?;
            if exists.is_none() {
                return Err(AppError::BadRequest(anyhow!("Invalid client")));
            }
        }

        let totals = InvoiceTotals::compute(&input.items, input.tax_rate, input.discount);

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to begin transaction: {}", e)))?;

        let invoice_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO invoices (invoice_id, invoice_number, client_id, date, due_date,
                                  subtotal, tax_rate, tax_amount, discount, total,
                                  notes, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(invoice_id)
        .bind(&input.invoice_number)
        .bind(input.client_id)
        .bind(input.date)
        .bind(input.due_date)
        .bind(totals.subtotal)
        .bind(input.tax_rate)
        .bind(totals.tax_amount)
        .bind(input.discount)
        .bind(totals.total)
        .bind(&input.notes)
        .bind(input.status.as_str())
        .bind(input.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow!("Invoice number already exists"))
            }
            _ => AppError::DatabaseError(anyhow!("Failed to create invoice: {}", e)),
        })?;

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (item_id, invoice_id, description, quantity,
                                           unit_price, taxable, amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(invoice_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.taxable)
            .bind(item.quantity * item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert item: {}", e)))?;
        }

        sqlx::query(
            r#"
            INSERT INTO invoice_history (history_id, invoice_id, status, changed_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(input.status.as_str())
        .bind(input.created_by)
        .bind("Invoice created")
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert history: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to commit invoice: {}", e)))?;

        timer.observe_duration();

        INVOICES_CREATED
            .with_label_values(&[input.status.as_str()])
            .inc();

        info!(
            invoice_id = %invoice_id,
            invoice_number = %input.invoice_number,
            total = %totals.total,
            "Invoice created"
        );

        Ok(invoice_id)
    }

    /// Change an invoice's status, appending a history row.
    #[instrument(skip(self, notes), fields(invoice_id = %invoice_id, status = %status))]
    pub async fn update_invoice_status(
        &self,
        invoice_id: Uuid,
        status: InvoiceStatus,
        changed_by: Uuid,
        notes: Option<String>,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice_status"])
            .start_timer();

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query("UPDATE invoices SET status = $1 WHERE invoice_id = $2")
            .bind(status.as_str())
            .bind(invoice_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to update invoice: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow!("Invoice not found")));
        }

        let notes = notes.unwrap_or_else(|| format!("Status changed to {}", status));
        sqlx::query(
            r#"
            INSERT INTO invoice_history (history_id, invoice_id, status, changed_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(status.as_str())
        .bind(changed_by)
        .bind(&notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!("Failed to insert history: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!("Failed to commit update: {}", e)))?;

        timer.observe_duration();

        info!(invoice_id = %invoice_id, status = %status, "Invoice status updated");

        Ok(())
    }
}
