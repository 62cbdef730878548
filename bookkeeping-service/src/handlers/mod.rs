pub mod accounts;
pub mod auth;
pub mod health;
pub mod invoices;
pub mod reports;
pub mod transactions;

pub use accounts::{create_account, get_account, list_accounts};
pub use auth::{login, register};
pub use health::{health_check, metrics_handler, readiness_check};
pub use invoices::{create_invoice, get_invoice, list_invoices, update_invoice_status};
pub use reports::generate_report;
pub use transactions::{create_transaction, get_transaction, list_transactions};
