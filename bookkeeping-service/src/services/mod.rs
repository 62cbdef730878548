pub mod auth;
pub mod database;
pub mod invoices;
pub mod metrics;
pub mod reports;

pub use auth::{AuthService, Claims};
pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
