use chrono::NaiveDate;
use serde::Deserialize;

/// Report request body. Date defaults are applied in the handler: January
/// 1st of the current year through today.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub report_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
