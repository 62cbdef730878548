//! HTTP request counting.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::services::metrics::{ERRORS_TOTAL, HTTP_REQUESTS_TOTAL};

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status.as_u16().to_string()])
        .inc();
    if status.is_server_error() {
        ERRORS_TOTAL.with_label_values(&["server_error"]).inc();
    } else if status.is_client_error() {
        ERRORS_TOTAL.with_label_values(&["client_error"]).inc();
    }

    response
}
