use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let content_length = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    if response.status().is_server_error() {
        warn!(
            method = %method,
            url = %uri,
            status = status,
            length = content_length,
            "HTTP request failed"
        );
    } else {
        info!(
            method = %method,
            url = %uri,
            status = status,
            length = content_length,
            "HTTP request"
        );
    }

    response
}
