//! Request logging.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, info, info_span, warn};

use super::RequestId;

/// Abre un span por request y registra inicio y fin.
///
/// La duracion se mide hasta tener los headers de la respuesta; el body del
/// servicio de conversion sigue en streaming despues de esto.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        info!("Request started");

        let response = next.run(request).await;

        let status = response.status().as_u16();
        let duration_ms = start.elapsed().as_millis() as u64;
        if response.status().is_server_error() {
            warn!(status, duration_ms, "Request failed");
        } else {
            info!(status, duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
