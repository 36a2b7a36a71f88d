use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{
    convert::{convert, reject_head},
    health::health_check,
    metrics::metrics_handler,
};
use crate::middleware::{assign_request_id, log_request};
use crate::state::AppState;

/// Creates the router with the given application state and metrics handle.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(create_app_router(state))
        .merge(metrics_router)
}

/// Creates the router without the /metrics endpoint.
///
/// Installing a Prometheus recorder is process-global, so tests drive this
/// router instead of [`create_router`].
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(convert).post(convert).head(reject_head))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        // El ultimo layer es el mas externo: el ID debe existir antes del span
        .layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn(assign_request_id))
}

/// Binds `addr` and serves until Ctrl+C or SIGTERM.
pub async fn run_server(
    addr: &str,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
