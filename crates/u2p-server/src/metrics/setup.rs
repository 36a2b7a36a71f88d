//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::{conversion::register_conversion_metrics, http::register_http_metrics};

/// Inicializa el sistema de metricas y retorna el handle para el endpoint.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    // Buckets en segundos; las conversiones pueden tardar varios segundos
    let handle = PrometheusBuilder::new()
        .set_buckets(&[
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ])?
        .install_recorder()?;

    register_http_metrics();
    register_conversion_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}
