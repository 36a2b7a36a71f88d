//! Conversion pipeline metrics recording.

use metrics::{counter, histogram};
use std::time::Duration;

/// Registra las metricas del pipeline de conversion.
pub fn register_conversion_metrics() {
    metrics::describe_counter!(
        "u2p_conversions_total",
        "Conversion requests by final outcome"
    );
    metrics::describe_counter!("u2p_mirror_syncs_total", "Mirror syncs by result");
    metrics::describe_histogram!(
        "u2p_downstream_duration_seconds",
        "Time until the conversion service answered"
    );
}

/// Final outcome of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Relayed from the conversion service.
    Forwarded,
    /// Rejected by validation.
    Rejected,
    /// Object absent at branch:path.
    NotFound,
    /// Sync, template or read failure.
    Failed,
    /// Conversion service unreachable or timed out.
    DownstreamFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forwarded => "forwarded",
            Self::Rejected => "rejected",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
            Self::DownstreamFailed => "downstream_failed",
        }
    }
}

/// Recorder de metricas de conversion.
/// Solo emite al recorder global; sin recorder instalado no hace nada.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionMetrics;

impl ConversionMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Registra el resultado final de una request
    pub fn record_outcome(&self, outcome: Outcome) {
        counter!("u2p_conversions_total", "outcome" => outcome.as_str()).increment(1);
    }

    /// Registra un sync del mirror
    pub fn record_sync(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        counter!("u2p_mirror_syncs_total", "result" => result).increment(1);
    }

    /// Registra cuanto tardo el servicio de conversion en responder
    pub fn record_downstream(&self, duration: Duration) {
        histogram!("u2p_downstream_duration_seconds").record(duration.as_secs_f64());
    }
}
