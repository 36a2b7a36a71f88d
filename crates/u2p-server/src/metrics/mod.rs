//! Metrics module for the unity3d2png proxy.

pub mod conversion;
pub mod http;
pub mod setup;

pub use conversion::{ConversionMetrics, Outcome};
pub use setup::init_metrics;
