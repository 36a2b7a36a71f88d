//! # u2p Server
//!
//! HTTP gateway for the unity3d2png conversion service.
//!
//! A single endpoint accepts `branch`, `file` and `fetch`, resolves
//! `<branch>:<path>` against a local git mirror, where the path comes from a
//! template rendered with the query string, and relays the object to the
//! conversion service as a multipart upload. The conversion service's
//! response is streamed back to the caller.

pub mod config;
pub mod error;
pub mod extractors;
pub mod forwarder;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;
pub mod template;
pub mod validation;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;
pub use forwarder::{ConversionForwarder, ForwardError};
pub use server::{create_app_router, create_router, run_server};
pub use state::AppState;
pub use template::{PathTemplate, TemplateError};
pub use validation::RequestValidator;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
