//! Middleware del servidor HTTP.
//!
//! Se aplican en este orden a todas las requests salvo /metrics:
//! - `assign_request_id`: genera o propaga X-Request-Id
//! - `log_request`: span y logging estructurado de la request

mod logging;
mod request_id;

pub use logging::log_request;
pub use request_id::{REQUEST_ID_HEADER, RequestId, assign_request_id};
