//! Extractores de axum para el endpoint de conversion.

mod submission;

pub use submission::Submission;
