use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::validation::{FieldError, ValidationErrors};

#[derive(Debug)]
pub enum AppError {
    /// Campos del formulario invalidos
    Validation(ValidationErrors),

    /// Body o query string imposibles de decodificar
    BadRequest(String),

    /// Content-Type del body no soportado
    UnsupportedMediaType(String),

    /// Objeto inexistente en branch:path
    NotFound,

    /// Error interno (sync, template, lectura)
    Internal(String),

    /// Fallo de transporte hacia el servicio de conversion
    BadGateway(String),

    /// Timeout del servicio de conversion
    GatewayTimeout(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl AppError {
    /// Returns the status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = status.canonical_reason().unwrap_or("Error").to_string();

        let (message, errors) = match self {
            AppError::Validation(errors) => (errors.to_string(), errors.into_inner()),
            AppError::NotFound => ("not found".to_string(), Vec::new()),
            AppError::BadRequest(msg)
            | AppError::UnsupportedMediaType(msg)
            | AppError::Internal(msg)
            | AppError::BadGateway(msg)
            | AppError::GatewayTimeout(msg) => (msg, Vec::new()),
        };

        let body = Json(ErrorResponse {
            error,
            message,
            errors,
        });

        (status, body).into_response()
    }
}
