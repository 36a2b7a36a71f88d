//! X-Request-Id handling.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// ID de la request en curso, guardado en las extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Usa el X-Request-Id del cliente o genera un UUID v4.
///
/// El ID queda en el header de la request, de modo que tambien llega al
/// servicio de conversion, y en el de la respuesta. Si la respuesta del
/// servicio de conversion trae su propio ID, gana el del cliente.
pub async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let incoming = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty())
        .cloned();

    let value = match incoming {
        Some(value) => value,
        None => match HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            Ok(value) => value,
            Err(_) => return next.run(request).await,
        },
    };

    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), value.clone());
    let id = RequestId(String::from_utf8_lossy(value.as_bytes()).into_owned());
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER.clone(), value);
    response
}
