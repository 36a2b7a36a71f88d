//! Raw form submission extractor.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Query, Request},
    http::{Method, header::CONTENT_TYPE},
};
use serde_json::Value;

use crate::error::AppError;

/// Campos enviados por el cliente, antes de validar.
///
/// Los campos del body (multipart, url-encoded o JSON) tienen prioridad sobre
/// los del query string. El query string se conserva aparte porque es la
/// entrada del path template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    body: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl Submission {
    /// Crea una submission a partir de campos ya decodificados.
    pub fn new(body: Vec<(String, String)>, query: Vec<(String, String)>) -> Self {
        Self { body, query }
    }

    /// Primer valor del campo, buscando primero en el body.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body
            .iter()
            .chain(self.query.iter())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parametros del query string, en orden.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if matches!(*req.method(), Method::GET | Method::HEAD | Method::DELETE) {
            return Ok(Self::new(Vec::new(), query));
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let body = match content_type.as_deref() {
            None => Vec::new(),
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                fields
            },
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                multipart_fields(multipart).await?
            },
            Some(ct) if ct.starts_with("application/json") => {
                let Json(object) = Json::<serde_json::Map<String, Value>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                json_fields(object)
            },
            Some(other) => {
                return Err(AppError::UnsupportedMediaType(format!(
                    "unsupported content type: {}",
                    other
                )));
            },
        };

        Ok(Self::new(body, query))
    }
}

/// Lee los campos de texto; las partes de archivo se ignoran.
async fn multipart_fields(mut multipart: Multipart) -> Result<Vec<(String, String)>, AppError> {
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        fields.push((name, value));
    }

    Ok(fields)
}

fn json_fields(object: serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    for (key, value) in object {
        match value {
            Value::Array(items) => {
                fields.extend(items.into_iter().filter_map(scalar).map(|v| (key.clone(), v)));
            },
            other => {
                if let Some(v) = scalar(other) {
                    fields.push((key, v));
                }
            },
        }
    }

    fields
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
