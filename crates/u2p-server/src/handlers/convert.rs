//! Conversion endpoint.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{Span, info, instrument, warn};
use u2p_git::{MirrorRepository, ObjectRef};

use crate::error::AppError;
use crate::extractors::Submission;
use crate::forwarder::ForwardError;
use crate::metrics::Outcome;
use crate::state::AppState;

/// Handler para GET|POST /
///
/// Valida, sincroniza el mirror si `fetch` esta activo, resuelve el path,
/// comprueba que el objeto exista, lo lee y lo reenvia al servicio de
/// conversion. Cada paso corre en secuencia y sin reintentos.
#[instrument(skip_all, fields(branch, file))]
pub async fn convert(
    State(state): State<AppState>,
    headers: HeaderMap,
    submission: Submission,
) -> Result<Response, AppError> {
    let metrics = state.metrics();

    let request = state.validator().validate(&submission).map_err(|errors| {
        warn!(errors = %errors, "Invalid submission");
        metrics.record_outcome(Outcome::Rejected);
        AppError::Validation(errors)
    })?;

    let span = Span::current();
    span.record("branch", request.branch.as_str());
    span.record("file", request.file.as_str());

    let repository = state.repository();

    if request.fetch {
        let result = repository.sync().await;
        metrics.record_sync(result.is_ok());
        result.map_err(|e| {
            warn!(error = %e, "Mirror sync failed");
            metrics.record_outcome(Outcome::Failed);
            AppError::Internal(e.to_string())
        })?;
    }

    let path = state.template().render(&request.query).map_err(|e| {
        warn!(error = %e, template = %state.template(), "Path template failed");
        metrics.record_outcome(Outcome::Failed);
        AppError::Internal(e.to_string())
    })?;

    let object = ObjectRef::new(request.branch, path);

    let exists = repository.exists(&object).await.map_err(|e| {
        warn!(object = %object, error = %e, "Existence check failed");
        metrics.record_outcome(Outcome::Failed);
        AppError::Internal(e.to_string())
    })?;
    if !exists {
        warn!(object = %object, "Object not found");
        metrics.record_outcome(Outcome::NotFound);
        return Err(AppError::NotFound);
    }

    let content = read(repository, &object).await.inspect_err(|_| {
        metrics.record_outcome(Outcome::Failed);
    })?;

    let start = Instant::now();
    let response = state
        .forwarder()
        .forward(content, object.file_name(), &headers)
        .await
        .map_err(|e| {
            warn!(object = %object, error = %e, "Forwarding failed");
            metrics.record_outcome(Outcome::DownstreamFailed);
            match e {
                ForwardError::Timeout(_) => AppError::GatewayTimeout(e.to_string()),
                ForwardError::Client(_) | ForwardError::Transport(_) => {
                    AppError::BadGateway(e.to_string())
                },
            }
        })?;

    metrics.record_downstream(start.elapsed());
    metrics.record_outcome(Outcome::Forwarded);
    info!(
        object = %object,
        status = response.status().as_u16(),
        "Relaying conversion response"
    );

    Ok(response)
}

async fn read(repository: &dyn MirrorRepository, object: &ObjectRef) -> Result<Vec<u8>, AppError> {
    let content = repository.read(object).await.map_err(|e| {
        warn!(object = %object, error = %e, "Object read failed");
        AppError::Internal(e.to_string())
    })?;

    info!(object = %object, bytes = content.len(), "Object resolved");
    Ok(content)
}

/// Handler para HEAD /
///
/// axum atiende HEAD con el handler de GET; aqui se corta para que un HEAD
/// no dispare fetch, lectura ni la llamada al servicio de conversion.
pub async fn reject_head() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, POST")])
}
