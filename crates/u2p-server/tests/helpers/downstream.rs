//! Local stand-in for the conversion service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};

/// A multipart upload received by the downstream.
#[derive(Debug, Clone)]
pub struct Upload {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub headers: HeaderMap,
}

#[derive(Clone)]
struct DownstreamState {
    uploads: Arc<Mutex<Vec<Upload>>>,
    status: StatusCode,
}

/// A conversion service bound to `127.0.0.1:0`.
///
/// Answers every upload with `status`, content type `image/png`, header
/// `x-converter: fake` and the uploaded bytes reversed.
pub struct Downstream {
    addr: SocketAddr,
    uploads: Arc<Mutex<Vec<Upload>>>,
}

impl Downstream {
    pub async fn start() -> Self {
        Self::start_with_status(StatusCode::CREATED).await
    }

    pub async fn start_with_status(status: StatusCode) -> Self {
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let state = DownstreamState {
            uploads: uploads.clone(),
            status,
        };

        let app = Router::new()
            .route("/convert", post(receive))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind downstream");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, uploads }
    }

    pub fn url(&self) -> String {
        format!("http://{}/convert", self.addr)
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

async fn receive(
    State(state): State<DownstreamState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut converted = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        let upload = Upload {
            field_name: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: Vec::new(),
            headers: headers.clone(),
        };
        let bytes = field.bytes().await.unwrap().to_vec();

        converted = bytes.iter().rev().copied().collect();
        state
            .uploads
            .lock()
            .unwrap()
            .push(Upload { bytes, ..upload });
    }

    let mut response = (state.status, converted).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    response
        .headers_mut()
        .insert("x-converter", HeaderValue::from_static("fake"));
    response
}
