//! Test helpers para u2p-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod downstream;
pub mod fake_repo;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use reqwest::Url;
use u2p_server::{
    AppState, ConversionForwarder, PathTemplate, RequestValidator, create_app_router,
};

pub use client::{TestClient, TestResponse};
pub use downstream::{Downstream, Upload};
pub use fake_repo::{Call, FakeMirror};

/// URL donde no escucha nadie.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/convert";

/// Template por defecto de los tests.
pub const TEMPLATE: &str = "assets/{{ file }}";

/// Construye el estado con el template y el downstream dados.
pub fn state_with(mirror: Arc<FakeMirror>, template: &str, downstream_url: &str) -> AppState {
    let forwarder = ConversionForwarder::new(
        Url::parse(downstream_url).expect("invalid downstream url"),
        Duration::from_secs(5),
    )
    .expect("failed to build forwarder");

    AppState::new(
        mirror,
        PathTemplate::parse(template).expect("invalid template"),
        RequestValidator::new(".unity3d"),
        forwarder,
    )
}

/// Router con el template por defecto.
pub fn app(mirror: Arc<FakeMirror>, downstream_url: &str) -> Router {
    create_app_router(state_with(mirror, TEMPLATE, downstream_url))
}

/// TestClient sobre el router por defecto.
pub fn client(mirror: Arc<FakeMirror>, downstream_url: &str) -> TestClient {
    TestClient::new(app(mirror, downstream_url))
}
