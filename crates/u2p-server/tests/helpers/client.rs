//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const BOUNDARY: &str = "u2p-test-boundary";

/// Helper para tests de integracion HTTP.
pub struct TestClient {
    app: Router,
}

impl TestClient {
    /// Crea un nuevo test client con el router proporcionado.
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    /// Hace un GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_headers(uri, Vec::new()).await
    }

    /// Hace un GET request con headers personalizados.
    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method("GET");

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// POST con body url-encoded. Los valores no se escapan.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// POST con body multipart/form-data de campos de texto.
    pub async fn post_multipart(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// POST con un body y Content-Type arbitrarios.
    pub async fn post_raw(&self, uri: &str, content_type: &str, body: &str) -> TestResponse {
        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Ejecuta un request arbitrario.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Wrapper sobre Response con helpers para assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    /// Retorna el body como string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parsea el body como JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    /// Retorna un header especifico.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Verifica que el status sea el esperado.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Verifica que el Content-Type contenga el valor esperado.
    pub fn assert_content_type_contains(&self, expected: &str) -> &Self {
        let content_type = self
            .header("content-type")
            .expect("Response missing Content-Type header");

        assert!(
            content_type.contains(expected),
            "Expected Content-Type to contain '{}' but got '{}'",
            expected,
            content_type
        );
        self
    }

    /// Verifica que un header exista.
    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    /// Verifica que un header tenga un valor especifico.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }
}
