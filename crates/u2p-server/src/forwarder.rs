//! Conversion forwarder.
//!
//! Packages resolved content as a multipart upload, posts it to the
//! conversion service and relays the service's response back to the caller.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, Response, header},
};
use reqwest::{
    Client, Url,
    multipart::{Form, Part},
};
use tracing::debug;

/// Multipart field carrying the resolved content.
pub const FILE_FIELD: &str = "file";

/// Headers that only make sense for a single connection.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Errors raised while talking to the conversion service.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The HTTP client could not be constructed.
    #[error("failed to build downstream client: {0}")]
    Client(#[source] reqwest::Error),

    /// No response head arrived within the configured timeout.
    #[error("conversion service did not respond within {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure.
    #[error("conversion service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Relays resolved objects to the conversion service.
///
/// `timeout` bounds connecting and waiting for the response head. The body
/// is relayed after the status has already been sent to the caller, so it is
/// streamed without a deadline.
#[derive(Debug, Clone)]
pub struct ConversionForwarder {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl ConversionForwarder {
    /// Creates a forwarder posting to `url`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Returns the downstream URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Posts `content` as field `file` named `filename` and returns the
    /// downstream response with its body streamed through.
    ///
    /// `inbound` are the original request headers; they are forwarded minus
    /// hop-by-hop headers, `Host`, `Content-Type` and `Content-Length`.
    pub async fn forward(
        &self,
        content: Vec<u8>,
        filename: &str,
        inbound: &HeaderMap,
    ) -> Result<Response<Body>, ForwardError> {
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(ForwardError::Transport)?;
        let form = Form::new().part(FILE_FIELD, part);

        let mut headers = inbound.clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);

        let start = Instant::now();
        let send = self
            .client
            .post(self.url.clone())
            .headers(headers)
            .multipart(form)
            .send();

        let downstream = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    ForwardError::Timeout(self.timeout)
                } else {
                    ForwardError::Transport(e)
                }
            })?;

        let status = downstream.status();
        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Conversion service responded"
        );

        let mut relayed_headers = downstream.headers().clone();
        strip_hop_by_hop(&mut relayed_headers);

        let mut response = Response::new(Body::from_stream(downstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = relayed_headers;

        Ok(response)
    }
}

/// Removes hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("proxy-connection");
}
