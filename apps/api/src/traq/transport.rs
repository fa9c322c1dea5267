//! Outbound HTTP to the platform.
//!
//! The `Transport` trait owns wire details only; status interpretation lives
//! in `TraqClient`, and relaying an upstream response back to the caller lives
//! in the `IntoResponse` impl for `UpstreamResponse`.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::constants::RELAYED_HEADERS;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    /// Caller's access token, sent as `Authorization: Bearer`.
    pub bearer: Option<String>,
    /// Sent as `application/x-www-form-urlencoded` when non-empty.
    pub form: Vec<(String, String)>,
}

impl OutboundRequest {
    pub fn get(url: Url, bearer: &str) -> Self {
        Self {
            method: Method::GET,
            url,
            bearer: Some(bearer.to_string()),
            form: Vec::new(),
        }
    }

    pub fn post_form(url: Url, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            url,
            bearer: None,
            form,
        }
    }
}

pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl UpstreamResponse {
    pub async fn into_bytes(self) -> Result<bytes::Bytes, TransportError> {
        axum::body::to_bytes(self.body, usize::MAX)
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("traq-album-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = Body::from_stream(response.bytes_stream());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// The subset of upstream headers passed through to the caller.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in RELAYED_HEADERS {
        let name = HeaderName::from_static(name);
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers
}

/// Status, whitelisted headers and body are copied verbatim, error statuses included.
impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let headers = relayed_headers(&self.headers);
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
