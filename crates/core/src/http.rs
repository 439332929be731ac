//! JSON-over-HTTP transport for workers.
//!
//! `HttpTransport` wraps a `reqwest::Client` with pre-built headers and the
//! endpoint paths every worker exposes: `POST {addr}{infer_path}` for
//! inference and `GET {addr}{health_path}` for liveness.

use crate::{InferReply, InferRequest, Transport, TransportError};
use compact_str::CompactString;
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderValue},
};
use std::time::Duration;

/// Default inference path.
pub const INFER_PATH: &str = "/infer";

/// Default liveness path.
pub const HEALTH_PATH: &str = "/healthz";

/// Shared HTTP transport for all workers in a pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    headers: HeaderMap,
    infer_path: CompactString,
    health_path: CompactString,
}

impl HttpTransport {
    /// Create a transport using the default endpoint paths.
    pub fn new(client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            client,
            headers,
            infer_path: INFER_PATH.into(),
            health_path: HEALTH_PATH.into(),
        }
    }

    /// Override the endpoint paths.
    pub fn with_paths(mut self, infer_path: &str, health_path: &str) -> Self {
        self.infer_path = infer_path.into();
        self.health_path = health_path.into();
        self
    }

    /// Pre-built request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Inference URL for a worker.
    pub fn infer_url(&self, addr: &str) -> String {
        join(addr, &self.infer_path)
    }

    /// Liveness URL for a worker.
    pub fn health_url(&self, addr: &str) -> String {
        join(addr, &self.health_path)
    }
}

impl Transport for HttpTransport {
    async fn infer(
        &self,
        addr: &str,
        request: &InferRequest,
        timeout: Duration,
    ) -> Result<InferReply, TransportError> {
        let response = self
            .client
            .request(Method::POST, self.infer_url(addr))
            .headers(self.headers.clone())
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| classify(e, timeout))?;
        tracing::trace!("reply from {addr}: {text}");
        let reply: InferReply =
            serde_json::from_str(&text).map_err(|e| TransportError::Malformed(e.to_string()))?;
        reply.validate()
    }

    async fn health(&self, addr: &str, timeout: Duration) -> Result<(), TransportError> {
        let response = self
            .client
            .request(Method::GET, self.health_url(addr))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}

fn join(addr: &str, path: &str) -> String {
    format!("{}{}", addr.trim_end_matches('/'), path)
}

fn classify(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Connect(error.to_string())
    }
}
