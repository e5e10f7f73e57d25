// Single-request HTTP transport.
//
// Issues exactly one request per `send` and hands back the status code and
// the fully-read body. Retry and authentication policy live above this layer
// in the client dispatcher.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed daemons on a LAN).
    DangerAcceptInvalid,
}

/// Transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("restreamer-api/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request / response values ────────────────────────────────────────

/// A request body: raw bytes plus the content type they are sent with.
#[derive(Debug, Clone)]
pub struct Body {
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl Body {
    /// Serialize `value` as a JSON body.
    pub fn json(value: &impl Serialize) -> Result<Self, Error> {
        let raw = serde_json::to_vec(value)
            .map_err(|e| Error::InvalidArgument(format!("failed to encode request body: {e}")))?;
        Ok(Self {
            content_type: "application/json",
            bytes: Bytes::from(raw),
        })
    }

    /// Raw binary payload. File uploads go out as `application/data`.
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: "application/data",
            bytes: bytes.into(),
        }
    }

    /// A zero-length body (still carries a content type).
    pub fn empty() -> Self {
        Self {
            content_type: "application/json",
            bytes: Bytes::new(),
        }
    }
}

/// Status code and complete body of one answered request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TransportResponse {
    /// Body as lossy UTF-8, for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ── Transport ────────────────────────────────────────────────────────

/// Thin wrapper around `reqwest::Client` bound to one daemon base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: Url, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an already-encoded absolute path (optionally with a query)
    /// onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Send one request and read the full response body.
    ///
    /// Never retries. A response that cannot be read completely is an
    /// error rather than a truncated body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Result<TransportResponse, Error> {
        let url = self.url(path)?;
        debug!("{method} {}", url.path());

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type)
                .body(body.bytes);
        }

        let resp = request.send().await.map_err(|e| self.map_error(e))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(TransportResponse { status, body })
    }

    fn map_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    }
}
