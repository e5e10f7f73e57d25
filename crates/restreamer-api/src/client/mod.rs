// Restreamer API client
//
// `RestreamerClient` ties together the connection, the session manager and
// the transport. This module holds the dispatcher every endpoint goes
// through; the endpoint families themselves are inherent methods in the
// sibling files.

mod auth;
mod filesystem;
mod metadata;
mod monitoring;
mod outputs;
mod playout;
mod processes;
mod system;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::connection::{ClientConfig, Connection};
use crate::endpoint;
use crate::error::Error;
use crate::session::SessionManager;
use crate::transport::{Body, HttpTransport, TransportResponse};

/// Text returned by [`error_message`] when there is no client to ask.
pub const INVALID_INSTANCE: &str = "Invalid API instance";

/// Last error of an optional client, or [`INVALID_INSTANCE`].
pub fn error_message(client: Option<&RestreamerClient>) -> &str {
    client.map_or(INVALID_INSTANCE, RestreamerClient::last_error)
}

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

// ── Client ───────────────────────────────────────────────────────────

/// Stateful client for one Restreamer daemon.
///
/// Every operation validates its arguments, makes sure a usable token is
/// held, sends the request and, on a 401, re-authenticates once and resends.
/// Operations take `&mut self` because they may replace the session; use one
/// client per task, or wrap it in a mutex to share it.
///
/// Every failure is returned as an [`Error`] and its message is also kept in
/// [`last_error`](Self::last_error) until the next failure.
pub struct RestreamerClient {
    connection: Connection,
    transport: HttpTransport,
    session: SessionManager,
    last_error: String,
}

impl RestreamerClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with default transport and session settings.
    ///
    /// No network activity happens until the first call.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        Self::with_config(connection, &ClientConfig::default())
    }

    pub fn with_config(connection: Connection, config: &ClientConfig) -> Result<Self, Error> {
        let base_url = connection.base_url()?;
        let transport = HttpTransport::new(base_url, &config.transport)?;
        Ok(Self::from_parts(connection, transport, config))
    }

    /// Build from a pre-made transport (tests, custom `reqwest` setups).
    pub fn from_parts(connection: Connection, transport: HttpTransport, config: &ClientConfig) -> Self {
        let session = SessionManager::new(&connection, config);
        Self {
            connection,
            transport,
            session,
            last_error: String::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    /// Message of the most recent failure, empty if nothing failed yet.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn clear_error(&mut self) {
        self.last_error.clear();
    }

    // ── Error bookkeeping ────────────────────────────────────────────

    fn note(&mut self, e: Error) -> Error {
        self.last_error = e.to_string();
        e
    }

    fn record<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        result.map_err(|e| self.note(e))
    }

    /// Fail with an already-built error, keeping it as the last error.
    pub(crate) fn fail<T>(&mut self, e: Error) -> Result<T, Error> {
        Err(self.note(e))
    }

    pub(crate) fn invalid<T>(&mut self, message: impl Into<String>) -> Result<T, Error> {
        self.fail(Error::InvalidArgument(message.into()))
    }

    /// Reject an empty required identifier before any request is built.
    pub(crate) fn require<'a>(&mut self, value: &'a str, what: &str) -> Result<&'a str, Error> {
        let checked = endpoint::require(value, what);
        self.record(checked)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Authenticated request; non-2xx answers become errors.
    pub(crate) async fn call(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> Result<TransportResponse, Error> {
        let result = self.dispatch(Auth::Bearer, method, path, body).await;
        self.record(result)
    }

    /// Request to an endpoint that needs no token.
    pub(crate) async fn call_public(
        &mut self,
        method: Method,
        path: &str,
    ) -> Result<TransportResponse, Error> {
        let result = self.dispatch(Auth::Public, method, path, None).await;
        self.record(result)
    }

    async fn dispatch(
        &mut self,
        auth: Auth,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> Result<TransportResponse, Error> {
        if auth == Auth::Bearer {
            self.session.ensure_valid(&self.transport).await?;
        }

        let resp = self
            .transport
            .send(method.clone(), path, self.headers(auth), body.clone())
            .await?;

        if resp.status != StatusCode::UNAUTHORIZED || auth == Auth::Public {
            return check_status(resp);
        }

        // One re-authentication and one resend; the body is fully
        // buffered so the resend carries it unchanged.
        debug!("{method} {path} unauthorized, re-authenticating");
        self.session.reauthenticate(&self.transport).await?;

        let retry = self
            .transport
            .send(method, path, self.headers(auth), body)
            .await?;

        if retry.status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "request still unauthorized after re-authentication".into(),
            });
        }
        check_status(retry)
    }

    fn headers(&self, auth: Auth) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if auth == Auth::Bearer {
            if let Some(bearer) = self.session.bearer() {
                headers.insert(AUTHORIZATION, bearer);
            }
        }
        headers
    }

    // ── Decoding ─────────────────────────────────────────────────────

    pub(crate) fn decode<T: DeserializeOwned>(&mut self, resp: &TransportResponse) -> Result<T, Error> {
        let decoded = serde_json::from_slice(&resp.body).map_err(|e| {
            let body = resp.text();
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        });
        self.record(decoded)
    }

    /// Decode a JSON array, either the whole body or the field `key`.
    ///
    /// The array itself is mandatory. Elements of the wrong shape become
    /// empty entries so the count matches what the daemon sent.
    pub(crate) fn decode_list<T: DeserializeOwned + Default>(
        &mut self,
        resp: &TransportResponse,
        key: Option<&str>,
    ) -> Result<Vec<T>, Error> {
        let mut root: Value = self.decode(resp)?;
        let array = match key {
            Some(key) => root.get_mut(key).map(Value::take),
            None => Some(root),
        };
        match array {
            Some(Value::Array(items)) => Ok(items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect()),
            _ => self.fail(Error::UnexpectedResponse(match key {
                Some(key) => format!("expected `{key}` array in response"),
                None => "expected array response".into(),
            })),
        }
    }

    // ── Verb helpers ─────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, Error> {
        let resp = self.call(Method::GET, path, None).await?;
        self.decode(&resp)
    }

    /// Send a JSON body and ignore the response payload.
    pub(crate) async fn send_json(
        &mut self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<TransportResponse, Error> {
        let body = Body::json(body);
        let body = self.record(body)?;
        self.call(method, path, Some(body)).await
    }

    pub(crate) async fn delete(&mut self, path: &str) -> Result<(), Error> {
        self.call(Method::DELETE, path, None).await.map(|_| ())
    }
}

/// Map a non-2xx answer to an error.
fn check_status(resp: TransportResponse) -> Result<TransportResponse, Error> {
    let status = resp.status;
    if status.is_success() {
        return Ok(resp);
    }

    let raw = resp.text();
    let message = serde_json::from_slice::<ErrorResponse>(&resp.body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if raw.trim().is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    Err(match status.as_u16() {
        401 => Error::Authentication { message },
        404 => Error::NotFound { message },
        code @ 500..=599 => Error::Server {
            status: code,
            message,
        },
        code => Error::Client {
            status: code,
            message,
        },
    })
}
