// Bearer-token session management
//
// Login exchanges username/password for an access token, a refresh token
// and an absolute expiry. The manager decides before every call whether the
// token can be used as-is, must be refreshed, or requires a fresh login.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::connection::{ClientConfig, Connection};
use crate::error::Error;
use crate::lenient;
use crate::transport::{Body, HttpTransport, TransportResponse};

const LOGIN_PATH: &str = "/api/login";
const REFRESH_PATH: &str = "/api/v3/refresh";

/// Failures after which the backoff stops growing.
const MAX_LOGIN_RETRIES: u32 = 3;

/// Lifetime assumed when the daemon does not send `expires_at`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Where the session manager currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token held. The next call logs in.
    Unauthenticated,
    /// A token is held and is outside the refresh margin.
    Authenticated,
    /// A token is held but is expired or about to expire.
    Expired,
    /// Explicit logout. Calls fail until `login`/`force_login`.
    LoggedOut,
}

struct Session {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<Value>,
}

impl TokenResponse {
    fn parse(resp: &TransportResponse, context: &str) -> Result<Self, Error> {
        serde_json::from_slice(&resp.body).map_err(|e| {
            let body = resp.text();
            Error::Deserialization {
                message: format!("invalid {context} response: {e}"),
                body,
            }
        })
    }

    /// Absolute expiry: integer Unix seconds, or one hour from now.
    fn expiry(&self) -> DateTime<Utc> {
        self.expires_at
            .as_ref()
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + TimeDelta::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
    }
}

// ── Login backoff ────────────────────────────────────────────────────

/// Exponential backoff between failed logins.
///
/// Each failure doubles the window (up to [`MAX_LOGIN_RETRIES`] doublings).
/// While the window since the last failure is open, login attempts are
/// rejected locally. A successful login resets everything.
#[derive(Debug)]
struct LoginBackoff {
    initial: Duration,
    current: Duration,
    failures: u32,
    last_failure: Option<Instant>,
}

impl LoginBackoff {
    fn new(initial: Duration) -> Self {
        Self {
            initial,
            current: initial,
            failures: 0,
            last_failure: None,
        }
    }

    fn check(&self) -> Result<(), Error> {
        let Some(last) = self.last_failure else {
            return Ok(());
        };
        let elapsed = last.elapsed();
        if self.failures > 0 && elapsed < self.current {
            let remaining = self.current.saturating_sub(elapsed);
            return Err(Error::LoginThrottled {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }
        Ok(())
    }

    fn record_failure(&mut self) {
        if self.initial.is_zero() {
            return;
        }
        self.failures += 1;
        self.last_failure = Some(Instant::now());
        if self.failures < MAX_LOGIN_RETRIES {
            self.current = self.current.saturating_mul(2);
            warn!(
                attempt = self.failures,
                max = MAX_LOGIN_RETRIES,
                backoff_ms = self.current.as_millis(),
                "login failed, backing off"
            );
        } else {
            warn!(attempts = self.failures, "login keeps failing");
        }
    }

    fn reset(&mut self) {
        self.current = self.initial;
        self.failures = 0;
        self.last_failure = None;
    }
}

// ── Session manager ──────────────────────────────────────────────────

/// Owns the token state of one client.
pub struct SessionManager {
    username: Option<String>,
    password: Option<SecretString>,
    session: Option<Session>,
    logged_out: bool,
    backoff: LoginBackoff,
    refresh_margin: TimeDelta,
}

impl SessionManager {
    pub fn new(connection: &Connection, config: &ClientConfig) -> Self {
        Self {
            username: connection.username.clone(),
            password: connection.password.clone(),
            session: None,
            logged_out: false,
            backoff: LoginBackoff::new(config.login_backoff),
            refresh_margin: TimeDelta::from_std(config.refresh_margin)
                .unwrap_or(TimeDelta::seconds(30)),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.logged_out {
            return SessionState::LoggedOut;
        }
        match &self.session {
            None => SessionState::Unauthenticated,
            Some(s) if Utc::now() + self.refresh_margin >= s.expires_at => SessionState::Expired,
            Some(_) => SessionState::Authenticated,
        }
    }

    /// `true` iff a non-expired access token is held.
    pub fn is_authenticated(&self) -> bool {
        !self.logged_out
            && self
                .session
                .as_ref()
                .is_some_and(|s| Utc::now() < s.expires_at)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|s| s.expires_at)
    }

    /// `Authorization` header value for the current access token.
    pub(crate) fn bearer(&self) -> Option<HeaderValue> {
        self.session
            .as_ref()
            .and_then(|s| bearer_header(&s.access_token))
    }

    /// Exchange credentials for a new session.
    ///
    /// `POST /api/login` with `{"username": ..., "password": ...}`. Any
    /// failure drops the previous session.
    pub async fn login(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        let result = self.request_login(transport).await;
        if result.is_err() {
            self.session = None;
        }
        result
    }

    async fn request_login(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        let (Some(username), Some(password)) = (self.username.as_deref(), self.password.as_ref())
        else {
            return Err(Error::Authentication {
                message: "Username and password required for login".into(),
            });
        };
        if username.is_empty() {
            return Err(Error::Authentication {
                message: "Username and password required for login".into(),
            });
        }

        self.backoff.check()?;

        debug!(username, "logging in");
        let body = Body::json(&json!({
            "username": username,
            "password": password.expose_secret(),
        }))?;

        let resp = match transport
            .send(Method::POST, LOGIN_PATH, HeaderMap::new(), Some(body))
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                self.backoff.record_failure();
                return Err(e);
            }
        };

        if !resp.status.is_success() {
            self.backoff.record_failure();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {}): {}", resp.status, resp.text()),
            });
        }

        let tokens = TokenResponse::parse(&resp, "login")?;
        let expires_at = tokens.expiry();
        let access_token = tokens
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::UnexpectedResponse("no access token in login response".into())
            })?;

        // A login without a refresh token keeps none; refresh then falls
        // back to login.
        self.session = Some(Session {
            access_token: SecretString::from(access_token),
            refresh_token: tokens.refresh_token.map(SecretString::from),
            expires_at,
        });
        self.logged_out = false;
        self.backoff.reset();

        info!(%expires_at, "logged in to Restreamer");
        Ok(())
    }

    /// Obtain a new access token with the refresh token.
    ///
    /// `POST /api/v3/refresh` with `Authorization: Bearer <refresh token>`.
    /// On failure the session is dropped.
    pub async fn refresh(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        if self.logged_out {
            return Err(Error::LoggedOut);
        }
        let Some(header) = self
            .session
            .as_ref()
            .and_then(|s| s.refresh_token.as_ref())
            .and_then(bearer_header)
        else {
            self.session = None;
            return Err(Error::RefreshFailed {
                message: "No refresh token available".into(),
            });
        };

        match self.request_refresh(transport, header).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session = None;
                Err(e)
            }
        }
    }

    async fn request_refresh(
        &mut self,
        transport: &HttpTransport,
        header: HeaderValue,
    ) -> Result<(), Error> {
        debug!("refreshing access token");
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header);

        let resp = transport
            .send(Method::POST, REFRESH_PATH, headers, Some(Body::empty()))
            .await?;

        if !resp.status.is_success() {
            return Err(Error::RefreshFailed {
                message: format!("HTTP {}: {}", resp.status, resp.text()),
            });
        }

        let tokens = TokenResponse::parse(&resp, "refresh")?;
        let expires_at = tokens.expiry();
        let access_token = tokens
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::RefreshFailed {
                message: "no access token in refresh response".into(),
            })?;

        if let Some(session) = self.session.as_mut() {
            session.access_token = SecretString::from(access_token);
            if let Some(refresh) = tokens.refresh_token {
                session.refresh_token = Some(SecretString::from(refresh));
            }
            session.expires_at = expires_at;
        }

        info!(%expires_at, "access token refreshed");
        Ok(())
    }

    /// Drop any held token and log in again.
    pub async fn force_login(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        self.session = None;
        self.logged_out = false;
        self.login(transport).await
    }

    /// Forget the session locally.
    ///
    /// The daemon has no token invalidation endpoint; the access token
    /// simply runs out at its expiry.
    pub fn logout(&mut self) {
        if self.session.take().is_some() {
            info!("logged out");
        }
        self.logged_out = true;
    }

    /// Make sure a usable token is held before an API call.
    ///
    /// One pass, no loop: login when unauthenticated, refresh (falling back
    /// to login) when expired or within the refresh margin.
    pub async fn ensure_valid(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        match self.state() {
            SessionState::Authenticated => Ok(()),
            SessionState::LoggedOut => Err(Error::LoggedOut),
            SessionState::Unauthenticated => self.login(transport).await,
            SessionState::Expired => self.reauthenticate(transport).await,
        }
    }

    /// Refresh, or log in if the refresh fails.
    pub(crate) async fn reauthenticate(&mut self, transport: &HttpTransport) -> Result<(), Error> {
        match self.refresh(transport).await {
            Ok(()) => Ok(()),
            Err(Error::LoggedOut) => Err(Error::LoggedOut),
            Err(e) => {
                debug!(error = %e, "refresh failed, logging in");
                self.login(transport).await
            }
        }
    }
}

fn bearer_header(token: &SecretString) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).ok()?;
    value.set_sensitive(true);
    Some(value)
}
