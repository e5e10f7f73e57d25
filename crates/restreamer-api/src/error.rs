use thiserror::Error;

/// Top-level error type for the `restreamer-api` crate.
///
/// Every client operation returns `Result<_, Error>`. The client also keeps
/// the display text of the most recent failure so callers that poll for
/// errors (see [`crate::RestreamerClient::last_error`]) see the same message.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, credentials missing, or a retried request was
    /// still unauthorized.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The refresh token was rejected or the refresh response was unusable.
    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// A previous login failed recently and the backoff window is still open.
    #[error("Login throttled -- retry after {retry_after_secs}s")]
    LoginThrottled { retry_after_secs: u64 },

    /// The session was explicitly logged out; only `login`/`force_login`
    /// leave this state.
    #[error("Session logged out -- explicit login required")]
    LoggedOut,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// The daemon answered 404 for the requested resource.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other 4xx answer.
    #[error("Request rejected (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// A 5xx answer.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Valid JSON, but a mandatory field or shape is missing.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // ── Arguments ───────────────────────────────────────────────────
    /// Rejected before any network activity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse classification of an [`Error`], for callers that branch on the
/// kind of failure rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Authentication,
    ClientStatus,
    ServerStatus,
    MalformedResponse,
    InvalidArgument,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. }
            | Self::RefreshFailed { .. }
            | Self::LoginThrottled { .. }
            | Self::LoggedOut => ErrorCategory::Authentication,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Timeout { .. } | Self::Tls(_) => {
                ErrorCategory::Connection
            }
            Self::NotFound { .. } | Self::Client { .. } => ErrorCategory::ClientStatus,
            Self::Server { .. } => ErrorCategory::ServerStatus,
            Self::Deserialization { .. } | Self::UnexpectedResponse(_) => {
                ErrorCategory::MalformedResponse
            }
            Self::InvalidArgument(_) => ErrorCategory::InvalidArgument,
        }
    }

    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::RefreshFailed { .. } | Self::LoggedOut
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::LoginThrottled { .. } | Self::Server { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status carried by the error, if the daemon answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
