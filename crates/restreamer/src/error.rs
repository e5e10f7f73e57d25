//! CLI error types with miette diagnostics.
//!
//! Maps `restreamer_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use restreamer_api::Error as ApiError;
use restreamer_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the daemon at {url}")]
    #[diagnostic(
        code(restreamer::connection_failed),
        help(
            "Check that the Restreamer daemon is running and reachable.\n\
             Try: restreamer ping --url {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("TLS setup failed for {url}: {message}")]
    #[diagnostic(
        code(restreamer::tls_error),
        help(
            "Use --insecure (-k) to accept a self-signed certificate,\n\
             or set ca_cert in your profile."
        )
    )]
    Tls { url: String, message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(restreamer::timeout),
        help("Increase the timeout with --timeout or check the daemon load.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(restreamer::auth_failed),
        help(
            "Verify the username and password of profile '{profile}'.\n\
             Run: restreamer config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(restreamer::no_credentials),
        help(
            "Store a password with: restreamer config set-password\n\
             Or set RESTREAMER_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Daemon answers ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(restreamer::not_found),
        help("Run: restreamer processes list to see available processes")
    )]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(restreamer::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(restreamer::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(restreamer::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: restreamer config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No daemon configured")]
    #[diagnostic(
        code(restreamer::no_config),
        help(
            "Create a profile with: restreamer config init\n\
             Or pass --url / set RESTREAMER_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(restreamer::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(restreamer::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(restreamer::json), help("Check the JSON document and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in the daemon URL and profile name, which the client error
    /// itself does not know.
    #[must_use]
    pub fn with_context(self, url: &str, profile: &str) -> Self {
        match self {
            Self::ConnectionFailed { source, .. } => Self::ConnectionFailed {
                url: url.to_owned(),
                source,
            },
            Self::Tls { message, .. } => Self::Tls {
                url: url.to_owned(),
                message,
            },
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: profile.to_owned(),
                message,
            },
            other => other,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Authentication { .. }
            | ApiError::RefreshFailed { .. }
            | ApiError::LoginThrottled { .. }
            | ApiError::LoggedOut => Self::AuthFailed {
                profile: "current".into(),
                message: err.to_string(),
            },

            ApiError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            ApiError::Tls(message) => Self::Tls {
                url: String::new(),
                message,
            },

            ApiError::Transport(_) | ApiError::InvalidUrl(_) => Self::ConnectionFailed {
                url: String::new(),
                source: err,
            },

            ApiError::NotFound { .. } => Self::NotFound {
                message: err.to_string(),
            },

            ApiError::InvalidArgument(reason) => Self::Validation {
                field: "argument".into(),
                reason,
            },

            ApiError::Client { .. }
            | ApiError::Server { .. }
            | ApiError::Deserialization { .. }
            | ApiError::UnexpectedResponse(_) => Self::Api {
                message: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
