// Connection identity and client tuning.
//
// A `Connection` names the daemon (host, port, scheme) and carries the login
// credentials. It is fixed for the lifetime of a client.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Port used when a connection is built with port `0`.
pub const DEFAULT_PORT: u16 = 8080;

/// Address and credentials of one Restreamer daemon.
#[derive(Debug, Clone)]
pub struct Connection {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub use_https: bool,
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            use_https: false,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    pub fn with_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    /// Parse `http(s)://host[:port][/...]`.
    ///
    /// Surrounding whitespace and trailing slashes are ignored. Without an
    /// explicit port the scheme default (80/443) is used; an unparseable or
    /// out-of-range port also falls back to the scheme default. Any path
    /// component is discarded. IPv6 literals keep their brackets
    /// (`[::1]`).
    pub fn from_url(raw: &str) -> Result<Self, Error> {
        let cleaned = raw.trim().trim_end_matches('/');

        let (scheme, rest) = if let Some(rest) = cleaned.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = cleaned.strip_prefix("http://") {
            ("http", rest)
        } else {
            return Err(Error::InvalidArgument(format!(
                "URL must start with http:// or https://: {cleaned:?}"
            )));
        };
        let no_host = || Error::InvalidArgument(format!("URL has no host: {cleaned:?}"));

        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if authority.is_empty() {
            return Err(no_host());
        }

        let url = match Url::parse(&format!("{scheme}://{authority}/")) {
            Ok(url) => url,
            Err(url::ParseError::InvalidPort) => {
                Url::parse(&format!("{scheme}://{}/", without_port(authority)))?
            }
            Err(url::ParseError::EmptyHost) => return Err(no_host()),
            Err(e) => return Err(e.into()),
        };

        let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(no_host)?;
        let use_https = scheme == "https";
        let default_port = if use_https { 443 } else { 80 };
        let port = url.port().filter(|p| *p > 0).unwrap_or(default_port);

        Ok(Self::new(host, port).with_https(use_https))
    }

    /// The port actually dialed (`0` means [`DEFAULT_PORT`]).
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 { DEFAULT_PORT } else { self.port }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty()) && self.password.is_some()
    }

    /// Base URL of the daemon, e.g. `http://localhost:8080/`.
    pub fn base_url(&self) -> Result<Url, Error> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidArgument("connection host is required".into()));
        }
        let scheme = if self.use_https { "https" } else { "http" };
        Ok(Url::parse(&format!(
            "{scheme}://{}:{}/",
            self.host.trim(),
            self.effective_port()
        ))?)
    }
}

/// `host[:port]` with the port removed; a bracketed IPv6 host keeps its
/// colons.
fn without_port(authority: &str) -> &str {
    let host_end = authority.rfind(']').map_or(0, |i| i + 1);
    match authority[host_end..].find(':') {
        Some(i) => &authority[..host_end + i],
        None => authority,
    }
}

/// Tuning knobs for a client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    /// First backoff after a failed login; doubled on each further failure.
    /// `Duration::ZERO` disables login throttling.
    pub login_backoff: Duration,
    /// Tokens this close to expiry are refreshed before use.
    pub refresh_margin: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            login_backoff: Duration::from_secs(1),
            refresh_margin: Duration::from_secs(30),
        }
    }
}
