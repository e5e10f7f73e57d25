// Authentication entry points
//
// Thin wrappers over the session manager that record failures in the
// client's last-error slot.

use chrono::{DateTime, Utc};

use crate::client::RestreamerClient;
use crate::error::Error;
use crate::session::SessionState;

impl RestreamerClient {
    /// Log in with the connection's credentials.
    ///
    /// `POST /api/login`
    pub async fn login(&mut self) -> Result<(), Error> {
        let result = self.session.login(&self.transport).await;
        self.record(result)
    }

    /// Check that the daemon is reachable and accepts the credentials.
    pub async fn test_connection(&mut self) -> Result<(), Error> {
        self.login().await
    }

    /// Discard the current token and log in again.
    pub async fn force_login(&mut self) -> Result<(), Error> {
        let result = self.session.force_login(&self.transport).await;
        self.record(result)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `POST /api/v3/refresh`
    pub async fn refresh_token(&mut self) -> Result<(), Error> {
        let result = self.session.refresh(&self.transport).await;
        self.record(result)
    }

    /// Forget the session locally. Later calls fail with
    /// [`Error::LoggedOut`] until [`login`](Self::login) or
    /// [`force_login`](Self::force_login).
    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// `true` while a non-expired access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Alias of [`is_authenticated`](Self::is_authenticated).
    pub fn is_connected(&self) -> bool {
        self.is_authenticated()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.expires_at()
    }
}
