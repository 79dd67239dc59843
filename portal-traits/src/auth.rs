//! Authentication contract.
//!
//! The engine owns nothing about how a session is obtained; it only needs a
//! way to trade credentials for a [`Session`] and a signal that the portal
//! rejected them. Session acquisition is retried by the orchestrator within
//! a bounded loop, but an established session is never retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Result;

/// Portal login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Manual Debug so the password never reaches a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated portal session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Username the session was established for.
    pub username: String,
    /// When the session was established.
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            established_at: Utc::now(),
        }
    }
}

/// Credential exchange with the portal.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Auth`](crate::PortalError::Auth) when the portal
    /// rejects the credentials, or a fetch/parse error for transient faults.
    async fn login(&self, credentials: &Credentials) -> Result<Session>;
}
