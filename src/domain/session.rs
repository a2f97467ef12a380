//! Login sessions and the client context they are bound to.
//!
//! A session has a fixed absolute lifetime that is not extended by activity,
//! and it remembers a fingerprint of the client that opened it so a token
//! replayed from a different client can be rejected.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::id::{SessionToken, UserId};

/// What the server can observe about the client sending a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientContext {
    pub fn new(ip: Option<IpAddr>, user_agent: Option<impl Into<String>>) -> Self {
        Self {
            ip,
            user_agent: user_agent.map(Into::into),
        }
    }

    /// Hex SHA-256 over the peer address and user agent.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        if let Some(ip) = self.ip {
            hasher.update(ip.to_string().as_bytes());
        }
        hasher.update(b"|");
        if let Some(agent) = &self.user_agent {
            hasher.update(agent.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// A server-side login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    #[serde(skip)]
    pub fingerprint: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `user_id` as seen from `client`.
    #[must_use]
    pub fn open(
        user_id: UserId,
        client: &ClientContext,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            token: SessionToken::generate(),
            user_id,
            fingerprint: client.fingerprint(),
            issued_at: now,
            expires_at: now + lifetime,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn is_bound_to(&self, client: &ClientContext) -> bool {
        self.fingerprint == client.fingerprint()
    }
}
