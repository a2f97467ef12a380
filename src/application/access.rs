//! Login, logout and per-request session resolution.
//!
//! Sessions live in memory only; restarting the server logs everyone out.
//! A session dies at its absolute expiry, when presented by a different
//! client (if fingerprint binding is on), or when its user is deleted.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::identity::IdentityStore;
use crate::config::SessionConfig;
use crate::domain::{ClientContext, Role, Session, SessionState, SessionToken, User};
use crate::error::{Result, SessionRejection};
use crate::port::Clock;

/// Where a user goes right after logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Landing {
    Admin,
    Home,
}

impl Landing {
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Student | Role::Teacher => Self::Home,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Home => "/home",
        }
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Login {
    pub session: Session,
    pub user: User,
    pub landing: Landing,
}

#[derive(Clone)]
pub struct AccessControl {
    identity: IdentityStore,
    sessions: Arc<DashMap<SessionToken, Session>>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
    bind_fingerprint: bool,
}

impl AccessControl {
    pub fn new(identity: IdentityStore, clock: Arc<dyn Clock>, config: &SessionConfig) -> Self {
        Self {
            identity,
            sessions: Arc::new(DashMap::new()),
            clock,
            lifetime: config.lifetime(),
            bind_fingerprint: config.bind_fingerprint,
        }
    }

    /// Check credentials and open a session bound to `client`.
    ///
    /// # Errors
    /// Returns a validation error for blank fields and
    /// [`Error::AuthenticationFailure`](crate::error::Error::AuthenticationFailure)
    /// for an unknown user or wrong password.
    pub fn login(&self, username: &str, password: &str, client: &ClientContext) -> Result<Login> {
        let user = match self.identity.authenticate(username, password) {
            Ok(user) => user,
            Err(e) => {
                warn!(user = username, error = %e, "Login rejected");
                return Err(e);
            }
        };

        let now = self.clock.now();
        self.purge_expired();
        let session = Session::open(user.id, client, now, self.lifetime);
        self.sessions.insert(session.token.clone(), session.clone());

        let landing = Landing::for_role(user.role);
        info!(user = %user.username, role = %user.role, expires_at = %session.expires_at, "Logged in");
        Ok(Login {
            session,
            user,
            landing,
        })
    }

    /// End a session. Returns false if the token was not live.
    pub fn logout(&self, token: &SessionToken) -> bool {
        let removed = self.sessions.remove(token).is_some();
        if removed {
            debug!("Session closed");
        }
        removed
    }

    /// Resolve the session behind a request.
    ///
    /// Rejected sessions are dropped so the same token cannot be retried.
    /// The user's role is re-read on every call, so admin edits apply
    /// immediately.
    ///
    /// # Errors
    /// Returns an error only if the user lookup fails.
    pub fn session(&self, token: Option<&SessionToken>, client: &ClientContext) -> Result<SessionState> {
        let Some(token) = token else {
            return Ok(SessionState::Anonymous(SessionRejection::Missing));
        };
        let Some(session) = self.sessions.get(token).map(|entry| entry.value().clone()) else {
            return Ok(SessionState::Anonymous(SessionRejection::Missing));
        };

        if session.is_expired(self.clock.now()) {
            self.sessions.remove(token);
            debug!(user_id = %session.user_id, "Session expired");
            return Ok(SessionState::Anonymous(SessionRejection::Expired));
        }
        if self.bind_fingerprint && !session.is_bound_to(client) {
            self.sessions.remove(token);
            warn!(user_id = %session.user_id, "Session presented by a different client");
            return Ok(SessionState::Anonymous(SessionRejection::ClientMismatch));
        }

        match self.identity.find(session.user_id)? {
            Some(user) => Ok(SessionState::from(user)),
            None => {
                self.sessions.remove(token);
                Ok(SessionState::Anonymous(SessionRejection::UserGone))
            }
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        before - self.sessions.len()
    }

    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::hasher::Argon2Hasher;
    use crate::adapter::outbound::sqlite::database::connection::{open, MEMORY_URL};
    use crate::error::Error;
    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;

    struct StepClock(Mutex<DateTime<Utc>>);

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    impl StepClock {
        fn advance(&self, secs: i64) {
            *self.0.lock() += Duration::seconds(secs);
        }
    }

    fn setup(bind: bool) -> (AccessControl, Arc<StepClock>) {
        let pool = open(MEMORY_URL, 1).unwrap();
        let clock = Arc::new(StepClock(Mutex::new(Utc::now())));
        let identity = IdentityStore::new(pool, Arc::new(Argon2Hasher::fast()), clock.clone());
        identity.register("ada", "lovelace").unwrap();
        identity.create_user("root", "toor", Role::Admin).unwrap();
        let config = SessionConfig {
            lifetime_secs: 30,
            bind_fingerprint: bind,
        };
        (AccessControl::new(identity, clock.clone(), &config), clock)
    }

    fn client(agent: &str) -> ClientContext {
        ClientContext::new(Some("127.0.0.1".parse().unwrap()), Some(agent))
    }

    #[test]
    fn login_lands_by_role() {
        let (access, _) = setup(true);
        let student = access.login("ada", "lovelace", &client("a")).unwrap();
        assert_eq!(student.landing, Landing::Home);
        let admin = access.login("root", "toor", &client("a")).unwrap();
        assert_eq!(admin.landing.path(), "/admin");
        assert_eq!(access.active_sessions(), 2);
    }

    #[test]
    fn bad_credentials_open_no_session() {
        let (access, _) = setup(true);
        assert!(matches!(
            access.login("ada", "wrong", &client("a")),
            Err(Error::AuthenticationFailure)
        ));
        assert!(matches!(access.login("", "", &client("a")), Err(Error::Validation(_))));
        assert_eq!(access.active_sessions(), 0);
    }

    #[test]
    fn session_expires_absolutely() {
        let (access, clock) = setup(true);
        let login = access.login("ada", "lovelace", &client("a")).unwrap();
        let token = login.session.token;

        clock.advance(29);
        assert!(access.session(Some(&token), &client("a")).unwrap().is_authenticated());

        clock.advance(1);
        assert_eq!(
            access.session(Some(&token), &client("a")).unwrap(),
            SessionState::Anonymous(SessionRejection::Expired)
        );
        assert_eq!(
            access.session(Some(&token), &client("a")).unwrap(),
            SessionState::Anonymous(SessionRejection::Missing)
        );
    }

    #[test]
    fn foreign_client_invalidates_session() {
        let (access, _) = setup(true);
        let token = access.login("ada", "lovelace", &client("a")).unwrap().session.token;
        assert_eq!(
            access.session(Some(&token), &client("b")).unwrap(),
            SessionState::Anonymous(SessionRejection::ClientMismatch)
        );
        assert!(!access.session(Some(&token), &client("a")).unwrap().is_authenticated());
    }

    #[test]
    fn binding_can_be_disabled() {
        let (access, _) = setup(false);
        let token = access.login("ada", "lovelace", &client("a")).unwrap().session.token;
        assert!(access.session(Some(&token), &client("b")).unwrap().is_authenticated());
    }

    #[test]
    fn logout_and_missing_tokens() {
        let (access, _) = setup(true);
        let token = access.login("ada", "lovelace", &client("a")).unwrap().session.token;
        assert!(access.logout(&token));
        assert!(!access.logout(&token));
        assert_eq!(
            access.session(None, &client("a")).unwrap(),
            SessionState::Anonymous(SessionRejection::Missing)
        );
    }

    #[test]
    fn purge_drops_only_expired() {
        let (access, clock) = setup(true);
        access.login("ada", "lovelace", &client("a")).unwrap();
        clock.advance(31);
        access.login("root", "toor", &client("a")).unwrap();
        assert_eq!(access.active_sessions(), 1);
        assert_eq!(access.purge_expired(), 0);
    }
}
