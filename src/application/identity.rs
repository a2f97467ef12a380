//! Registration, credential checks and user lookup.

use std::sync::{Arc, OnceLock};

use tracing::info;

use super::{read, transact};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::users;
use crate::domain::error::require;
use crate::domain::{Field, Role, User, UserId};
use crate::error::{Error, Result};
use crate::port::{Clock, PasswordHasher};

/// Verified in place of a real hash when the username is unknown.
const DECOY_PASSWORD: &str = "roster-decoy-password";

/// User records and their credentials.
#[derive(Clone)]
pub struct IdentityStore {
    pool: DbPool,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    decoy: Arc<OnceLock<String>>,
}

impl IdentityStore {
    pub fn new(pool: DbPool, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            hasher,
            clock,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    /// A hash of [`DECOY_PASSWORD`] made with the live hasher, so checking
    /// against it costs what checking a stored hash costs.
    fn decoy_hash(&self) -> &str {
        self.decoy
            .get_or_init(|| self.hasher.hash(DECOY_PASSWORD).unwrap_or_default())
    }

    /// Register a new student.
    ///
    /// # Errors
    /// Returns a validation error naming every blank field, or
    /// [`Error::DuplicateEntity`] if the username is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        self.create_user(username, password, Role::Student)
    }

    /// Create a user with an explicit role. Registration always goes
    /// through [`IdentityStore::register`]; this is for operators.
    ///
    /// # Errors
    /// Same as [`IdentityStore::register`].
    pub fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        require(&[(Field::Username, username), (Field::Password, password)])?;
        let hash = self.hasher.hash(password)?;
        let now = self.clock.now();
        let user = transact(&self.pool, |conn| users::insert(conn, username, &hash, role, now))?;
        info!(user = %user.username, id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials.
    ///
    /// Unknown usernames and wrong passwords fail identically, and both run
    /// one password verification.
    ///
    /// # Errors
    /// Returns a validation error for blank fields, otherwise
    /// [`Error::AuthenticationFailure`].
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        require(&[(Field::Username, username), (Field::Password, password)])?;
        let user = read(&self.pool, |conn| users::find_by_username(conn, username))?;
        match user {
            Some(user) if self.hasher.verify(password, user.password_hash()) => Ok(user),
            Some(_) => Err(Error::AuthenticationFailure),
            None => {
                self.hasher.verify(password, self.decoy_hash());
                Err(Error::AuthenticationFailure)
            }
        }
    }

    /// # Errors
    /// Returns [`Error::NotFound`] if no user has the name.
    pub fn lookup(&self, username: &str) -> Result<User> {
        read(&self.pool, |conn| users::find_by_username(conn, username))?
            .ok_or_else(|| Error::not_found("user", username))
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn find(&self, id: UserId) -> Result<Option<User>> {
        read(&self.pool, |conn| users::find_by_id(conn, id))
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<User>> {
        read(&self.pool, users::list)
    }

    /// Change a user's role out of band.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no user has the name.
    pub fn set_role(&self, username: &str, role: Role) -> Result<User> {
        let user = transact(&self.pool, |conn| {
            let user = users::find_by_username(conn, username)?
                .ok_or_else(|| Error::not_found("user", username))?;
            users::set_role(conn, user.id, role)?;
            users::find_by_id(conn, user.id)?.ok_or_else(|| Error::not_found("user", username))
        })?;
        info!(user = %user.username, role = %role, "Role changed");
        Ok(user)
    }

    /// Create the configured administrator, or reset an existing account of
    /// that name to Admin with the configured password.
    ///
    /// # Errors
    /// Returns a validation error for blank credentials.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<User> {
        require(&[(Field::Username, username), (Field::Password, password)])?;
        let hash = self.hasher.hash(password)?;
        let now = self.clock.now();
        let user = transact(&self.pool, |conn| match users::find_by_username(conn, username)? {
            Some(existing) => {
                users::set_role(conn, existing.id, Role::Admin)?;
                users::set_password_hash(conn, existing.id, &hash)?;
                users::find_by_id(conn, existing.id)?
                    .ok_or_else(|| Error::not_found("user", username))
            }
            None => users::insert(conn, username, &hash, Role::Admin, now),
        })?;
        info!(user = %user.username, "Administrator account ready");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::adapter::outbound::hasher::Argon2Hasher;
    use crate::adapter::outbound::sqlite::database::connection::{open, MEMORY_URL};
    use crate::domain::ValidationError;
    use crate::port::SystemClock;

    fn store() -> IdentityStore {
        store_with(Arc::new(Argon2Hasher::fast()))
    }

    fn store_with(hasher: Arc<dyn PasswordHasher>) -> IdentityStore {
        let pool = open(MEMORY_URL, 1).unwrap();
        IdentityStore::new(pool, hasher, Arc::new(SystemClock))
    }

    /// Counts verifications on top of the real hasher.
    struct CountingHasher {
        inner: Argon2Hasher,
        verifies: AtomicUsize,
    }

    impl CountingHasher {
        fn fast() -> Self {
            Self {
                inner: Argon2Hasher::fast(),
                verifies: AtomicUsize::new(0),
            }
        }
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, encoded: &str) -> bool {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, encoded)
        }
    }

    #[test]
    fn register_then_authenticate() {
        let store = store();
        let user = store.register("ada", "lovelace").unwrap();
        assert_eq!(user.role, Role::Student);
        assert_ne!(user.password_hash(), "lovelace");

        let authed = store.authenticate("ada", "lovelace").unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[test]
    fn duplicate_registration_fails() {
        let store = store();
        store.register("ada", "one").unwrap();
        assert!(matches!(
            store.register("ada", "two"),
            Err(Error::DuplicateEntity { entity: "user", .. })
        ));
    }

    #[test]
    fn blank_fields_are_reported_together() {
        let store = store();
        match store.register("", "") {
            Err(Error::Validation(err)) => {
                assert_eq!(err, ValidationError::missing([Field::Username, Field::Password]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        match store.authenticate("ada", "") {
            Err(Error::Validation(err)) => {
                assert_eq!(err, ValidationError::missing([Field::Password]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let store = store();
        store.register("ada", "lovelace").unwrap();

        let unknown = store.authenticate("grace", "lovelace").unwrap_err();
        let wrong = store.authenticate("ada", "babbage").unwrap_err();
        assert_eq!(unknown.to_string(), "Incorrect Password");
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn unknown_user_still_runs_a_verification() {
        let hasher = Arc::new(CountingHasher::fast());
        let store = store_with(hasher.clone());
        store.register("ada", "lovelace").unwrap();

        assert!(store.authenticate("grace", "lovelace").is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);
        assert!(store.authenticate("ada", "babbage").is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);
        assert!(store.authenticate("nobody", "x").is_err());
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn decoy_hash_never_matches_a_real_login() {
        let store = store();
        assert!(matches!(
            store.authenticate("ghost", DECOY_PASSWORD),
            Err(Error::AuthenticationFailure)
        ));
    }

    #[test]
    fn creation_time_comes_from_the_clock() {
        use diesel::prelude::*;

        use crate::adapter::outbound::sqlite::database::schema::users as table;
        use crate::testkit::clock::ManualClock;

        let pool = open(MEMORY_URL, 1).unwrap();
        let clock = Arc::new(ManualClock::default());
        clock.advance_secs(3_600);
        let store = IdentityStore::new(pool.clone(), Arc::new(Argon2Hasher::fast()), clock.clone());
        store.register("ada", "lovelace").unwrap();

        let stored: String = table::table
            .select(table::created_at)
            .first(&mut pool.get().unwrap())
            .unwrap();
        assert_eq!(stored, clock.now().to_rfc3339());
    }

    #[test]
    fn lookup_and_set_role() {
        let store = store();
        store.register("turing", "enigma").unwrap();
        assert!(matches!(store.lookup("nobody"), Err(Error::NotFound { .. })));

        let promoted = store.set_role("turing", Role::Teacher).unwrap();
        assert_eq!(promoted.role, Role::Teacher);
        assert_eq!(store.lookup("turing").unwrap().role, Role::Teacher);
    }

    #[test]
    fn ensure_admin_creates_then_resets() {
        let store = store();
        let admin = store.ensure_admin("root", "first").unwrap();
        assert_eq!(admin.role, Role::Admin);

        store.set_role("root", Role::Student).unwrap();
        let again = store.ensure_admin("root", "second").unwrap();
        assert_eq!(again.id, admin.id);
        assert_eq!(again.role, Role::Admin);
        assert!(store.authenticate("root", "second").is_ok());
        assert!(store.authenticate("root", "first").is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
