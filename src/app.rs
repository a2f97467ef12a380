//! Application wiring: one pool, one hasher, one clock, shared by every
//! service.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::hasher::Argon2Hasher;
use crate::adapter::outbound::sqlite::database::connection::{self, DbPool};
use crate::application::{
    AccessControl, AdminEditor, CourseRegistry, EnrollmentService, GradeLedger, IdentityStore,
};
use crate::config::{Config, SessionConfig};
use crate::error::Result;
use crate::port::{Clock, PasswordHasher, SystemClock};

/// Every service, ready to use.
#[derive(Clone)]
pub struct App {
    pub identity: IdentityStore,
    pub registry: CourseRegistry,
    pub ledger: GradeLedger,
    pub enrollment: EnrollmentService,
    pub access: AccessControl,
    pub admin: AdminEditor,
    pool: DbPool,
}

impl App {
    /// Open the configured database, migrate it, and create the configured
    /// administrator if there is one.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let pool = connection::open(&config.database.url, config.database.pool_size)?;
        info!(url = %config.database.url, "Database ready");

        let app = Self::from_parts(
            pool,
            Arc::new(Argon2Hasher::default()),
            Arc::new(SystemClock),
            &config.session,
        );
        if let Some((username, password)) = config.admin.credentials() {
            app.identity.ensure_admin(username, password)?;
        }
        Ok(app)
    }

    /// Assemble services over an existing, migrated pool.
    pub fn from_parts(
        pool: DbPool,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        session: &SessionConfig,
    ) -> Self {
        let identity = IdentityStore::new(pool.clone(), hasher.clone(), clock.clone());
        Self {
            registry: CourseRegistry::new(pool.clone()),
            ledger: GradeLedger::new(pool.clone()),
            enrollment: EnrollmentService::new(pool.clone()),
            admin: AdminEditor::new(pool.clone(), hasher, clock.clone()),
            access: AccessControl::new(identity.clone(), clock, session),
            identity,
            pool,
        }
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
