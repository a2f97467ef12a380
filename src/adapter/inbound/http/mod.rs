//! HTTP surface.
//!
//! Form bodies in, JSON views or redirects out. Core operations are
//! synchronous and touch SQLite, so every handler hands them to tokio's
//! blocking pool.

pub mod admin;
pub mod auth;
pub mod courses;
pub mod error;
pub mod extract;
pub mod grades;
pub mod server;

pub use error::HttpError;
pub use extract::{Caller, SESSION_COOKIE};
pub use server::{router, serve};

use crate::error::{Error, Result};

/// Run a core operation on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> std::result::Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HttpError::from(Error::Internal(format!("blocking task failed: {e}"))))?
        .map_err(HttpError::from)
}
