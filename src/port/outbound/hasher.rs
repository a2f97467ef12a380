//! Password hashing port.

use crate::error::Result;

/// Produces and checks salted password hashes.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `hash` must salt every call, so equal passwords yield different output
/// - `verify` must do the same amount of work for a wrong password as for
///   a right one
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing encoded string.
    ///
    /// # Errors
    /// Returns an error if the underlying algorithm rejects its input.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against an encoded hash.
    ///
    /// Malformed encodings verify as `false`.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}
