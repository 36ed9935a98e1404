//! store::traits
//!
//! Credential storage trait definition.
//!
//! # Design
//!
//! The `CredentialStore` trait defines a simple string key-value interface for
//! everything the session layer persists: bearer/refresh tokens, the captured
//! cookie header, instance metadata, and the cached apps list. One entry per
//! key, string-valued.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include stored values in error messages
//! - Use storage mechanisms appropriate to the platform
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

/// Errors from credential storage operations.
///
/// Note: Error messages intentionally do not include stored values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No value stored for the given key.
    #[error("credential not found: {0}")]
    NotFound(String),

    /// Failed to read from the store.
    #[error("failed to read credential: {0}")]
    ReadError(String),

    /// Failed to write to the store.
    #[error("failed to write credential: {0}")]
    WriteError(String),

    /// Failed to delete from the store.
    #[error("failed to delete credential: {0}")]
    DeleteError(String),

    /// Permission denied accessing the store.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Provider not available or not configured.
    #[error("credential provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for credential storage providers.
///
/// Implementations must be thread-safe (Send + Sync) and must never
/// log, print, or include stored values in error messages.
///
/// # Keys
///
/// Keys are the fixed session key space (`auth_token`, `refresh_token`,
/// `instance_url`, ...). The implementation stores them as-is without
/// interpretation; see [`crate::store::keys`] for the canonical list.
pub trait CredentialStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `Ok(Some(value))` if the entry exists.
    /// Returns `Ok(None)` if the entry does not exist.
    /// Returns `Err` if there was an error accessing the store.
    ///
    /// # Security
    ///
    /// The returned value may be a credential. Do not log or print it.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value.
    ///
    /// Overwrites any existing value for the key.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value.
    ///
    /// Returns `Ok(())` even if the entry did not exist.
    /// This makes delete idempotent.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Check if an entry exists.
    ///
    /// Default implementation uses `get()` and checks for `Some`.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}
