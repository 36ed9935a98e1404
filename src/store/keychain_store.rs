//! store::keychain_store
//!
//! Keychain-based credential storage using the OS keychain.
//!
//! # Platform Support
//!
//! This module uses the `keyring` crate which supports:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (via D-Bus)
//!
//! # Feature Flag
//!
//! This module is only available with the `keychain` feature flag:
//!
//! ```toml
//! dify-chat = { version = "0.1", features = ["keychain"] }
//! ```

#[cfg(feature = "keychain")]
use keyring::Entry;

#[cfg(feature = "keychain")]
use super::traits::CredentialStore;
use super::traits::StoreError;

/// Keychain-based credential storage.
///
/// Uses the OS keychain (macOS Keychain, Windows Credential Manager,
/// Linux Secret Service) via the `keyring` crate.
///
/// This is only available when compiled with the `keychain` feature.
#[cfg(feature = "keychain")]
#[derive(Debug)]
pub struct KeychainCredentialStore {
    /// Service name for keychain entries
    service: String,
}

#[cfg(feature = "keychain")]
impl KeychainCredentialStore {
    /// Create a new keychain credential store.
    ///
    /// Uses "dify-chat" as the service name for all keychain entries.
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            service: "dify-chat".to_string(),
        })
    }

    /// Create a new keychain credential store with a custom service name.
    ///
    /// This is primarily useful for testing to avoid conflicts.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Get the service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Create a keyring entry for the given key.
    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key)
            .map_err(|e| StoreError::ReadError(format!("cannot create keyring entry: {}", e)))
    }
}

#[cfg(feature = "keychain")]
impl CredentialStore for KeychainCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::Ambiguous(_)) => {
                // Multiple entries found - this shouldn't happen with our usage
                Err(StoreError::ReadError("ambiguous keychain entry".to_string()))
            }
            Err(e) => Err(StoreError::ReadError(format!(
                "cannot read from keychain: {}",
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        entry
            .set_password(value)
            .map_err(|e| StoreError::WriteError(format!("cannot write to keychain: {}", e)))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already gone, that's fine
            Err(e) => Err(StoreError::DeleteError(format!(
                "cannot delete from keychain: {}",
                e
            ))),
        }
    }
}

// Stub implementation when keychain feature is disabled
#[cfg(not(feature = "keychain"))]
#[derive(Debug)]
pub struct KeychainCredentialStore {
    _private: (),
}

#[cfg(not(feature = "keychain"))]
impl KeychainCredentialStore {
    /// Keychain support requires the `keychain` feature.
    pub fn new() -> Result<Self, StoreError> {
        Err(StoreError::ProviderNotAvailable(
            "keychain support not enabled (compile with --features keychain)".into(),
        ))
    }
}
