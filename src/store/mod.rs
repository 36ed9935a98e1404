//! store
//!
//! Credential storage abstraction for session state.
//!
//! # Architecture
//!
//! Everything the session layer persists goes through the [`CredentialStore`]
//! trait, which has multiple implementations:
//!
//! - [`FileCredentialStore`]: Stores in `~/.dify-chat/credentials.toml` (default)
//! - [`KeychainCredentialStore`]: Uses OS keychain (optional, feature-gated)
//! - [`MemoryCredentialStore`]: In-process map for tests and embedders
//!
//! # Key space
//!
//! One entry per key, string-valued. The session manager is the only component
//! permitted to write these keys directly; everything else goes through its
//! accessors. See [`keys`] for the canonical list.
//!
//! # Security
//!
//! All store implementations follow these rules:
//!
//! - Values are **never** logged or included in error messages
//! - File store uses 0600 permissions on Unix (owner read/write only)
//! - All file writes are atomic (temp file + rename)

mod file_store;
mod keychain_store;
mod memory;
mod traits;

pub use file_store::FileCredentialStore;
pub use keychain_store::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;
pub use traits::{CredentialStore, StoreError};

/// Persisted key space, one entry per key.
///
/// These names are load-bearing: they match what earlier clients wrote, so a
/// device that logged in under an old build rehydrates cleanly.
pub mod keys {
    /// Bearer access token.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Refresh token for the token-exchange endpoint.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Base URL of the selected instance.
    pub const INSTANCE_URL: &str = "instance_url";
    /// Instance type ("cloud" or "custom").
    pub const INSTANCE_TYPE: &str = "instance_type";
    /// REST path prefix for console API calls.
    pub const API_PREFIX: &str = "api_prefix";
    /// REST path prefix for public API calls; falls back to `api_prefix`.
    pub const PUBLIC_API_PREFIX: &str = "public_api_prefix";
    /// Raw cookie header captured from the embedded browser login.
    pub const AUTH_COOKIES: &str = "auth_cookies";
    /// Origin of the resolved instance, captured at login time.
    pub const BASE_URL: &str = "base_url";
    /// Derived authenticated flag, stored as "true"/"false".
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    /// JSON-serialized apps list.
    pub const APPS: &str = "apps";

    /// Every session-owned key, in the order logout clears them.
    pub const ALL: &[&str] = &[
        AUTH_TOKEN,
        REFRESH_TOKEN,
        INSTANCE_URL,
        INSTANCE_TYPE,
        API_PREFIX,
        PUBLIC_API_PREFIX,
        AUTH_COOKIES,
        BASE_URL,
        IS_AUTHENTICATED,
        APPS,
    ];
}

/// Create a credential store based on the provider name.
///
/// # Providers
///
/// - `"file"` (default): [`FileCredentialStore`] storing in `~/.dify-chat/credentials.toml`
/// - `"keychain"`: [`KeychainCredentialStore`] using the OS keychain (requires feature)
/// - `"memory"`: [`MemoryCredentialStore`], nothing persisted
///
/// # Errors
///
/// - Unknown provider name
/// - Keychain provider without the `keychain` feature enabled
/// - Initialization errors from the store
pub fn create_store(provider: &str) -> Result<Box<dyn CredentialStore>, StoreError> {
    match provider {
        "file" => Ok(Box::new(FileCredentialStore::new()?)),
        "memory" => Ok(Box::new(MemoryCredentialStore::new())),
        #[cfg(feature = "keychain")]
        "keychain" => Ok(Box::new(KeychainCredentialStore::new()?)),
        #[cfg(not(feature = "keychain"))]
        "keychain" => Err(StoreError::ProviderNotAvailable(
            "keychain support not enabled (compile with --features keychain)".into(),
        )),
        other => Err(StoreError::ProviderNotAvailable(format!(
            "unknown credential provider: '{}' (valid: file, keychain, memory)",
            other
        ))),
    }
}

/// The default credential store provider name.
pub const DEFAULT_PROVIDER: &str = "file";
