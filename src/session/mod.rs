//! session - authentication and session lifecycle
//!
//! This module owns the answer to "is this device currently allowed to call
//! the instance API, and with which credentials."
//!
//! # Architecture
//!
//! The session layer:
//! - Rehydrates state from the credential store at startup
//! - Derives `is_authenticated` from the presence of both an access token and
//!   a captured session cookie
//! - Checks the token's embedded expiry claim and exchanges the refresh token
//!   when it has lapsed (one attempt, then forced logout)
//! - Publishes authenticated-state transitions on a watch channel
//! - Never exposes tokens or cookies in logs, errors, or `Debug` output
//!
//! # Components
//!
//! - [`SessionManager`] - single source of truth, constructed once and shared
//! - [`SessionState`] - the in-memory data model
//! - [`TokenClaims`] - expiry-claim decoding for stored access tokens
//! - [`TokenSource`] - trait for handing bearer tokens to HTTP callers
//! - [`SessionError`] - error taxonomy with reauth/transient classification
//!
//! # Failure semantics
//!
//! Session-integrity failures (failed refresh, undecodable token) always
//! resolve toward the safer state: logged out, never ambiguously
//! authenticated. Store reads degrade to defaults; credential writes
//! propagate their errors.

mod errors;
mod manager;
mod state;
pub(crate) mod token;

pub use errors::SessionError;
pub use manager::SessionManager;
pub use state::SessionState;
pub use token::TokenClaims;

/// Trait for providing bearer tokens to HTTP callers.
///
/// Implementors return a token that is valid right now, refreshing behind the
/// scenes when the stored one has expired. Downstream clients attach the
/// result as an `Authorization: Bearer` header and never persist it
/// themselves.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a valid bearer token, refreshing if necessary.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotAuthenticated`] if no token exists
    /// - [`SessionError::RefreshFailed`] if the exchange was rejected
    async fn bearer_token(&self) -> Result<String, SessionError>;

    /// Check if authentication is available without refreshing.
    fn is_authenticated(&self) -> bool;
}
