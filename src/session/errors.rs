//! session::errors
//!
//! Error types for session and authentication operations.
//!
//! # Design
//!
//! Error messages MUST NOT contain token or cookie values. All variants carry
//! only context that is safe to surface in a user-visible alert or a log line.

use thiserror::Error;

/// Errors from session operations.
///
/// # Security
///
/// Error messages intentionally do not include credential values.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No access token is stored for this session.
    #[error("not authenticated. Sign in first.")]
    NotAuthenticated,

    /// Custom instance selected but no API prefix configured.
    #[error("instance not configured: set an API prefix for the custom instance")]
    InstanceNotConfigured,

    /// Token refresh failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Stored access token could not be decoded.
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// Error from credential storage.
    #[error("credential store error: {0}")]
    Store(String),

    /// Network error during a session call.
    #[error("network error: {0}")]
    Network(String),

    /// Instance API returned a non-success status.
    #[error("instance API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the instance
        message: String,
    },

    /// Persisted or wire data did not match any known shape.
    #[error("malformed data: {0}")]
    Malformed(String),

    /// Instance configuration error (type/domain resolution).
    #[error(transparent)]
    Instance(#[from] crate::instance::InstanceError),
}

impl SessionError {
    /// Check if this error indicates the user needs to sign in again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            SessionError::NotAuthenticated
                | SessionError::RefreshFailed(_)
                | SessionError::InvalidToken(_)
        )
    }

    /// Check if this error is a transient failure that might succeed on a
    /// user-initiated retry. There is no automatic retry loop; the caller
    /// surfaces these with a retry affordance.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::Network(_))
    }
}

impl From<crate::store::StoreError> for SessionError {
    fn from(err: crate::store::StoreError) -> Self {
        SessionError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Malformed(err.to_string())
    }
}
