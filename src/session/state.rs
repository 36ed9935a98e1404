//! session::state
//!
//! In-memory session state, rehydrated from the credential store at startup
//! and mutated by [`crate::session::SessionManager`] methods only.
//!
//! # Invariant
//!
//! `is_authenticated` is derived: true iff both an access token and a session
//! cookie are present. Every code path that sets cookies or tokens re-derives
//! it from the presence of both; it is never true without a stored access
//! token.
//!
//! # Security
//!
//! This struct implements a custom `Debug` that redacts token and cookie
//! values. Never log or print credential fields directly.

use std::fmt;

use crate::instance::{InstanceType, CLOUD_URL};

/// Process-wide session state.
#[derive(Clone)]
pub struct SessionState {
    /// Derived: both an access token and cookies are present.
    pub is_authenticated: bool,

    /// Which kind of backend this session talks to. Defaults to cloud.
    pub instance_type: InstanceType,

    /// Base URL of the selected instance. Defaults to the public cloud URL.
    pub instance_url: String,

    /// Console API prefix, when explicitly set or computed.
    pub api_prefix: Option<String>,

    /// Public API prefix; falls back to `api_prefix` when unset.
    pub public_api_prefix: Option<String>,

    /// Raw cookie header captured from the embedded browser login.
    /// Opaque authentication artifact alongside the bearer token.
    pub cookies: Option<String>,

    /// Origin of the resolved instance, captured at login time.
    pub base_url: Option<String>,

    /// Bearer access token with an embedded expiry claim.
    pub access_token: Option<String>,

    /// Refresh token for the token-exchange endpoint.
    pub refresh_token: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            instance_type: InstanceType::default(),
            instance_url: CLOUD_URL.to_string(),
            api_prefix: None,
            public_api_prefix: None,
            cookies: None,
            base_url: None,
            access_token: None,
            refresh_token: None,
        }
    }
}

impl SessionState {
    /// Re-derive the authenticated flag from the presence of both artifacts.
    pub fn derive_authenticated(&mut self) {
        self.is_authenticated = self.access_token.is_some() && self.cookies.is_some();
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "[none]" };
        f.debug_struct("SessionState")
            .field("is_authenticated", &self.is_authenticated)
            .field("instance_type", &self.instance_type)
            .field("instance_url", &self.instance_url)
            .field("api_prefix", &self.api_prefix)
            .field("public_api_prefix", &self.public_api_prefix)
            .field("cookies", &redact(&self.cookies))
            .field("base_url", &self.base_url)
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_cloud_and_unauthenticated() {
        let state = SessionState::default();
        assert!(!state.is_authenticated);
        assert_eq!(state.instance_type, InstanceType::Cloud);
        assert_eq!(state.instance_url, CLOUD_URL);
        assert!(state.api_prefix.is_none());
        assert!(state.cookies.is_none());
        assert!(state.access_token.is_none());
    }

    #[test]
    fn derive_requires_both_artifacts() {
        let mut state = SessionState::default();

        state.access_token = Some("token".into());
        state.derive_authenticated();
        assert!(!state.is_authenticated, "token alone is not enough");

        state.cookies = Some("session=abc".into());
        state.derive_authenticated();
        assert!(state.is_authenticated);

        state.access_token = None;
        state.derive_authenticated();
        assert!(!state.is_authenticated, "never true without an access token");
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let state = SessionState {
            access_token: Some("eyJ_secret_access".into()),
            refresh_token: Some("secret_refresh".into()),
            cookies: Some("session=secret".into()),
            ..SessionState::default()
        };

        let debug = format!("{:?}", state);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("cloud"));
    }
}
