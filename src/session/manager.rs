//! session::manager
//!
//! `SessionManager` - single source of truth for "is this device currently
//! allowed to call the instance API, and with which credentials."
//!
//! # Architecture
//!
//! The manager is an explicit context object constructed once at process start
//! and passed by `Arc` to every collaborator that needs session data. It owns
//! the credential store (no other component writes session keys directly), the
//! in-memory [`SessionState`], and a watch channel that publishes
//! authenticated-state transitions so dependent surfaces update without
//! polling.
//!
//! # Concurrency
//!
//! Operations are async (store and network I/O are suspension points) but are
//! not designed to race with themselves: callers serialize dependent mutations
//! through single user-driven action sequences. Last write wins on the store;
//! most-recent in-memory assignment wins for reads. [`initialize`] must
//! complete before other accessors are consulted, otherwise they observe
//! pre-initialization defaults.
//!
//! [`initialize`]: SessionManager::initialize

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::errors::SessionError;
use super::state::SessionState;
use super::token::TokenClaims;
use super::TokenSource;
use crate::api::apps::{canonical_apps_json, normalize_apps_json};
use crate::api::types::App;
use crate::instance::{self, InstanceType, CLOUD_API_PREFIX, CLOUD_URL};
use crate::store::{keys, CredentialStore};

/// Request body for the token refresh endpoint.
#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response from the token refresh endpoint.
#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Session manager: owns authentication state and its persistence.
///
/// Construct once, share via `Arc`. See the module docs for the concurrency
/// contract.
pub struct SessionManager {
    /// Credential store; sole writer of the session key space.
    store: Box<dyn CredentialStore>,

    /// In-memory state, rehydrated by `initialize()`.
    state: RwLock<SessionState>,

    /// Shared HTTP client for the refresh endpoint.
    http: reqwest::Client,

    /// Publishes `is_authenticated` transitions to subscribers.
    auth_tx: watch::Sender<bool>,
}

impl SessionManager {
    /// Create a session manager over a credential store.
    ///
    /// State starts at defaults (unauthenticated, cloud instance); call
    /// [`initialize`](Self::initialize) to rehydrate from the store.
    pub fn new(store: Box<dyn CredentialStore>) -> Self {
        let (auth_tx, _) = watch::channel(false);
        Self {
            store,
            state: RwLock::new(SessionState::default()),
            http: reqwest::Client::new(),
            auth_tx,
        }
    }

    /// Subscribe to authenticated-state transitions.
    ///
    /// The receiver yields the current value immediately and every change
    /// thereafter. This is the push-based alternative to polling
    /// [`is_authenticated`](Self::is_authenticated) on an interval.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }

    /// Read a key, degrading failures to `None` with a log line.
    ///
    /// Read paths never abort session setup; a broken store behaves like an
    /// empty one, the same as a first run.
    fn read_degraded(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "credential read failed, using default");
                None
            }
        }
    }

    /// Load all persisted fields and validate the stored token.
    ///
    /// - Tolerates an empty store (first run): returns `Ok(false)`.
    /// - `is_authenticated` is derived from the presence of both an access
    ///   token and cookies.
    /// - An expired or undecodable access token triggers exactly one refresh
    ///   attempt when a refresh token exists; otherwise the session is logged
    ///   out.
    ///
    /// Returns the resulting authenticated flag.
    pub async fn initialize(&self) -> Result<bool, SessionError> {
        let access_token = self.read_degraded(keys::AUTH_TOKEN);
        let refresh_token = self.read_degraded(keys::REFRESH_TOKEN);
        let cookies = self.read_degraded(keys::AUTH_COOKIES);
        let base_url = self.read_degraded(keys::BASE_URL);
        let api_prefix = self.read_degraded(keys::API_PREFIX);
        let public_api_prefix = self.read_degraded(keys::PUBLIC_API_PREFIX);

        let instance_type = self
            .read_degraded(keys::INSTANCE_TYPE)
            .and_then(|s| match s.parse::<InstanceType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(error = %e, "stored instance type unreadable, defaulting to cloud");
                    None
                }
            })
            .unwrap_or_default();

        let instance_url = self
            .read_degraded(keys::INSTANCE_URL)
            .unwrap_or_else(|| CLOUD_URL.to_string());

        {
            let mut state = self.write_state();
            *state = SessionState {
                is_authenticated: false,
                instance_type,
                instance_url,
                api_prefix,
                public_api_prefix,
                cookies,
                base_url,
                access_token: access_token.clone(),
                refresh_token: refresh_token.clone(),
            };
            state.derive_authenticated();
        }

        // Validate the token's embedded expiry claim. A token that fails to
        // decode is treated like an expired one: one refresh attempt, then
        // forced logout.
        if let Some(ref token) = access_token {
            let stale = match TokenClaims::decode(token) {
                Ok(claims) => claims.is_expired(),
                Err(e) => {
                    debug!(error = %e, "stored access token did not decode");
                    true
                }
            };

            if stale {
                match refresh_token {
                    Some(ref rt) => {
                        self.refresh_auth_token(rt).await?;
                    }
                    None => {
                        self.logout()?;
                    }
                }
            }
        }

        let authenticated = self.is_authenticated();
        // Persisting the derived flag is best-effort: it mirrors state other
        // clients read, but a failure here does not make the session invalid.
        if let Err(e) = self.store.set(keys::IS_AUTHENTICATED, bool_str(authenticated)) {
            warn!(error = %e, "could not persist derived authenticated flag");
        }
        self.publish_auth_state();
        Ok(authenticated)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// `POST {api_prefix}/oauth/token/refresh` with body `{refresh_token}`.
    /// Any non-2xx response, network failure, or unusable response body treats
    /// the session as unrecoverable: the session is logged out and `Ok(false)`
    /// is returned. On success the new pair is stored and `Ok(true)` is
    /// returned.
    pub async fn refresh_auth_token(&self, refresh_token: &str) -> Result<bool, SessionError> {
        let prefix = match self.api_prefix() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "no API prefix for token refresh");
                self.logout()?;
                return Ok(false);
            }
        };
        let url = format!("{}/oauth/token/refresh", prefix);

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "token refresh request failed");
                self.logout()?;
                return Ok(false);
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "token refresh rejected");
            self.logout()?;
            return Ok(false);
        }

        match response.json::<RefreshResponse>().await {
            Ok(pair) => {
                self.set_auth_tokens(&pair.access_token, &pair.refresh_token)?;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "token refresh response did not parse");
                self.logout()?;
                Ok(false)
            }
        }
    }

    /// Persist a new token pair.
    ///
    /// Does not validate the token; validation is `initialize()`'s job. The
    /// authenticated flag is re-derived from the presence of both token and
    /// cookies. Write failures propagate: silently continuing would leave the
    /// session inconsistent.
    pub fn set_auth_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        self.store.set(keys::AUTH_TOKEN, access_token)?;
        self.store.set(keys::REFRESH_TOKEN, refresh_token)?;

        let authenticated = {
            let mut state = self.write_state();
            state.access_token = Some(access_token.to_string());
            state.refresh_token = Some(refresh_token.to_string());
            state.derive_authenticated();
            state.is_authenticated
        };
        self.store.set(keys::IS_AUTHENTICATED, bool_str(authenticated))?;
        self.publish_auth_state();
        Ok(())
    }

    /// Persist the raw cookie header captured from the embedded browser.
    ///
    /// Cookies are required in addition to the bearer token for the derived
    /// authenticated invariant to hold.
    pub fn set_cookies(&self, cookies: &str) -> Result<(), SessionError> {
        self.store.set(keys::AUTH_COOKIES, cookies)?;

        let authenticated = {
            let mut state = self.write_state();
            state.cookies = Some(cookies.to_string());
            state.derive_authenticated();
            state.is_authenticated
        };
        self.store.set(keys::IS_AUTHENTICATED, bool_str(authenticated))?;
        self.publish_auth_state();
        Ok(())
    }

    /// Persist the instance type.
    ///
    /// Affects which default API prefix later accessors compute: cloud maps to
    /// the fixed public endpoint, custom must be explicitly configured via
    /// [`set_api_prefix`](Self::set_api_prefix) or
    /// [`configure_instance`](Self::configure_instance). Changing the type
    /// invalidates any cached prefixes: a prefix computed for one kind of
    /// instance addresses the wrong backend on the other.
    pub fn set_instance_type(&self, instance_type: InstanceType) -> Result<(), SessionError> {
        let changed = self.read_state().instance_type != instance_type;
        self.store.set(keys::INSTANCE_TYPE, instance_type.as_str())?;
        if changed {
            self.store.delete(keys::API_PREFIX)?;
            self.store.delete(keys::PUBLIC_API_PREFIX)?;
        }

        let mut state = self.write_state();
        state.instance_type = instance_type;
        if changed {
            state.api_prefix = None;
            state.public_api_prefix = None;
        }
        Ok(())
    }

    /// Resolve and persist a full instance selection.
    ///
    /// Cloud ignores `domain`; custom normalizes it (prepending `https://`
    /// when no scheme is given) and derives the console API prefix.
    pub fn configure_instance(
        &self,
        instance_type: InstanceType,
        domain: Option<&str>,
    ) -> Result<(), SessionError> {
        let resolved = instance::resolve(instance_type, domain)?;

        self.store.set(keys::INSTANCE_TYPE, instance_type.as_str())?;
        self.store.set(keys::INSTANCE_URL, &resolved.instance_url)?;
        self.store.set(keys::BASE_URL, &resolved.instance_url)?;
        self.store.set(keys::API_PREFIX, &resolved.api_prefix)?;
        // A public prefix from a previous instance selection is stale now.
        self.store.delete(keys::PUBLIC_API_PREFIX)?;

        let mut state = self.write_state();
        state.instance_type = instance_type;
        state.instance_url = resolved.instance_url.clone();
        state.base_url = Some(resolved.instance_url);
        state.api_prefix = Some(resolved.api_prefix);
        state.public_api_prefix = None;
        Ok(())
    }

    /// Persist both API prefixes.
    ///
    /// `public_api_prefix` defaults to `api_prefix` when omitted.
    pub fn set_api_prefix(
        &self,
        api_prefix: &str,
        public_api_prefix: Option<&str>,
    ) -> Result<(), SessionError> {
        let public = public_api_prefix.unwrap_or(api_prefix);
        self.store.set(keys::API_PREFIX, api_prefix)?;
        self.store.set(keys::PUBLIC_API_PREFIX, public)?;

        let mut state = self.write_state();
        state.api_prefix = Some(api_prefix.to_string());
        state.public_api_prefix = Some(public.to_string());
        Ok(())
    }

    /// The console API prefix for this session.
    ///
    /// Computes and caches the cloud default on first access when unset. A
    /// custom instance with no configured prefix is an error: cloud and custom
    /// are mutually exclusive, so falling back to the cloud endpoint would
    /// address the wrong backend.
    pub fn api_prefix(&self) -> Result<String, SessionError> {
        {
            let state = self.read_state();
            if let Some(ref prefix) = state.api_prefix {
                return Ok(prefix.clone());
            }
            if state.instance_type == InstanceType::Custom {
                return Err(SessionError::InstanceNotConfigured);
            }
        }

        let mut state = self.write_state();
        // Re-check under the write lock; another accessor may have cached it.
        if state.api_prefix.is_none() {
            state.api_prefix = Some(CLOUD_API_PREFIX.to_string());
        }
        Ok(state.api_prefix.clone().unwrap_or_else(|| CLOUD_API_PREFIX.to_string()))
    }

    /// The public API prefix; falls back to the console prefix when unset.
    pub fn public_api_prefix(&self) -> Result<String, SessionError> {
        if let Some(prefix) = self.read_state().public_api_prefix.clone() {
            return Ok(prefix);
        }
        self.api_prefix()
    }

    /// Persist the origin of the resolved instance, captured at login time.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), SessionError> {
        self.store.set(keys::BASE_URL, base_url)?;
        self.write_state().base_url = Some(base_url.to_string());
        Ok(())
    }

    /// Clear every persisted session key and reset in-memory state.
    ///
    /// Idempotent: safe to call when already logged out. Missing keys are
    /// silent ("nothing to delete" is not a failure); true store failures are
    /// logged, the reset still completes, and the first error is returned so
    /// the caller knows persistence is unhealthy.
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut first_error: Option<SessionError> = None;
        for key in keys::ALL {
            if let Err(e) = self.store.delete(key) {
                warn!(key, error = %e, "could not delete session key during logout");
                first_error.get_or_insert(e.into());
            }
        }

        *self.write_state() = SessionState::default();
        self.publish_auth_state();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Re-read the credential material from the store and re-derive the
    /// authenticated flag.
    ///
    /// Picks up changes made to the underlying store by another writer. Store
    /// read failures degrade to "entry absent", matching [`initialize`].
    ///
    /// [`initialize`]: SessionManager::initialize
    pub fn reload_auth_state(&self) -> bool {
        let access_token = self.read_degraded(keys::AUTH_TOKEN);
        let cookies = self.read_degraded(keys::AUTH_COOKIES);

        let authenticated = {
            let mut state = self.write_state();
            state.access_token = access_token;
            state.cookies = cookies;
            state.derive_authenticated();
            state.is_authenticated
        };
        self.publish_auth_state();
        authenticated
    }

    /// The hosted sign-in URL for the current instance configuration.
    pub fn sign_in_url(&self) -> String {
        instance::sign_in_url(&self.read_state().instance_url)
    }

    /// Current derived authenticated flag.
    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated
    }

    /// Current instance type.
    pub fn instance_type(&self) -> InstanceType {
        self.read_state().instance_type
    }

    /// Base URL of the selected instance.
    pub fn instance_url(&self) -> String {
        self.read_state().instance_url.clone()
    }

    /// Origin captured at login time, if any.
    pub fn base_url(&self) -> Option<String> {
        self.read_state().base_url.clone()
    }

    /// Captured cookie header, if any. Do not log the returned value.
    pub fn cookies(&self) -> Option<String> {
        self.read_state().cookies.clone()
    }

    /// Stored access token, if any. Do not log the returned value; prefer
    /// [`TokenSource::bearer_token`] which also handles expiry.
    pub fn access_token(&self) -> Option<String> {
        self.read_state().access_token.clone()
    }

    /// The locally cached apps list, normalized to the canonical shape.
    ///
    /// Any of the historical persisted shapes (bare array, `{data: [...]}`,
    /// legacy `{appId, appKey, apiUrl}` entries) is migrated on load and the
    /// key is rewritten canonically. A malformed cache degrades to empty.
    pub fn cached_apps(&self) -> Vec<App> {
        let Some(json) = self.read_degraded(keys::APPS) else {
            return Vec::new();
        };
        match normalize_apps_json(&json) {
            Ok((apps, migrated)) => {
                if migrated {
                    if let Err(e) = self.set_cached_apps(&apps) {
                        warn!(error = %e, "could not rewrite migrated apps cache");
                    }
                }
                apps
            }
            Err(e) => {
                warn!(error = %e, "cached apps list unreadable, ignoring");
                Vec::new()
            }
        }
    }

    /// Persist the apps list in the canonical shape.
    pub fn set_cached_apps(&self, apps: &[App]) -> Result<(), SessionError> {
        let json = canonical_apps_json(apps)?;
        self.store.set(keys::APPS, &json)?;
        Ok(())
    }

    fn publish_auth_state(&self) {
        self.auth_tx.send_replace(self.is_authenticated());
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionManager {
    async fn bearer_token(&self) -> Result<String, SessionError> {
        let (token, refresh) = {
            let state = self.read_state();
            (state.access_token.clone(), state.refresh_token.clone())
        };
        let token = token.ok_or(SessionError::NotAuthenticated)?;

        let stale = TokenClaims::decode(&token)
            .map(|claims| claims.is_expired())
            .unwrap_or(true);
        if !stale {
            return Ok(token);
        }

        let refresh = refresh.ok_or(SessionError::NotAuthenticated)?;
        if self.refresh_auth_token(&refresh).await? {
            self.read_state()
                .access_token
                .clone()
                .ok_or(SessionError::NotAuthenticated)
        } else {
            Err(SessionError::RefreshFailed(
                "refresh token rejected by instance".into(),
            ))
        }
    }

    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

// Custom Debug to avoid exposing credentials
impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("instance_type", &self.instance_type())
            .field("instance_url", &self.instance_url())
            .field("is_authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::test_tokens::token_with_exp;
    use crate::store::MemoryCredentialStore;
    use chrono::{Duration, Utc};

    fn manager_with(entries: &[(&str, &str)]) -> SessionManager {
        let store = MemoryCredentialStore::with_entries(entries.iter().copied());
        SessionManager::new(Box::new(store))
    }

    fn future_token() -> String {
        token_with_exp((Utc::now() + Duration::hours(1)).timestamp())
    }

    #[tokio::test]
    async fn initialize_empty_store_returns_false() {
        let manager = manager_with(&[]);
        let authed = manager.initialize().await.expect("initialize");
        assert!(!authed);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_with_token_and_cookies_is_authenticated() {
        let token = future_token();
        let manager = manager_with(&[
            (keys::AUTH_TOKEN, token.as_str()),
            (keys::AUTH_COOKIES, "session=abc"),
        ]);

        let authed = manager.initialize().await.expect("initialize");
        assert!(authed);
    }

    #[tokio::test]
    async fn initialize_token_without_cookies_not_authenticated() {
        let token = future_token();
        let manager = manager_with(&[(keys::AUTH_TOKEN, token.as_str())]);

        let authed = manager.initialize().await.expect("initialize");
        assert!(!authed, "token alone must not authenticate");
    }

    #[tokio::test]
    async fn initialize_cookies_without_token_not_authenticated() {
        let manager = manager_with(&[(keys::AUTH_COOKIES, "session=abc")]);

        let authed = manager.initialize().await.expect("initialize");
        assert!(!authed, "isAuthenticated must never be true without a token");
    }

    #[tokio::test]
    async fn initialize_expired_token_without_refresh_forces_logout() {
        let expired = token_with_exp((Utc::now() - Duration::hours(1)).timestamp());
        let manager = manager_with(&[
            (keys::AUTH_TOKEN, expired.as_str()),
            (keys::AUTH_COOKIES, "session=abc"),
        ]);

        let authed = manager.initialize().await.expect("initialize");
        assert!(!authed);
        assert!(manager.access_token().is_none(), "logout clears the token");
    }

    #[tokio::test]
    async fn initialize_undecodable_token_without_refresh_forces_logout() {
        let manager = manager_with(&[
            (keys::AUTH_TOKEN, "garbage"),
            (keys::AUTH_COOKIES, "session=abc"),
        ]);

        let authed = manager.initialize().await.expect("initialize");
        assert!(!authed);
    }

    #[tokio::test]
    async fn set_api_prefix_defaults_public_to_api() {
        let manager = manager_with(&[]);
        manager.set_api_prefix("https://x/api", None).expect("set");

        assert_eq!(manager.api_prefix().expect("api"), "https://x/api");
        assert_eq!(manager.public_api_prefix().expect("public"), "https://x/api");
    }

    #[tokio::test]
    async fn set_api_prefix_with_both_values() {
        let manager = manager_with(&[]);
        manager
            .set_api_prefix("https://x/console/api", Some("https://x/v1"))
            .expect("set");

        assert_eq!(manager.api_prefix().expect("api"), "https://x/console/api");
        assert_eq!(manager.public_api_prefix().expect("public"), "https://x/v1");
    }

    #[tokio::test]
    async fn api_prefix_computes_cloud_default_on_first_access() {
        let manager = manager_with(&[]);
        assert_eq!(manager.api_prefix().expect("api"), CLOUD_API_PREFIX);
    }

    #[tokio::test]
    async fn api_prefix_errors_for_unconfigured_custom_instance() {
        let manager = manager_with(&[]);
        manager
            .set_instance_type(InstanceType::Custom)
            .expect("set type");

        assert!(matches!(
            manager.api_prefix(),
            Err(SessionError::InstanceNotConfigured)
        ));
    }

    #[tokio::test]
    async fn instance_type_change_drops_cached_prefix() {
        let manager = manager_with(&[]);
        assert_eq!(manager.api_prefix().expect("api"), CLOUD_API_PREFIX);

        manager
            .set_instance_type(InstanceType::Custom)
            .expect("set type");

        assert!(matches!(
            manager.api_prefix(),
            Err(SessionError::InstanceNotConfigured)
        ));
        assert!(matches!(
            manager.public_api_prefix(),
            Err(SessionError::InstanceNotConfigured)
        ));
    }

    #[tokio::test]
    async fn setting_same_instance_type_keeps_prefix() {
        let manager = manager_with(&[]);
        manager
            .set_api_prefix("https://cloud.dify.ai/console/api", None)
            .expect("set prefix");

        manager
            .set_instance_type(InstanceType::Cloud)
            .expect("set type");

        assert_eq!(
            manager.api_prefix().expect("api"),
            "https://cloud.dify.ai/console/api"
        );
    }

    #[tokio::test]
    async fn configure_custom_instance_derives_prefix() {
        let manager = manager_with(&[]);
        manager
            .configure_instance(InstanceType::Custom, Some("dify.example.com"))
            .expect("configure");

        assert_eq!(manager.instance_url(), "https://dify.example.com");
        assert_eq!(
            manager.api_prefix().expect("api"),
            "https://dify.example.com/console/api"
        );
        assert_eq!(manager.base_url(), Some("https://dify.example.com".into()));
    }

    #[tokio::test]
    async fn set_auth_tokens_alone_does_not_authenticate() {
        let manager = manager_with(&[]);
        manager.set_auth_tokens("abc", "def").expect("set tokens");

        assert!(!manager.is_authenticated(), "cookies still missing");
        assert_eq!(manager.access_token(), Some("abc".into()));
    }

    #[tokio::test]
    async fn tokens_plus_cookies_authenticate() {
        let manager = manager_with(&[]);
        manager.set_auth_tokens("abc", "def").expect("set tokens");
        manager.set_cookies("session=abc").expect("set cookies");

        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn logout_then_initialize_resets_everything() {
        let token = future_token();
        let manager = manager_with(&[
            (keys::AUTH_TOKEN, token.as_str()),
            (keys::AUTH_COOKIES, "session=abc"),
            (keys::API_PREFIX, "https://x/api"),
            (keys::PUBLIC_API_PREFIX, "https://x/v1"),
            (keys::BASE_URL, "https://x"),
            (keys::INSTANCE_TYPE, "custom"),
            (keys::INSTANCE_URL, "https://x"),
        ]);

        assert!(manager.initialize().await.expect("first initialize"));

        manager.logout().expect("logout");
        let authed = manager.initialize().await.expect("second initialize");

        assert!(!authed);
        assert!(manager.cookies().is_none());
        assert!(manager.base_url().is_none());
        assert_eq!(manager.instance_type(), InstanceType::Cloud);
        assert_eq!(manager.instance_url(), CLOUD_URL);
        // Back to the cloud default, not the custom prefix.
        assert_eq!(manager.api_prefix().expect("api"), CLOUD_API_PREFIX);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let manager = manager_with(&[(keys::AUTH_TOKEN, "t"), (keys::AUTH_COOKIES, "c")]);

        manager.logout().expect("first logout");
        manager.logout().expect("second logout must not error");
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn sign_in_url_follows_instance() {
        let manager = manager_with(&[]);
        assert_eq!(manager.sign_in_url(), "https://cloud.dify.ai/signin");

        manager
            .configure_instance(InstanceType::Custom, Some("dify.example.com"))
            .expect("configure");
        assert_eq!(manager.sign_in_url(), "https://dify.example.com/signin");
    }

    #[tokio::test]
    async fn subscribe_observes_transitions() {
        let manager = manager_with(&[]);
        let rx = manager.subscribe();
        assert!(!*rx.borrow());

        manager.set_auth_tokens("abc", "def").expect("tokens");
        manager.set_cookies("session=abc").expect("cookies");
        assert!(*rx.borrow());

        manager.logout().expect("logout");
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn bearer_token_requires_authentication() {
        let manager = manager_with(&[]);
        let result = TokenSource::bearer_token(&manager).await;
        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn bearer_token_returns_fresh_token() {
        let token = future_token();
        let manager = manager_with(&[]);
        manager.set_auth_tokens(&token, "refresh").expect("set");

        let bearer = TokenSource::bearer_token(&manager).await.expect("token");
        assert_eq!(bearer, token);
    }

    #[tokio::test]
    async fn debug_output_does_not_expose_credentials() {
        let manager = manager_with(&[]);
        manager
            .set_auth_tokens("eyJ_secret_token", "secret_refresh")
            .expect("set");

        let debug = format!("{:?}", manager);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("cloud.dify.ai"));
    }
}
