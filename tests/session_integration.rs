//! Session lifecycle integration tests against a mock instance.
//!
//! Covers rehydration from a persisted store, expiry-driven token refresh,
//! and forced logout when the refresh endpoint rejects the session.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dify_chat::session::SessionManager;
use dify_chat::store::{keys, CredentialStore, MemoryCredentialStore};

/// Build an unsigned JWT whose payload carries the given `exp` claim.
fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
    format!("{}.{}.sig", header, payload)
}

fn future_token() -> String {
    token_with_exp(chrono::Utc::now().timestamp() + 3600)
}

fn expired_token() -> String {
    token_with_exp(chrono::Utc::now().timestamp() - 3600)
}

fn session_over(store: MemoryCredentialStore) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(Box::new(store)))
}

#[tokio::test]
async fn rehydrates_valid_session_from_store() {
    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, future_token().as_str()),
        (keys::REFRESH_TOKEN, "refresh-1"),
        (keys::AUTH_COOKIES, "session=abc"),
        (keys::INSTANCE_TYPE, "cloud"),
    ]);
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(authenticated);
    assert!(session.is_authenticated());
    assert_eq!(session.cookies().as_deref(), Some("session=abc"));
}

#[tokio::test]
async fn missing_cookies_mean_not_authenticated() {
    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, future_token().as_str()),
        (keys::REFRESH_TOKEN, "refresh-1"),
    ]);
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(!authenticated, "a token without cookies is only half a session");
}

#[tokio::test]
async fn expired_token_refreshes_on_startup() {
    let server = MockServer::start().await;
    let new_access = future_token();

    Mock::given(method("POST"))
        .and(path("/oauth/token/refresh"))
        .and(body_json(serde_json::json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": new_access,
            "refresh_token": "refresh-2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, expired_token().as_str()),
        (keys::REFRESH_TOKEN, "refresh-1"),
        (keys::AUTH_COOKIES, "session=abc"),
        (keys::API_PREFIX, server.uri().as_str()),
    ]);
    let external = store.clone();
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(authenticated);
    assert_eq!(session.access_token().as_deref(), Some(new_access.as_str()));

    // The rotated pair is persisted, not just cached.
    assert_eq!(
        external.get(keys::AUTH_TOKEN).expect("get"),
        Some(new_access.clone())
    );
    assert_eq!(
        external.get(keys::REFRESH_TOKEN).expect("get"),
        Some("refresh-2".to_string())
    );
}

#[tokio::test]
async fn rejected_refresh_forces_logout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, expired_token().as_str()),
        (keys::REFRESH_TOKEN, "refresh-1"),
        (keys::AUTH_COOKIES, "session=abc"),
        (keys::API_PREFIX, server.uri().as_str()),
    ]);
    let external = store.clone();
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(!authenticated);
    assert!(!session.is_authenticated());

    // Forced logout wipes the stored credentials.
    assert_eq!(external.get(keys::AUTH_TOKEN).expect("get"), None);
    assert_eq!(external.get(keys::REFRESH_TOKEN).expect("get"), None);
    assert_eq!(external.get(keys::AUTH_COOKIES).expect("get"), None);
}

#[tokio::test]
async fn expired_token_without_refresh_token_logs_out() {
    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, expired_token().as_str()),
        (keys::AUTH_COOKIES, "session=abc"),
    ]);
    let external = store.clone();
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(!authenticated);
    assert_eq!(external.get(keys::AUTH_TOKEN).expect("get"), None);
}

#[tokio::test]
async fn undecodable_token_is_treated_as_expired() {
    let server = MockServer::start().await;
    let new_access = future_token();

    Mock::given(method("POST"))
        .and(path("/oauth/token/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": new_access,
            "refresh_token": "refresh-2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, "not-a-jwt"),
        (keys::REFRESH_TOKEN, "refresh-1"),
        (keys::AUTH_COOKIES, "session=abc"),
        (keys::API_PREFIX, server.uri().as_str()),
    ]);
    let session = session_over(store);

    let authenticated = session.initialize().await.expect("initialize");
    assert!(authenticated, "a garbled token should refresh, not wedge the session");
}

#[tokio::test]
async fn empty_store_is_a_clean_first_run() {
    let session = session_over(MemoryCredentialStore::new());
    let authenticated = session.initialize().await.expect("initialize");

    assert!(!authenticated);
    assert_eq!(session.instance_url(), "https://cloud.dify.ai");
    assert!(session.cached_apps().is_empty());
}

#[tokio::test]
async fn derived_flag_is_persisted_for_other_clients() {
    let store = MemoryCredentialStore::with_entries([
        (keys::AUTH_TOKEN, future_token().as_str()),
        (keys::AUTH_COOKIES, "session=abc"),
        // A stale flag left behind by an older client.
        (keys::IS_AUTHENTICATED, "false"),
    ]);
    let external = store.clone();
    let session = session_over(store);

    session.initialize().await.expect("initialize");
    assert_eq!(
        external.get(keys::IS_AUTHENTICATED).expect("get"),
        Some("true".to_string())
    );
}
