//! Login flow integration tests against a mock instance.
//!
//! Exercises the full path from a landing-page navigation event to an
//! authenticated session, including the readiness check and the guard
//! against duplicate redirect callbacks.

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dify_chat::instance::{InstanceType, CLOUD_API_PREFIX};
use dify_chat::login::{BrowserEvent, FlowOutcome, LoginFlow, LoginPhase, PageMessage};
use dify_chat::session::SessionManager;
use dify_chat::store::MemoryCredentialStore;

fn new_session() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(Box::new(MemoryCredentialStore::new())))
}

fn apps_body() -> serde_json::Value {
    serde_json::json!([
        { "id": "app-1", "name": "Helper", "mode": "chat" },
        { "id": "app-2", "name": "Writer", "mode": "completion" }
    ])
}

async fn mount_apps_ok(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(apps_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_login_against_self_hosted_instance() {
    let server = MockServer::start().await;
    mount_apps_ok(&server, 1).await;

    let session = new_session();
    let mut flow = LoginFlow::new(session.clone());
    flow.begin();

    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let landing = format!("{}/apps?access_token=tok-1&refresh_token=ref-1", server.uri());
    let outcome = flow
        .handle_event(BrowserEvent::Navigated(landing))
        .await
        .expect("navigated");

    match outcome {
        FlowOutcome::Authenticated { apps } => assert_eq!(apps.len(), 2),
        other => panic!("expected authenticated outcome, got {:?}", other),
    }

    assert_eq!(flow.phase(), LoginPhase::Idle);
    assert!(session.is_authenticated());
    assert_eq!(session.access_token().as_deref(), Some("tok-1"));
    assert_eq!(session.base_url(), Some(server.uri()));
    assert_eq!(
        session.api_prefix().expect("prefix"),
        format!("{}/console/api", server.uri())
    );
    assert_eq!(session.cached_apps().len(), 2);
}

#[tokio::test]
async fn duplicate_redirect_is_processed_once() {
    let server = MockServer::start().await;
    // expect(1) is the assertion: a second navigation must not re-fetch.
    mount_apps_ok(&server, 1).await;

    let session = new_session();
    let mut flow = LoginFlow::new(session.clone());
    flow.begin();
    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let landing = format!("{}/apps?access_token=tok-1&refresh_token=ref-1", server.uri());
    let first = flow
        .handle_event(BrowserEvent::Navigated(landing.clone()))
        .await
        .expect("first navigation");
    assert!(matches!(first, FlowOutcome::Authenticated { .. }));

    // Some embedded browsers fire the navigation callback twice.
    let second = flow
        .handle_event(BrowserEvent::Navigated(landing))
        .await
        .expect("second navigation");
    assert!(matches!(second, FlowOutcome::Pending));
}

#[tokio::test]
async fn failed_readiness_check_keeps_browser_armed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = new_session();
    let mut flow = LoginFlow::new(session.clone());
    flow.begin();
    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let landing = format!("{}/apps?access_token=tok-1", server.uri());
    let result = flow.handle_event(BrowserEvent::Navigated(landing)).await;

    assert!(result.is_err(), "a rejected readiness check fails the attempt");
    assert_eq!(
        flow.phase(),
        LoginPhase::BrowserOpen,
        "the user should be able to retry without restarting"
    );
}

#[tokio::test]
async fn partial_landing_url_still_completes() {
    let server = MockServer::start().await;
    mount_apps_ok(&server, 1).await;

    let session = new_session();
    // The page posted the API prefix earlier in the login, so even a
    // relative landing URL (no host to derive the prefix from) completes.
    session
        .set_api_prefix(&format!("{}/console/api", server.uri()), None)
        .expect("prefix");

    let mut flow = LoginFlow::new(session.clone());
    flow.begin();
    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let outcome = flow
        .handle_event(BrowserEvent::Navigated(
            "/apps?access_token=tok-1&refresh_token=ref-1".into(),
        ))
        .await
        .expect("navigated");

    assert!(matches!(outcome, FlowOutcome::Authenticated { .. }));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn stale_cloud_prefix_does_not_survive_custom_login() {
    let server = MockServer::start().await;
    // expect(1) also asserts the readiness check hits the custom host, not
    // the cloud endpoint a stale prefix would point at.
    mount_apps_ok(&server, 1).await;

    let session = new_session();
    // Something read the prefix before login, caching the cloud default.
    assert_eq!(session.api_prefix().expect("prefix"), CLOUD_API_PREFIX);

    let mut flow = LoginFlow::new(session.clone());
    flow.begin();
    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let landing = format!("{}/apps?access_token=tok-1&refresh_token=ref-1", server.uri());
    let outcome = flow
        .handle_event(BrowserEvent::Navigated(landing))
        .await
        .expect("navigated");

    assert!(matches!(outcome, FlowOutcome::Authenticated { .. }));
    assert_eq!(session.instance_type(), InstanceType::Custom);
    assert_eq!(
        session.api_prefix().expect("prefix"),
        format!("{}/console/api", server.uri())
    );
}

#[tokio::test]
async fn cloud_redirect_extracts_tokens_and_marks_cloud() {
    let server = MockServer::start().await;
    mount_apps_ok(&server, 1).await;

    let session = new_session();
    // Point the console prefix at the mock so the readiness check stays
    // local; a same-type login leaves a configured prefix alone.
    session
        .set_api_prefix(&format!("{}/console/api", server.uri()), None)
        .expect("prefix");

    let mut flow = LoginFlow::new(session.clone());
    flow.begin();
    flow.handle_event(BrowserEvent::Message(PageMessage::Cookies {
        cookies: "session=abc".into(),
    }))
    .await
    .expect("cookies");

    let outcome = flow
        .handle_event(BrowserEvent::Navigated(
            "https://cloud.dify.ai/apps?access_token=tok-1&refresh_token=ref-1".into(),
        ))
        .await
        .expect("navigated");

    match outcome {
        FlowOutcome::Authenticated { apps } => assert_eq!(apps.len(), 2),
        other => panic!("expected authenticated outcome, got {:?}", other),
    }
    assert!(session.is_authenticated());
    assert_eq!(session.access_token().as_deref(), Some("tok-1"));
    assert_eq!(session.instance_type(), InstanceType::Cloud);
    assert_eq!(session.base_url(), Some("https://cloud.dify.ai".into()));
}

#[tokio::test]
async fn cloud_landing_marks_instance_as_cloud() {
    // No server here: the landing URL has no token, so extraction never
    // reaches the readiness check.
    let session = new_session();
    let mut flow = LoginFlow::new(session.clone());
    flow.begin();

    let outcome = flow
        .handle_event(BrowserEvent::Navigated(
            "https://cloud.dify.ai/apps".into(),
        ))
        .await
        .expect("navigated");
    assert!(matches!(outcome, FlowOutcome::Pending));
    assert_eq!(flow.phase(), LoginPhase::BrowserOpen);
}
