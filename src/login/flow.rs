//! login::flow
//!
//! Embedded-browser login state machine.
//!
//! # Phases
//!
//! - **Idle**: no login in progress.
//! - **BrowserOpen**: the hosted sign-in page is showing; every navigation
//!   event is inspected for the post-login landing redirect.
//! - **Extracting**: a landing redirect was seen; tokens are being pulled out
//!   and the readiness check is in flight.
//!
//! The "process the redirect exactly once" guard is not a boolean flag: it is
//! the transition precondition that Extracting is only entered from
//! BrowserOpen. A duplicate navigation callback for the same redirect finds
//! the machine already past BrowserOpen and is ignored.
//!
//! # Side channel
//!
//! The hosted page may also post in-page messages carrying a cookie string or
//! API-prefix hints. Those are applied to the session in any phase and do not
//! participate in the guard.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::api::types::App;
use crate::api::fetch_apps;
use crate::instance::{InstanceType, CLOUD_HOST, LANDING_PATH};
use crate::session::{SessionError, SessionManager};

/// Where the login state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    /// No login in progress.
    #[default]
    Idle,
    /// The hosted sign-in page is open; watching navigation events.
    BrowserOpen,
    /// Landing redirect seen; extracting tokens and checking readiness.
    Extracting,
}

/// An event reported by the embedded browser.
#[derive(Debug, Clone)]
pub enum BrowserEvent {
    /// The browser navigated to (or reported) a URL. May be partial or
    /// relative on some browsers.
    Navigated(String),
    /// The hosted page posted an in-page message.
    Message(PageMessage),
    /// The user closed the browser.
    Closed,
}

/// In-page messages the hosted login page may post.
#[derive(Clone)]
pub enum PageMessage {
    /// Raw cookie header for the session.
    Cookies { cookies: String },
    /// API prefix hints for the instance.
    ApiPrefix {
        api_prefix: String,
        public_api_prefix: Option<String>,
    },
}

// Cookie values are credentials; keep them out of Debug output.
impl std::fmt::Debug for PageMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageMessage::Cookies { .. } => f.write_str("PageMessage::Cookies([REDACTED])"),
            PageMessage::ApiPrefix {
                api_prefix,
                public_api_prefix,
            } => f
                .debug_struct("PageMessage::ApiPrefix")
                .field("api_prefix", api_prefix)
                .field("public_api_prefix", public_api_prefix)
                .finish(),
        }
    }
}

/// What a handled event amounted to.
#[derive(Debug)]
pub enum FlowOutcome {
    /// Nothing conclusive yet; keep feeding events.
    Pending,
    /// The user cancelled; the machine is back at Idle.
    Cancelled,
    /// Login completed; the session is authenticated and the fetched apps
    /// list has been cached.
    Authenticated { apps: Vec<App> },
}

/// Drives an embedded-browser login and hands extracted artifacts to the
/// session manager.
#[derive(Debug)]
pub struct LoginFlow {
    session: Arc<SessionManager>,
    http: reqwest::Client,
    phase: LoginPhase,
}

impl LoginFlow {
    /// Create an idle flow over a session.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            http: reqwest::Client::new(),
            phase: LoginPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    /// Start a login attempt: returns the sign-in URL the embedded browser
    /// should navigate to and arms the navigation watcher.
    pub fn begin(&mut self) -> String {
        self.phase = LoginPhase::BrowserOpen;
        self.session.sign_in_url()
    }

    /// Feed one browser event through the state machine.
    ///
    /// # Errors
    ///
    /// A failed readiness check surfaces as an error and leaves the browser
    /// phase armed so the user can retry the attempt; persistence failures on
    /// credential writes propagate as-is.
    pub async fn handle_event(&mut self, event: BrowserEvent) -> Result<FlowOutcome, SessionError> {
        match event {
            BrowserEvent::Message(message) => {
                self.apply_message(message)?;
                Ok(FlowOutcome::Pending)
            }
            BrowserEvent::Closed => {
                self.phase = LoginPhase::Idle;
                Ok(FlowOutcome::Cancelled)
            }
            BrowserEvent::Navigated(url) => {
                // Only enter Extracting from BrowserOpen: this precondition is
                // the one-shot guard against duplicate redirect callbacks.
                if self.phase != LoginPhase::BrowserOpen {
                    debug!(phase = ?self.phase, "ignoring navigation event");
                    return Ok(FlowOutcome::Pending);
                }
                if !is_landing(&url) {
                    return Ok(FlowOutcome::Pending);
                }

                self.phase = LoginPhase::Extracting;
                match self.extract(&url).await {
                    Ok(Some(apps)) => {
                        self.phase = LoginPhase::Idle;
                        Ok(FlowOutcome::Authenticated { apps })
                    }
                    Ok(None) => {
                        // Landing URL carried no token; keep watching.
                        self.phase = LoginPhase::BrowserOpen;
                        Ok(FlowOutcome::Pending)
                    }
                    Err(e) => {
                        // Hard failure for this attempt; the browser stays
                        // open so the user can retry.
                        self.phase = LoginPhase::BrowserOpen;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Apply a side-channel message. Independent of the navigation guard.
    fn apply_message(&self, message: PageMessage) -> Result<(), SessionError> {
        match message {
            PageMessage::Cookies { cookies } => self.session.set_cookies(&cookies),
            PageMessage::ApiPrefix {
                api_prefix,
                public_api_prefix,
            } => self
                .session
                .set_api_prefix(&api_prefix, public_api_prefix.as_deref()),
        }
    }

    /// Pull tokens out of a landing URL and run the readiness check.
    ///
    /// Returns `Ok(None)` when the URL carried no access token.
    async fn extract(&self, url: &str) -> Result<Option<Vec<App>>, SessionError> {
        let access_token = match query_param(url, "access_token") {
            Some(token) => token,
            None => return Ok(None),
        };
        let refresh_token = query_param(url, "refresh_token").unwrap_or_default();

        self.session.set_auth_tokens(&access_token, &refresh_token)?;

        // The redirect hostname tells us which kind of instance signed us in.
        let instance_type = match host_of(url) {
            Some(host) if host == CLOUD_HOST => InstanceType::Cloud,
            Some(_) => InstanceType::Custom,
            None => self.session.instance_type(),
        };
        self.session.set_instance_type(instance_type)?;

        if let Some(origin) = origin_of(url) {
            self.session.set_base_url(&origin)?;
            // A custom instance fresh out of login has no prefix configured
            // yet unless the page posted one; derive it from the origin.
            if self.session.api_prefix().is_err() {
                self.session
                    .set_api_prefix(&format!("{}/console/api", origin), None)?;
            }
        }

        // Readiness check: one authenticated GET against the apps list. A
        // failure here fails this attempt; success doubles as the first
        // apps fetch.
        let prefix = self.session.api_prefix()?;
        let apps = fetch_apps(&self.http, &prefix, &access_token).await?;
        self.session.set_cached_apps(&apps)?;

        Ok(Some(apps))
    }
}

/// Does this URL look like the post-login landing redirect?
///
/// Parses properly when possible; falls back to substring containment for
/// browsers that report partial or relative URLs.
fn is_landing(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path() == LANDING_PATH,
        Err(_) => url.contains(LANDING_PATH),
    }
}

/// Read a query parameter, tolerating unparsable URLs.
fn query_param(url: &str, name: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned());
    }

    // Manual fallback: no percent-decoding, which is fine for the token
    // alphabet the hosted login actually emits.
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// Hostname of a URL, if recoverable.
fn host_of(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(str::to_string),
        Err(_) => {
            let rest = url.split_once("://")?.1;
            let host_port = rest.split(['/', '?', '#']).next()?;
            let host = host_port.split(':').next()?;
            (!host.is_empty()).then(|| host.to_string())
        }
    }
}

/// Origin (`scheme://host[:port]`) of a URL, if recoverable.
fn origin_of(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let origin = parsed.origin();
            origin.is_tuple().then(|| origin.ascii_serialization())
        }
        Err(_) => {
            let (scheme, rest) = url.split_once("://")?;
            let host_port = rest.split(['/', '?', '#']).next()?;
            (!host_port.is_empty()).then(|| format!("{}://{}", scheme, host_port))
        }
    }
}
