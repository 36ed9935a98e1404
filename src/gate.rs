//! gate
//!
//! Auth-gated navigation: maps the session's authentication state to the
//! top-level screen the app should show.
//!
//! The primary mechanism is push-based: [`AuthGate`] wraps the session's
//! watch channel, so consumers await `changed()` instead of sampling.
//! [`GatePoller`] remains for hosts that want a fixed-interval re-check on
//! top of that (the channel already covers in-process changes; the poller
//! also picks up credential edits made by another process against the same
//! store file).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::SessionManager;

/// Default interval for [`GatePoller`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The top-level screen selected by the authentication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRoot {
    /// The sign-in screen; shown whenever the session is not authenticated.
    SignIn,
    /// The main authenticated surface.
    Main,
}

impl NavigationRoot {
    /// The root for a given authentication state.
    pub fn for_auth_state(authenticated: bool) -> Self {
        if authenticated {
            NavigationRoot::Main
        } else {
            NavigationRoot::SignIn
        }
    }
}

/// Push-based view of the session's authentication state.
///
/// Cheap to clone; every clone observes the same underlying channel.
#[derive(Debug, Clone)]
pub struct AuthGate {
    rx: watch::Receiver<bool>,
}

impl AuthGate {
    /// Gate a session.
    pub fn new(session: &SessionManager) -> Self {
        Self {
            rx: session.subscribe(),
        }
    }

    /// The root to show right now.
    pub fn current(&self) -> NavigationRoot {
        NavigationRoot::for_auth_state(*self.rx.borrow())
    }

    /// Wait until the authentication state changes, then return the new root.
    ///
    /// Returns `None` if the session manager has been dropped.
    pub async fn changed(&mut self) -> Option<NavigationRoot> {
        self.rx.changed().await.ok()?;
        Some(NavigationRoot::for_auth_state(*self.rx.borrow_and_update()))
    }
}

/// Fixed-interval re-check of the authentication state.
///
/// Spawns a background task that samples the session every `interval` and
/// publishes the result through the session's own watch channel, so gates
/// subscribed to the session see externally-made changes too. The task is
/// aborted on drop; teardown is deterministic.
#[derive(Debug)]
pub struct GatePoller {
    handle: JoinHandle<()>,
}

impl GatePoller {
    /// Start polling with [`DEFAULT_POLL_INTERVAL`].
    pub fn start(session: Arc<SessionManager>) -> Self {
        Self::with_interval(session, DEFAULT_POLL_INTERVAL)
    }

    /// Start polling with an explicit interval.
    pub fn with_interval(session: Arc<SessionManager>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a freshly started
            // poller does not race the caller's own initialization.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let authenticated = session.reload_auth_state();
                debug!(authenticated, "gate poll");
            }
        });
        Self { handle }
    }

    /// Stop the poller.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for GatePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
