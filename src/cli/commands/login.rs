//! cli::commands::login
//!
//! Interactive sign-in through the hosted login page.
//!
//! # Design
//!
//! The browser does the actual authentication; this command only opens the
//! sign-in page, collects the redirect URL the user lands on, and feeds it
//! through the login state machine. Tokens are never printed.
//!
//! # Example
//!
//! ```bash
//! # Opens the browser, then prompts for the landing URL
//! difyc login
//!
//! # Print the sign-in URL instead of opening a browser
//! difyc login --no-browser
//! ```

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::login::{BrowserEvent, FlowOutcome, LoginFlow, PageMessage};
use crate::session::SessionManager;
use crate::ui::{output, prompts};

/// Run the login command.
pub async fn login(ctx: &Context, session: Arc<SessionManager>, no_browser: bool) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    if session.is_authenticated() {
        output::print(
            "Already signed in; continuing will replace the current session.",
            ctx.verbosity,
        );
    }

    let mut flow = LoginFlow::new(session.clone());
    let sign_in_url = flow.begin();

    if no_browser {
        output::print(format!("Sign in at: {}", sign_in_url), ctx.verbosity);
    } else {
        output::print(
            format!("Opening sign-in page: {}", sign_in_url),
            ctx.verbosity,
        );
        if let Err(e) = open::that(&sign_in_url) {
            output::warn(
                format!("could not open browser ({}); open the URL manually", e),
                ctx.verbosity,
            );
        }
    }

    let redirect = prompts::input(
        "Paste the URL you landed on after signing in (blank to cancel)",
        ctx.interactive,
    )
    .context("Login requires an interactive terminal")?;

    if redirect.is_empty() {
        flow.handle_event(BrowserEvent::Closed).await?;
        bail!("login cancelled");
    }

    // The cookie header is a separate channel from the redirect URL; some
    // deployments need it for session validity.
    let cookies = prompts::input(
        "Paste the session cookie header (press Enter to skip)",
        ctx.interactive,
    )
    .context("Login requires an interactive terminal")?;
    if !cookies.is_empty() {
        flow.handle_event(BrowserEvent::Message(PageMessage::Cookies { cookies }))
            .await
            .context("Failed to store session cookies")?;
    }

    match flow
        .handle_event(BrowserEvent::Navigated(redirect))
        .await
        .context("Login verification failed")?
    {
        FlowOutcome::Authenticated { apps } => {
            output::print(
                format!("Signed in. {} app(s) available.", apps.len()),
                ctx.verbosity,
            );
            Ok(())
        }
        FlowOutcome::Pending => {
            bail!(
                "that URL does not look like a completed sign-in redirect \
                 (expected a URL on the /apps page carrying an access_token)"
            )
        }
        FlowOutcome::Cancelled => bail!("login cancelled"),
    }
}
