//! cli::commands::status
//!
//! Session status display and sign-out.
//!
//! # Security
//!
//! Status output confirms whether a session exists and which instance it
//! targets. It never prints tokens, cookies, or any part of them.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::session::SessionManager;
use crate::ui::output;

/// Run the status command.
pub async fn status(ctx: &Context, session: Arc<SessionManager>) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    let authenticated = session.is_authenticated();

    if ctx.quiet {
        // Machine-readable output
        if authenticated {
            println!("authenticated");
        } else {
            println!("not_authenticated");
        }
        return Ok(());
    }

    output::print(
        format!(
            "Instance: {} ({})",
            session.instance_type(),
            session.instance_url()
        ),
        ctx.verbosity,
    );

    if authenticated {
        output::print("Signed in: yes", ctx.verbosity);
        let apps = session.cached_apps();
        output::print(format!("Cached apps: {}", apps.len()), ctx.verbosity);
    } else {
        output::print("Signed in: no", ctx.verbosity);
        output::print("Run 'difyc login' to sign in.", ctx.verbosity);
    }

    Ok(())
}

/// Run the logout command.
pub async fn logout(ctx: &Context, session: Arc<SessionManager>) -> Result<()> {
    session.logout().context("Failed to clear session data")?;
    output::print("Signed out.", ctx.verbosity);
    Ok(())
}
