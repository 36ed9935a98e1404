//! cli::commands::apps
//!
//! Apps listing, cached or fresh.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::api::ApiClient;
use crate::cli::Context;
use crate::session::SessionManager;
use crate::ui::output;

/// Run the apps command.
pub async fn apps(ctx: &Context, session: Arc<SessionManager>, refresh: bool) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    if !session.is_authenticated() {
        bail!("not signed in; run 'difyc login' first");
    }

    let apps = if refresh {
        let client = ApiClient::new(session.clone());
        let apps = client.list_apps().await.context("Failed to fetch apps")?;
        session
            .set_cached_apps(&apps)
            .context("Failed to cache apps list")?;
        apps
    } else {
        session.cached_apps()
    };

    if apps.is_empty() {
        output::print(
            "No apps. Try 'difyc apps --refresh' to fetch from the instance.",
            ctx.verbosity,
        );
        return Ok(());
    }

    for app in &apps {
        let mode = app.mode.as_deref().unwrap_or("-");
        println!("{}  {}  {}", app.id, mode, app.name);
    }
    Ok(())
}
