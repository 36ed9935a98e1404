//! cli::commands::instance_cmd
//!
//! Instance selection.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::args::InstanceAction;
use crate::cli::Context;
use crate::instance::InstanceType;
use crate::session::SessionManager;
use crate::ui::output;

/// Run the instance command.
///
/// Without a subcommand, shows the current selection. `set` resolves and
/// persists a new one; credentials are left alone, but a session signed in
/// against a different instance will stop working until re-login.
pub async fn instance(
    ctx: &Context,
    session: Arc<SessionManager>,
    action: Option<InstanceAction>,
) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    match action {
        None => {
            output::print(
                format!(
                    "Instance: {} ({})",
                    session.instance_type(),
                    session.instance_url()
                ),
                ctx.verbosity,
            );
            Ok(())
        }
        Some(InstanceAction::Set { kind, domain }) => {
            let instance_type: InstanceType = kind
                .parse()
                .context("Instance kind must be 'cloud' or 'custom'")?;

            session
                .configure_instance(instance_type, domain.as_deref())
                .context("Failed to configure instance")?;

            output::print(
                format!(
                    "Instance set to {} ({}).",
                    session.instance_type(),
                    session.instance_url()
                ),
                ctx.verbosity,
            );
            if session.is_authenticated() {
                output::warn(
                    "existing credentials belong to the previous instance; \
                     run 'difyc login' to sign in here",
                    ctx.verbosity,
                );
            }
            Ok(())
        }
    }
}
