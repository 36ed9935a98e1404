//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT touch credentials or the network directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`SessionManager`](crate::session::SessionManager) over the selected
//! credential store, and dispatches to handlers in [`commands`]. All session
//! state changes flow through the session manager.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::session::SessionManager;
use crate::store;
use crate::ui::output::Verbosity;

/// Per-invocation context derived from global flags.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub quiet: bool,
    pub debug: bool,
    pub interactive: bool,
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        quiet: cli.quiet,
        debug: cli.debug,
        interactive: cli.interactive(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    let store =
        store::create_store(&cli.store).context("Failed to initialize credential store")?;
    let session = Arc::new(SessionManager::new(store));

    commands::dispatch(cli.command, &ctx, session).await
}
