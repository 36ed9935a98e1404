//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Rehydrates the session from the credential store
//! 2. Calls into the session/API layer to do the work
//! 3. Formats and displays output
//!
//! Handlers never read or write credential keys directly.

mod apps;
mod chat;
mod conversations;
mod instance_cmd;
mod login;
mod status;

pub use apps::apps;
pub use chat::chat;
pub use conversations::conversations;
pub use instance_cmd::instance;
pub use login::login;
pub use status::{logout, status};

use std::sync::Arc;

use anyhow::Result;

use crate::cli::args::Command;
use crate::cli::Context;
use crate::session::SessionManager;

/// Dispatch a command to its handler.
pub async fn dispatch(
    command: Command,
    ctx: &Context,
    session: Arc<SessionManager>,
) -> Result<()> {
    match command {
        Command::Login { no_browser } => login(ctx, session, no_browser).await,
        Command::Status => status(ctx, session).await,
        Command::Logout => logout(ctx, session).await,
        Command::Instance { action } => instance(ctx, session, action).await,
        Command::Apps { refresh } => apps(ctx, session, refresh).await,
        Command::Chat {
            query,
            conversation,
            show_conversation,
        } => chat(ctx, session, &query, conversation, show_conversation).await,
        Command::Conversations { limit, delete } => {
            conversations(ctx, session, limit, delete).await
        }
    }
}
