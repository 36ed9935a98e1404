//! cli::commands::conversations
//!
//! Conversation listing and deletion.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use chrono::DateTime;

use crate::api::ApiClient;
use crate::cli::Context;
use crate::session::SessionManager;
use crate::ui::output;

/// Run the conversations command.
pub async fn conversations(
    ctx: &Context,
    session: Arc<SessionManager>,
    limit: Option<u32>,
    delete: Option<String>,
) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    if !session.is_authenticated() {
        bail!("not signed in; run 'difyc login' first");
    }

    let client = ApiClient::new(session);

    if let Some(id) = delete {
        client
            .delete_conversation(&id)
            .await
            .context("Failed to delete conversation")?;
        output::print(format!("Deleted conversation {}.", id), ctx.verbosity);
        return Ok(());
    }

    let conversations = client
        .list_conversations(limit)
        .await
        .context("Failed to list conversations")?;

    if conversations.is_empty() {
        output::print("No conversations.", ctx.verbosity);
        return Ok(());
    }

    for conv in &conversations {
        let when = DateTime::from_timestamp(conv.updated_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = if conv.name.is_empty() {
            "(untitled)"
        } else {
            conv.name.as_str()
        };
        println!("{}  {}  {}", conv.id, when, name);
    }
    Ok(())
}
