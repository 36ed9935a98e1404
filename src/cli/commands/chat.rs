//! cli::commands::chat
//!
//! Blocking chat messages.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::api::{ApiClient, ChatMessageRequest};
use crate::cli::Context;
use crate::session::SessionManager;
use crate::ui::output;

/// Run the chat command.
pub async fn chat(
    ctx: &Context,
    session: Arc<SessionManager>,
    query: &str,
    conversation: Option<String>,
    show_conversation: bool,
) -> Result<()> {
    session
        .initialize()
        .await
        .context("Failed to load session state")?;

    if !session.is_authenticated() {
        bail!("not signed in; run 'difyc login' first");
    }

    let client = ApiClient::new(session);

    let mut request = ChatMessageRequest::new(query);
    request.conversation_id = conversation;

    let response = client
        .send_chat_message(&request)
        .await
        .context("Failed to send message")?;

    println!("{}", response.answer);
    if show_conversation {
        output::print(
            format!("conversation: {}", response.conversation_id),
            ctx.verbosity,
        );
    }
    Ok(())
}
