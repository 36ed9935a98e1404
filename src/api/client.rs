//! api::client
//!
//! Bearer-authenticated client for the instance REST contract.
//!
//! The endpoint shapes are a fixed external contract (`/apps`, `/parameters`,
//! `/chat-messages`, `/conversations`); this client only attaches credentials
//! and normalizes responses. Tokens come from the session layer via
//! [`TokenSource`], so an expired token is refreshed transparently before the
//! call goes out.
//!
//! There is no automatic retry: transient failures surface to the caller,
//! which decides whether to offer a user-initiated retry.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;

use super::apps::normalize_apps_json;
use super::types::{App, AppParameters, ChatMessageRequest, ChatMessageResponse, Conversation};
use crate::session::{SessionError, SessionManager, TokenSource};

/// User-Agent header for API requests.
const USER_AGENT: &str = "dify-chat";

/// Either of the wire shapes the conversations endpoint has used.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConversationsPayload {
    Wrapped { data: Vec<Conversation> },
    Bare(Vec<Conversation>),
}

/// Fetch the apps list with an explicit bearer token.
///
/// Used both by [`ApiClient::list_apps`] and by the login flow's readiness
/// check, which runs before the session is fully authenticated and so cannot
/// go through [`TokenSource`].
pub async fn fetch_apps(
    http: &Client,
    api_prefix: &str,
    access_token: &str,
) -> Result<Vec<App>, SessionError> {
    let url = format!("{}/apps", api_prefix);
    let response = http
        .get(&url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(AUTHORIZATION, format!("Bearer {}", access_token))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SessionError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let (apps, _migrated) = normalize_apps_json(&body)?;
    Ok(apps)
}

/// Client for the instance REST API.
///
/// Holds the session manager so every call picks up the current API prefix
/// and a valid bearer token.
pub struct ApiClient {
    http: Client,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a client over a session.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            http: Client::new(),
            session,
        }
    }

    /// The session this client draws credentials from.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    async fn bearer(&self) -> Result<String, SessionError> {
        self.session.bearer_token().await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, SessionError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SessionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// List the apps exposed by the instance.
    pub async fn list_apps(&self) -> Result<Vec<App>, SessionError> {
        let prefix = self.session.api_prefix()?;
        let token = self.bearer().await?;
        fetch_apps(&self.http, &prefix, &token).await
    }

    /// Fetch prompt parameters for the selected app context.
    pub async fn get_parameters(&self) -> Result<AppParameters, SessionError> {
        let prefix = self.session.api_prefix()?;
        self.get_json(&format!("{}/parameters", prefix)).await
    }

    /// Send a blocking chat message.
    ///
    /// The first message of a session creates a conversation server-side; the
    /// returned `conversation_id` identifies it either way. Abandoning the
    /// returned future cancels the request.
    pub async fn send_chat_message(
        &self,
        request: &ChatMessageRequest,
    ) -> Result<ChatMessageResponse, SessionError> {
        let prefix = self.session.api_prefix()?;
        let token = self.bearer().await?;

        let response = self
            .http
            .post(format!("{}/chat-messages", prefix))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SessionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// List conversations, newest first as returned by the instance.
    pub async fn list_conversations(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Conversation>, SessionError> {
        let prefix = self.session.api_prefix()?;
        let mut url = format!("{}/conversations", prefix);
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={}", limit));
        }

        let payload: ConversationsPayload = self.get_json(&url).await?;
        Ok(match payload {
            ConversationsPayload::Wrapped { data } => data,
            ConversationsPayload::Bare(list) => list,
        })
    }

    /// Delete a conversation.
    ///
    /// The caller must also drop the conversation from any local mirror; the
    /// instance does not push deletions.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), SessionError> {
        let prefix = self.session.api_prefix()?;
        let token = self.bearer().await?;

        let response = self
            .http
            .delete(format!("{}/conversations/{}", prefix, conversation_id))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
