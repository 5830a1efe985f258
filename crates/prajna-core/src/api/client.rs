use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{ChatRequest, RenameRequest, RenameResponse};
use super::{ChatBackend, ChatDetail, ChatId, ChatReply, ChatSummary};
use crate::error::ApiError;

/// `ChatBackend` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/chats/{id}[/{action}]`, with the id encoded as a single path segment.
    fn chat_url(&self, id: &ChatId, action: Option<&str>) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| ApiError::Transport(err.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Transport(format!("{} cannot be used as a base URL", self.base_url)))?;
            segments.pop_if_empty().extend(["api", "chats"]).push(&id.to_string());
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(&self, message: &str, chat_id: Option<&ChatId>) -> Result<ChatReply, ApiError> {
        let url = self.url("/api/chat");
        debug!(%url, chat_id = ?chat_id, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message, chat_id })
            .send()
            .await?;

        decode(response).await
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        let url = self.url("/api/chats");
        debug!(%url, "listing chats");

        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn create_chat(&self) -> Result<ChatSummary, ApiError> {
        let url = self.url("/api/chats");
        debug!(%url, "creating chat");

        let response = self.client.post(&url).send().await?;
        decode(response).await
    }

    async fn fetch_chat(&self, id: &ChatId) -> Result<ChatDetail, ApiError> {
        let url = self.chat_url(id, None)?;
        debug!(%url, "fetching chat");

        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError> {
        let url = self.chat_url(id, None)?;
        debug!(%url, "deleting chat");

        let response = self.client.delete(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // No body is required here, but an error payload still counts.
        if let Ok(value) = serde_json::from_str::<Value>(&body) {
            if let Some(message) = error_message(&value) {
                return Err(ApiError::Backend(message));
            }
        }
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(())
    }

    async fn rename_chat(&self, id: &ChatId, title: &str) -> Result<String, ApiError> {
        let url = self.chat_url(id, Some("rename"))?;
        debug!(%url, "renaming chat");

        let response = self
            .client
            .put(url)
            .json(&RenameRequest { title })
            .send()
            .await?;

        let renamed: RenameResponse = decode(response).await?;
        Ok(renamed.title)
    }
}

/// Read a JSON body, mapping `{"error": ...}` payloads to `ApiError::Backend`
/// whatever the HTTP status was.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Err(err) => return Err(ApiError::Decode(err)),
    };

    if let Some(message) = error_message(&value) {
        return Err(ApiError::Backend(message));
    }

    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), body });
    }

    Ok(serde_json::from_value(value)?)
}

fn error_message(value: &Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    match error {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
