pub mod client;
pub mod types;

pub use client::HttpBackend;
pub use types::{ChatDetail, ChatId, ChatReply, ChatSummary, Message, Role};

use async_trait::async_trait;

use crate::error::ApiError;

/// The HTTP/JSON contract the chat page consumes.
///
/// `HttpBackend` is the production implementation; tests substitute scripted fakes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /api/chat`
    async fn send_message(&self, message: &str, chat_id: Option<&ChatId>) -> Result<ChatReply, ApiError>;

    /// `GET /api/chats`
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError>;

    /// `POST /api/chats`
    async fn create_chat(&self) -> Result<ChatSummary, ApiError>;

    /// `GET /api/chats/{id}`
    async fn fetch_chat(&self, id: &ChatId) -> Result<ChatDetail, ApiError>;

    /// `DELETE /api/chats/{id}`
    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError>;

    /// `PUT /api/chats/{id}/rename`, returning the title the backend stored.
    async fn rename_chat(&self, id: &ChatId, title: &str) -> Result<String, ApiError>;
}
