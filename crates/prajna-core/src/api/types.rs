//! Wire shapes exchanged with the chat backend.
//!
//! The backend owns every one of these; the client only ever holds transient copies.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque chat identifier. The backend hands out integers today, but nothing on
/// the client depends on that, so strings are accepted too and echoed back in
/// whatever form they arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Number(n) => write!(f, "{}", n),
            ChatId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ChatId {
    fn from(n: i64) -> Self {
        ChatId::Number(n)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        ChatId::Text(s.to_string())
    }
}

/// Digits become a numeric id, anything else is kept as text.
impl FromStr for ChatId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>().map(ChatId::Number).unwrap_or_else(|_| ChatId::from(s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ChatSummary {
    pub fn new(id: impl Into<ChatId>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry. Assistant content is markdown, user content is plain text.
/// Each source is a `"<title>: <url>"` citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: &str, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            sources,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDetail {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body of `POST /api/chat`. `chat_id` goes out as `null` when no chat is active.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub chat_id: Option<&'a ChatId>,
}

/// Successful body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenameResponse {
    pub title: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
