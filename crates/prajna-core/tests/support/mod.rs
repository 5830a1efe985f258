#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use prajna_core::{ApiError, ChatBackend, ChatDetail, ChatId, ChatReply, ChatSummary};

/// A backend that answers from scripted queues and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<VecDeque<Result<ChatSummary, ApiError>>>,
    pub replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    pub chats: Mutex<Vec<ChatSummary>>,
    pub details: Mutex<Vec<ChatDetail>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created(self, chat: ChatSummary) -> Self {
        self.created.lock().unwrap().push_back(Ok(chat));
        self
    }

    pub fn with_reply(self, reply: Result<ChatReply, ApiError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_chats(self, chats: Vec<ChatSummary>) -> Self {
        *self.chats.lock().unwrap() = chats;
        self
    }

    pub fn with_detail(self, detail: ChatDetail) -> Self {
        self.details.lock().unwrap().push(detail);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn reply(answer: &str, sources: &[&str]) -> Result<ChatReply, ApiError> {
    Ok(ChatReply {
        answer: answer.to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
        chat_id: None,
    })
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send_message(&self, message: &str, chat_id: Option<&ChatId>) -> Result<ChatReply, ApiError> {
        let id = chat_id.map(|id| id.to_string()).unwrap_or_else(|| "null".into());
        self.record(format!("POST /api/chat {} {}", id, message));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted reply".into())))
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        self.record("GET /api/chats".into());
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn create_chat(&self) -> Result<ChatSummary, ApiError> {
        self.record("POST /api/chats".into());
        let created = self
            .created
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted chat".into())));
        if let Ok(chat) = &created {
            self.chats.lock().unwrap().insert(0, chat.clone());
        }
        created
    }

    async fn fetch_chat(&self, id: &ChatId) -> Result<ChatDetail, ApiError> {
        self.record(format!("GET /api/chats/{}", id));
        self.details
            .lock()
            .unwrap()
            .iter()
            .find(|d| &d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Backend("Chat not found".into()))
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError> {
        self.record(format!("DELETE /api/chats/{}", id));
        self.chats.lock().unwrap().retain(|c| &c.id != id);
        Ok(())
    }

    async fn rename_chat(&self, id: &ChatId, title: &str) -> Result<String, ApiError> {
        self.record(format!("PUT /api/chats/{}/rename {}", id, title));
        for chat in self.chats.lock().unwrap().iter_mut() {
            if &chat.id == id {
                chat.title = title.to_string();
            }
        }
        Ok(title.to_string())
    }
}
