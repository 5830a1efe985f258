//! The chat page's view-model.
//!
//! `ChatSession` owns the only mutable state the chat page has: the active chat,
//! the send guard, the transcript and the last sidebar listing. Every operation
//! mutates it and returns the [`Effect`]s the host must carry out; network
//! completions come back in as [`SessionEvent`]s. Nothing here performs I/O.

mod transcript;

pub use transcript::{Transcript, TranscriptItem};

use tracing::{debug, warn};

use crate::api::{ChatDetail, ChatId, ChatReply, ChatSummary, Message};
use crate::error::ApiError;

pub const DEFAULT_TITLE: &str = "New Conversation";
pub const APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";
pub const EMPTY_SIDEBAR: &str = "No conversations yet.\nStart a new chat!";
pub const DEFAULT_NARROW_WIDTH: u16 = 768;

/// Prompts offered on the welcome screen.
pub const SUGGESTIONS: [&str; 4] = [
    "How do I deal with fear?",
    "What is the purpose of life?",
    "How can I stop overthinking?",
    "What does real freedom mean?",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    CreateChat,
    ListChats,
    FetchChat(ChatId),
    SendMessage { message: String, chat_id: Option<ChatId> },
    DeleteChat(ChatId),
    RenameChat { id: ChatId, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue `request`, then feed the matching completion back through
    /// [`ChatSession::handle`]. `generation` must be echoed unchanged.
    Request { generation: u64, request: ApiRequest },
    /// Ask the user; call [`ChatSession::confirm_delete`] only on yes.
    ConfirmDelete(ChatId),
    ScrollToEnd,
    FocusInput,
}

/// Completion of an [`ApiRequest`].
#[derive(Debug)]
pub enum SessionEvent {
    ChatCreated { generation: u64, result: Result<ChatSummary, ApiError> },
    ReplyReceived { generation: u64, result: Result<ChatReply, ApiError> },
    ChatsListed(Result<Vec<ChatSummary>, ApiError>),
    ChatLoaded { id: ChatId, result: Result<ChatDetail, ApiError> },
    ChatDeleted { id: ChatId, result: Result<(), ApiError> },
    ChatRenamed { id: ChatId, result: Result<String, ApiError> },
}

/// Sidebar contents derived from the last listing and the active chat.
#[derive(Debug, PartialEq)]
pub enum SidebarView<'a> {
    /// Nothing fetched yet.
    Loading,
    /// Fetched, and there are no chats.
    Empty(&'static str),
    Entries(Vec<SidebarEntry<'a>>),
}

#[derive(Debug, PartialEq)]
pub struct SidebarEntry<'a> {
    pub chat: &'a ChatSummary,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    active_chat_id: Option<ChatId>,
    is_sending: bool,
    title: String,
    transcript: Transcript,
    welcome_visible: bool,
    chats: Option<Vec<ChatSummary>>,
    sidebar_open: bool,
    viewport_width: u16,
    narrow_width: u16,
    // Bumped whenever the transcript is cleared or replaced wholesale.
    generation: u64,
    pending_message: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_NARROW_WIDTH)
    }
}

impl ChatSession {
    pub fn new(narrow_width: u16) -> Self {
        Self {
            active_chat_id: None,
            is_sending: false,
            title: DEFAULT_TITLE.to_string(),
            transcript: Transcript::default(),
            welcome_visible: true,
            chats: None,
            sidebar_open: false,
            viewport_width: u16::MAX,
            narrow_width,
            generation: 0,
            pending_message: None,
        }
    }

    pub fn active_chat_id(&self) -> Option<&ChatId> {
        self.active_chat_id.as_ref()
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn is_narrow(&self) -> bool {
        self.viewport_width <= self.narrow_width
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sidebar(&self) -> SidebarView<'_> {
        match &self.chats {
            None => SidebarView::Loading,
            Some(chats) if chats.is_empty() => SidebarView::Empty(EMPTY_SIDEBAR),
            Some(chats) => SidebarView::Entries(
                chats
                    .iter()
                    .map(|chat| SidebarEntry {
                        chat,
                        active: self.active_chat_id.as_ref() == Some(&chat.id),
                    })
                    .collect(),
            ),
        }
    }

    fn request(&self, request: ApiRequest) -> Effect {
        Effect::Request {
            generation: self.generation,
            request,
        }
    }

    // ---- operations ----

    /// Send `text` as a user message, creating a chat first if none is active.
    pub fn submit_message(&mut self, text: &str) -> Vec<Effect> {
        let message = text.trim();
        if message.is_empty() || self.is_sending {
            return Vec::new();
        }
        // Set before anything is awaited, so a second submit is a no-op.
        self.is_sending = true;
        self.welcome_visible = false;
        self.transcript.push(Message::user(message));
        self.transcript.show_typing();

        let request = match &self.active_chat_id {
            Some(id) => ApiRequest::SendMessage {
                message: message.to_string(),
                chat_id: Some(id.clone()),
            },
            None => {
                self.pending_message = Some(message.to_string());
                ApiRequest::CreateChat
            }
        };
        vec![Effect::ScrollToEnd, self.request(request)]
    }

    pub fn ask_suggestion(&mut self, index: usize) -> Vec<Effect> {
        match SUGGESTIONS.get(index) {
            Some(question) => self.submit_message(question),
            None => Vec::new(),
        }
    }

    pub fn load_chat(&mut self, id: ChatId) -> Vec<Effect> {
        vec![self.request(ApiRequest::FetchChat(id))]
    }

    /// Back to the welcome state. Creation is deferred to the next submit.
    pub fn start_new_chat(&mut self) -> Vec<Effect> {
        self.active_chat_id = None;
        self.title = DEFAULT_TITLE.to_string();
        self.transcript.clear();
        self.welcome_visible = true;
        self.generation += 1;
        if self.is_narrow() {
            self.sidebar_open = false;
        }
        vec![Effect::FocusInput]
    }

    pub fn request_delete(&mut self, id: ChatId) -> Vec<Effect> {
        vec![Effect::ConfirmDelete(id)]
    }

    pub fn confirm_delete(&mut self, id: ChatId) -> Vec<Effect> {
        vec![self.request(ApiRequest::DeleteChat(id))]
    }

    pub fn rename_chat(&mut self, id: ChatId, title: &str) -> Vec<Effect> {
        let title = title.trim();
        if title.is_empty() {
            return Vec::new();
        }
        vec![self.request(ApiRequest::RenameChat {
            id,
            title: title.to_string(),
        })]
    }

    pub fn refresh_sidebar(&mut self) -> Vec<Effect> {
        vec![self.request(ApiRequest::ListChats)]
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width;
    }

    // ---- completions ----

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::ChatCreated { generation, result } => self.on_chat_created(generation, result),
            SessionEvent::ReplyReceived { generation, result } => self.on_reply(generation, result),
            SessionEvent::ChatsListed(result) => {
                match result {
                    Ok(chats) => self.chats = Some(chats),
                    Err(err) => warn!(error = %err, "Error loading chat history"),
                }
                Vec::new()
            }
            SessionEvent::ChatLoaded { id, result } => self.on_chat_loaded(id, result),
            SessionEvent::ChatDeleted { id, result } => self.on_chat_deleted(id, result),
            SessionEvent::ChatRenamed { id, result } => {
                match result {
                    Ok(title) => {
                        if self.active_chat_id.as_ref() == Some(&id) {
                            self.title = title;
                        }
                    }
                    Err(err) => {
                        warn!(chat_id = %id, error = %err, "Error renaming chat");
                        return Vec::new();
                    }
                }
                self.refresh_sidebar()
            }
        }
    }

    fn on_chat_created(&mut self, generation: u64, result: Result<ChatSummary, ApiError>) -> Vec<Effect> {
        let Some(message) = self.pending_message.take() else {
            debug!("chat created with no pending message");
            return Vec::new();
        };
        let current = generation == self.generation;

        let chat_id = match result {
            Ok(chat) => {
                if current {
                    self.active_chat_id = Some(chat.id.clone());
                    self.title = chat.title;
                }
                Some(chat.id)
            }
            Err(err) => {
                // Still send; the backend answers chats without an id.
                warn!(error = %err, "Error creating chat");
                None
            }
        };

        vec![Effect::Request {
            generation,
            request: ApiRequest::SendMessage { message, chat_id },
        }]
    }

    fn on_reply(&mut self, generation: u64, result: Result<ChatReply, ApiError>) -> Vec<Effect> {
        self.is_sending = false;
        let mut effects = Vec::new();

        if generation == self.generation {
            let message = match result {
                Ok(reply) => Message::assistant(&reply.answer, reply.sources),
                Err(err) => {
                    warn!(error = %err, application = err.is_application(), "Error sending message");
                    Message::assistant(APOLOGY, Vec::new())
                }
            };
            self.transcript.resolve_typing(message);
            effects.push(Effect::ScrollToEnd);
        } else {
            debug!(generation, current = self.generation, "dropping reply for a replaced transcript");
            if let Err(err) = result {
                warn!(error = %err, "Error sending message");
            }
        }

        effects.extend(self.refresh_sidebar());
        effects
    }

    fn on_chat_loaded(&mut self, id: ChatId, result: Result<ChatDetail, ApiError>) -> Vec<Effect> {
        let chat = match result {
            Ok(chat) => chat,
            Err(err) => {
                warn!(chat_id = %id, error = %err, "Error loading chat");
                return Vec::new();
            }
        };

        self.active_chat_id = Some(id);
        self.title = chat.title;
        self.transcript.replace(chat.messages);
        self.welcome_visible = false;
        self.generation += 1;
        if self.is_narrow() {
            self.sidebar_open = false;
        }

        let mut effects = vec![Effect::ScrollToEnd];
        effects.extend(self.refresh_sidebar());
        effects
    }

    fn on_chat_deleted(&mut self, id: ChatId, result: Result<(), ApiError>) -> Vec<Effect> {
        let mut effects = Vec::new();
        match result {
            Ok(()) => {
                if self.active_chat_id.as_ref() == Some(&id) {
                    effects.extend(self.start_new_chat());
                }
            }
            Err(err) => warn!(chat_id = %id, error = %err, "Error deleting chat"),
        }
        effects.extend(self.refresh_sidebar());
        effects
    }
}
