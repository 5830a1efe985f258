pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod landing;
pub mod markup;
pub mod session;

// Re-export main types for convenience
pub use api::{ChatBackend, ChatDetail, ChatId, ChatReply, ChatSummary, HttpBackend, Message, Role};
pub use config::Config;
pub use driver::{perform, run_until_idle};
pub use error::ApiError;
pub use landing::{LandingController, LandingEffect, LandingLayout, LandingSettings, ScrollSnapshot};
pub use session::{
    ApiRequest, ChatSession, Effect, SessionEvent, SidebarEntry, SidebarView, TranscriptItem, APOLOGY, DEFAULT_TITLE,
    SUGGESTIONS,
};
