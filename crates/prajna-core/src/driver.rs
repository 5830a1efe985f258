//! Carrying out session effects against a backend.
//!
//! Hosts with their own event loop call [`perform`] for each request effect (the
//! terminal front end does this on a spawned task). [`run_until_idle`] is the
//! sequential version: one request in flight at a time, follow-ups queued in
//! order, used by the one-shot CLI commands and by tests.

use std::collections::VecDeque;

use tracing::debug;

use crate::api::{ChatBackend, ChatId};
use crate::session::{ApiRequest, ChatSession, Effect, SessionEvent};

/// Issue one request and wrap its outcome as the matching completion event.
pub async fn perform<B: ChatBackend + ?Sized>(backend: &B, generation: u64, request: ApiRequest) -> SessionEvent {
    match request {
        ApiRequest::CreateChat => SessionEvent::ChatCreated {
            generation,
            result: backend.create_chat().await,
        },
        ApiRequest::ListChats => SessionEvent::ChatsListed(backend.list_chats().await),
        ApiRequest::FetchChat(id) => {
            let result = backend.fetch_chat(&id).await;
            SessionEvent::ChatLoaded { id, result }
        }
        ApiRequest::SendMessage { message, chat_id } => SessionEvent::ReplyReceived {
            generation,
            result: backend.send_message(&message, chat_id.as_ref()).await,
        },
        ApiRequest::DeleteChat(id) => {
            let result = backend.delete_chat(&id).await;
            SessionEvent::ChatDeleted { id, result }
        }
        ApiRequest::RenameChat { id, title } => {
            let result = backend.rename_chat(&id, &title).await;
            SessionEvent::ChatRenamed { id, result }
        }
    }
}

/// Run `effects` and everything they lead to. Delete confirmations are answered
/// by `confirm`; the remaining UI effects are returned in the order produced.
pub async fn run_until_idle<B, F>(
    session: &mut ChatSession,
    backend: &B,
    effects: Vec<Effect>,
    mut confirm: F,
) -> Vec<Effect>
where
    B: ChatBackend + ?Sized,
    F: FnMut(&ChatId) -> bool,
{
    let mut queue: VecDeque<Effect> = effects.into();
    let mut surfaced = Vec::new();

    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Request { generation, request } => {
                debug!(?request, generation, "performing request");
                let event = perform(backend, generation, request).await;
                queue.extend(session.handle(event));
            }
            Effect::ConfirmDelete(id) => {
                if confirm(&id) {
                    queue.extend(session.confirm_delete(id));
                } else {
                    debug!(chat_id = %id, "delete cancelled");
                }
            }
            other => surfaced.push(other),
        }
    }

    surfaced
}
