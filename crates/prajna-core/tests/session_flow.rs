mod support;

use prajna_core::markup::{render_message_html, Citation};
use prajna_core::session::{APOLOGY, DEFAULT_TITLE};
use prajna_core::{
    run_until_idle, ApiError, ChatDetail, ChatId, ChatSession, ChatSummary, Effect, Message, Role, SidebarView,
};
use support::{reply, ScriptedBackend};

fn active_ids(session: &ChatSession) -> Vec<ChatId> {
    match session.sidebar() {
        SidebarView::Entries(entries) => entries.into_iter().filter(|e| e.active).map(|e| e.chat.id.clone()).collect(),
        _ => Vec::new(),
    }
}

fn never(_: &ChatId) -> bool {
    panic!("no confirmation expected")
}

#[tokio::test]
async fn hello_with_no_active_chat_creates_then_sends() {
    let backend = ScriptedBackend::new()
        .with_created(ChatSummary::new(12, DEFAULT_TITLE))
        .with_reply(reply("Hi!", &["Talk A: https://x"]));
    let mut session = ChatSession::default();

    let effects = session.submit_message("Hello");
    let surfaced = run_until_idle(&mut session, &backend, effects, never).await;

    assert_eq!(
        backend.calls(),
        vec!["POST /api/chats", "POST /api/chat 12 Hello", "GET /api/chats"]
    );
    assert_eq!(surfaced, vec![Effect::ScrollToEnd, Effect::ScrollToEnd]);
    assert_eq!(session.active_chat_id(), Some(&ChatId::Number(12)));

    let messages: Vec<&Message> = session.transcript().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    let answer = messages[1];
    assert_eq!(answer.role, Role::Assistant);

    let html = render_message_html(answer);
    assert!(html.contains("<p>Hi!</p>"));
    let citations: Vec<Citation> = answer.sources.iter().map(|s| Citation::parse(s)).collect();
    assert_eq!(citations.len(), 1);
    assert_eq!(citations[0].title, "Talk A");
    assert_eq!(citations[0].href(), "https://x");
    assert!(html.contains(r#"href="https://x""#));

    assert_eq!(active_ids(&session), vec![ChatId::Number(12)]);
}

#[tokio::test]
async fn transport_failure_yields_single_apology() {
    let backend = ScriptedBackend::new()
        .with_created(ChatSummary::new(1, DEFAULT_TITLE))
        .with_reply(Err(ApiError::Transport("connection refused".into())));
    let mut session = ChatSession::default();

    let effects = session.submit_message("Hello");
    run_until_idle(&mut session, &backend, effects, never).await;

    let assistants: Vec<&Message> = session
        .transcript()
        .messages()
        .filter(|m| m.role == Role::Assistant)
        .collect();
    assert_eq!(assistants.len(), 1);
    assert_eq!(assistants[0].content, APOLOGY);
    assert!(assistants[0].sources.is_empty());
    assert!(!render_message_html(assistants[0]).contains("<a "));
    assert!(!session.is_sending());

    // The send control is usable again.
    assert!(!session.submit_message("again").is_empty());
}

#[tokio::test]
async fn blank_submit_makes_no_calls() {
    let backend = ScriptedBackend::new();
    let mut session = ChatSession::default();

    let effects = session.submit_message("  ");
    run_until_idle(&mut session, &backend, effects, never).await;

    assert!(backend.calls().is_empty());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn existing_chat_sends_directly() {
    let backend = ScriptedBackend::new()
        .with_detail(ChatDetail {
            id: ChatId::Number(3),
            title: "Fear".into(),
            messages: vec![Message::user("a"), Message::assistant("b", vec![])],
        })
        .with_chats(vec![ChatSummary::new(3, "Fear")])
        .with_reply(reply("c", &[]));
    let mut session = ChatSession::default();

    let effects = session.load_chat(ChatId::Number(3));
    run_until_idle(&mut session, &backend, effects, never).await;
    let effects = session.submit_message("next");
    run_until_idle(&mut session, &backend, effects, never).await;

    assert_eq!(
        backend.calls(),
        vec!["GET /api/chats/3", "GET /api/chats", "POST /api/chat 3 next", "GET /api/chats"]
    );
    let contents: Vec<&str> = session.transcript().messages().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "b", "next", "c"]);
}

#[tokio::test]
async fn deleting_active_chat_returns_to_welcome() {
    let backend = ScriptedBackend::new()
        .with_detail(ChatDetail { id: ChatId::Number(8), title: "Gone".into(), messages: vec![Message::user("x")] })
        .with_chats(vec![ChatSummary::new(8, "Gone"), ChatSummary::new(9, "Stays")]);
    let mut session = ChatSession::default();

    let effects = session.load_chat(ChatId::Number(8));
    run_until_idle(&mut session, &backend, effects, never).await;
    assert_eq!(active_ids(&session), vec![ChatId::Number(8)]);

    let mut asked = Vec::new();
    let effects = session.request_delete(ChatId::Number(8));
    let surfaced = run_until_idle(&mut session, &backend, effects, |id| {
        asked.push(id.clone());
        true
    })
    .await;

    assert_eq!(asked, vec![ChatId::Number(8)]);
    assert_eq!(surfaced, vec![Effect::FocusInput]);
    assert_eq!(session.active_chat_id(), None);
    assert!(session.transcript().is_empty());
    assert!(session.welcome_visible());
    assert!(active_ids(&session).is_empty());
    assert!(matches!(session.sidebar(), SidebarView::Entries(ref e) if e.len() == 1));
}

#[tokio::test]
async fn declined_delete_does_nothing() {
    let backend = ScriptedBackend::new().with_chats(vec![ChatSummary::new(1, "a")]);
    let mut session = ChatSession::default();

    let effects = session.request_delete(ChatId::Number(1));
    run_until_idle(&mut session, &backend, effects, |_| false).await;

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn missing_chat_load_is_silent() {
    let backend = ScriptedBackend::new();
    let mut session = ChatSession::default();

    let effects = session.load_chat(ChatId::Number(404));
    let surfaced = run_until_idle(&mut session, &backend, effects, never).await;

    assert!(surfaced.is_empty());
    assert_eq!(session.active_chat_id(), None);
    assert!(session.welcome_visible());
}

#[tokio::test]
async fn rename_refreshes_sidebar_titles() {
    let backend = ScriptedBackend::new()
        .with_detail(ChatDetail { id: ChatId::Number(2), title: "Old".into(), messages: vec![] })
        .with_chats(vec![ChatSummary::new(2, "Old")]);
    let mut session = ChatSession::default();

    let effects = session.load_chat(ChatId::Number(2));
    run_until_idle(&mut session, &backend, effects, never).await;
    let effects = session.rename_chat(ChatId::Number(2), "On silence");
    run_until_idle(&mut session, &backend, effects, never).await;

    assert_eq!(session.title(), "On silence");
    match session.sidebar() {
        SidebarView::Entries(entries) => {
            assert_eq!(entries[0].chat.title, "On silence");
            assert!(entries[0].active);
        }
        other => panic!("unexpected sidebar {:?}", other),
    }
}
