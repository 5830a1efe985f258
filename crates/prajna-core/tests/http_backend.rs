use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use prajna_core::{ApiError, ChatBackend, ChatId, HttpBackend, Role};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn chat(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let message = body["message"].as_str().unwrap_or_default();
    match message {
        "" => (StatusCode::BAD_REQUEST, Json(json!({"error": "Message is required"}))),
        "boom" => (StatusCode::OK, Json(json!({"error": "Error calling LLM"}))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "answer": format!("You said: {}", message),
                "sources": ["Talk A: https://x"],
                "chat_id": body["chat_id"],
            })),
        ),
    }
}

async fn list() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "<b>Fear</b>", "created_at": "2024-05-01 10:00:00", "updated_at": "2024-05-02 09:00:00"},
        {"id": 2, "title": "New Conversation", "created_at": "2024-05-03 10:00:00", "updated_at": "2024-05-03 10:00:00"}
    ]))
}

async fn create() -> Json<Value> {
    Json(json!({"id": 3, "title": "New Conversation"}))
}

async fn detail(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Chat not found"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 1,
            "title": "Fear",
            "created_at": "2024-05-01 10:00:00",
            "messages": [
                {"id": 10, "role": "user", "content": "Why fear?", "sources": [], "created_at": "t"},
                {"id": 11, "role": "assistant", "content": "*Look*", "sources": ["Talk B: https://y"], "created_at": "t"}
            ]
        })),
    )
}

async fn delete(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({"success": true}))
}

async fn rename(Path(_id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let title = body["title"].as_str().unwrap_or("Untitled").to_string();
    Json(json!({"success": true, "title": title}))
}

fn app() -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chats", get(list).post(create))
        .route("/api/chats/{id}", get(detail).delete(delete))
        .route("/api/chats/{id}/rename", put(rename))
}

#[tokio::test]
async fn full_contract_round_trip() {
    let backend = HttpBackend::new(&serve(app()).await);

    let chats = backend.list_chats().await.unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].id, ChatId::Number(1));
    assert_eq!(chats[0].title, "<b>Fear</b>");
    assert_eq!(chats[0].updated_at.as_deref(), Some("2024-05-02 09:00:00"));

    let created = backend.create_chat().await.unwrap();
    assert_eq!(created.id, ChatId::Number(3));

    let reply = backend.send_message("Hello", Some(&created.id)).await.unwrap();
    assert_eq!(reply.answer, "You said: Hello");
    assert_eq!(reply.sources, vec!["Talk A: https://x".to_string()]);
    assert_eq!(reply.chat_id, Some(ChatId::Number(3)));

    let detail = backend.fetch_chat(&ChatId::Number(1)).await.unwrap();
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages[1].role, Role::Assistant);
    assert_eq!(detail.messages[1].sources, vec!["Talk B: https://y".to_string()]);

    backend.delete_chat(&ChatId::Number(1)).await.unwrap();
    assert_eq!(backend.rename_chat(&ChatId::Number(2), "Silence").await.unwrap(), "Silence");
}

#[tokio::test]
async fn send_without_chat_id_sends_null() {
    let backend = HttpBackend::new(&serve(app()).await);
    let reply = backend.send_message("Hi", None).await.unwrap();
    assert_eq!(reply.chat_id, None);
}

#[tokio::test]
async fn error_payloads_are_application_errors() {
    let backend = HttpBackend::new(&serve(app()).await);

    let err = backend.send_message("boom", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Backend(ref m) if m == "Error calling LLM"));

    // 4xx with an error body is still classified by its payload.
    let err = backend.send_message("", None).await.unwrap_err();
    assert!(err.is_application());

    let err = backend.fetch_chat(&ChatId::Number(99)).await.unwrap_err();
    assert!(matches!(err, ApiError::Backend(ref m) if m == "Chat not found"));
}

#[tokio::test]
async fn non_json_failures_are_transport_class() {
    let router = Router::new()
        .route("/api/chats", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }))
        .route("/api/chat", post(|| async { "<html>not json</html>" }));
    let backend = HttpBackend::new(&serve(router).await);

    let err = backend.list_chats().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 502, .. }));
    assert!(!err.is_application());

    let err = backend.send_message("Hello", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://{}", addr));
    let err = backend.list_chats().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

async fn rename_echo_id(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let title = body["title"].as_str().unwrap_or_default();
    Json(json!({"success": true, "title": format!("{} -> {}", id, title)}))
}

#[tokio::test]
async fn text_ids_with_reserved_characters_stay_one_segment() {
    let router = Router::new().route("/api/chats/{id}/rename", put(rename_echo_id));
    let backend = HttpBackend::new(&serve(router).await);

    let title = backend.rename_chat(&ChatId::from("a/b?c#d"), "Quiet").await.unwrap();
    assert_eq!(title, "a/b?c#d -> Quiet");
}
