use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::{app_state::AppState, error::AppError};

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Free-form user message. No length or content validation; an absent
    /// field is forwarded upstream with the content key omitted.
    #[serde(default)]
    message: Option<String>,
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(has_message = request.message.is_some(), "Relaying chat message");

    // A fresh token per request; failure here short-circuits before any
    // chat-completion call is attempted.
    let token = state.gigachat.fetch_access_token().await?;

    let answer = state
        .gigachat
        .send_chat(&token, request.message.as_deref())
        .await?;

    tracing::info!("Chat relay complete");

    Ok(Json(answer))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app_state::AppState, gigachat::GigaChatClient};

    /// Build the real router with both upstreams pointed at the mock server.
    fn app(server: &MockServer) -> Router {
        let gigachat = GigaChatClient::new(
            reqwest::Client::new(),
            server.url("/api/v2/oauth"),
            server.url("/api/v1/chat/completions"),
            "rq-uid-1",
            "basic-credential",
        );
        crate::app(std::sync::Arc::new(AppState { gigachat }))
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn read_body(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn happy_path_returns_upstream_body_verbatim() {
        let server = MockServer::start();
        let upstream_body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Привет!" }, "index": 0 }],
            "created": 1700000000,
            "model": "GigaChat"
        });

        let auth_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/oauth")
                .header("RqUID", "rq-uid-1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "access_token": "T" }));
        });
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/completions")
                .header("Authorization", "Bearer T")
                .json_body(json!({
                    "model": "GigaChat",
                    "messages": [{ "role": "user", "content": "hello" }],
                    "stream": false,
                    "repetition_penalty": 1
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(upstream_body.clone());
        });

        let response = app(&server)
            .oneshot(chat_request(r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(body, upstream_body);

        auth_mock.assert();
        chat_mock.assert();
    }

    #[tokio::test]
    async fn auth_failure_yields_500_and_skips_chat_call() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/oauth");
            then.status(401).body(r#"{"message":"Unauthorized"}"#);
        });
        let chat_mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        });

        let response = app(&server)
            .oneshot(chat_request(r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert!(!body.is_empty());

        chat_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn chat_failure_yields_500_with_plain_text_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/oauth");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "access_token": "T" }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/chat/completions");
            then.status(503).body("upstream unavailable");
        });

        let response = app(&server)
            .oneshot(chat_request(r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(read_body(response).await).unwrap();
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn missing_message_field_is_relayed_without_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/oauth");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "access_token": "T" }));
        });
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/completions")
                .json_body(json!({
                    "model": "GigaChat",
                    "messages": [{ "role": "user" }],
                    "stream": false,
                    "repetition_penalty": 1
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "choices": [] }));
        });

        let response = app(&server).oneshot(chat_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        chat_mock.assert();
    }
}
