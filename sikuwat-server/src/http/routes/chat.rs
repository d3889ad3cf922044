//! Chat endpoints: quick keyword replies and the farming assistant

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatReply, ChatRequest};
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct QuickChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct QuickChatResponse {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub success: bool,
    #[serde(flatten)]
    pub reply: ChatReply,
}

fn require_message(message: &str) -> Result<(), ApiError> {
    if message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".into()));
    }
    Ok(())
}

/// POST /chat - knowledge base lookup only
async fn quick_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuickChatRequest>,
) -> Result<Json<QuickChatResponse>, ApiError> {
    require_message(&req.message)?;
    Ok(Json(QuickChatResponse {
        success: true,
        response: state.chat.quick_reply(&req.message),
    }))
}

/// POST /chat/assistant - generative answer with local fallback
async fn assistant(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    require_message(&req.message)?;
    let reply = state.chat.assist(&state.pool, req).await?;
    Ok(Json(AssistantResponse {
        success: true,
        reply,
    }))
}

/// Chat routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(quick_chat))
        .route("/chat/assistant", post(assistant))
}

#[cfg(test)]
mod tests {
    use crate::http::routes::tests::{app, request, send};

    #[tokio::test]
    async fn quick_chat_answers_by_keyword() {
        let (status, body) = send(
            app(),
            request("POST", "/api/chat", None, Some(r#"{"message":"Bagaimana cara mengatasi HAMA?"}"#)),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert!(body["response"].as_str().unwrap().starts_with("Kenali hamanya"));
    }

    #[tokio::test]
    async fn empty_message_is_400() {
        for uri in ["/api/chat", "/api/chat/assistant"] {
            let (status, body) = send(app(), request("POST", uri, None, Some(r#"{"message":"  "}"#))).await;
            assert_eq!(status, 400, "{uri}");
            assert_eq!(body["message"], "Message is required");
        }
    }

    #[tokio::test]
    async fn assistant_without_key_answers_locally() {
        let (status, body) = send(
            app(),
            request(
                "POST",
                "/api/chat/assistant",
                None,
                Some(r#"{"message":"kapan waktu panen?","detail":"brief",
                        "context":{"tips":[{"id":"tip_1","title":"Panen pagi hari"}]}}"#),
            ),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["isLocal"], true);
        assert!(body.get("error").is_none());
        assert!(body["response"]
            .as_str()
            .unwrap()
            .ends_with("\n**Tips Berguna**: Panen pagi hari"));
    }
}
