//! Farming assistant: generative answers with a local knowledge fallback
//!
//! Two entry points:
//! - [`ChatService::quick_reply`]: keyword lookup only, brief answers
//! - [`ChatService::assist`]: retrieval-augmented prompt to the generative
//!   model, falling back to the knowledge base when no key is configured or
//!   the call cannot be completed

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use sikuwat_core::knowledge::{append_references, Detail, KnowledgeBase};
use sikuwat_core::prompt::{build_prompt, extract_keywords, ChatContext, ContextArticle, ContextTip};

use crate::db::{ArticleRepo, TipRepo};

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Clone, Error)]
pub enum AssistantError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("timeout")]
    Timeout,

    /// Upstream answered with a non-success status
    #[error("Generative API error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl AssistantError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Upstream { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Decode(_) => false,
        }
    }

    /// Short cause safe to show to anonymous callers; the full error only
    /// goes to the log
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Transport(_) => "generative API unreachable",
            Self::Timeout => "generative API timed out",
            Self::Upstream { .. } => "generative API error",
            Self::Decode(_) => "unreadable generative API response",
        }
    }
}

/// Text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Assistant request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "systemPrompt", alias = "system_prompt")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub context: ChatContext,
    #[serde(default)]
    pub detail: Detail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// Answer came from the local knowledge base
    #[serde(rename = "isLocal")]
    pub is_local: bool,
    /// Why the generative call was skipped, when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ChatService {
    knowledge: KnowledgeBase,
    generator: Option<Arc<dyn TextGenerator>>,
    retrieve_context: bool,
    system_prompt: Option<String>,
}

impl ChatService {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self {
            knowledge,
            generator: None,
            retrieve_context: true,
            system_prompt: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_retrieval(mut self, enabled: bool) -> Self {
        self.retrieve_context = enabled;
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn quick_reply(&self, message: &str) -> String {
        self.knowledge.quick_reply(message)
    }

    /// Answer a question. Only a non-success upstream status is an error;
    /// every other failure degrades to a local answer.
    pub async fn assist(&self, pool: &PgPool, request: ChatRequest) -> Result<ChatReply, AssistantError> {
        let Some(generator) = &self.generator else {
            debug!("no generative API key, answering locally");
            return Ok(self.local_reply(&request.message, &request.context, request.detail, None));
        };

        let retrieved = if self.retrieve_context {
            retrieve(pool, &request.message).await
        } else {
            ChatContext::default()
        };
        let context = ChatContext::merge(retrieved, request.context);

        let system_prompt = request
            .system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.system_prompt.as_deref());
        let prompt = build_prompt(system_prompt, &context, &request.message, request.detail);

        match generator.generate(&prompt).await {
            Ok(response) => Ok(ChatReply {
                response,
                is_local: false,
                error: None,
            }),
            Err(e @ AssistantError::Upstream { .. }) => Err(e),
            Err(e) => {
                warn!(error = %e, "generative call failed, answering locally");
                let reason = Some(e.reason().to_string());
                Ok(self.local_reply(&request.message, &context, request.detail, reason))
            }
        }
    }

    fn local_reply(
        &self,
        message: &str,
        context: &ChatContext,
        detail: Detail,
        error: Option<String>,
    ) -> ChatReply {
        let mut response = self.knowledge.answer(message, detail);
        append_references(&mut response, &context.article_titles(), &context.tip_titles());
        ChatReply {
            response,
            is_local: true,
            error,
        }
    }
}

/// Articles and tips matching the question's keywords. A failed search for
/// one keyword is logged and skipped.
async fn retrieve(pool: &PgPool, message: &str) -> ChatContext {
    let articles = ArticleRepo::new(pool);
    let tips = TipRepo::new(pool);
    let mut context = ChatContext::default();

    for keyword in extract_keywords(message) {
        let (found_articles, found_tips) =
            futures::join!(articles.search(&keyword), tips.search(&keyword));

        match found_articles {
            Ok(found) => context.articles.extend(found.iter().map(|a| {
                ContextArticle::retrieved(&a.id, &a.title, &a.content, a.url.as_deref())
            })),
            Err(e) => warn!(keyword = %keyword, error = %e, "article search failed"),
        }
        match found_tips {
            Ok(found) => context.tips.extend(found.iter().map(|t| {
                ContextTip::retrieved(&t.id, &t.title, &t.content, Some(&t.category))
            })),
            Err(e) => warn!(keyword = %keyword, error = %e, "tip search failed"),
        }
    }

    debug!(
        articles = context.articles.len(),
        tips = context.tips.len(),
        "retrieved chat context"
    );
    context
}
