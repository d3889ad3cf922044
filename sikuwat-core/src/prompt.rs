//! Chat context assembly for the generative assistant
//!
//! Pulls keywords out of a question, merges retrieved and client-supplied
//! context, and renders the final prompt text.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::knowledge::Detail;

pub const MAX_KEYWORDS: usize = 6;
pub const MAX_CONTEXT_ARTICLES: usize = 8;
pub const MAX_CONTEXT_TIPS: usize = 12;
/// Retrieved article bodies are cut to this many characters
pub const ARTICLE_SUMMARY_CHARS: usize = 500;
pub const TIP_CONTENT_CHARS: usize = 400;
/// Per-entry cap inside the rendered prompt
pub const PROMPT_SNIPPET_CHARS: usize = 300;

const DETAILED_INSTRUCTION: &str =
    "Please answer in a detailed, step-by-step, practical manner in Indonesian.";

static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.,!?;:/()\[\]"']"#).expect("punctuation regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextArticle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl ContextArticle {
    /// Build from a stored article, cutting the body down to a summary
    pub fn retrieved(id: &str, title: &str, content: &str, url: Option<&str>) -> Self {
        Self {
            id: Some(id.to_string()),
            title: title.to_string(),
            summary: truncate_chars(content, ARTICLE_SUMMARY_CHARS).to_string(),
            url: url.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextTip {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContextTip {
    pub fn retrieved(id: &str, title: &str, content: &str, category: Option<&str>) -> Self {
        Self {
            id: Some(id.to_string()),
            title: title.to_string(),
            content: truncate_chars(content, TIP_CONTENT_CHARS).to_string(),
            category: category.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub articles: Vec<ContextArticle>,
    #[serde(default)]
    pub tips: Vec<ContextTip>,
}

impl ChatContext {
    /// Server-found entries first, then the client's; capped and
    /// de-duplicated by id. Entries without an id are always kept.
    pub fn merge(server: ChatContext, client: ChatContext) -> ChatContext {
        let mut seen = HashSet::new();
        let articles = server
            .articles
            .into_iter()
            .chain(client.articles)
            .filter(|a| a.id.as_ref().map_or(true, |id| seen.insert(id.clone())))
            .take(MAX_CONTEXT_ARTICLES)
            .collect();

        let mut seen = HashSet::new();
        let tips = server
            .tips
            .into_iter()
            .chain(client.tips)
            .filter(|t| t.id.as_ref().map_or(true, |id| seen.insert(id.clone())))
            .take(MAX_CONTEXT_TIPS)
            .collect();

        ChatContext { articles, tips }
    }

    pub fn article_titles(&self) -> Vec<&str> {
        self.articles.iter().map(|a| a.title.as_str()).collect()
    }

    pub fn tip_titles(&self) -> Vec<&str> {
        self.tips.iter().map(|t| t.title.as_str()).collect()
    }
}

/// Search terms for context retrieval: punctuation stripped, lowercased,
/// tokens longer than three characters, at most six.
pub fn extract_keywords(message: &str) -> Vec<String> {
    PUNCTUATION_RE
        .replace_all(message, " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 3)
        .take(MAX_KEYWORDS)
        .collect()
}

/// Longest prefix of at most `max` characters, cut on a char boundary
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render the prompt sent to the generative model
pub fn build_prompt(
    system_prompt: Option<&str>,
    context: &ChatContext,
    message: &str,
    detail: Detail,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(system) = system_prompt.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(system.to_string());
    }

    if !context.articles.is_empty() {
        parts.push("Context - Relevant Articles:".to_string());
        for a in &context.articles {
            parts.push(format!(
                "- {}\n{}\n{}",
                a.title,
                truncate_chars(&a.summary, PROMPT_SNIPPET_CHARS),
                a.url.as_deref().unwrap_or_default()
            ));
        }
    }

    if !context.tips.is_empty() {
        parts.push("Context - Relevant Tips:".to_string());
        for t in &context.tips {
            parts.push(format!(
                "- {}: {}",
                t.title,
                truncate_chars(&t.content, PROMPT_SNIPPET_CHARS)
            ));
        }
    }

    parts.push("User question:".to_string());
    parts.push(message.to_string());

    if detail == Detail::Detailed {
        parts.push(DETAILED_INSTRUCTION.to_string());
    }

    parts.join("\n\n")
}
