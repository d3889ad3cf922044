/// UTF-8 Safety Tests
///
/// Farmers type in Indonesian with emoji and the occasional regional script.
/// Every cut made on user text (prompt snippets, summaries, sanitising)
/// must land on a character boundary or the request handler panics.

use sikuwat_core::prompt::{truncate_chars, PROMPT_SNIPPET_CHARS};
use sikuwat_core::{
    build_prompt, extract_keywords, sanitize_text, ArticleDraft, ChatContext, ContextArticle,
    ContextTip, Detail, KnowledgeBase,
};

#[test]
fn test_truncate_emoji_at_every_position() {
    let text = "🌾🌽🍅🥬🌶️";
    for max in 0..=text.chars().count() + 1 {
        let cut = truncate_chars(text, max);
        assert!(cut.chars().count() <= max);
        assert!(text.starts_with(cut));
    }
}

#[test]
fn test_retrieved_article_summary_with_multibyte_body() {
    // 3-byte characters; a byte-based cut at 500 would split one
    let body = "稻".repeat(700);
    let article = ContextArticle::retrieved("article_x", "Padi", &body, Some("https://contoh.id"));
    assert_eq!(article.summary.chars().count(), 500);
}

#[test]
fn test_tip_content_with_emoji() {
    let body = "Siram pagi 💧".repeat(60);
    let tip = ContextTip::retrieved("tip_x", "Air", &body, None);
    assert_eq!(tip.content.chars().count(), 400);
}

#[test]
fn test_prompt_snippets_with_multibyte_text() {
    let context = ChatContext {
        articles: vec![ContextArticle {
            title: "Hama 🐛".into(),
            summary: "ꦥꦢꦶ".repeat(200),
            ..Default::default()
        }],
        tips: vec![ContextTip {
            title: "Tip 🌱".into(),
            content: "é".repeat(PROMPT_SNIPPET_CHARS * 2),
            ..Default::default()
        }],
    };

    let prompt = build_prompt(None, &context, "Bagaimana? 🤔", Detail::Detailed);
    assert!(prompt.contains(&"é".repeat(PROMPT_SNIPPET_CHARS)));
    assert!(!prompt.contains(&"é".repeat(PROMPT_SNIPPET_CHARS + 1)));
    assert!(prompt.contains("Bagaimana? 🤔"));
}

#[test]
fn test_keywords_from_emoji_message() {
    let kws = extract_keywords("🌾🌾🌾🌾 panen, 🌽!");
    assert_eq!(kws, vec!["🌾🌾🌾🌾", "panen"]);
}

#[test]
fn test_sanitize_caps_multibyte_input() {
    let long = "😀".repeat(12_000);
    let clean = sanitize_text(&long);
    assert_eq!(clean.chars().count(), 10_000);
}

#[test]
fn test_knowledge_fallback_with_emoji_question() {
    let kb = KnowledgeBase::builtin();
    let answer = kb.answer("cuaca besok 🌧️?", Detail::Detailed);
    assert!(answer.contains("cuaca besok 🌧️?"));
}

#[test]
fn test_validation_counts_characters() {
    let article = ArticleDraft {
        title: Some("🌾".repeat(500)),
        content: Some("🌽".repeat(20)),
        ..Default::default()
    };
    assert!(article.validate().is_valid());
}
