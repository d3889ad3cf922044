//! Keyword-matched farming knowledge base
//!
//! Answers the chat when no generative backend is reachable. Topics are
//! plain data (TOML); the first topic with a keyword contained in the
//! lowercased question wins.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SikuwatError};
use crate::validation::sanitize_text;

const BUILTIN: &str = include_str!("../assets/knowledge.toml");

/// How long an answer should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    Brief,
    #[default]
    Detailed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub name: String,
    pub keywords: Vec<String>,
    pub brief: String,
    pub detailed: String,
}

impl Topic {
    pub fn answer(&self, detail: Detail) -> &str {
        match detail {
            Detail::Brief => self.brief.trim(),
            Detail::Detailed => self.detailed.trim(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Fallback {
    greeting: String,
    brief: String,
    /// May contain `{question}` and `{topics}` placeholders
    detailed: String,
}

#[derive(Debug, Clone, Deserialize)]
struct KnowledgeFile {
    fallback: Fallback,
    #[serde(rename = "topic", default)]
    topics: Vec<Topic>,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    topics: Vec<Topic>,
    fallback: Fallback,
}

impl KnowledgeBase {
    /// The knowledge base compiled into the binary
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN).expect("embedded knowledge base is valid")
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SikuwatError::path_not_found(path));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SikuwatError::Toml { source, .. } => {
                SikuwatError::toml(path.display().to_string(), source)
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: KnowledgeFile =
            toml::from_str(content).map_err(|e| SikuwatError::toml("knowledge base", e))?;

        if file.topics.is_empty() {
            return Err(SikuwatError::knowledge("no [[topic]] entries"));
        }

        let mut topics = Vec::with_capacity(file.topics.len());
        for mut topic in file.topics {
            topic.keywords = topic
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();

            if topic.keywords.is_empty() {
                return Err(SikuwatError::knowledge(format!(
                    "topic '{}' has no keywords",
                    topic.name
                )));
            }
            if topic.brief.trim().is_empty() || topic.detailed.trim().is_empty() {
                return Err(SikuwatError::knowledge(format!(
                    "topic '{}' needs both brief and detailed answers",
                    topic.name
                )));
            }
            topics.push(topic);
        }

        Ok(Self {
            topics,
            fallback: file.fallback,
        })
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// First topic whose keyword occurs in the question
    pub fn lookup(&self, question: &str) -> Option<&Topic> {
        let lowered = question.to_lowercase();
        self.topics.iter().find(|t| t.matches(&lowered))
    }

    /// Topic answer, or the generic fallback when nothing matches
    pub fn answer(&self, question: &str, detail: Detail) -> String {
        if let Some(topic) = self.lookup(question) {
            return topic.answer(detail).to_string();
        }

        match detail {
            Detail::Brief => self.fallback.brief.trim().to_string(),
            Detail::Detailed => {
                let topics = self
                    .topics
                    .iter()
                    .map(|t| format!("- {}", t.name))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.fallback
                    .detailed
                    .trim()
                    .replace("{question}", &sanitize_text(question))
                    .replace("{topics}", &topics)
            }
        }
    }

    /// Short reply for the quick chat box; greeting when nothing matches
    pub fn quick_reply(&self, message: &str) -> String {
        match self.lookup(message) {
            Some(topic) => topic.answer(Detail::Brief).to_string(),
            None => self.fallback.greeting.trim().to_string(),
        }
    }
}

/// Append "related articles / useful tips" lines listing titles
pub fn append_references(answer: &mut String, articles: &[&str], tips: &[&str]) {
    if !articles.is_empty() {
        answer.push_str("\n\n**Artikel Terkait**: ");
        answer.push_str(&articles.join(", "));
    }
    if !tips.is_empty() {
        answer.push_str("\n**Tips Berguna**: ");
        answer.push_str(&tips.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_parses() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.topics().len(), 7);
        assert_eq!(kb.topics()[0].name, "Budidaya tanaman");
    }

    #[test]
    fn first_matching_topic_wins() {
        let kb = KnowledgeBase::builtin();
        // "tanaman" (budidaya) precedes "hama" in topic order
        assert_eq!(kb.lookup("hama tanaman cabai").unwrap().name, "Budidaya tanaman");
        assert_eq!(kb.lookup("Bagaimana mengusir ULAT?").unwrap().name, "Hama dan penyakit");
        assert_eq!(kb.lookup("kapan waktu panen").unwrap().name, "Panen");
    }

    #[test]
    fn substring_matching_is_case_insensitive() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.lookup("PEMUPUKAN urea").unwrap().name, "Pemupukan");
        assert!(kb.lookup("selamat pagi").is_none());
    }

    #[test]
    fn detail_selects_answer_length() {
        let kb = KnowledgeBase::builtin();
        let brief = kb.answer("pupuk apa yang bagus", Detail::Brief);
        let detailed = kb.answer("pupuk apa yang bagus", Detail::Detailed);
        assert!(detailed.len() > brief.len());
        assert!(detailed.starts_with("Panduan pemupukan"));
    }

    #[test]
    fn detailed_fallback_echoes_sanitized_question() {
        let kb = KnowledgeBase::builtin();
        let answer = kb.answer("<script>cuaca</script> besok", Detail::Detailed);
        assert!(answer.contains("&lt;script&gt;cuaca"));
        assert!(!answer.contains("<script>"));
        assert!(answer.contains("- Irigasi"));
        assert!(!answer.contains("{topics}"));
    }

    #[test]
    fn quick_reply_greets_on_miss() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.quick_reply("halo").starts_with("Saya asisten pertanian"));
        assert!(kb.quick_reply("cara menanam bibit").starts_with("Siapkan lahan"));
    }

    #[test]
    fn references_are_appended() {
        let mut answer = "Jawaban".to_string();
        append_references(&mut answer, &["Artikel A", "Artikel B"], &["Tip C"]);
        assert_eq!(
            answer,
            "Jawaban\n\n**Artikel Terkait**: Artikel A, Artikel B\n**Tips Berguna**: Tip C"
        );

        let mut tips_only = "Jawaban".to_string();
        append_references(&mut tips_only, &[], &["Tip C"]);
        assert_eq!(tips_only, "Jawaban\n**Tips Berguna**: Tip C");
    }

    #[test]
    fn rejects_topic_without_keywords() {
        let toml = r#"
            [fallback]
            greeting = "hi"
            brief = "b"
            detailed = "d"

            [[topic]]
            name = "Kosong"
            keywords = [" "]
            brief = "b"
            detailed = "d"
        "#;
        let err = KnowledgeBase::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("has no keywords"));
    }

    #[test]
    fn load_from_file_lowercases_keywords() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [fallback]
            greeting = "hi"
            brief = "b"
            detailed = "d"

            [[topic]]
            name = "Kopi"
            keywords = ["Kopi Arabika"]
            brief = "Tanam di dataran tinggi."
            detailed = "Tanam di dataran tinggi dengan naungan."
            "#
        )
        .unwrap();

        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.quick_reply("harga kopi arabika"), "Tanam di dataran tinggi.");
    }

    #[test]
    fn load_missing_file() {
        let err = KnowledgeBase::load(Path::new("/nonexistent/kb.toml")).unwrap_err();
        assert!(matches!(err, SikuwatError::PathNotFound { .. }));
    }
}
