//! Ask command - answer a farming question from the knowledge base
//!
//! Uses the same keyword matching as the `/api/chat` fallback, so an
//! operator can check what farmers get when the generative API is down.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sikuwat_core::knowledge::{Detail, KnowledgeBase};
use sikuwat_core::SikuwatConfig;

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Question, in Indonesian
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Short answer instead of the step-by-step one
    #[arg(long)]
    pub brief: bool,

    /// Knowledge base file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub knowledge: Option<PathBuf>,
}

pub fn run_ask(args: AskArgs, config: &SikuwatConfig) -> Result<()> {
    let question = args.question.join(" ");

    let knowledge = match args.knowledge.as_ref().or(config.assistant.knowledge_file.as_ref()) {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("Failed to load knowledge base from {}", path.display()))?,
        None => KnowledgeBase::builtin(),
    };

    let detail = if args.brief { Detail::Brief } else { Detail::Detailed };
    match knowledge.lookup(&question) {
        Some(topic) => tracing::debug!(topic = %topic.name, "matched topic"),
        None => tracing::debug!("no topic matched, using fallback"),
    }

    println!("{}", knowledge.answer(&question, detail));
    Ok(())
}
