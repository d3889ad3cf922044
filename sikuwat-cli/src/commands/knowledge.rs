//! Knowledge base maintenance: validate a file, list topics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sikuwat_core::knowledge::KnowledgeBase;
use sikuwat_core::SikuwatConfig;

#[derive(Parser, Debug)]
pub struct KnowledgeArgs {
    #[command(subcommand)]
    pub command: KnowledgeCommands,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeCommands {
    /// Validate a knowledge base TOML file
    Check {
        /// File to validate
        file: PathBuf,
    },
    /// List topics and their keywords
    List {
        /// Knowledge base file (default: configured file or built-in set)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub fn run_knowledge(args: KnowledgeArgs, config: &SikuwatConfig) -> Result<()> {
    match args.command {
        KnowledgeCommands::Check { file } => {
            let kb = KnowledgeBase::load(&file)
                .with_context(|| format!("Invalid knowledge base: {}", file.display()))?;
            println!("✓ {} topics in {}", kb.topics().len(), file.display());
            Ok(())
        }
        KnowledgeCommands::List { file } => {
            let kb = match file.as_ref().or(config.assistant.knowledge_file.as_ref()) {
                Some(path) => KnowledgeBase::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => KnowledgeBase::builtin(),
            };
            for topic in kb.topics() {
                println!("{}: {}", topic.name, topic.keywords.join(", "));
            }
            Ok(())
        }
    }
}
