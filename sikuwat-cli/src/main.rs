//! sikuwat CLI - farmer cooperative service
//!
//! Entry point for:
//! - Running the HTTP API (`serve`) and applying the schema (`migrate`)
//! - Asking the farming knowledge base from the terminal (`ask`)
//! - Checking knowledge base files (`knowledge`)
//! - Managing `~/.sikuwat/config.toml` (`config`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use sikuwat_core::{load_dotenv, SikuwatConfig};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "sikuwat",
    author,
    version,
    about = "Sikuwat farmer cooperative service: market prices, planting log and farming assistant"
)]
struct Cli {
    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (needs the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: ~/.sikuwat/config.toml)
    #[arg(long, global = true, value_name = "FILE", env = "SIKUWAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Answer a farming question from the local knowledge base
    Ask(commands::ask::AskArgs),
    /// Validate or list the chatbot knowledge base
    Knowledge(commands::knowledge::KnowledgeArgs),
    /// Manage sikuwat configuration (init, path, show)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();
    load_dotenv();

    let result = run(cli).await;
    tracing_setup::shutdown_otel();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let explicit = cli.config.as_deref();
    let load = || SikuwatConfig::load(explicit);

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, load()?).await,
        Commands::Migrate(args) => commands::run_migrate(args, &load()?).await,
        Commands::Ask(args) => commands::run_ask(args, &load()?),
        Commands::Knowledge(args) => commands::run_knowledge(args, &load()?),
        Commands::Config(args) => commands::run_config(args, explicit),
        Commands::Completions(args) => run_completions(args),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
