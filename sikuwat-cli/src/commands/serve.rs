//! HTTP server command
//!
//! Wires the configured database, platform clients and assistant into the
//! server and runs it until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sikuwat_core::config::{AssistantConfig, PlatformConfig};
use sikuwat_core::knowledge::KnowledgeBase;
use sikuwat_core::SikuwatConfig;
use sikuwat_server::auth::{AuthProvider, PlatformAuth};
use sikuwat_server::chat::{ChatService, GeminiClient};
use sikuwat_server::db::{create_lazy_pool, migrations};
use sikuwat_server::http::{run_server, AppState, ServerConfig};
use sikuwat_server::storage::PlatformStorage;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow any CORS origin even if origins are configured
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Serve the built client from this directory at `/`
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Skip running migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Knowledge base from the configured file, or the built-in one
pub fn load_knowledge(config: &AssistantConfig) -> Result<KnowledgeBase> {
    match &config.knowledge_file {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("Failed to load knowledge base from {}", path.display())),
        None => Ok(KnowledgeBase::builtin()),
    }
}

fn chat_service(config: &AssistantConfig) -> Result<ChatService> {
    let knowledge = load_knowledge(config)?;
    tracing::info!(topics = knowledge.topics().len(), "knowledge base loaded");

    let mut chat = ChatService::new(knowledge)
        .with_retrieval(config.retrieve_context)
        .with_system_prompt(config.system_prompt.clone());

    match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            let client = GeminiClient::new(key, config).context("Failed to build generative API client")?;
            tracing::info!(model = %config.model, "generative assistant enabled");
            chat = chat.with_generator(Arc::new(client));
        }
        None => tracing::warn!("no generative API key, assistant answers from the knowledge base"),
    }
    Ok(chat)
}

fn platform_clients(config: &PlatformConfig) -> Result<(Arc<dyn AuthProvider>, Option<PlatformStorage>)> {
    let url = config
        .url
        .as_deref()
        .context("Platform URL not set. Set SUPABASE_URL or [platform].url in the config")?;
    let anon_key = config
        .anon_key
        .clone()
        .context("Platform anon key not set. Set SUPABASE_ANON_KEY or [platform].anon_key")?;

    let auth = PlatformAuth::new(url, anon_key, config.service_role_key.clone())
        .context("Failed to build platform auth client")?;

    let storage = match &config.service_role_key {
        Some(key) => Some(
            PlatformStorage::new(url, key.clone(), config.storage_bucket.clone())
                .context("Failed to build platform storage client")?,
        ),
        None => {
            tracing::warn!("no service role key, sign-up and image uploads are disabled");
            None
        }
    };

    Ok((Arc::new(auth), storage))
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: SikuwatConfig) -> Result<()> {
    let database_url = args
        .database_url
        .or(config.database.url.clone())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.sikuwat/.env")?;

    let pool = create_lazy_pool(&database_url, config.database.max_connections)
        .context("Invalid database URL")?;

    if !args.no_migrate {
        migrations::run(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let (auth, storage) = platform_clients(&config.platform)?;
    let chat = chat_service(&config.assistant)?;

    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_origins: if args.cors_permissive {
            Vec::new()
        } else {
            config.server.cors_origins.clone()
        },
        static_dir: args.static_dir.or(config.server.static_dir.clone()),
    };

    tracing::info!("Starting sikuwat server on {}", server_config.bind_addr);

    let state = AppState {
        pool,
        auth,
        chat,
        storage,
    };

    // Blocks until shutdown
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
