use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use shopmate::catalog::CatalogClient;
use shopmate::chat::ChatOrchestrator;
use shopmate::config::{Config, Credentials};
use shopmate::llm::GeminiClient;
use shopmate::prompt::load_system_instruction;
use shopmate::server::{self, AppState};
use shopmate::tools::ToolRegistry;

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// Wire the model client, catalog and tools together from resolved config
fn build_orchestrator(config: &Config) -> Result<ChatOrchestrator> {
    let credentials = Credentials::from_env(config).context("Failed to resolve credentials")?;

    let llm = GeminiClient::new(&config.llm, credentials.gemini_api_key.clone())
        .context("Failed to create model client")?;
    let catalog = CatalogClient::new(&config.catalog, &credentials).context("Failed to create catalog client")?;
    let tools = ToolRegistry::standard(Arc::new(catalog));
    let system_instruction = load_system_instruction(&config.prompt).context("Failed to load system instruction")?;

    info!(
        "Model {} with tools {:?}, catalog {} ({:?})",
        config.llm.model,
        tools.tool_names(),
        credentials.store_domain,
        config.catalog.source
    );
    Ok(ChatOrchestrator::new(Arc::new(llm), tools, system_instruction))
}

async fn run_application(cli: &Cli, mut config: Config) -> Result<()> {
    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => serve(config).await,
        Some(Commands::Serve { bind }) => {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
            serve(config).await
        }
        Some(Commands::Ask { message }) => ask(&config, message).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let orchestrator = build_orchestrator(&config)?;
    println!(
        "{} http://{}{}",
        "Serving chat on".green(),
        config.server.bind,
        config.server.path
    );
    server::start_server(&config.server, AppState::new(orchestrator))
        .await
        .context("Server failed")?;
    Ok(())
}

async fn ask(config: &Config, message: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let reply = orchestrator
        .reply(Some(message), Vec::new())
        .await
        .context("Chat request failed")?;

    println!("{}", reply.text);
    if let Some(tool) = &reply.tool_used {
        println!("{} {}", "tool:".cyan(), tool);
    }
    println!(
        "{} {} in / {} out",
        "tokens:".cyan(),
        reply.usage.input_tokens,
        reply.usage.output_tokens
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the real environment may already carry the secrets
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.is_verbose());

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env: {}", e),
    }

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting shopmate");
    run_application(&cli, config).await
}
