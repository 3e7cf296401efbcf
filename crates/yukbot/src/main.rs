use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

use yukbot::cli::{Cli, Commands};
use yukbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TeloxideTransport};
use yukcore::core::{init_logger, log_startup_configuration};
use yukcore::{
    config, BroadcastDispatcher, Conversation, Engine, FlowSettings, SnapshotStore, UserRegistry, VerificationCodes,
};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, snapshot, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::Stats) => print_stats(),
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(false).await
        }
    }
}

fn open_registry() -> Result<UserRegistry> {
    let store = SnapshotStore::new(config::DATA_FILE.as_str());
    let registry = UserRegistry::open(store, *config::storage::DAILY_RETENTION_DAYS)
        .with_context(|| format!("Failed to load snapshot {}", config::DATA_FILE.as_str()))?;
    Ok(registry)
}

/// Prints registry counters without starting the bot
fn print_stats() -> Result<()> {
    let registry = open_registry()?;
    let today = chrono::Local::now().date_naive();

    println!("📊 Yukbot statistics ({})", config::DATA_FILE.as_str());
    println!("Total users:   {}", registry.total_users());
    println!("Blocked users: {}", registry.blocked_count());
    println!("Active today:  {} ({})", registry.active_count(today), today);
    Ok(())
}

async fn run_bot(use_webhook: bool) -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");
    log_startup_configuration();

    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let registry = open_registry()?;
    log::info!(
        "Loaded {} known user(s), {} blocked",
        registry.total_users(),
        registry.blocked_count()
    );

    let conversation = Conversation::new(registry, VerificationCodes::new(), FlowSettings::from_env());
    let engine = Engine::new(conversation, BroadcastDispatcher::new(config::broadcast::pacing()));
    let handler_deps = HandlerDeps::new(engine, TeloxideTransport::new(bot.clone()));

    let handler = schema(handler_deps);

    let webhook_url = if use_webhook { config::WEBHOOK_URL.clone() } else { None };
    if use_webhook && webhook_url.is_none() {
        log::warn!("--webhook given but WEBHOOK_URL is not set, falling back to long polling");
    }

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build();

    log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());

    if let Some(url) = webhook_url {
        let addr: SocketAddr = format!("{}:{}", config::server::HOST.as_str(), *config::server::PORT)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HOST/PORT: {}", e))?;
        let url = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid WEBHOOK_URL: {}", e))?;

        log::info!("Starting bot in webhook mode at {} (listening on {})", url, addr);
        let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;

        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    } else {
        log::info!("Starting bot in long polling mode");
        if let Err(e) = bot.delete_webhook().await {
            log::warn!("Failed to delete webhook: {}", e);
        }
        dispatcher.dispatch().await;
    }

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
