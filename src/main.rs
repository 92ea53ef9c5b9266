use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners::Polling;
use tokio::time::{interval, sleep};

use steamdb_bot::cli::{Cli, Commands};
use steamdb_bot::core::{config, init_logger, AppError, Config};
use steamdb_bot::lookup::{LookupOutcome, LookupService, Reply};
use steamdb_bot::steam::{HttpSteamApi, HttpSteamDbScraper};
use steamdb_bot::storage::{cache, create_pool, get_connection, stats, DbPool};
use steamdb_bot::telegram::{create_bot, notify_startup, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::log_file_path())?;

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    log::info!("Setting up database at {}", config.database_path);
    let db_pool = Arc::new(create_pool(&config.database_path).context("Failed to open database")?);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config, db_pool).await,
        Commands::Lookup { query, enrich, json } => run_cli_lookup(&config, db_pool, &query, enrich, json).await,
        Commands::Stats => run_cli_stats(&db_pool),
        Commands::ClearCache { expired } => run_cli_clear_cache(&db_pool, expired),
    }
}

fn build_lookup_service(config: &Config, db_pool: Arc<DbPool>) -> Result<LookupService> {
    let steam = HttpSteamApi::new(&config.steam_api_url, &config.steam_api_key).context("Steam API client")?;
    let steamdb = HttpSteamDbScraper::new(&config.steamdb_scraper_url).context("SteamDB scraper client")?;

    Ok(LookupService::new(
        db_pool,
        Arc::new(steam),
        Arc::new(steamdb),
        config.cache.enrichment_ttl(),
    ))
}

/// Periodically drops expired cache rows. Reads already ignore them; this only
/// keeps the table small.
fn spawn_cache_sweeper(db_pool: Arc<DbPool>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        // first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let result = get_connection(&db_pool)
                .map_err(AppError::from)
                .and_then(|conn| cache::clear_expired(&conn));
            match result {
                Ok(0) => log::debug!("Cache sweep: nothing expired"),
                Ok(removed) => log::info!("Cache sweep removed {} expired entries", removed),
                Err(e) => log::warn!("Cache sweep failed: {}", e),
            }
        }
    });
}

/// Waits for the Bot API to answer `getMe` (a local Bot API server may still be starting).
async fn wait_for_bot_api(bot: &Bot) -> Result<Me> {
    let max_retries = config::retry::MAX_STARTUP_RETRIES;
    let mut attempt = 0;
    loop {
        match bot.get_me().await {
            Ok(me) => return Ok(me),
            Err(e) => {
                attempt += 1;
                if attempt >= max_retries {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} retries: {}",
                        attempt,
                        e
                    ));
                }
                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt,
                    max_retries,
                    e,
                    config::retry::startup_delay()
                );
                sleep(config::retry::startup_delay()).await;
            }
        }
    }
}

async fn run_bot(config: Arc<Config>, db_pool: Arc<DbPool>) -> Result<()> {
    let lookup = Arc::new(build_lookup_service(&config, Arc::clone(&db_pool))?);

    match config.cache.sweep_interval() {
        Some(every) => spawn_cache_sweeper(Arc::clone(&db_pool), every),
        None => log::info!("Cache sweep disabled"),
    }

    let bot = create_bot(&config)?;
    let me = wait_for_bot_api(&bot).await?;
    log::info!("Bot username: @{}, Bot ID: {}", me.username(), me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }
    notify_startup(&bot, &config, Some(me.username())).await;

    let handler = schema(HandlerDeps::new(db_pool, lookup, config));
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    log::info!("Starting polling");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

async fn run_cli_lookup(config: &Config, db_pool: Arc<DbPool>, query: &str, enrich: bool, json: bool) -> Result<()> {
    let lookup = build_lookup_service(config, db_pool)?;

    let outcome = lookup.lookup(query).await;
    let mut replies = vec![Reply::from_lookup(query, &outcome)];

    if enrich {
        if let LookupOutcome::Found(profile) = &outcome {
            let enrichment = lookup.enrich(&profile.steam_id).await;
            replies.push(Reply::from_enrichment(&profile.steam_id, &enrichment));
        }
    }

    for reply in &replies {
        if json {
            println!("{}", serde_json::to_string_pretty(reply)?);
        } else {
            println!("{}\n", reply);
        }
    }
    Ok(())
}

fn run_cli_stats(db_pool: &DbPool) -> Result<()> {
    let conn = get_connection(db_pool)?;
    println!("{}", stats::collect(&conn)?);
    Ok(())
}

fn run_cli_clear_cache(db_pool: &DbPool, expired_only: bool) -> Result<()> {
    let conn = get_connection(db_pool)?;
    let removed = if expired_only {
        cache::clear_expired(&conn)?
    } else {
        cache::clear_all(&conn)?
    };
    println!("Removed {} cache entries", removed);
    Ok(())
}
