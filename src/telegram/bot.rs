//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "SteamDB bot commands:")]
pub enum Command {
    #[command(description = "what this bot does")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "cache, registry and log statistics (admin only)")]
    Stats,
    #[command(description = "drop every cache entry (admin only)")]
    Clearcache,
    #[command(description = "drop expired cache entries (admin only)")]
    Clearexpired,
    #[command(description = "run a read-only SQL query (admin only)")]
    Sql(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::telegram_timeout()).build()?;
    let bot = Bot::with_client(config.telegram_token.clone(), client);

    let bot = if let Some(bot_api_url) = &config.bot_api_url {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI. Admin commands stay hidden.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "what this bot does"),
        BotCommand::new("help", "how to use the bot"),
    ])
    .await?;

    Ok(())
}
