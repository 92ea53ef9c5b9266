use teloxide::prelude::*;

use crate::core::config::Config;

pub const STEAMDB_DOWN_NOTICE: &str = "Cant connect to SteamDB!";

/// Sends an operational notice to the configured log channel.
///
/// Silent plain text. Does nothing when `LOG_CHANNEL` is
/// unset; delivery failures are only logged.
pub async fn notify_log_channel(bot: &Bot, config: &Config, text: &str) {
    let Some(channel) = config.log_channel.clone() else {
        log::debug!("No log channel configured, dropping notice: {}", text);
        return;
    };

    let result = bot
        .send_message(channel, text)
        .disable_notification(true)
        .await;

    if let Err(e) = result {
        log::error!("Failed to send log channel notice: {}", e);
    }
}

/// Announces a (re)start in the log channel.
pub async fn notify_startup(bot: &Bot, config: &Config, bot_username: Option<&str>) {
    let name = bot_username.map(|u| format!("@{}", u)).unwrap_or_else(|| "Bot".to_string());
    notify_log_channel(bot, config, &format!("{} started (v{})", name, env!("CARGO_PKG_VERSION"))).await;
}
