//! MarkdownV2 rendering of lookup results and a parse-error tolerant sender.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use teloxide::RequestError;

use crate::core::utils::{escape_markdown_v2, escape_markdown_v2_entity};
use crate::steam::{SteamDbProfile, SteamProfile};

const SEPARATOR: &str = "\\-\\-\\-\\-\\-\\-\\-\\-\\-\\-";

/// Plain text, sent without a parse mode.
pub const LOADING_TEXT: &str = "Loading SteamDB data...";

fn is_markdown_parse_error(err: &RequestError) -> bool {
    err.to_string().to_lowercase().contains("can't parse entities")
}

/// Send a MarkdownV2 message and auto-escape on parse errors.
pub async fn send_message_markdown_v2(
    bot: &Bot,
    chat_id: impl Into<Recipient> + Clone,
    text: impl Into<String>,
) -> ResponseResult<Message> {
    let raw_text = text.into();
    let req = bot
        .send_message(chat_id.clone(), raw_text.clone())
        .parse_mode(ParseMode::MarkdownV2);

    match req.await {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            let escaped = escape_markdown_v2(&raw_text);
            bot.send_message(chat_id, escaped).parse_mode(ParseMode::MarkdownV2).await
        }
        Err(e) => Err(e),
    }
}

/// `[text](url)`, or just the escaped text when there is no url.
fn link(text: &str, url: &str) -> String {
    if url.is_empty() {
        escape_markdown_v2(text)
    } else {
        format!("[{}]({})", escape_markdown_v2(text), escape_markdown_v2_entity(url))
    }
}

/// Card posted when an inline lookup result is chosen.
pub fn profile_card(profile: &SteamProfile) -> String {
    format!(
        "*{}*\n`{}`\n{}",
        escape_markdown_v2(&profile.display_name),
        escape_markdown_v2_entity(&profile.steam_id),
        link("Steam Profile", &profile.profile_url)
    )
}

/// Collection statistics card that replaces the profile card.
pub fn stats_card(stats: &SteamDbProfile) -> String {
    let row = |label: &str, value: &str| format!("*{}:*\t{}", escape_markdown_v2(label), escape_markdown_v2(value));

    [
        link(&stats.display_name, &stats.url_steam),
        SEPARATOR.to_string(),
        row("Level", &stats.level),
        row("Games", &stats.games),
        row("Played", &stats.games_played),
        SEPARATOR.to_string(),
        row("Account Value", &stats.price),
        row("Value with offers", &stats.price_lowest),
        row("Average Game price", &stats.price_average),
        row("Price per Hour", &stats.price_hour),
        SEPARATOR.to_string(),
        row("Hours", &stats.hours),
        row("Average Hours", &stats.hours_average),
        SEPARATOR.to_string(),
        format!("*SteamDB:*\t{}", link("Link", &stats.url_steamdb)),
    ]
    .join("\n")
}

pub fn fetching_notice(steam_id: &str) -> String {
    format!("Fetching Profile of {}. It may take some seconds...", steam_id)
}

pub fn upstream_down_text(steam_id: &str) -> String {
    format!(
        "Something bad happened while fetching the SteamDB Profile of *{}*\nMaybe SteamDB is down",
        escape_markdown_v2(steam_id)
    )
}

pub fn enrichment_not_found_text(steam_id: &str) -> String {
    format!("SteamDB has no data for *{}*", escape_markdown_v2(steam_id))
}
