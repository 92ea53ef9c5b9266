//! "Load SteamDB Data" button: replaces the profile card with SteamDB stats.

use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::lookup::EnrichmentOutcome;
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::markdown::{
    enrichment_not_found_text, fetching_notice, stats_card, upstream_down_text, LOADING_TEXT,
};
use crate::telegram::notifications::{notify_log_channel, STEAMDB_DOWN_NOTICE};

/// Where the card being updated lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditTarget {
    /// Sent through inline mode, addressable only by id
    Inline(String),
    Chat(ChatId, MessageId),
}

impl EditTarget {
    fn from_query(q: &CallbackQuery) -> Option<Self> {
        if let Some(id) = &q.inline_message_id {
            return Some(Self::Inline(id.clone()));
        }
        q.message.as_ref().map(|m| Self::Chat(m.chat().id, m.id()))
    }

    async fn edit(&self, bot: &Bot, text: &str, parse_mode: Option<ParseMode>) {
        let result = match self {
            Self::Inline(id) => {
                let mut req = bot.edit_message_text_inline(id.clone(), text);
                if let Some(mode) = parse_mode {
                    req = req.parse_mode(mode);
                }
                req.await.map(|_| ())
            }
            Self::Chat(chat_id, message_id) => {
                let mut req = bot.edit_message_text(*chat_id, *message_id, text);
                if let Some(mode) = parse_mode {
                    req = req.parse_mode(mode);
                }
                req.await.map(|_| ())
            }
        };

        if let Err(e) = result {
            log::warn!("Failed to edit {:?}: {}", self, e);
        }
    }
}

/// MarkdownV2 text for an enrichment outcome.
pub fn render_enrichment(steam_id: &str, outcome: &EnrichmentOutcome) -> String {
    match outcome {
        EnrichmentOutcome::Enriched(stats) => stats_card(stats),
        EnrichmentOutcome::NotFound => enrichment_not_found_text(steam_id),
        EnrichmentOutcome::UpstreamDown => upstream_down_text(steam_id),
    }
}

/// Handles a callback whose data is a Steam ID.
pub async fn handle_callback_query(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let Some(steam_id) = q.data.clone() else {
        return Ok(());
    };
    log::info!("Fetching SteamDB data of \"{}\" from User {}", steam_id, q.from.id);

    bot.answer_callback_query(q.id.clone())
        .text(fetching_notice(&steam_id))
        .show_alert(false)
        .cache_time(deps.config.cache.user_found)
        .await?;

    let Some(target) = EditTarget::from_query(&q) else {
        log::warn!("Callback for {} has no message to edit", steam_id);
        return Ok(());
    };

    target.edit(&bot, LOADING_TEXT, None).await;

    let outcome = deps.lookup.enrich(&steam_id).await;
    if outcome == EnrichmentOutcome::UpstreamDown {
        notify_log_channel(&bot, &deps.config, STEAMDB_DOWN_NOTICE).await;
    }

    target
        .edit(&bot, &render_enrichment(&steam_id, &outcome), Some(ParseMode::MarkdownV2))
        .await;
    Ok(())
}
