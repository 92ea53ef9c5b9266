//! Inline mode: `@bot <steam name or id>`.

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText, ParseMode,
};

use crate::lookup::{LookupOutcome, Reply};
use crate::steam::SteamProfile;
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::markdown::profile_card;

/// Queries up to this many characters get the usage hint instead of a lookup.
pub const SHORT_QUERY_MAX_CHARS: usize = 2;

pub const LOAD_STEAMDB_BUTTON: &str = "Load SteamDB Data";
const HINT_TEXT: &str = "@steamdbbot";

fn text_content(text: impl Into<String>) -> InputMessageContent {
    InputMessageContent::Text(InputMessageContentText::new(text))
}

pub fn is_short_query(query: &str) -> bool {
    query.trim().chars().count() <= SHORT_QUERY_MAX_CHARS
}

/// Usage hint shown while the user is still typing.
pub fn short_query_results() -> Vec<InlineQueryResult> {
    vec![
        InlineQueryResult::Article(InlineQueryResultArticle::new(
            "1",
            "SteamDB.info Bot!",
            text_content(HINT_TEXT),
        )),
        InlineQueryResult::Article(InlineQueryResultArticle::new(
            "2",
            "Please type a steam username or steamID",
            text_content(HINT_TEXT),
        )),
    ]
}

/// Single article for an unknown user.
pub fn not_found_results(query: &str) -> Vec<InlineQueryResult> {
    let reply = Reply::from_lookup(query, &LookupOutcome::NotFound);
    vec![InlineQueryResult::Article(InlineQueryResultArticle::new(
        "not_found",
        reply.title,
        text_content(reply.body),
    ))]
}

/// Profile card with the button that triggers enrichment.
pub fn found_results(profile: &SteamProfile) -> Vec<InlineQueryResult> {
    let content = InputMessageContent::Text(
        InputMessageContentText::new(profile_card(profile)).parse_mode(ParseMode::MarkdownV2),
    );
    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        LOAD_STEAMDB_BUTTON,
        profile.steam_id.clone(),
    )]]);

    let mut article = InlineQueryResultArticle::new(profile.steam_id.clone(), profile.display_name.clone(), content)
        .description(profile.steam_id.clone())
        .reply_markup(keyboard);
    match url::Url::parse(&profile.avatar_url) {
        Ok(thumbnail) => article = article.thumbnail_url(thumbnail),
        Err(e) => log::debug!("No usable avatar for {}: {}", profile.steam_id, e),
    }

    vec![InlineQueryResult::Article(article)]
}

/// Answers an inline query. Cache times come from the configured policy.
pub async fn handle_inline_query(bot: Bot, q: InlineQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let policy = &deps.config.cache;

    if is_short_query(&q.query) {
        bot.answer_inline_query(q.id.clone(), short_query_results())
            .cache_time(policy.short_query)
            .await?;
        log::info!(
            "Invalid Query \"{}\" from user {}. Setting cache for {} seconds",
            q.query,
            q.from.id,
            policy.short_query
        );
        return Ok(());
    }

    log::info!("User {} queried \"{}\".", q.from.id, q.query);
    match deps.lookup.lookup(&q.query).await {
        LookupOutcome::Found(profile) => {
            bot.answer_inline_query(q.id.clone(), found_results(&profile))
                .cache_time(policy.user_found)
                .await?;
            log::info!(
                "Valid Query \"{}\" from user {}. Setting cache for {} seconds",
                q.query,
                q.from.id,
                policy.user_found
            );
        }
        LookupOutcome::NotFound => {
            bot.answer_inline_query(q.id.clone(), not_found_results(&q.query))
                .cache_time(policy.user_not_found)
                .await?;
            log::info!(
                "Nothing found for \"{}\". Setting cache for {} seconds",
                q.query,
                policy.user_not_found
            );
        }
    }

    Ok(())
}
