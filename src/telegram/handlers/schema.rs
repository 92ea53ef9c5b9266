//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Me, Message};
use teloxide::utils::command::BotCommands;

use super::types::{log_message, HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::callback::handle_callback_query;
use crate::telegram::commands::handle_command;
use crate::telegram::inline::handle_inline_query;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and can be used in integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool, lookup service, configuration)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_inline = deps.clone();
    let deps_callback = deps.clone();

    dptree::entry()
        // Every message is logged, commands are answered
        .branch(message_handler(deps_messages))
        .branch(inline_query_handler(deps_inline))
        .branch(callback_handler(deps_callback))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message, me: Me| {
        let deps = deps.clone();
        async move {
            log_message(&deps, &msg);

            let Some(text) = msg.text() else {
                return Ok(());
            };
            match Command::parse(text, me.username()) {
                Ok(cmd) => {
                    log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                    handle_command(bot, msg, cmd, deps).await
                }
                Err(_) => Ok(()),
            }
        }
    })
}

fn inline_query_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_inline_query().endpoint(move |bot: Bot, q: InlineQuery| {
        let deps = deps.clone();
        async move {
            let query = q.query.clone();
            let user = q.from.id;
            if let Err(e) = handle_inline_query(bot, q, deps).await {
                log::error!("Something happened while answering user {} query \"{}\": {}", user, query, e);
            }
            Ok(())
        }
    })
}

/// Only callbacks carrying a Steam ID are ours.
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();

    Update::filter_callback_query()
        .filter(move |q: CallbackQuery| {
            q.data
                .as_deref()
                .is_some_and(|data| deps_filter.lookup.looks_like_identity(data))
        })
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let deps = deps.clone();
            async move { handle_callback_query(bot, q, deps).await }
        })
}
