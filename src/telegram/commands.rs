//! Slash commands: the public intro and the admin maintenance set.

use teloxide::prelude::*;

use crate::core::error::AppResult;
use crate::core::utils::{escape_markdown_v2, truncate_utf16};
use crate::storage::{admin, cache, get_connection, stats};
use crate::telegram::bot::Command;
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::markdown::send_message_markdown_v2;

/// Telegram rejects messages longer than this.
pub const MESSAGE_LIMIT: usize = 4096;

pub fn intro_text() -> String {
    [
        "*SteamDB\\.info Bot*".to_string(),
        String::new(),
        escape_markdown_v2("Use me inline from any chat: type @steamdbbot followed by a Steam username or steamID."),
        escape_markdown_v2("Pick the profile, then press \"Load SteamDB Data\" for level, games, account value and hours."),
    ]
    .join("\n")
}

pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, deps: HandlerDeps) -> Result<(), HandlerError> {
    match cmd {
        Command::Start | Command::Help => {
            send_message_markdown_v2(&bot, msg.chat.id, intro_text()).await?;
        }
        admin_cmd => {
            if !deps.is_admin(msg.from.as_ref()) {
                log::warn!("Ignoring admin command {:?} from chat {}", admin_cmd, msg.chat.id);
                return Ok(());
            }

            let text = match run_admin_command(&deps, &admin_cmd) {
                Ok(text) => text,
                Err(e) => {
                    log::error!("Admin command {:?} failed: {}", admin_cmd, e);
                    format!("Failed: {}", e)
                }
            };
            bot.send_message(msg.chat.id, truncate_utf16(&text, MESSAGE_LIMIT)).await?;
        }
    }
    Ok(())
}

/// Executes an admin command and returns the plain-text answer.
pub fn run_admin_command(deps: &HandlerDeps, cmd: &Command) -> AppResult<String> {
    let conn = get_connection(&deps.db_pool)?;

    let text = match cmd {
        Command::Stats => stats::collect(&conn)?.to_string(),
        Command::Clearcache => {
            let removed = cache::clear_all(&conn)?;
            log::info!("Cache cleared by admin, {} entries removed", removed);
            format!("Removed {} cache entries", removed)
        }
        Command::Clearexpired => {
            let removed = cache::clear_expired(&conn)?;
            log::info!("Expired cache cleared by admin, {} entries removed", removed);
            format!("Removed {} expired cache entries", removed)
        }
        Command::Sql(query) if query.trim().is_empty() => "Usage: /sql SELECT ...".to_string(),
        Command::Sql(query) => admin::run_query(&conn, query)?.unwrap_or_else(|| "No rows".to_string()),
        Command::Start | Command::Help => intro_text(),
    };
    Ok(text)
}
