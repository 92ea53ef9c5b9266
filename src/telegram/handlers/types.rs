//! Handler types, dependencies, and message helpers

use std::sync::Arc;

use teloxide::types::{Chat, Message, User};

use crate::core::config::Config;
use crate::lookup::LookupService;
use crate::storage::db::DbPool;
use crate::storage::interaction_log::{self, InteractionLogEntry};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub lookup: Arc<LookupService>,
    pub config: Arc<Config>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, lookup: Arc<LookupService>, config: Arc<Config>) -> Self {
        Self {
            db_pool,
            lookup,
            config,
        }
    }

    /// Whether `user` may run admin commands.
    pub fn is_admin(&self, user: Option<&User>) -> bool {
        user.and_then(user_id).is_some_and(|id| self.config.is_admin(id))
    }
}

/// Telegram user id as stored in the database.
pub fn user_id(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}

/// Telegram's name for the chat kind.
pub fn chat_type(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_group() {
        "group"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    }
}

/// Builds the audit-trail record for an inbound message.
pub fn log_entry_from_message(msg: &Message) -> InteractionLogEntry {
    let from = msg.from.as_ref();
    InteractionLogEntry {
        user_id: from.and_then(user_id),
        username: from.and_then(|u| u.username.clone()),
        first_name: from.map(|u| u.first_name.clone()),
        last_name: from.and_then(|u| u.last_name.clone()),
        language_code: from.and_then(|u| u.language_code.clone()),
        text: msg.text().or_else(|| msg.caption()).map(str::to_string),
        chat_id: msg.chat.id.0,
        chat_type: chat_type(&msg.chat).to_string(),
        message_id: msg.id.0,
        timestamp: msg.date,
    }
}

/// Writes `msg` to the interaction log. Never fails the update.
pub fn log_message(deps: &HandlerDeps, msg: &Message) {
    interaction_log::record(&deps.db_pool, &log_entry_from_message(msg));
}
