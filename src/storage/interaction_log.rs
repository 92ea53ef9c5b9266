//! Append-only audit trail of inbound messages (`log` table).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::core::error::AppResult;
use crate::storage::db::{get_connection, DbPool};

/// One inbound message as seen by the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionLogEntry {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub text: Option<String>,
    pub chat_id: i64,
    pub chat_type: String,
    pub message_id: i32,
    pub timestamp: DateTime<Utc>,
}

/// Inserts `entry`. No validation beyond what the schema enforces.
pub fn append(conn: &Connection, entry: &InteractionLogEntry) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (user_id, username, first_name, last_name, language_code, text, chat_id, chat_type, message_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.user_id,
            entry.username,
            entry.first_name,
            entry.last_name,
            entry.language_code,
            entry.text,
            entry.chat_id,
            entry.chat_type,
            entry.message_id,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

/// Best-effort [`append`] through the pool.
///
/// Failures are logged and swallowed; the caller's request must not fail
/// because the audit trail could not be written.
pub fn record(pool: &DbPool, entry: &InteractionLogEntry) {
    let result = get_connection(pool)
        .map_err(Into::into)
        .and_then(|conn| append(&conn, entry));

    if let Err(e) = result {
        log::warn!(
            "Failed to log message {} from chat {}: {}",
            entry.message_id,
            entry.chat_id,
            e
        );
    }
}
