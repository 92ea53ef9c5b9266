//! Read-only rollups over the cache, registry and interaction log.

use std::fmt;

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::core::error::AppResult;
use crate::core::utils::{format_unix_timestamp, unix_now};
use crate::storage::registry;

/// Placeholder shown for values that do not exist yet (empty tables).
pub const PLACEHOLDER: &str = "--";

/// Operational snapshot of the bot's persistent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BotStats {
    pub cache_total: i64,
    pub cache_valid: i64,
    /// Latest `expires_at` in the cache, unix seconds
    pub last_expire: Option<i64>,
    pub steam_total: i64,
    pub steam_most_hits: Option<String>,
    pub steam_least_hits: Option<String>,
    pub log_total: i64,
    pub log_unique_chats: i64,
    pub log_unique_users: i64,
}

/// Collects [`BotStats`] using the wall clock.
pub fn collect(conn: &Connection) -> AppResult<BotStats> {
    collect_at(conn, unix_now())
}

/// Collects [`BotStats`], counting cache rows with `expires_at > now` as valid.
pub fn collect_at(conn: &Connection, now: i64) -> AppResult<BotStats> {
    let (cache_total, cache_valid, last_expire): (i64, i64, Option<i64>) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0), MAX(expires_at) FROM cache",
        params![now],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let (log_total, log_unique_chats, log_unique_users): (i64, i64, i64) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT chat_id), COUNT(DISTINCT user_id) FROM log",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(BotStats {
        cache_total,
        cache_valid,
        last_expire,
        steam_total: registry::count(conn)?,
        steam_most_hits: registry::most_hit(conn)?.map(|r| r.steam_id),
        steam_least_hits: registry::least_hit(conn)?.map(|r| r.steam_id),
        log_total,
        log_unique_chats,
        log_unique_users,
    })
}

impl fmt::Display for BotStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last_expire = self
            .last_expire
            .map(format_unix_timestamp)
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        writeln!(f, "Cache entries: {}", self.cache_total)?;
        writeln!(f, "Valid cache entries: {}", self.cache_valid)?;
        writeln!(f, "Last cache expiry: {}", last_expire)?;
        writeln!(f, "Steam users: {}", self.steam_total)?;
        writeln!(
            f,
            "Most queried: {}",
            self.steam_most_hits.as_deref().unwrap_or(PLACEHOLDER)
        )?;
        writeln!(
            f,
            "Least queried: {}",
            self.steam_least_hits.as_deref().unwrap_or(PLACEHOLDER)
        )?;
        writeln!(f, "Logged messages: {}", self.log_total)?;
        writeln!(f, "Unique chats: {}", self.log_unique_chats)?;
        write!(f, "Unique users: {}", self.log_unique_users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::interaction_log::{append, InteractionLogEntry};
    use crate::storage::migrations::run_migrations;
    use crate::storage::{cache, registry};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    fn log_entry(user_id: i64, chat_id: i64) -> InteractionLogEntry {
        InteractionLogEntry {
            user_id: Some(user_id),
            username: None,
            first_name: None,
            last_name: None,
            language_code: None,
            text: Some("hi".to_string()),
            chat_id,
            chat_type: "private".to_string(),
            message_id: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_tables() {
        let conn = setup();
        let stats = collect_at(&conn, NOW).unwrap();

        assert_eq!(stats, BotStats::default());
        let text = stats.to_string();
        assert!(text.contains("Last cache expiry: --"));
        assert!(text.contains("Most queried: --"));
    }

    #[test]
    fn test_counts() {
        let conn = setup();
        cache::put_at(&conn, "steamdb:1", &json!(1), Duration::from_secs(10), NOW - 100).unwrap();
        cache::put_at(&conn, "steamdb:2", &json!(2), Duration::from_secs(3600), NOW).unwrap();
        registry::upsert_hit_at(&conn, "1", "one", "2024-01-01 00:00:00").unwrap();
        registry::upsert_hit_at(&conn, "2", "two", "2024-01-02 00:00:00").unwrap();
        registry::upsert_hit_at(&conn, "2", "two", "2024-01-02 00:00:00").unwrap();
        append(&conn, &log_entry(10, 10)).unwrap();
        append(&conn, &log_entry(10, 10)).unwrap();
        append(&conn, &log_entry(11, -500)).unwrap();
        append(&conn, &log_entry(12, -500)).unwrap();

        let stats = collect_at(&conn, NOW).unwrap();

        assert_eq!(
            stats,
            BotStats {
                cache_total: 2,
                cache_valid: 1,
                last_expire: Some(NOW + 3600),
                steam_total: 2,
                steam_most_hits: Some("2".to_string()),
                steam_least_hits: Some("1".to_string()),
                log_total: 4,
                log_unique_chats: 2,
                log_unique_users: 3,
            }
        );
    }
}
