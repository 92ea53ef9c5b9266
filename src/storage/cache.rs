//! TTL cache persisted in the `cache` table.
//!
//! Payloads are arbitrary JSON values keyed by a namespaced string such as
//! `steamdb:<steam_id>`. A row is live while `expires_at > now`; reads filter
//! on that predicate, so an expired row is never returned even if the
//! background sweep has not deleted it yet. [`clear_expired`] only reclaims space.

use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::core::error::AppResult;
use crate::core::utils::unix_now;

/// Namespace for SteamDB enrichment payloads.
pub const STEAMDB_NAMESPACE: &str = "steamdb";

/// Builds a namespaced cache key, e.g. `steamdb:76561197960287930`.
pub fn cache_key(namespace: &str, id: &str) -> String {
    format!("{}:{}", namespace, id)
}

/// Returns the payload stored under `key` if it exists and has not expired.
pub fn get(conn: &Connection, key: &str) -> AppResult<Option<Value>> {
    get_at(conn, key, unix_now())
}

/// [`get`] with an explicit clock, in unix seconds.
pub fn get_at(conn: &Connection, key: &str, now: i64) -> AppResult<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT payload FROM cache WHERE key = ?1 AND expires_at > ?2",
            params![key, now],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Stores `payload` under `key`, replacing any previous payload and resetting
/// the expiry to `now + ttl`.
pub fn put(conn: &Connection, key: &str, payload: &Value, ttl: Duration) -> AppResult<()> {
    put_at(conn, key, payload, ttl, unix_now())
}

/// [`put`] with an explicit clock, in unix seconds.
pub fn put_at(conn: &Connection, key: &str, payload: &Value, ttl: Duration, now: i64) -> AppResult<()> {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let expires_at = now.saturating_add(ttl_secs);
    let raw = serde_json::to_string(payload)?;

    conn.execute(
        "INSERT INTO cache (key, payload, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, expires_at = excluded.expires_at",
        params![key, raw, expires_at],
    )?;
    log::debug!("Cached {} until {}", key, expires_at);
    Ok(())
}

/// Deletes every row whose expiry has passed. Returns the number of rows removed.
pub fn clear_expired(conn: &Connection) -> AppResult<usize> {
    clear_expired_at(conn, unix_now())
}

/// [`clear_expired`] with an explicit clock, in unix seconds.
pub fn clear_expired_at(conn: &Connection, now: i64) -> AppResult<usize> {
    let removed = conn.execute("DELETE FROM cache WHERE expires_at <= ?1", params![now])?;
    if removed > 0 {
        log::debug!("Cleaned up {} expired cache entries", removed);
    }
    Ok(removed)
}

/// Deletes every cache row. Returns the number of rows removed.
pub fn clear_all(conn: &Connection) -> AppResult<usize> {
    let removed = conn.execute("DELETE FROM cache", [])?;
    log::info!("Cache cleared ({} entries)", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;
    const HOUR: Duration = Duration::from_secs(3600);

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(STEAMDB_NAMESPACE, "76561198287455504"), "steamdb:76561198287455504");
    }

    #[test]
    fn test_get_on_empty_cache() {
        let conn = setup();
        assert!(get_at(&conn, "steamdb:1", NOW).unwrap().is_none());
    }

    #[test]
    fn test_put_then_get_returns_exact_payload() {
        let conn = setup();
        let payload = json!({"display_name": "Robin", "games": "1,024", "nested": {"hours": [1, 2, 3]}});

        put_at(&conn, "steamdb:1", &payload, HOUR, NOW).unwrap();

        assert_eq!(get_at(&conn, "steamdb:1", NOW).unwrap(), Some(payload.clone()));
        assert_eq!(get_at(&conn, "steamdb:1", NOW + 3599).unwrap(), Some(payload));
    }

    #[test]
    fn test_get_after_ttl_is_absent_without_sweep() {
        let conn = setup();
        put_at(&conn, "steamdb:1", &json!({"a": 1}), HOUR, NOW).unwrap();

        assert!(get_at(&conn, "steamdb:1", NOW + 3600).unwrap().is_none());
        assert!(get_at(&conn, "steamdb:1", NOW + 10_000).unwrap().is_none());
        // the row is still physically present until a sweep runs
        assert_eq!(row_count(&conn), 1);
    }

    #[test]
    fn test_put_overwrites_payload_and_resets_expiry() {
        let conn = setup();
        put_at(&conn, "steamdb:1", &json!({"v": 1}), HOUR, NOW).unwrap();
        put_at(&conn, "steamdb:1", &json!({"v": 2}), HOUR, NOW + 3000).unwrap();

        assert_eq!(row_count(&conn), 1);
        assert_eq!(get_at(&conn, "steamdb:1", NOW + 5000).unwrap(), Some(json!({"v": 2})));
        assert!(get_at(&conn, "steamdb:1", NOW + 6600).unwrap().is_none());
    }

    #[test]
    fn test_put_revives_expired_row() {
        let conn = setup();
        put_at(&conn, "steamdb:1", &json!({"v": 1}), HOUR, NOW).unwrap();
        put_at(&conn, "steamdb:1", &json!({"v": 2}), HOUR, NOW + 7200).unwrap();

        assert_eq!(get_at(&conn, "steamdb:1", NOW + 7201).unwrap(), Some(json!({"v": 2})));
    }

    #[test]
    fn test_clear_expired_removes_only_expired_rows() {
        let conn = setup();
        put_at(&conn, "steamdb:old", &json!("old"), Duration::from_secs(10), NOW).unwrap();
        put_at(&conn, "steamdb:new", &json!("new"), HOUR, NOW).unwrap();

        let removed = clear_expired_at(&conn, NOW + 60).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(row_count(&conn), 1);
        assert_eq!(get_at(&conn, "steamdb:new", NOW + 60).unwrap(), Some(json!("new")));
    }

    #[test]
    fn test_clear_expired_is_idempotent() {
        let conn = setup();
        put_at(&conn, "steamdb:old", &json!("old"), Duration::from_secs(10), NOW).unwrap();

        assert_eq!(clear_expired_at(&conn, NOW + 60).unwrap(), 1);
        assert_eq!(clear_expired_at(&conn, NOW + 60).unwrap(), 0);
    }

    #[test]
    fn test_clear_all() {
        let conn = setup();
        put_at(&conn, "steamdb:1", &json!(1), HOUR, NOW).unwrap();
        put_at(&conn, "steamdb:2", &json!(2), HOUR, NOW).unwrap();

        assert_eq!(clear_all(&conn).unwrap(), 2);
        assert!(get_at(&conn, "steamdb:1", NOW).unwrap().is_none());
        assert_eq!(row_count(&conn), 0);
    }

    #[test]
    fn test_wall_clock_round_trip() {
        let conn = setup();
        put(&conn, "steamdb:live", &json!({"ok": true}), HOUR).unwrap();
        assert_eq!(get(&conn, "steamdb:live").unwrap(), Some(json!({"ok": true})));
    }
}
