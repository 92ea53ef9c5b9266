//! Registry of Steam identities that were successfully looked up.
//!
//! One row per Steam ID. The first lookup records the query text and the time;
//! later lookups only bump `hit_count`. Rows are never deleted.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::error::AppResult;

/// A row of the `steam` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SteamUserRecord {
    pub steam_id: String,
    /// What the user typed the first time this identity was resolved
    pub query_text: String,
    /// `YYYY-MM-DD HH:MM:SS` UTC
    pub first_seen: String,
    pub hit_count: i64,
}

impl SteamUserRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            steam_id: row.get(0)?,
            query_text: row.get(1)?,
            first_seen: row.get(2)?,
            hit_count: row.get(3)?,
        })
    }
}

/// Records a successful resolution of `steam_id`.
///
/// Inserts a row with `hit_count = 1` on first sight, otherwise increments
/// `hit_count` and leaves `query_text` and `first_seen` untouched.
pub fn upsert_hit(conn: &Connection, steam_id: &str, query_text: &str) -> AppResult<()> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    upsert_hit_at(conn, steam_id, query_text, &now)
}

/// [`upsert_hit`] with an explicit `first_seen` value.
pub fn upsert_hit_at(conn: &Connection, steam_id: &str, query_text: &str, seen_at: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO steam (steam_id, query_text, first_seen, hit_count) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(steam_id) DO UPDATE SET hit_count = hit_count + 1",
        params![steam_id, query_text, seen_at],
    )?;
    Ok(())
}

/// Looks up a single identity.
pub fn get(conn: &Connection, steam_id: &str) -> AppResult<Option<SteamUserRecord>> {
    let record = conn
        .query_row(
            "SELECT steam_id, query_text, first_seen, hit_count FROM steam WHERE steam_id = ?1",
            params![steam_id],
            SteamUserRecord::from_row,
        )
        .optional()?;
    Ok(record)
}

/// Identity with the most hits; ties go to the one seen first.
pub fn most_hit(conn: &Connection) -> AppResult<Option<SteamUserRecord>> {
    first_by(conn, "hit_count DESC, first_seen ASC, rowid ASC")
}

/// Identity with the fewest hits; ties go to the one seen first.
pub fn least_hit(conn: &Connection) -> AppResult<Option<SteamUserRecord>> {
    first_by(conn, "hit_count ASC, first_seen ASC, rowid ASC")
}

/// Number of distinct identities ever resolved.
pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM steam", [], |row| row.get(0))?)
}

fn first_by(conn: &Connection, order_by: &str) -> AppResult<Option<SteamUserRecord>> {
    let sql = format!(
        "SELECT steam_id, query_text, first_seen, hit_count FROM steam ORDER BY {} LIMIT 1",
        order_by
    );
    Ok(conn.query_row(&sql, [], SteamUserRecord::from_row).optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;
    use pretty_assertions::assert_eq;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_first_hit_creates_row() {
        let conn = setup();
        upsert_hit_at(&conn, "76561198287455504", "mrmarblet", "2024-01-01 10:00:00").unwrap();

        let record = get(&conn, "76561198287455504").unwrap().unwrap();
        assert_eq!(
            record,
            SteamUserRecord {
                steam_id: "76561198287455504".to_string(),
                query_text: "mrmarblet".to_string(),
                first_seen: "2024-01-01 10:00:00".to_string(),
                hit_count: 1,
            }
        );
    }

    #[test]
    fn test_second_hit_increments_and_keeps_first_values() {
        let conn = setup();
        upsert_hit_at(&conn, "76561198287455504", "mrmarblet", "2024-01-01 10:00:00").unwrap();
        upsert_hit_at(&conn, "76561198287455504", "76561198287455504", "2024-02-02 12:00:00").unwrap();

        let record = get(&conn, "76561198287455504").unwrap().unwrap();
        assert_eq!(record.hit_count, 2);
        assert_eq!(record.query_text, "mrmarblet");
        assert_eq!(record.first_seen, "2024-01-01 10:00:00");
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_wall_clock_upsert() {
        let conn = setup();
        upsert_hit(&conn, "76561197960287930", "gabelogannewell").unwrap();
        upsert_hit(&conn, "76561197960287930", "gabelogannewell").unwrap();
        assert_eq!(get(&conn, "76561197960287930").unwrap().unwrap().hit_count, 2);
    }

    #[test]
    fn test_most_and_least_hit_on_empty_table() {
        let conn = setup();
        assert!(most_hit(&conn).unwrap().is_none());
        assert!(least_hit(&conn).unwrap().is_none());
        assert_eq!(count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_most_and_least_hit() {
        let conn = setup();
        upsert_hit_at(&conn, "a", "a", "2024-01-01 00:00:00").unwrap();
        for _ in 0..3 {
            upsert_hit_at(&conn, "b", "b", "2024-01-02 00:00:00").unwrap();
        }
        upsert_hit_at(&conn, "c", "c", "2024-01-03 00:00:00").unwrap();
        upsert_hit_at(&conn, "c", "c", "2024-01-03 00:00:00").unwrap();

        assert_eq!(most_hit(&conn).unwrap().unwrap().steam_id, "b");
        assert_eq!(least_hit(&conn).unwrap().unwrap().steam_id, "a");
    }

    #[test]
    fn test_ties_break_on_earliest_first_seen() {
        let conn = setup();
        upsert_hit_at(&conn, "late", "late", "2024-03-01 00:00:00").unwrap();
        upsert_hit_at(&conn, "early", "early", "2024-01-01 00:00:00").unwrap();

        assert_eq!(most_hit(&conn).unwrap().unwrap().steam_id, "early");
        assert_eq!(least_hit(&conn).unwrap().unwrap().steam_id, "early");
    }
}
