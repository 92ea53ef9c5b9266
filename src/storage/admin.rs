//! Administrative ad-hoc queries.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};
use serde_json::{Map, Value};

use crate::core::error::{AppError, AppResult};

/// Runs a single read-only SQL statement and renders the rows as pretty JSON.
///
/// Returns `Ok(None)` when the statement produced no rows. Statements that
/// would modify the database are rejected, and so are statements without a
/// result set: SQLite reports `BEGIN`, `SAVEPOINT`, `ATTACH` and `DETACH` as
/// read-only although they change the connection's state.
pub fn run_query(conn: &Connection, sql: &str) -> AppResult<Option<String>> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(AppError::Validation("only read-only statements are allowed".to_string()));
    }
    if stmt.column_count() == 0 {
        return Err(AppError::Validation("only statements returning rows are allowed".to_string()));
    }

    let result = collect_rows(&mut stmt);
    drop(stmt);

    // The connection goes back to the pool, it must not keep a transaction open.
    if !conn.is_autocommit() {
        conn.execute_batch("ROLLBACK")?;
        return Err(AppError::Validation("statement left a transaction open".to_string()));
    }
    result
}

fn collect_rows(stmt: &mut Statement<'_>) -> AppResult<Option<String>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            object.insert(name.clone(), json_value(row.get_ref(idx)?));
        }
        out.push(Value::Object(object));
    }

    if out.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string_pretty(&out)?))
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<{} bytes>", bytes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;
    use crate::storage::registry::upsert_hit_at;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_select_renders_rows() {
        let conn = setup();
        upsert_hit_at(&conn, "76561198287455504", "mrmarblet", "2024-01-01 00:00:00").unwrap();

        let out = run_query(&conn, "SELECT steam_id, hit_count FROM steam").unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(
            parsed,
            serde_json::json!([{"steam_id": "76561198287455504", "hit_count": 1}])
        );
    }

    #[test]
    fn test_empty_result_is_none() {
        let conn = setup();
        assert!(run_query(&conn, "SELECT * FROM cache").unwrap().is_none());
    }

    #[test]
    fn test_writes_are_rejected() {
        let conn = setup();
        let err = run_query(&conn, "DELETE FROM cache").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_transaction_control_is_rejected() {
        let conn = setup();

        for sql in ["BEGIN", "BEGIN IMMEDIATE", "SAVEPOINT sp"] {
            let err = run_query(&conn, sql).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} was accepted", sql);
            assert!(conn.is_autocommit(), "{} left a transaction open", sql);
        }
    }

    #[test]
    fn test_attach_is_rejected_without_creating_files() {
        let conn = setup();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new.db");

        let sql = format!("ATTACH DATABASE '{}' AS x", target.display());
        assert!(matches!(run_query(&conn, &sql).unwrap_err(), AppError::Validation(_)));
        assert!(matches!(
            run_query(&conn, "DETACH DATABASE main").unwrap_err(),
            AppError::Validation(_) | AppError::Database(_)
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_invalid_sql_is_an_error() {
        let conn = setup();
        assert!(matches!(
            run_query(&conn, "SELEKT nothing").unwrap_err(),
            AppError::Database(_)
        ));
    }
}
