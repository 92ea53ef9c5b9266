use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Duration;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

/// Brings the schema up to date.
///
/// Safe to run against an already-initialized database: refinery records the
/// applied versions and every statement is `IF NOT EXISTS`.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.busy_timeout(Duration::from_secs(30))
        .context("set SQLite busy timeout")?;

    let report = embedded::migrations::runner()
        .run(conn)
        .context("apply migrations")?;

    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}
