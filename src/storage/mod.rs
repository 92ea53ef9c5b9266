//! SQLite persistence: cache, Steam user registry, interaction log and stats

pub mod admin;
pub mod cache;
pub mod db;
pub mod interaction_log;
pub mod migrations;
pub mod registry;
pub mod stats;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
