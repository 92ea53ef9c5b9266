//! SteamDB bot - Telegram inline bot for Steam profile lookups
//!
//! Resolves a Steam username or steamID to a public profile card and, on
//! demand, replaces it with SteamDB collection statistics cached in SQLite.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and common helpers
//! - `storage`: SQLite pool, migrations, TTL cache, user registry, interaction log, stats
//! - `steam`: Steam Web API client and SteamDB scraper interface
//! - `lookup`: Lookup orchestration and transport-neutral replies
//! - `telegram`: Telegram bot integration and handlers
//! - `cli`: Command line interface

pub mod cli;
pub mod core;
pub mod lookup;
pub mod steam;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Config};
pub use lookup::{EnrichmentOutcome, LookupOutcome, LookupService, Reply};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
