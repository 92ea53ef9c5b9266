//! Telegram bot integration and handlers

pub mod bot;
pub mod callback;
pub mod commands;
pub mod handlers;
pub mod inline;
pub mod markdown;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use notifications::{notify_log_channel, notify_startup};
