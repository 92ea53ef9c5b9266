use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "steamdb-bot")]
#[command(author, version, about = "Telegram inline bot for Steam profile and SteamDB lookups", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Resolve a Steam username or steamID once and print the result
    Lookup {
        /// Steam vanity name or 17-digit steamID
        query: String,

        /// Also fetch SteamDB statistics for the found profile
        #[arg(short, long)]
        enrich: bool,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print cache, registry and interaction log statistics
    Stats,

    /// Remove cached SteamDB profiles
    ClearCache {
        /// Only remove entries whose TTL has passed
        #[arg(long)]
        expired: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
