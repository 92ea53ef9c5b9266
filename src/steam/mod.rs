//! Steam-side collaborators: ID classification, Steam Web API, SteamDB scraper

pub mod api;
pub mod steam_id;
pub mod steamdb;

pub use api::{HttpSteamApi, SteamApi, SteamProfile};
pub use steam_id::is_steam_id;
pub use steamdb::{HttpSteamDbScraper, SteamDbProfile, SteamDbScraper};
