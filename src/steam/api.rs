//! Steam Web API client.
//!
//! Only two endpoints are used:
//! - `ISteamUser/ResolveVanityURL/v0001` to turn a vanity name into a Steam ID
//! - `ISteamUser/GetPlayerSummaries/v0002` to fetch the public profile summary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::network;
use crate::core::error::{AppError, AppResult};

/// Lightweight public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamProfile {
    pub steam_id: String,
    pub display_name: String,
    pub profile_url: String,
    pub avatar_url: String,
}

/// Identity resolution and profile lookup.
///
/// `Ok(None)` means the API answered and the user does not exist. Transport
/// failures and unexpected status codes are errors.
#[async_trait]
pub trait SteamApi: Send + Sync {
    /// Resolves a vanity name (`steamcommunity.com/id/<name>`) to a Steam ID.
    async fn resolve_vanity_name(&self, name: &str) -> AppResult<Option<String>>;

    /// Fetches the public profile summary of `steam_id`.
    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamProfile>>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Deserialize)]
struct VanityResponse {
    success: i64,
    steamid: Option<String>,
}

#[derive(Deserialize)]
struct PlayerSummaries {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Deserialize)]
struct PlayerSummary {
    steamid: String,
    #[serde(default)]
    personaname: String,
    #[serde(default)]
    profileurl: String,
    #[serde(default)]
    avatarfull: String,
}

/// [`SteamApi`] over HTTP with the connect/read timeouts from [`network`].
pub struct HttpSteamApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSteamApi {
    pub fn new(base_url: &str, api_key: &str) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(network::connect_timeout())
            .timeout(network::read_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(AppError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SteamApi for HttpSteamApi {
    async fn resolve_vanity_name(&self, name: &str) -> AppResult<Option<String>> {
        let envelope: Envelope<VanityResponse> = self
            .get_json("/ISteamUser/ResolveVanityURL/v0001/", &[("vanityurl", name)])
            .await?;

        let resolved = envelope.response;
        if resolved.success != 1 {
            log::debug!("Vanity name {:?} not resolved (success={})", name, resolved.success);
            return Ok(None);
        }
        Ok(resolved.steamid.filter(|id| !id.is_empty()))
    }

    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamProfile>> {
        let envelope: Envelope<PlayerSummaries> = self
            .get_json("/ISteamUser/GetPlayerSummaries/v0002/", &[("steamids", steam_id)])
            .await?;

        let profile = envelope
            .response
            .players
            .into_iter()
            .next()
            .filter(|player| !player.personaname.is_empty())
            .map(|player| SteamProfile {
                steam_id: player.steamid,
                display_name: player.personaname,
                profile_url: player.profileurl,
                avatar_url: player.avatarfull,
            });
        Ok(profile)
    }
}
