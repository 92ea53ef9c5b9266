//! SteamDB enrichment.
//!
//! Scraping steamdb.info (sessions, bot-detection, HTML parsing) is done by a
//! separate scraper service. The bot only talks to it through [`SteamDbScraper`]:
//! a health check and a JSON profile endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::config::network;
use crate::core::error::{AppError, AppResult};
use crate::steam::steam_id::is_steam_id;

/// Collection statistics for one account, as reported by SteamDB.
///
/// Values are kept as the display strings SteamDB renders ("$1,234.56", "3,456h").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamDbProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub display_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url_steam: String,
    #[serde(deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(deserialize_with = "lenient_string")]
    pub games: String,
    #[serde(deserialize_with = "lenient_string")]
    pub games_played: String,
    #[serde(deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(deserialize_with = "lenient_string")]
    pub price_lowest: String,
    #[serde(deserialize_with = "lenient_string")]
    pub price_average: String,
    #[serde(deserialize_with = "lenient_string")]
    pub price_hour: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hours: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hours_average: String,
    #[serde(alias = "url_stamdb", deserialize_with = "lenient_string")]
    pub url_steamdb: String,
}

impl SteamDbProfile {
    /// A profile without a display name carries no usable data.
    pub fn is_empty(&self) -> bool {
        self.display_name.trim().is_empty()
    }
}

/// Accepts strings, numbers, booleans and null for display fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Narrow interface to the SteamDB scraper.
#[async_trait]
pub trait SteamDbScraper: Send + Sync {
    /// Probes whether SteamDB can currently be scraped.
    async fn is_reachable(&self) -> bool;

    /// Fetches collection statistics. `Ok(None)` means SteamDB has nothing for this account.
    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamDbProfile>>;

    /// Whether `value` looks like an identity this scraper understands.
    fn looks_like_identity(&self, value: &str) -> bool {
        is_steam_id(value)
    }
}

/// [`SteamDbScraper`] backed by the scraper service's HTTP API:
/// `GET /health` and `GET /profile/{steam_id}`.
pub struct HttpSteamDbScraper {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSteamDbScraper {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(network::connect_timeout())
            .timeout(network::read_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SteamDbScraper for HttpSteamDbScraper {
    async fn is_reachable(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    log::warn!("SteamDB scraper health check returned {}", response.status());
                }
                ok
            }
            Err(e) => {
                log::warn!("SteamDB scraper health check failed: {}", e);
                false
            }
        }
    }

    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamDbProfile>> {
        let response = self
            .client
            .get(format!("{}/profile/{}", self.base_url, steam_id))
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let profile: SteamDbProfile = response.json().await?;
                Ok((!profile.is_empty()).then_some(profile))
            }
            status => Err(AppError::HttpStatus(status)),
        }
    }
}
