//! Lookup orchestration: query → Steam identity → profile → (on demand) SteamDB stats.
//!
//! Every external failure is logged and folded into an outcome variant; callers
//! only ever see [`LookupOutcome`] or [`EnrichmentOutcome`].

use std::sync::Arc;
use std::time::Duration;

use crate::core::error::AppResult;
use crate::storage::cache::{self, STEAMDB_NAMESPACE};
use crate::storage::db::{get_connection, DbPool};
use crate::storage::registry;
use crate::steam::{SteamApi, SteamDbProfile, SteamDbScraper, SteamProfile};

/// How a query will be turned into a Steam ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Already a Steam ID, used as-is
    SteamId(String),
    /// Needs vanity-name resolution
    VanityName(String),
}

/// Result of the first stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Profile found; `profile.steam_id` is the follow-up token for enrichment
    Found(SteamProfile),
    NotFound,
}

/// Result of the user-triggered second stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Enriched(SteamDbProfile),
    /// SteamDB answered but has nothing for this account
    NotFound,
    /// The scraper's health check failed
    UpstreamDown,
}

/// The lookup orchestrator.
///
/// Owns the persistence boundary for the cache and the registry; collaborators
/// are injected so tests can substitute them.
#[derive(Clone)]
pub struct LookupService {
    db_pool: Arc<DbPool>,
    steam: Arc<dyn SteamApi>,
    steamdb: Arc<dyn SteamDbScraper>,
    enrichment_ttl: Duration,
}

impl LookupService {
    pub fn new(
        db_pool: Arc<DbPool>,
        steam: Arc<dyn SteamApi>,
        steamdb: Arc<dyn SteamDbScraper>,
        enrichment_ttl: Duration,
    ) -> Self {
        Self {
            db_pool,
            steam,
            steamdb,
            enrichment_ttl,
        }
    }

    /// Whether `value` is syntactically a Steam ID.
    pub fn looks_like_identity(&self, value: &str) -> bool {
        self.steamdb.looks_like_identity(value)
    }

    /// Classifies a trimmed query. The ID form always wins, even if the same
    /// string is also somebody's vanity name.
    pub fn classify(&self, query: &str) -> Classification {
        let query = query.trim();
        if self.looks_like_identity(query) {
            Classification::SteamId(query.to_string())
        } else {
            Classification::VanityName(query.to_string())
        }
    }

    /// Resolves `query` to a profile and records the hit in the registry.
    pub async fn lookup(&self, query: &str) -> LookupOutcome {
        let query = query.trim();
        if query.is_empty() {
            return LookupOutcome::NotFound;
        }

        let steam_id = match self.classify(query) {
            Classification::SteamId(id) => {
                log::info!("\"{}\" is a valid steamID.", query);
                id
            }
            Classification::VanityName(name) => {
                log::info!("Fetching steamID for \"{}\".", name);
                match self.steam.resolve_vanity_name(&name).await {
                    Ok(Some(id)) => id,
                    Ok(None) => {
                        log::info!("SteamID not found for \"{}\".", name);
                        return LookupOutcome::NotFound;
                    }
                    Err(e) => {
                        log::error!("Something happened while fetching \"{}\" steamID: {}", name, e);
                        return LookupOutcome::NotFound;
                    }
                }
            }
        };

        log::info!("Fetching profile data for \"{}\".", steam_id);
        let profile = match self.steam.fetch_profile(&steam_id).await {
            Ok(Some(profile)) if !profile.display_name.is_empty() => profile,
            Ok(_) => {
                log::info!("No Steam Profile found for \"{}\".", steam_id);
                return LookupOutcome::NotFound;
            }
            Err(e) => {
                log::error!("Something happened while fetching \"{}\" profile data: {}", steam_id, e);
                return LookupOutcome::NotFound;
            }
        };

        self.register(&steam_id, query);
        LookupOutcome::Found(profile)
    }

    /// Returns SteamDB statistics for `steam_id`, from cache when possible.
    ///
    /// A miss costs at most one health check and one scraper fetch; only
    /// non-empty results are cached.
    pub async fn enrich(&self, steam_id: &str) -> EnrichmentOutcome {
        if !self.looks_like_identity(steam_id) {
            log::warn!("Refusing to enrich non-identity {:?}", steam_id);
            return EnrichmentOutcome::NotFound;
        }

        let key = cache::cache_key(STEAMDB_NAMESPACE, steam_id);
        log::info!("Looking up {} in cache", steam_id);
        if let Some(profile) = self.cached_enrichment(&key) {
            log::info!("Returning cache of {}", steam_id);
            return EnrichmentOutcome::Enriched(profile);
        }

        log::info!("Not in cache, fetching {}.", steam_id);
        if !self.steamdb.is_reachable().await {
            log::warn!("Cant connect to SteamDB!");
            return EnrichmentOutcome::UpstreamDown;
        }

        match self.steamdb.fetch_profile(steam_id).await {
            Ok(Some(profile)) if !profile.is_empty() => {
                log::info!("Setting cache for {}", steam_id);
                self.store_enrichment(&key, &profile);
                EnrichmentOutcome::Enriched(profile)
            }
            Ok(_) => {
                log::info!("SteamDB has no profile for {}", steam_id);
                EnrichmentOutcome::NotFound
            }
            Err(e) => {
                log::error!("Something happened while fetching SteamDB profile of {}: {}", steam_id, e);
                EnrichmentOutcome::NotFound
            }
        }
    }

    fn register(&self, steam_id: &str, query: &str) {
        let result = get_connection(&self.db_pool)
            .map_err(Into::into)
            .and_then(|conn| registry::upsert_hit(&conn, steam_id, query));
        if let Err(e) = result {
            log::warn!("Failed to register hit for {}: {}", steam_id, e);
        }
    }

    fn cached_enrichment(&self, key: &str) -> Option<SteamDbProfile> {
        let cached = get_connection(&self.db_pool)
            .map_err(Into::into)
            .and_then(|conn| cache::get(&conn, key));

        match cached {
            Ok(Some(value)) => match serde_json::from_value::<SteamDbProfile>(value) {
                Ok(profile) if !profile.is_empty() => Some(profile),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Discarding unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    fn store_enrichment(&self, key: &str, profile: &SteamDbProfile) {
        if let Err(e) = self.try_store_enrichment(key, profile) {
            log::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    fn try_store_enrichment(&self, key: &str, profile: &SteamDbProfile) -> AppResult<()> {
        let payload = serde_json::to_value(profile)?;
        let conn = get_connection(&self.db_pool)?;
        cache::put(&conn, key, &payload, self.enrichment_ttl)
    }
}
