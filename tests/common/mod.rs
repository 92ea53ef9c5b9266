//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use steamdb_bot::core::error::{AppError, AppResult};
use steamdb_bot::steam::{SteamApi, SteamDbProfile, SteamDbScraper, SteamProfile};
use steamdb_bot::storage::{create_pool, DbPool};
use steamdb_bot::LookupService;

pub const ROBIN_ID: &str = "76561198287455504";
pub const ENRICHMENT_TTL: Duration = Duration::from_secs(3600);

/// File-backed pool in a temporary directory. Keep the `TempDir` alive for
/// as long as the pool is used.
pub fn temp_pool() -> (TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steamdb.db");
    let pool = create_pool(path.to_str().unwrap()).unwrap();
    (dir, Arc::new(pool))
}

pub fn profile(steam_id: &str, name: &str) -> SteamProfile {
    SteamProfile {
        steam_id: steam_id.to_string(),
        display_name: name.to_string(),
        profile_url: format!("https://steamcommunity.com/profiles/{}/", steam_id),
        avatar_url: format!("https://avatars.example/{}.jpg", steam_id),
    }
}

pub fn stats(name: &str) -> SteamDbProfile {
    SteamDbProfile {
        display_name: name.to_string(),
        level: "42".to_string(),
        games: "1,024".to_string(),
        hours: "3,456h".to_string(),
        url_steamdb: format!("https://steamdb.info/calculator/{}/", ROBIN_ID),
        ..Default::default()
    }
}

/// Call of a fake collaborator, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve(String),
    FetchProfile(String),
    Probe,
    FetchStats(String),
}

/// Steam API double that records every call.
#[derive(Default)]
pub struct RecordingSteamApi {
    pub vanity: HashMap<String, String>,
    pub profiles: HashMap<String, SteamProfile>,
    pub fail: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingSteamApi {
    pub fn with_user(vanity: &str, steam_id: &str, name: &str) -> Self {
        Self {
            vanity: HashMap::from([(vanity.to_string(), steam_id.to_string())]),
            profiles: HashMap::from([(steam_id.to_string(), profile(steam_id, name))]),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SteamApi for RecordingSteamApi {
    async fn resolve_vanity_name(&self, name: &str) -> AppResult<Option<String>> {
        self.calls.lock().unwrap().push(Call::Resolve(name.to_string()));
        if self.fail {
            return Err(AppError::Validation("simulated transport failure".to_string()));
        }
        Ok(self.vanity.get(name).cloned())
    }

    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamProfile>> {
        self.calls.lock().unwrap().push(Call::FetchProfile(steam_id.to_string()));
        if self.fail {
            return Err(AppError::Validation("simulated transport failure".to_string()));
        }
        Ok(self.profiles.get(steam_id).cloned())
    }
}

/// SteamDB scraper double that records every call.
#[derive(Default)]
pub struct RecordingScraper {
    pub unreachable: bool,
    pub profiles: HashMap<String, SteamDbProfile>,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingScraper {
    pub fn with_stats(steam_id: &str, stats: SteamDbProfile) -> Self {
        Self {
            profiles: HashMap::from([(steam_id.to_string(), stats)]),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SteamDbScraper for RecordingScraper {
    async fn is_reachable(&self) -> bool {
        self.calls.lock().unwrap().push(Call::Probe);
        !self.unreachable
    }

    async fn fetch_profile(&self, steam_id: &str) -> AppResult<Option<SteamDbProfile>> {
        self.calls.lock().unwrap().push(Call::FetchStats(steam_id.to_string()));
        Ok(self.profiles.get(steam_id).cloned())
    }
}

pub fn service(pool: &Arc<DbPool>, steam: &Arc<RecordingSteamApi>, scraper: &Arc<RecordingScraper>) -> LookupService {
    LookupService::new(
        Arc::clone(pool),
        Arc::clone(steam) as Arc<dyn SteamApi>,
        Arc::clone(scraper) as Arc<dyn SteamDbScraper>,
        ENRICHMENT_TTL,
    )
}
