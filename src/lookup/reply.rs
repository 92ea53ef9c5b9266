//! Transport-neutral presentation of lookup outcomes.

use std::fmt;

use serde::Serialize;

use crate::lookup::service::{EnrichmentOutcome, LookupOutcome};
use crate::steam::{SteamDbProfile, SteamProfile};

pub const NO_RESULTS_TITLE: &str = "No results!";
pub const UPSTREAM_DOWN_TITLE: &str = "SteamDB unavailable";

/// Why a reply carries no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyError {
    NotFound,
    EnrichmentNotFound,
    UpstreamUnavailable,
}

/// What a front end shows for an outcome.
///
/// `token` is set when a follow-up enrichment is possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub title: String,
    pub body: String,
    pub token: Option<String>,
    pub error: Option<ReplyError>,
}

impl Reply {
    pub fn from_lookup(query: &str, outcome: &LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Found(profile) => Self::profile(profile),
            LookupOutcome::NotFound => Self {
                title: NO_RESULTS_TITLE.to_string(),
                body: format!("Steam username not found: {}", query.trim()),
                token: None,
                error: Some(ReplyError::NotFound),
            },
        }
    }

    pub fn from_enrichment(steam_id: &str, outcome: &EnrichmentOutcome) -> Self {
        match outcome {
            EnrichmentOutcome::Enriched(stats) => Self::stats(stats),
            EnrichmentOutcome::NotFound => Self {
                title: NO_RESULTS_TITLE.to_string(),
                body: format!("SteamDB has no data for {}", steam_id),
                token: None,
                error: Some(ReplyError::EnrichmentNotFound),
            },
            EnrichmentOutcome::UpstreamDown => Self {
                title: UPSTREAM_DOWN_TITLE.to_string(),
                body: format!(
                    "Something bad happened while fetching the SteamDB Profile of {}\nMaybe SteamDB is down",
                    steam_id
                ),
                token: None,
                error: Some(ReplyError::UpstreamUnavailable),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn profile(profile: &SteamProfile) -> Self {
        Self {
            title: profile.display_name.clone(),
            body: format!(
                "{}\n{}\nSteam Profile: {}",
                profile.display_name, profile.steam_id, profile.profile_url
            ),
            token: Some(profile.steam_id.clone()),
            error: None,
        }
    }

    fn stats(stats: &SteamDbProfile) -> Self {
        let rows = [
            ("Level", &stats.level),
            ("Games", &stats.games),
            ("Played", &stats.games_played),
            ("Account Value", &stats.price),
            ("Value with offers", &stats.price_lowest),
            ("Average Game price", &stats.price_average),
            ("Price per Hour", &stats.price_hour),
            ("Hours", &stats.hours),
            ("Average Hours", &stats.hours_average),
        ];

        let mut body = String::new();
        for (label, value) in rows.iter().filter(|(_, v)| !v.is_empty()) {
            body.push_str(&format!("{}: {}\n", label, value));
        }
        if !stats.url_steamdb.is_empty() {
            body.push_str(&format!("SteamDB: {}", stats.url_steamdb));
        }

        Self {
            title: stats.display_name.clone(),
            body: body.trim_end().to_string(),
            token: None,
            error: None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.body)
    }
}
