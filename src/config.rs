//! Runtime configuration read from the environment.

use std::{env, time::Duration};

use tracing::warn;

use crate::domain::{CraftCostFilter, RankingStrategy};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

pub const ENV_API_URL: &str = "REALM_SCANNER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "REALM_SCANNER_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "REALM_SCANNER_CACHE_TTL_SECS";
pub const ENV_RANKING: &str = "REALM_SCANNER_RANKING";
pub const ENV_CRAFT_FILTER: &str = "REALM_SCANNER_CRAFT_FILTER";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub ranking: RankingStrategy,
    pub craft_filter: CraftCostFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            ranking: RankingStrategy::default(),
            craft_filter: CraftCostFilter::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Malformed values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup(ENV_API_URL)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| with_trailing_slash(&raw))
            .unwrap_or(defaults.api_url);

        let request_timeout = parse_or_default(&lookup, ENV_TIMEOUT_SECS, |raw| {
            raw.parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        })
        .unwrap_or(defaults.request_timeout);

        let cache_ttl = parse_or_default(&lookup, ENV_CACHE_TTL_SECS, |raw| {
            raw.parse::<u64>().ok().map(Duration::from_secs)
        })
        .unwrap_or(defaults.cache_ttl);

        let ranking = parse_or_default(&lookup, ENV_RANKING, RankingStrategy::parse)
            .unwrap_or(defaults.ranking);

        let craft_filter = parse_or_default(&lookup, ENV_CRAFT_FILTER, |raw| {
            parse_bool(raw).map(|enabled| {
                if enabled {
                    CraftCostFilter::Enabled
                } else {
                    CraftCostFilter::Disabled
                }
            })
        })
        .unwrap_or(defaults.craft_filter);

        Self {
            api_url,
            request_timeout,
            cache_ttl,
            ranking,
            craft_filter,
        }
    }
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring malformed configuration value");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

/// `Url::join` treats the last segment without a slash as a file name.
fn with_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}
