use std::{fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::{rate_limiter::MAX_WINDOW_MINUTES, store::ReadPolicy};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BALLOT_RATE_LIMIT: u32 = 30;
pub const DEFAULT_BALLOT_RATE_WINDOW_MINUTES: i64 = 1;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_tokens: Vec<String>,
    pub read_policy: ReadPolicy,
    pub ballot_rate_limit: u32,
    pub ballot_rate_window_minutes: i64,
    /// Origin prefixes granted CORS access.
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            api_tokens: Vec::new(),
            read_policy: ReadPolicy::FailOpen,
            ballot_rate_limit: DEFAULT_BALLOT_RATE_LIMIT,
            ballot_rate_window_minutes: DEFAULT_BALLOT_RATE_WINDOW_MINUTES,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl Config {
    /// Builds the configuration from a key lookup, usually the deployment's
    /// secret store. Unset or unparsable keys keep their defaults.
    pub fn load<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let strict_reads: bool = try_load(&lookup, "STRICT_READS", false);
        let read_policy = if strict_reads { ReadPolicy::FailClosed } else { ReadPolicy::FailOpen };

        let allowed_origins = match lookup("ALLOWED_ORIGINS").map(|raw| split_list(&raw)) {
            Some(origins) if !origins.is_empty() => origins,
            _ => defaults.allowed_origins,
        };

        let mut ballot_rate_window_minutes =
            try_load(&lookup, "BALLOT_RATE_WINDOW_MINUTES", defaults.ballot_rate_window_minutes);
        if !(1..=MAX_WINDOW_MINUTES).contains(&ballot_rate_window_minutes) {
            warn!(
                "BALLOT_RATE_WINDOW_MINUTES={} is outside 1..={}, using default: {}",
                ballot_rate_window_minutes, MAX_WINDOW_MINUTES, defaults.ballot_rate_window_minutes
            );
            ballot_rate_window_minutes = defaults.ballot_rate_window_minutes;
        }

        Self {
            data_dir,
            api_tokens: lookup("API_TOKENS").map(|raw| split_list(&raw)).unwrap_or_default(),
            read_policy,
            ballot_rate_limit: try_load(&lookup, "BALLOT_RATE_LIMIT", defaults.ballot_rate_limit),
            ballot_rate_window_minutes,
            allowed_origins,
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
