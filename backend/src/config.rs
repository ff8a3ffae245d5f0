use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

pub const DEFAULT_VOTES_PER_WINDOW: u32 = 30;
pub const DEFAULT_VOTE_WINDOW_SECS: i64 = 60;

/// Runtime settings of the vote service, read from the deployment's secrets.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub admin_token: Option<String>,
    pub votes_per_window: u32,
    pub vote_window_secs: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            votes_per_window: DEFAULT_VOTES_PER_WINDOW,
            vote_window_secs: DEFAULT_VOTE_WINDOW_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let admin_token = lookup("ADMIN_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if admin_token.is_none() {
            warn!("ADMIN_TOKEN not set - admin routes will reject every request");
        }

        Self {
            admin_token,
            votes_per_window: parse_or(&lookup, "VOTES_PER_WINDOW", DEFAULT_VOTES_PER_WINDOW),
            vote_window_secs: parse_or(&lookup, "VOTE_WINDOW_SECS", DEFAULT_VOTE_WINDOW_SECS),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
