use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_API_BASE;
use crate::fetch::FetchOrdering;

pub const DEFAULT_SEARCH_TERM: &str = "React";
pub const SEARCH_KEY: &str = "search";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub initial_search_term: String,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    pub fetch_ordering: FetchOrdering,
}

impl AppConfig {
    /// `~/.hacker_stories`, used when no data directory is configured.
    pub fn home_data_dir() -> Result<PathBuf> {
        let home_dir =
            dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".hacker_stories"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            initial_search_term: DEFAULT_SEARCH_TERM.to_string(),
            data_dir: PathBuf::from(".hacker_stories"),
            request_timeout: Duration::from_secs(30),
            fetch_ordering: FetchOrdering::LatestWins,
        }
    }
}
