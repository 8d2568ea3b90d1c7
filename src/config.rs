use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_MAX_ATTACHMENT_BYTES;

const APP_NAME: &str = "issuedesk";
const CONFIG_FILE: &str = "config.json";

const ENV_MAX_ATTACHMENT_BYTES: &str = "ISSUEDESK_MAX_ATTACHMENT_BYTES";
const ENV_FEED_LIMIT: &str = "ISSUEDESK_FEED_LIMIT";
const ENV_ACTOR: &str = "ISSUEDESK_ACTOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Largest attachment accepted, in bytes.
    pub max_attachment_bytes: u64,
    /// How many entries the activity feed shows. The log and the summary are
    /// never truncated.
    pub feed_limit: usize,
    /// Name recorded on activity entries. `None` renders as "System".
    pub actor_name: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            feed_limit: 15,
            actor_name: None,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let base = match get_config_path().and_then(|p| Self::from_file(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ATTACHMENT_BYTES) {
            match raw.trim().parse::<u64>() {
                Ok(v) => self.max_attachment_bytes = v,
                Err(_) => tracing::warn!("Ignoring invalid {}: {:?}", ENV_MAX_ATTACHMENT_BYTES, raw),
            }
        }
        if let Some(raw) = lookup(ENV_FEED_LIMIT) {
            match raw.trim().parse::<usize>() {
                Ok(v) => self.feed_limit = v,
                Err(_) => tracing::warn!("Ignoring invalid {}: {:?}", ENV_FEED_LIMIT, raw),
            }
        }
        if let Some(raw) = lookup(ENV_ACTOR) {
            let name = raw.trim();
            self.actor_name = (!name.is_empty()).then(|| name.to_string());
        }
        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
