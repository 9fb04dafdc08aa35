use color_eyre::eyre::{Context, Result, eyre};
use constants::{API_URL_ENV, APP_DIR_NAME, DEFAULT_API_BASE_URL, filename::persistent};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::util::DateStyle;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
// camel case keeps the file readable by the web frontend
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    #[serde(default)]
    pub date_style: DateStyle,
    #[serde(default)]
    pub relative_dates: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// The directory in which all persistent config data should be stored.
pub fn get_persistent_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| eyre!("Could not find user config directory"))?
        .join(APP_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayPreferences,
}

impl Config {
    /// Loads the config from the standard location, falling back to defaults if there is
    /// none. `RIVEN_API_URL` overrides the stored base URL.
    pub fn load() -> Result<Self> {
        Self::load_with_env(&Self::get_path()?)
    }

    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            tracing::info!("Using API base URL from {API_URL_ENV}");
            config.api.base_url = url;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        tracing::info!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config =
            serde_json::from_str::<Config>(&contents).context("Failed to parse config file")?;

        // An emptied-out URL would make every request fail
        if config.api.base_url.trim().is_empty() {
            config.api.base_url = default_base_url();
        }

        Ok(config)
    }

    pub fn get_path() -> Result<PathBuf> {
        Ok(get_persistent_dir()?.join(persistent::CONFIG))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        tracing::info!("Saving config to {}", path.to_string_lossy());
        fs::write(path, serde_json::to_string_pretty(&self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
