use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::landing::LandingSettings;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const BACKEND_URL_ENV: &str = "PRAJNA_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub backend_url: Option<String>,
    /// Viewport width at or below which the chat sidebar behaves as an overlay.
    pub narrow_width: Option<u16>,
    pub skip_splash: Option<bool>,
    pub landing: Option<LandingOverrides>,
}

/// Optional tweaks to the landing page thresholds, in the host's own units.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LandingOverrides {
    pub splash_seconds: Option<f32>,
    pub navbar_threshold: Option<f32>,
    pub reveal_point: Option<f32>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Environment variable first, then the config file, then the local default.
    pub fn backend_url(&self) -> String {
        self.resolve_backend_url(std::env::var(BACKEND_URL_ENV).ok())
    }

    pub fn resolve_backend_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn apply_landing_overrides(&self, settings: &mut LandingSettings) {
        let Some(overrides) = &self.landing else {
            return;
        };
        if let Some(secs) = overrides.splash_seconds.filter(|s| *s >= 0.0) {
            settings.splash_duration = std::time::Duration::from_secs_f32(secs);
        }
        if let Some(threshold) = overrides.navbar_threshold {
            settings.navbar_threshold = threshold;
        }
        if let Some(point) = overrides.reveal_point {
            settings.reveal_point = point;
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("prajna").join("config.json"))
    }
}
