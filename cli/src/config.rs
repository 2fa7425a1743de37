use anyhow::{Context, Result};
use mesh_dashboard_client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk defaults, overridden by flags and environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub base_url: Option<String>,
    #[serde(default)]
    pub mock: bool,
}

/// Effective settings after layering flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub mock: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read config {:?}", path))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(cfg)
    }

    /// `base_url` carries both the flag and `MESH_API_URL`; clap has
    /// already merged them.
    pub fn resolve(&self, base_url: Option<String>, mock: bool) -> Settings {
        Settings {
            base_url: base_url
                .or_else(|| self.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            mock: mock || self.mock,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("meshctl");
    dir.push("config.json");
    dir
}
