// Configuration management for syrinx
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub audio: AudioSettings,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the streaming server, e.g. "http://localhost:8000"
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    pub volume: f32,
    pub fade_in_duration: u64,
    pub fade_out_duration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Quiet period after the last search keystroke before hitting the server
    pub search_debounce_ms: u64,
    pub show_love_counts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                url: "http://localhost:8000".to_string(),
            },
            audio: AudioSettings {
                volume: 0.7,
                fade_in_duration: 300,
                fade_out_duration: 200,
            },
            ui: UiConfig {
                search_debounce_ms: 200,
                show_love_counts: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn app_dir() -> Result<PathBuf> {
        let dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("syrinx");
        Ok(dir)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Where the session token lives between runs
    pub fn token_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("token"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_toml() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();

        assert_eq!(parsed.server.url, "http://localhost:8000");
        assert_eq!(parsed.ui.search_debounce_ms, 200);
        assert!((parsed.audio.volume - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_config_is_rejected_not_guessed() {
        // Missing sections should fail loudly rather than invent settings
        let result: Result<Config, _> = toml::from_str("[server]\nurl = \"http://x\"\n");
        assert!(result.is_err());
    }
}
