use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::youtube::DEFAULT_USER_AGENT;
use crate::ytdlp::{DEFAULT_LANGUAGES, DEFAULT_PROGRAM};

pub const DEFAULT_OUTPUT_DIR: &str = "transcripts";
pub const DEFAULT_DELAY_MS: u64 = 500;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Subtitle languages requested after the detected one
    pub languages: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    /// Pause between videos in a batch
    pub delay_ms: Option<u64>,
    pub user_agent: Option<String>,
    /// Path or name of the yt-dlp executable
    pub yt_dlp: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytscribe/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages
            .clone()
            .filter(|langs| !langs.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms.unwrap_or(DEFAULT_DELAY_MS)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn yt_dlp(&self) -> PathBuf {
        self.yt_dlp.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytscribe")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
languages = ["pt", "en"]
output_dir = "/data/transcripts"
delay_ms = 1500
user_agent = "test-agent"
yt_dlp = "/opt/bin/yt-dlp"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.languages(), vec!["pt".to_string(), "en".to_string()]);
        assert_eq!(config.output_dir(), PathBuf::from("/data/transcripts"));
        assert_eq!(config.delay_ms(), 1500);
        assert_eq!(config.user_agent(), "test-agent");
        assert_eq!(config.yt_dlp(), PathBuf::from("/opt/bin/yt-dlp"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.languages.is_none());
        assert_eq!(config.output_dir(), PathBuf::from("transcripts"));
        assert_eq!(config.delay_ms(), 500);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.yt_dlp(), PathBuf::from("yt-dlp"));
        assert_eq!(config.languages().len(), DEFAULT_LANGUAGES.len());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str("delay_ms = 0\nlanguages = []").unwrap();
        assert_eq!(config.delay_ms(), 0);
        assert_eq!(config.languages().first().map(String::as_str), Some("es"));
    }
}
