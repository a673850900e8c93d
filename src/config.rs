use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, AppResult};

/// All knobs for the uploader, resolved once at load time. Environment
/// overrides are folded in here so no other module touches the process
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub default_preset: String,
    pub uploader_name: String,
    pub jpeg_quality: u8,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub active_event_file: PathBuf,
    pub watch_directory: Option<PathBuf>,
    pub file_extensions: Vec<String>,
    pub status_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002".to_string(),
            timeout_secs: 10,
            upload_timeout_secs: 60,
            default_preset: "wedding_warm".to_string(),
            uploader_name: "DSLR Auto".to_string(),
            jpeg_quality: 95,
            max_retries: 3,
            retry_delay_secs: 5,
            active_event_file: PathBuf::from("dslr_selection.json"),
            watch_directory: None,
            // RAW conversion happens upstream; the pipeline only picks up
            // formats it can decode itself.
            file_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
            ],
            status_file: PathBuf::from("dslr_status.json"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from a JSON file if it exists, then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Failed to parse config file {}: {}. Using defaults.", path.display(), e);
                Config::default()
            })
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(preset) = env::var("DSLR_DEFAULT_PRESET") {
            self.default_preset = preset;
        }
        if let Ok(name) = env::var("DSLR_UPLOADER_NAME") {
            self.uploader_name = name;
        }
        if let Some(quality) = env_parse::<u8>("DSLR_JPEG_QUALITY") {
            self.jpeg_quality = quality;
        }
        if let Some(retries) = env_parse::<u32>("DSLR_MAX_RETRIES") {
            self.max_retries = retries;
        }
        if let Some(delay) = env_parse::<u64>("DSLR_RETRY_DELAY") {
            self.retry_delay_secs = delay;
        }
        if let Ok(path) = env::var("CONFIG_FILE") {
            self.active_event_file = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::validation("base_url", "Base URL cannot be empty"));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(AppError::validation("jpeg_quality", "Must be between 1 and 100"));
        }

        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(AppError::validation("max_retries", "Must be between 1 and 10"));
        }

        if self.timeout_secs == 0 || self.upload_timeout_secs == 0 {
            return Err(AppError::validation("timeout", "Timeouts must be greater than 0"));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(AppError::validation("log_level", "Must be a valid log level"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring unparseable {} value: {}", key, raw);
                None
            }
        },
        Err(_) => None,
    }
}

pub fn save_config(config: &Config, path: &Path) -> AppResult<()> {
    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)?;
    log::info!("Configuration saved to {}", path.display());
    Ok(())
}
