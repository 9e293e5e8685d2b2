use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use haul_fetch::{ClientSettings, RetryOptions};
use serde::Deserialize;

pub const APP_NAME: &str = "haul";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub download: DownloadConfig,
}

/// The `[download]` table. Every field is optional; unset fields fall back
/// to the library defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    pub max_attempts: Option<u32>,
    pub stall_timeout_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub silent: Option<bool>,
    pub accept_invalid_certs: Option<bool>,
    pub temp_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Config {
    /// Read `explicit`, else the file in the application home if it exists,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Looked up without creating the application home.
fn default_path() -> Option<PathBuf> {
    let home = haul_platform::user_home()?;
    let dir = haul_platform::app_dir_name(APP_NAME).ok()?;
    Some(home.join(dir).join(CONFIG_FILE))
}

impl DownloadConfig {
    /// Values set in `overrides` win.
    pub fn merge(self, overrides: DownloadConfig) -> Self {
        Self {
            max_attempts: overrides.max_attempts.or(self.max_attempts),
            stall_timeout_ms: overrides.stall_timeout_ms.or(self.stall_timeout_ms),
            retry_delay_ms: overrides.retry_delay_ms.or(self.retry_delay_ms),
            silent: overrides.silent.or(self.silent),
            accept_invalid_certs: overrides.accept_invalid_certs.or(self.accept_invalid_certs),
            temp_dir: overrides.temp_dir.or(self.temp_dir),
            user_agent: overrides.user_agent.or(self.user_agent),
        }
    }

    pub fn retry_options(&self) -> RetryOptions {
        let mut options = RetryOptions::default()
            .inactivity_timeout(self.stall_timeout_ms.map(Duration::from_millis))
            .silent(self.silent.unwrap_or(false));
        if let Some(max_attempts) = self.max_attempts {
            options = options.max_attempts(max_attempts);
        }
        if let Some(delay) = self.retry_delay_ms {
            options = options.retry_delay(Duration::from_millis(delay));
        }
        options
    }

    pub fn client_settings(&self) -> ClientSettings {
        let mut settings =
            ClientSettings::default().accept_invalid_certs(self.accept_invalid_certs.unwrap_or(false));
        if let Some(user_agent) = &self.user_agent {
            settings = settings.user_agent(user_agent.clone());
        }
        settings
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_download_table() {
        let config = Config::parse(
            r#"
            [download]
            max_attempts = 5
            stall_timeout_ms = 30000
            retry_delay_ms = 250
            accept_invalid_certs = true
            temp_dir = "/var/tmp"
            "#,
        )
        .unwrap();

        let options = config.download.retry_options();
        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.inactivity_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.retry_delay, Duration::from_millis(250));
        assert!(!options.silent);
        assert!(config.download.client_settings().accept_invalid_certs);
        assert_eq!(config.download.temp_dir(), PathBuf::from("/var/tmp"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::parse("[download]\nretries = 3\n").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let file = DownloadConfig {
            max_attempts: Some(5),
            stall_timeout_ms: Some(1000),
            silent: Some(true),
            ..Default::default()
        };
        let flags = DownloadConfig {
            max_attempts: Some(2),
            ..Default::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.max_attempts, Some(2));
        assert_eq!(merged.stall_timeout_ms, Some(1000));
        assert_eq!(merged.silent, Some(true));
    }

    #[test]
    fn test_defaults_without_any_source() {
        let merged = DownloadConfig::default().merge(DownloadConfig::default());
        assert_eq!(merged.retry_options(), RetryOptions::default());
        assert_eq!(merged.client_settings(), ClientSettings::default());
        assert_eq!(merged.temp_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haul.toml");
        std::fs::write(&path, "[download]\nsilent = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.download.silent, Some(true));

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
