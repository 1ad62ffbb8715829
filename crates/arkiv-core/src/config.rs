use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per job (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs_f64(self.base_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/arkiv/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArkivConfig {
    /// Records requested per checksum-listing page.
    pub page_size: usize,
    /// Worker threads handling transfer-outcome events.
    pub dispatch_workers: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ArkivConfig {
    fn default() -> Self {
        Self {
            page_size: 10_000,
            dispatch_workers: 4,
            retry: None,
        }
    }
}

impl ArkivConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(|r| r.to_policy())
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("arkiv")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ArkivConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ArkivConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ArkivConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ArkivConfig::default();
        assert_eq!(cfg.page_size, 10_000);
        assert_eq!(cfg.dispatch_workers, 4);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ArkivConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ArkivConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.page_size, cfg.page_size);
        assert_eq!(parsed.dispatch_workers, cfg.dispatch_workers);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            page_size = 500
            dispatch_workers = 2

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: ArkivConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.page_size, 500);
        assert_eq!(cfg.dispatch_workers, 2);

        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn missing_retry_section_uses_defaults() {
        let toml = r#"
            page_size = 100
            dispatch_workers = 1
        "#;
        let cfg: ArkivConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry_policy().max_attempts, RetryPolicy::default().max_attempts);
    }
}
