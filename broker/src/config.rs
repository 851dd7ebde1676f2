//! Runtime configuration: a TOML file read at startup, with defaults
//! written back out the first time it's missing. Same
//! read-then-fall-back-to-defaults-then-persist shape as the reference
//! service's own `Settings`, trimmed to the fields this broker actually
//! needs.

use crate::db::intent_store::Environment;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SETTINGS_FILE_NAME: &str = "broker-settings.toml";

/// A value that differs between `production` and `staging`, since this
/// broker serves both out of one process (`spec.md` §3's `environment`
/// column on every intent).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerEnvironment<T> {
    pub production: T,
    pub staging: T,
}

impl<T> PerEnvironment<T> {
    pub fn get(&self, environment: Environment) -> &T {
        match environment {
            Environment::Production => &self.production,
            Environment::Staging => &self.staging,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub default_intent_ttl_seconds: u64,
    pub processing_ttl_seconds: u64,
    pub janitor_interval_seconds: u64,
    pub max_tip_recipients: usize,
    pub max_fee_percent: f64,
    pub hot_cache_enabled: bool,
    pub webhook_secrets: PerEnvironment<String>,
    pub broker_credentials: PerEnvironment<String>,
    pub provider_api_urls: PerEnvironment<String>,
    /// Compared against the `Authorization: Bearer <token>` header on the
    /// `/admin/*` surface. Empty means the admin routes are unreachable
    /// (no default secret is ever generated for admin access).
    pub admin_secret: String,

    /// Special parameter, where the settings file is located.
    pub path: Option<PathBuf>,
}

impl Settings {
    fn default() -> Self {
        Self {
            default_intent_ttl_seconds: 15 * 60,
            processing_ttl_seconds: 30 * 60,
            janitor_interval_seconds: 5 * 60,
            max_tip_recipients: 32,
            max_fee_percent: 1.0,
            hot_cache_enabled: true,
            webhook_secrets: PerEnvironment {
                production: String::new(),
                staging: String::new(),
            },
            broker_credentials: PerEnvironment {
                production: String::new(),
                staging: String::new(),
            },
            provider_api_urls: PerEnvironment {
                production: "https://api.blink.sv".to_string(),
                staging: "https://api.staging.blink.sv".to_string(),
            },
            admin_secret: String::new(),
            path: None,
        }
    }

    pub fn default_intent_ttl(&self) -> Duration {
        Duration::from_secs(self.default_intent_ttl_seconds)
    }

    pub fn processing_ttl(&self) -> Duration {
        Duration::from_secs(self.processing_ttl_seconds)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_seconds)
    }
}

async fn read_settings(data_dir: &Path) -> Result<Settings> {
    let settings_path = data_dir.join(SETTINGS_FILE_NAME);
    let data = fs::read_to_string(settings_path).await?;
    toml::from_str(&data).context("unable to parse settings file")
}

impl Settings {
    pub async fn new(data_dir: &Path) -> Self {
        match read_settings(data_dir).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("unable to read {SETTINGS_FILE_NAME}, using defaults: {e}");
                let new = Settings {
                    path: Some(data_dir.join(SETTINGS_FILE_NAME)),
                    ..Settings::default()
                };
                if let Err(e) = new.write_to_file().await {
                    tracing::error!("unable to write default settings to file: {e}");
                } else {
                    tracing::info!("default settings written to file");
                }
                new
            }
        }
    }

    pub async fn write_to_file(&self) -> Result<()> {
        let data = toml::to_string_pretty(&self).context("unable to serialize settings to TOML")?;

        let settings_path = self.path.as_ref().context("settings path not set")?.clone();
        let mut file = fs::File::create(settings_path).await?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.default_intent_ttl_seconds, settings.default_intent_ttl_seconds);
        assert_eq!(parsed.max_tip_recipients, settings.max_tip_recipients);
    }

    #[test]
    fn per_environment_selects_correctly() {
        let settings = Settings::default();
        assert_eq!(
            settings.provider_api_urls.get(Environment::Production),
            &settings.provider_api_urls.production
        );
        assert_eq!(
            settings.provider_api_urls.get(Environment::Staging),
            &settings.provider_api_urls.staging
        );
    }
}
