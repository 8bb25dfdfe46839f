use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.skinport.com/v1";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credentials: Credentials,
    pub general: General,
    pub catalog: CatalogConfig,
    pub tracker: TrackerConfig,
}

/// Client id/secret pair. Both empty is fine: public access.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Optional pass-through relay; the real target goes in `?url=`.
    pub relay_url: Option<String>,
    pub currency: Option<String>,
    pub app_id: Option<u32>,
    pub ttl_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub refresh_minutes: u64,
    pub store_path: PathBuf,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            relay_url: None,
            currency: None,
            app_id: None,
            ttl_secs: 300,     // 5 minutes
            timeout_secs: 30,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: 5, // matches the catalog TTL
            store_path: PathBuf::from("tracked_items.json"),
        }
    }
}

impl Credentials {
    /// Returns the pair only when both halves are set.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return None;
        }
        Some((&self.client_id, &self.client_secret))
    }

    /// Environment wins over the file.
    fn apply_env(&mut self) {
        if let Ok(id) = std::env::var("SKINPORT_CLIENT_ID") {
            self.client_id = id;
        }
        if let Ok(secret) = std::env::var("SKINPORT_CLIENT_SECRET") {
            self.client_secret = secret;
        }
    }
}

impl CatalogConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TrackerConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes.max(1) * 60)
    }
}

impl Config {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load from a TOML file (missing file = defaults), then layer `.env`
    /// and environment credentials on top.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            Self::parse(&contents)?
        } else {
            Config::default()
        };

        dotenvy::dotenv().ok();
        config.credentials.apply_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.catalog.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.catalog.ttl(), Duration::from_secs(300));
        assert_eq!(cfg.tracker.refresh_period(), Duration::from_secs(300));
        assert!(cfg.credentials.basic_auth().is_none());
    }

    #[test]
    fn test_partial_sections() {
        let cfg = Config::parse(
            r#"
            [catalog]
            relay_url = "http://localhost:3000/"
            currency = "EUR"

            [tracker]
            refresh_minutes = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.catalog.relay_url.as_deref(), Some("http://localhost:3000/"));
        assert_eq!(cfg.catalog.currency.as_deref(), Some("EUR"));
        assert_eq!(cfg.catalog.ttl_secs, 300);
        assert_eq!(cfg.tracker.refresh_period(), Duration::from_secs(600));
        assert_eq!(cfg.tracker.store_path, PathBuf::from("tracked_items.json"));
    }

    #[test]
    fn test_basic_auth_needs_both_halves() {
        let mut creds = Credentials {
            client_id: "id".to_string(),
            client_secret: String::new(),
        };
        assert!(creds.basic_auth().is_none());

        creds.client_secret = "secret".to_string();
        assert_eq!(creds.basic_auth(), Some(("id", "secret")));
    }

    #[test]
    fn test_zero_refresh_clamped() {
        let cfg = Config::parse("[tracker]\nrefresh_minutes = 0").unwrap();
        assert_eq!(cfg.tracker.refresh_period(), Duration::from_secs(60));
    }
}
