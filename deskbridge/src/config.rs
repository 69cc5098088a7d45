use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use ticket_gateway::config::{Config as GatewayConfig, ValidationError};
use url::Url;

pub const DOMAIN_ENV: &str = "FRESHDESK_DOMAIN";
pub const UPSTREAM_API_KEY_ENV: &str = "FRESHDESK_API_KEY";
pub const ACCESS_KEY_ENV: &str = "API_ACCESS_KEY";

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when RUST_LOG is unset
    pub level: String,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".into(),
            sentry_dsn: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub metrics: Option<MetricsConfig>,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Reads the optional config file, applies environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.gateway.validate()?;

        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup(DOMAIN_ENV).filter(|d| !d.is_empty()) {
            let url = if domain.contains("://") {
                domain.clone()
            } else {
                format!("https://{domain}")
            };
            let parsed =
                Url::parse(&url).map_err(|source| ConfigError::InvalidDomain { domain, source })?;
            self.gateway.upstream.base_url = Some(parsed);
        }

        if let Some(api_key) = lookup(UPSTREAM_API_KEY_ENV) {
            self.gateway.upstream.api_key = api_key;
        }

        if let Some(access_key) = lookup(ACCESS_KEY_ENV) {
            self.gateway.access_key = access_key;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid helpdesk domain {domain:?}: {source}")]
    InvalidDomain {
        domain: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}
