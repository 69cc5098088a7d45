use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Upstream base URL is not configured")]
    MissingUpstreamUrl,

    #[error("Upstream API key is empty")]
    EmptyUpstreamApiKey,

    #[error("Access key is empty")]
    EmptyAccessKey,
}

/// Ticket gateway configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Main listener serving the ticket and summary routes
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    pub admin_listener: Listener,
    /// Secret callers must present in the `x-api-key` header
    pub access_key: String,
    /// Helpdesk API the gateway reads from
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Validates the gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.upstream.validate()?;

        if self.access_key.is_empty() {
            return Err(ValidationError::EmptyAccessKey);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: Listener {
                host: "127.0.0.1".into(),
                port: 3001,
            },
            access_key: String::new(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Helpdesk API configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the helpdesk, e.g. "https://acme.freshdesk.com"
    pub base_url: Option<Url>,
    /// API key sent as the basic auth user name
    pub api_key: String,
    /// Per-request timeout. No timeout is applied when unset.
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_none() {
            return Err(ValidationError::MissingUpstreamUrl);
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::EmptyUpstreamApiKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let yaml = r#"
            listener:
                host: 0.0.0.0
                port: 8080
            admin_listener:
                host: 0.0.0.0
                port: 8081
            access_key: secret
            upstream:
                base_url: https://acme.freshdesk.com
                api_key: abc123
                timeout_secs: 10
        "#;
        serde_yaml::from_str(yaml).expect("parse config")
    }

    #[test]
    fn test_parse_config() {
        let config = valid_config();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.admin_listener.port, 8081);
        assert_eq!(config.access_key, "secret");
        assert_eq!(
            config.upstream.base_url.as_ref().map(Url::as_str),
            Some("https://acme.freshdesk.com/")
        );
        assert_eq!(config.upstream.timeout_secs, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("access_key: secret").unwrap();
        assert_eq!(config.listener, Listener::default());
        assert_eq!(config.admin_listener.port, 3001);
        assert_eq!(config.upstream.timeout_secs, None);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingUpstreamUrl)
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut config = valid_config();
        config.listener.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = valid_config();
        config.upstream.api_key.clear();
        assert_eq!(config.validate(), Err(ValidationError::EmptyUpstreamApiKey));

        let mut config = valid_config();
        config.access_key.clear();
        assert_eq!(config.validate(), Err(ValidationError::EmptyAccessKey));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let yaml = r#"
            upstream:
                base_url: "not a url"
        "#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }
}
