use crate::config::UpstreamConfig;
use crate::errors::{GatewayError, UpstreamError};
use crate::metrics_defs::UPSTREAM_REQUESTS;
use crate::types::{Contact, ContactId, Conversation, Ticket, TicketId};
use serde::de::DeserializeOwned;
use shared::counter;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// The helpdesk ignores the password when authenticating with an API key.
const API_KEY_PASSWORD: &str = "X";

/// Read-only client for the helpdesk v2 API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Arc<str>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or(crate::config::ValidationError::MissingUpstreamUrl)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(UpstreamClient {
            client: builder.build()?,
            base_url,
            api_key: config.api_key.as_str().into(),
        })
    }

    pub async fn ticket(&self, id: TicketId) -> Result<Ticket, UpstreamError> {
        self.get("ticket", &format!("/api/v2/tickets/{id}")).await
    }

    pub async fn conversations(&self, id: TicketId) -> Result<Vec<Conversation>, UpstreamError> {
        self.get("conversations", &format!("/api/v2/tickets/{id}/conversations"))
            .await
    }

    pub async fn contact(&self, id: ContactId) -> Result<Contact, UpstreamError> {
        self.get("contact", &format!("/api/v2/contacts/{id}")).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
    ) -> Result<T, UpstreamError> {
        let result = self.fetch(path).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        counter!(UPSTREAM_REQUESTS, "resource" => resource, "outcome" => outcome).increment(1);
        result
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let url = self.url_for(path)?;
        tracing::debug!(%url, "Fetching from upstream");

        let response = self
            .client
            .get(url)
            .basic_auth(&*self.api_key, Some(API_KEY_PASSWORD))
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Request {
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                path: path.to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| UpstreamError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, UpstreamError> {
        let base_path = self.base_url.path().trim_end_matches('/');
        self.base_url
            .join(&format!("{base_path}{path}"))
            .map_err(|source| UpstreamError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }
}
