use crate::config::ValidationError;
use crate::types::ContactId;
use http::StatusCode;
use thiserror::Error;

/// Errors raised by a single call to the helpdesk API
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("invalid upstream URL for {path}: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("upstream request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status} for {path}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode upstream response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort assembling a ticket view. Each wraps the first upstream failure.
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("ticket fetch failed: {0}")]
    Ticket(#[source] UpstreamError),

    #[error("conversation fetch failed: {0}")]
    Conversations(#[source] UpstreamError),

    #[error("name lookup for contact {id} failed: {source}")]
    Contact {
        id: ContactId,
        #[source]
        source: UpstreamError,
    },

    #[error("name lookup task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors that stop the gateway from starting or serving
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("could not build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}
