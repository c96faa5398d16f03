//! Port definitions (traits) for external dependencies
//!
//! The Graph API is the only external system. Adapters implement [`GraphApi`]
//! over HTTP or in memory.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Message used when the remote error payload carries none
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Error type for publishing and lookup operations
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Instagram API error: {message}")]
    Api { message: String },
    #[error("{0}")]
    MediaRequired(String),
    #[error(
        "Local file detected ({0}). Upload the image to a public storage service and pass its public URL instead of a local path"
    )]
    UnsupportedLocalFile(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GraphError {
    /// Error built from a remote error message, falling back to a generic one
    pub fn api(message: Option<&str>) -> Self {
        Self::Api {
            message: message.unwrap_or(UNKNOWN_ERROR_MESSAGE).to_string(),
        }
    }

    /// The message supplied by the remote service, if this is an API error
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api { message } => Some(message),
            _ => None,
        }
    }
}

/// Port for the versioned Graph REST API
///
/// `path` is relative to the API host and already includes the version
/// segment, e.g. `v18.0/1784/media`. Authentication travels as an
/// `access_token` field supplied by the caller.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Query-string GET returning the parsed body
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GraphError>;

    /// Form-encoded POST returning the parsed body
    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Value, GraphError>;
}

#[async_trait]
impl<G: GraphApi + ?Sized> GraphApi for &G {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GraphError> {
        (**self).get(path, query).await
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Value, GraphError> {
        (**self).post_form(path, fields).await
    }
}
