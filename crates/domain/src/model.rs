//! Domain models and value objects

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

use crate::ports::GraphError;

/// Graph API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v18.0";

/// Fields of a [`Message`] addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    Content,
    Image,
}

impl FromStr for MessageField {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "image" => Ok(Self::Image),
            other => Err(GraphError::InvalidInput(format!(
                "Unknown property: {}",
                other
            ))),
        }
    }
}

/// A single post entry: caption text plus one image reference
///
/// The image is either a public `http(s)://` URL or a local filesystem path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    content: String,
    #[serde(default)]
    image: String,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style caption setter
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder-style image setter
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn set(&mut self, field: MessageField, value: impl Into<String>) -> &mut Self {
        match field {
            MessageField::Content => self.content = value.into(),
            MessageField::Image => self.image = value.into(),
        }
        self
    }

    /// Set a field by its string name, rejecting unknown names
    pub fn set_named(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, GraphError> {
        let field = key.parse::<MessageField>()?;
        Ok(self.set(field, value))
    }

    pub fn get(&self, field: MessageField) -> &str {
        match field {
            MessageField::Content => &self.content,
            MessageField::Image => &self.image,
        }
    }

    /// Read a field by its string name, rejecting unknown names
    pub fn get_named(&self, key: &str) -> Result<&str, GraphError> {
        let field = key.parse::<MessageField>()?;
        Ok(self.get(field))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// True only when the image is an existing local file.
    ///
    /// Remote URLs report `false` here even though they are the form the
    /// publisher actually accepts; use [`crate::policy::classify_image`] to
    /// decide whether a message is publishable.
    pub fn has_image(&self) -> bool {
        !self.image.is_empty() && Path::new(&self.image).exists()
    }
}

/// What to publish: one photo or an ordered carousel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    Single(Message),
    Carousel(Vec<Message>),
}

impl From<Message> for PostContent {
    fn from(message: Message) -> Self {
        Self::Single(message)
    }
}

impl From<Vec<Message>> for PostContent {
    fn from(messages: Vec<Message>) -> Self {
        Self::Carousel(messages)
    }
}

/// Configuration options accepted by [`ClientConfig::set`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    FacebookPageId,
    IgAccountId,
    AccessToken,
    ApiVersion,
}

impl FromStr for ConfigKey {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebookPageId" => Ok(Self::FacebookPageId),
            "igAccountId" => Ok(Self::IgAccountId),
            "accessToken" => Ok(Self::AccessToken),
            "apiVersion" => Ok(Self::ApiVersion),
            other => Err(GraphError::InvalidInput(format!(
                "Unknown configuration key: {}",
                other
            ))),
        }
    }
}

/// Credentials and API settings for an [`crate::InstagramClient`]
///
/// Empty strings mean "not set".
#[derive(Debug)]
pub struct ClientConfig {
    pub facebook_page_id: String,
    pub ig_account_id: String,
    pub access_token: SecretString,
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            facebook_page_id: String::new(),
            ig_account_id: String::new(),
            access_token: SecretString::new("".into()),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match key {
            ConfigKey::FacebookPageId => self.facebook_page_id = value,
            ConfigKey::IgAccountId => self.ig_account_id = value,
            ConfigKey::AccessToken => self.access_token = SecretString::new(value.into()),
            ConfigKey::ApiVersion => self.api_version = value,
        }
        self
    }

    /// Set an option by its string name; unknown names leave the config untouched
    pub fn set_named(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, GraphError> {
        let key = key.parse::<ConfigKey>()?;
        Ok(self.set(key, value))
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.expose_secret().is_empty()
    }

    /// Whether either the page id or the account id is known
    pub fn has_account_source(&self) -> bool {
        !self.facebook_page_id.is_empty() || !self.ig_account_id.is_empty()
    }
}

/// Response of a successful publish call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedMedia {
    /// Id of the published media object
    pub id: String,
    /// Raw response body
    pub response: Value,
}

impl PublishedMedia {
    pub fn from_response(response: Value) -> Result<Self, GraphError> {
        let id = id_field(&response).ok_or_else(|| {
            GraphError::UnexpectedResponse("Publish response did not contain an id".to_string())
        })?;
        Ok(Self { id, response })
    }
}

/// Account info lookup result: the remote profile object, as returned, nested under `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub data: Value,
}

impl AccountInfo {
    pub fn id(&self) -> Option<String> {
        id_field(&self.data)
    }

    /// A string profile field such as `username` or `biography`
    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// A counter such as `followers_count`
    pub fn count(&self, field: &str) -> Option<u64> {
        self.data.get(field).and_then(Value::as_u64)
    }
}

/// Facebook app credentials used for the long-lived token exchange
#[derive(Debug)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: SecretString,
}

/// A Facebook page the user administers
#[derive(Debug)]
pub struct ConnectedPage {
    pub id: String,
    pub name: String,
    pub access_token: SecretString,
    pub is_published: Option<bool>,
    pub tasks: Vec<String>,
}

/// Business account linked to a page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkedAccount {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything the setup flow discovered
#[derive(Debug)]
pub struct SetupOutcome {
    pub page_id: String,
    pub page_name: String,
    pub account: LinkedAccount,
    /// Page access token derived from the long-lived user token
    pub access_token: SecretString,
}

/// Read an `id` field that the Graph API may encode as a string or a number
pub(crate) fn id_field(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
