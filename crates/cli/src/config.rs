//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub app: FacebookAppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub page_id: String,

    #[serde(default)]
    pub account_id: String,

    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookAppConfig {
    #[serde(default)]
    pub app_id: String,

    #[serde(default = "default_app_secret_env")]
    pub app_secret_env: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_token_env() -> String {
    "FACEBOOK_ACCESS_TOKEN".to_string()
}

fn default_api_version() -> String {
    ig_poster_domain::DEFAULT_API_VERSION.to_string()
}

fn default_base_url() -> String {
    ig_poster_adapters::HttpGraphApi::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_app_secret_env() -> String {
    "FACEBOOK_APP_SECRET".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            page_id: String::new(),
            account_id: String::new(),
            access_token_env: default_access_token_env(),
            api_version: default_api_version(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for FacebookAppConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret_env: default_app_secret_env(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("IG_POSTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# ig-poster configuration

[general]
log_level = "info"

[graph]
# Facebook page connected to the Instagram business account
page_id = ""
# Optional: skips the page lookup when set
account_id = ""
# Environment variable holding the page access token
access_token_env = "FACEBOOK_ACCESS_TOKEN"
api_version = "v18.0"
base_url = "https://graph.facebook.com"
timeout_secs = 30

[app]
# Only needed by `ig-poster setup` for the long-lived token exchange
app_id = ""
app_secret_env = "FACEBOOK_APP_SECRET"
"#
        .to_string()
    }
}
