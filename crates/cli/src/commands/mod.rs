//! Subcommand implementations

pub mod config;
pub mod doctor;
pub mod me;
pub mod post;
pub mod setup;

use anyhow::{Context, Result};
use ig_poster_adapters::{HttpGraphApi, StubGraphApi};
use ig_poster_domain::{ClientConfig, ConfigKey, GraphApi};
use secrecy::SecretString;
use std::time::Duration;

use crate::config::AppConfig;

/// Read a secret from the named environment variable; unset or blank is `None`
pub(crate) fn read_secret_env(env_var: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        return None;
    }

    std::env::var(env_var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| SecretString::new(value.into()))
}

/// Client configuration from the app config and the token environment variable
///
/// Missing credentials are left unset; the client reports them when used.
pub(crate) fn client_config(config: &AppConfig) -> ClientConfig {
    let mut client_config = ClientConfig::default();
    client_config
        .set(ConfigKey::FacebookPageId, config.graph.page_id.trim())
        .set(ConfigKey::IgAccountId, config.graph.account_id.trim())
        .set(ConfigKey::ApiVersion, config.graph.api_version.trim());

    if let Some(token) = read_secret_env(&config.graph.access_token_env) {
        client_config.access_token = token;
    }

    client_config
}

/// Build the Graph API backend: HTTPS, or the offline stub for dry runs
pub(crate) fn build_graph(config: &AppConfig, dry_run: bool) -> Result<Box<dyn GraphApi>> {
    if dry_run {
        tracing::info!("Dry run: requests go to the offline stub");
        return Ok(Box::new(StubGraphApi::new()));
    }

    let api = HttpGraphApi::with_base_url(
        config.graph.base_url.clone(),
        Duration::from_secs(config.graph.timeout_secs),
    )
    .context("Failed to initialize Graph API client")?;

    Ok(Box::new(api))
}
