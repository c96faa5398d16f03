//! Setup command - derive page credentials from a user token

use anyhow::{Context, Result, bail};
use ig_poster_adapters::env_file::{self, EnvKeys};
use ig_poster_domain::{AppCredentials, SetupFlow};
use secrecy::SecretString;
use std::path::PathBuf;
use time::OffsetDateTime;

use crate::args::SetupArgs;
use crate::commands::{build_graph, read_secret_env};
use crate::config::AppConfig;

pub async fn execute(args: SetupArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    if args.output.exists() && !args.force {
        bail!(
            "Credentials file already exists: {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    let user_token = args.user_token.trim();
    if user_token.is_empty() {
        bail!("No user access token provided");
    }
    let user_token = SecretString::new(user_token.into());

    let app = app_credentials(&config);

    let graph = build_graph(&config, false)?;
    let flow = SetupFlow::new(&*graph, config.graph.api_version.clone());

    let outcome = flow
        .run(app.as_ref(), &user_token, args.page.as_deref())
        .await
        .context("Setup failed")?;

    let keys = EnvKeys {
        page_id: "IG_POSTER__GRAPH__PAGE_ID".to_string(),
        account_id: "IG_POSTER__GRAPH__ACCOUNT_ID".to_string(),
        access_token: config.graph.access_token_env.clone(),
    };
    let content = env_file::render(&outcome, &keys, OffsetDateTime::now_utc());
    env_file::write(&args.output, &content, args.force)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Instagram configuration complete");
    println!();
    println!("Facebook page:        {} ({})", outcome.page_name, outcome.page_id);
    match outcome.account.username {
        Some(ref username) => println!(
            "Instagram account:    @{} ({})",
            username, outcome.account.id
        ),
        None => println!("Instagram account:    {}", outcome.account.id),
    }
    println!("Credentials written:  {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Load the credentials: source {}", args.output.display());
    println!("  2. Check the setup: ig-poster me");
    println!("  3. Images must be public URLs; upload local files to object storage first");

    Ok(())
}

/// App id from config plus secret from the environment; both are needed for
/// the long-lived token exchange
fn app_credentials(config: &AppConfig) -> Option<AppCredentials> {
    let app_id = config.app.app_id.trim();
    if app_id.is_empty() {
        return None;
    }

    let app_secret = read_secret_env(&config.app.app_secret_env)?;
    Some(AppCredentials {
        app_id: app_id.to_string(),
        app_secret,
    })
}
