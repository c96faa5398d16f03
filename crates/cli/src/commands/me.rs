//! Me command - show business account profile

use anyhow::{Context, Result};
use ig_poster_domain::InstagramClient;
use std::path::PathBuf;

use crate::args::MeArgs;
use crate::commands::{build_graph, client_config};
use crate::config::AppConfig;

pub async fn execute(args: MeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let graph = build_graph(&config, false)?;
    let mut client = InstagramClient::with_config(&*graph, client_config(&config));

    let info = client
        .me()
        .await
        .context("Failed to fetch account information")?;

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(());
    }

    println!("Instagram Account");
    println!("=================");
    println!("ID:        {}", info.id().unwrap_or_default());
    if let Some(username) = info.text("username") {
        println!("Username:  @{}", username);
    }
    if let Some(name) = info.text("name") {
        println!("Name:      {}", name);
    }
    if let Some(bio) = info.text("biography") {
        println!("Bio:       {}", bio);
    }
    if let Some(count) = info.count("followers_count") {
        println!("Followers: {}", count);
    }
    if let Some(count) = info.count("follows_count") {
        println!("Following: {}", count);
    }
    if let Some(count) = info.count("media_count") {
        println!("Posts:     {}", count);
    }

    Ok(())
}
