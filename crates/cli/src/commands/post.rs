//! Post command - publish a photo or carousel

use anyhow::{Context, Result};
use ig_poster_domain::{InstagramClient, Message, PostContent};
use std::path::PathBuf;

use crate::args::PostArgs;
use crate::commands::{build_graph, client_config};
use crate::config::AppConfig;

pub async fn execute(args: PostArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let content = build_content(&args.caption, &args.images);

    tracing::info!(
        images = args.images.len(),
        dry_run = args.dry_run,
        "Publishing post"
    );

    let graph = build_graph(&config, args.dry_run)?;
    let mut client = InstagramClient::with_config(&*graph, client_config(&config));

    let published = client.post(content).await.context("Failed to publish post")?;

    if args.json {
        let json = serde_json::to_string_pretty(&published.response)
            .context("Failed to serialize response")?;
        println!("{}", json);
    } else {
        let label = if args.images.len() > 1 {
            "Carousel post"
        } else {
            "Post"
        };
        let suffix = if args.dry_run { " (dry run)" } else { "" };
        println!("✓ {} published{}! ID: {}", label, suffix, published.id);
    }

    Ok(())
}

/// One image is a single post; several become a carousel captioned by the
/// first entry
fn build_content(caption: &str, images: &[String]) -> PostContent {
    match images {
        [image] => Message::new()
            .with_content(caption)
            .with_image(image.as_str())
            .into(),
        _ => images
            .iter()
            .enumerate()
            .map(|(i, image)| {
                let message = Message::new().with_image(image.as_str());
                if i == 0 {
                    message.with_content(caption)
                } else {
                    message
                }
            })
            .collect::<Vec<_>>()
            .into(),
    }
}
