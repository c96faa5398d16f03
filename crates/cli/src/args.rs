//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ig-poster: publish photo and carousel posts to an Instagram business account
#[derive(Parser, Debug)]
#[command(name = "ig-poster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish a photo, or a carousel when several images are given
    Post(PostArgs),

    /// Show profile information for the business account
    Me(MeArgs),

    /// Exchange a user token for page credentials and write them to an env file
    Setup(SetupArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Caption text (applied to the first image of a carousel)
    #[arg(long, default_value = "")]
    pub caption: String,

    /// Public image URL; repeat for a carousel
    #[arg(long = "image", required = true)]
    pub images: Vec<String>,

    /// Run the full request sequence against an offline stub
    #[arg(long)]
    pub dry_run: bool,

    /// Output the raw publish response as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MeArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Short-lived user access token from the Graph API Explorer
    #[arg(long, env = "FACEBOOK_USER_TOKEN", hide_env_values = true)]
    pub user_token: String,

    /// Page to use, by id or 1-based position (defaults to the first page)
    #[arg(long)]
    pub page: Option<String>,

    /// Path to write the credentials env file
    #[arg(long, default_value = "./.env.local")]
    pub output: PathBuf,

    /// Overwrite an existing env file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
