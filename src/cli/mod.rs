pub mod check;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallery-bot")]
#[command(version)]
#[command(about = "Publishes images sent to a chat bot into a git-backed gallery", long_about = None)]
pub struct Cli {
    /// Optional TOML settings file; environment variables take precedence.
    #[arg(short, long, default_value = "gallery.toml", env = "GALLERY_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Commands {
    /// Start polling for images and serve the health endpoint (default)
    Run,
    /// Validate configuration and print the resolved settings
    Check,
}
