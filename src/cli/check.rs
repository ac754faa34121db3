use crate::config::redact;
use crate::services::metadata::count_images;
use crate::Config;
use anyhow::Result;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    let images = count_images(&config.images_path()).unwrap_or(0);
    let repo_is_git = config.gallery.repo_dir.join(".git").exists();

    println!("Configuration OK");
    println!("  Repository:     {}", config.github.repo);
    println!("  Branch:         {}", config.github.branch);
    println!(
        "  Remote URL:     {}",
        redact(&config.remote_url(), &config.github.token)
    );
    println!("  Force push:     {}", config.github.force_push_fallback);
    println!("  Working tree:   {}", config.gallery.repo_dir.display());
    println!("  Images:         {} ({} files)", config.images_path().display(), images);
    println!("  Metadata:       {}", config.metadata_path().display());
    println!("  Gallery URL:    {}", config.gallery_url());
    println!("  Health port:    {}", config.server.port);

    if !repo_is_git {
        println!(
            "\n  Warning: {} is not a git working tree",
            config.gallery.repo_dir.display()
        );
    }

    Ok(())
}
