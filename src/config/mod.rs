use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const REQUIRED_VARS: [&str; 4] = [
    "TELEGRAM_BOT_TOKEN",
    "GITHUB_TOKEN",
    "GITHUB_USERNAME",
    "GITHUB_EMAIL",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Overwrite the remote branch when a normal push is rejected.
    #[serde(default)]
    pub force_push_fallback: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryConfig {
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: PathBuf,
    #[serde(default)]
    pub site_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            username: String::new(),
            email: String::new(),
            repo: default_repo(),
            remote: default_remote(),
            branch: default_branch(),
            force_push_fallback: false,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            repo_dir: default_repo_dir(),
            images_dir: default_images_dir(),
            metadata_file: default_metadata_file(),
            site_url: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_repo() -> String {
    "your-username/image-gallery".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("public/images")
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("public/images.json")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Reads the optional TOML file, then applies the process environment on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    /// Overlays values from `lookup` (normally the process environment) and validates.
    /// Empty values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = v;
        }
        if let Some(v) = var("TELEGRAM_API_URL") {
            self.telegram.api_url = v;
        }
        if let Some(v) = var("GITHUB_TOKEN") {
            self.github.token = v;
        }
        if let Some(v) = var("GITHUB_USERNAME") {
            self.github.username = v;
        }
        if let Some(v) = var("GITHUB_EMAIL") {
            self.github.email = v;
        }
        if let Some(v) = var("GITHUB_REPO") {
            self.github.repo = v;
        }
        if let Some(v) = var("GIT_BRANCH") {
            self.github.branch = v;
        }
        if let Some(v) = var("GIT_FORCE_PUSH") {
            self.github.force_push_fallback = parse_bool("GIT_FORCE_PUSH", &v)?;
        }
        if let Some(v) = var("GALLERY_REPO_DIR") {
            self.gallery.repo_dir = PathBuf::from(v);
        }
        if let Some(v) = var("GALLERY_URL") {
            self.gallery.site_url = Some(v);
        }
        if let Some(v) = var("PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            &self.telegram.bot_token,
            &self.github.token,
            &self.github.username,
            &self.github.email,
        ];
        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        if !self.github.repo.contains('/') {
            return Err(ConfigError::Invalid {
                name: "GITHUB_REPO",
                value: self.github.repo.clone(),
            });
        }
        Ok(())
    }

    pub fn images_path(&self) -> PathBuf {
        self.gallery.repo_dir.join(&self.gallery.images_dir)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.gallery.repo_dir.join(&self.gallery.metadata_file)
    }

    /// Public URL of the rendered gallery, derived from the repository when not set.
    pub fn gallery_url(&self) -> String {
        if let Some(ref url) = self.gallery.site_url {
            return url.clone();
        }
        match self.github.repo.split_once('/') {
            Some((owner, name)) => format!("https://{}.github.io/{}", owner, name),
            None => format!("https://github.com/{}", self.github.repo),
        }
    }

    /// Authenticated push URL. Contains the token; never log it.
    pub fn remote_url(&self) -> String {
        format!(
            "https://{}:{}@github.com/{}.git",
            self.github.username, self.github.token, self.github.repo
        )
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

/// Replaces anything that looks like the token with asterisks.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}
