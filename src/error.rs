use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("could not read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Another process is consuming updates for the same bot token.
    #[error("conflict with another bot instance: {0}")]
    Conflict(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bot api error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),

    #[error("file has no download path: {0}")]
    MissingFilePath(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("failed to write image '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to update metadata '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("git identity configuration failed: {0}")]
    Identity(String),

    #[error("git commit failed: {0}")]
    Commit(String),

    #[error("git push failed: {0}")]
    Push(String),

    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Everything that can go wrong while ingesting one image.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl IngestError {
    /// Text safe to show to the sender. Diagnostics stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            IngestError::Transport(_) => "Could not download the image, please try again later.",
            IngestError::Materialize(_) => "Could not save the image on the server.",
            IngestError::Metadata(_) => "Could not update the gallery index.",
            IngestError::Publish(PublishError::Identity(_)) => {
                "The gallery repository is misconfigured. Please contact the bot owner."
            }
            IngestError::Publish(_) => "Could not publish the image to the gallery repository.",
        }
    }
}
