use crate::config::Config;
use crate::services::clock::{Clock, SystemClock};
use crate::services::git::{GitRunner, SystemGit};
use crate::services::materializer::FileMaterializer;
use crate::services::metadata::MetadataRecorder;
use crate::services::publish::{PublishSettings, Publisher};
use crate::transport::Transport;
use std::sync::Arc;

/// Everything the ingestion pipeline needs, built once at startup.
pub struct AppContext {
    pub config: Config,
    pub transport: Arc<dyn Transport>,
    pub clock: Arc<dyn Clock>,
    pub materializer: FileMaterializer,
    pub recorder: MetadataRecorder,
    pub publisher: Publisher,
}

impl AppContext {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        git: Arc<dyn GitRunner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let materializer = FileMaterializer::new(config.images_path());
        let recorder = MetadataRecorder::new(config.images_path(), config.metadata_path());
        let publisher = Publisher::new(git, PublishSettings::from_config(&config));

        Self {
            config,
            transport,
            clock,
            materializer,
            recorder,
            publisher,
        }
    }

    /// Production wiring: system clock and the `git` binary in the repository directory.
    pub fn with_system_git(config: Config, transport: Arc<dyn Transport>) -> Self {
        let git = Arc::new(SystemGit::new(config.gallery.repo_dir.clone()));
        Self::new(config, transport, git, Arc::new(SystemClock))
    }
}
