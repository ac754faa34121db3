use crate::config::{redact, Config};
use crate::error::PublishError;
use crate::models::{PublishAttempt, PublishStep, StepOutcome};
use crate::services::git::{GitOutput, GitRunner};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub username: String,
    pub email: String,
    pub token: String,
    pub remote: String,
    pub remote_url: String,
    pub branch: String,
    pub force_push_fallback: bool,
    /// Relative to the repository root.
    pub images_dir: String,
    /// Relative to the repository root.
    pub metadata_file: String,
}

impl PublishSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            username: config.github.username.clone(),
            email: config.github.email.clone(),
            token: config.github.token.clone(),
            remote: config.github.remote.clone(),
            remote_url: config.remote_url(),
            branch: config.github.branch.clone(),
            force_push_fallback: config.github.force_push_fallback,
            images_dir: git_path(&config.gallery.images_dir),
            metadata_file: git_path(&config.gallery.metadata_file),
        }
    }

    pub fn commit_message(filename: &str) -> String {
        format!("Add new image: {}", filename)
    }

    fn asset_path(&self, filename: &str) -> String {
        if self.images_dir.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.images_dir.trim_end_matches('/'), filename)
        }
    }
}

fn git_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Commits and pushes new gallery assets. Runs are serialized.
pub struct Publisher {
    git: Arc<dyn GitRunner>,
    settings: PublishSettings,
    lock: Mutex<()>,
}

impl Publisher {
    pub fn new(git: Arc<dyn GitRunner>, settings: PublishSettings) -> Self {
        Self {
            git,
            settings,
            lock: Mutex::new(()),
        }
    }

    pub async fn publish(&self, filename: &str) -> Result<PublishAttempt, PublishError> {
        let _guard = self.lock.lock().await;
        let mut attempt = PublishAttempt::new(filename);

        self.configure_identity(&mut attempt).await?;
        self.ensure_remote(&mut attempt).await;
        self.ensure_branch(&mut attempt).await;
        self.sync(&mut attempt).await;
        self.stage(filename, &mut attempt).await;

        if !self.commit(filename, &mut attempt).await? {
            return Ok(attempt);
        }

        self.push(&mut attempt).await?;
        tracing::info!("Published {} to {}/{}", filename, self.settings.remote, self.settings.branch);
        Ok(attempt)
    }

    async fn git(&self, args: &[&str]) -> Result<GitOutput, PublishError> {
        let output = self.git.run(args).await?;
        if !output.success {
            tracing::debug!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                self.redact(&output.diagnostic())
            );
        }
        Ok(output)
    }

    /// For steps that never abort: a git that cannot be started counts as a failed command.
    async fn best_effort(&self, args: &[&str]) -> GitOutput {
        match self.git(args).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    "Could not run git {}: {}",
                    args.first().copied().unwrap_or_default(),
                    e
                );
                GitOutput::failed(e.to_string())
            }
        }
    }

    fn redact(&self, text: &str) -> String {
        redact(text, &self.settings.token)
    }

    async fn configure_identity(&self, attempt: &mut PublishAttempt) -> Result<(), PublishError> {
        let name = self.git(&["config", "user.name", &self.settings.username]).await?;
        if !name.success {
            return self.fail_identity(attempt, &name);
        }
        let email = self.git(&["config", "user.email", &self.settings.email]).await?;
        if !email.success {
            return self.fail_identity(attempt, &email);
        }
        attempt.record(PublishStep::ConfigureIdentity, StepOutcome::Succeeded);
        Ok(())
    }

    fn fail_identity(
        &self,
        attempt: &mut PublishAttempt,
        output: &GitOutput,
    ) -> Result<(), PublishError> {
        let diagnostic = self.redact(&output.diagnostic());
        tracing::error!("Could not configure git identity: {}", diagnostic);
        attempt.record(
            PublishStep::ConfigureIdentity,
            StepOutcome::Failed(diagnostic.clone()),
        );
        Err(PublishError::Identity(diagnostic))
    }

    async fn ensure_remote(&self, attempt: &mut PublishAttempt) {
        let remote = self.settings.remote.as_str();
        let existing = self.best_effort(&["remote", "get-url", remote]).await;
        if existing.success {
            attempt.record(PublishStep::EnsureRemote, StepOutcome::Succeeded);
            return;
        }

        let added = self
            .best_effort(&["remote", "add", remote, &self.settings.remote_url])
            .await;
        let outcome = if added.success {
            tracing::info!("Added git remote '{}'", remote);
            StepOutcome::Recovered(format!("added remote {}", remote))
        } else {
            let diagnostic = self.redact(&added.diagnostic());
            tracing::warn!("Could not add git remote '{}': {}", remote, diagnostic);
            StepOutcome::Failed(diagnostic)
        };
        attempt.record(PublishStep::EnsureRemote, outcome);
    }

    async fn ensure_branch(&self, attempt: &mut PublishAttempt) {
        let target = self.settings.branch.as_str();
        let head = self.best_effort(&["rev-parse", "--abbrev-ref", "HEAD"]).await;
        let current = if head.success {
            head.stdout.trim().to_string()
        } else {
            String::new()
        };

        if current == target {
            attempt.record(PublishStep::EnsureBranch, StepOutcome::Succeeded);
            return;
        }

        if current.is_empty() || current == "HEAD" {
            tracing::warn!("Not on a branch, switching to '{}'", target);
        } else {
            tracing::warn!("On branch '{}', switching to '{}'", current, target);
        }

        let checkout = self.best_effort(&["checkout", target]).await;
        if checkout.success {
            attempt.record(
                PublishStep::EnsureBranch,
                StepOutcome::Recovered(format!("checked out {}", target)),
            );
            return;
        }

        let create = self.best_effort(&["checkout", "-b", target]).await;
        let outcome = if create.success {
            tracing::info!("Created branch '{}'", target);
            StepOutcome::Recovered(format!("created {}", target))
        } else {
            let diagnostic = self.redact(&create.diagnostic());
            tracing::warn!("Could not switch to branch '{}': {}", target, diagnostic);
            StepOutcome::Failed(diagnostic)
        };
        attempt.record(PublishStep::EnsureBranch, outcome);
    }

    async fn sync(&self, attempt: &mut PublishAttempt) {
        let pull = self
            .best_effort(&["pull", "--rebase", &self.settings.remote, &self.settings.branch])
            .await;
        if pull.success {
            attempt.record(PublishStep::Sync, StepOutcome::Succeeded);
            return;
        }

        let diagnostic = self.redact(&pull.diagnostic());
        tracing::warn!("Pull from remote failed, continuing: {}", diagnostic);
        // Leave no half-finished rebase behind for the commit step.
        self.best_effort(&["rebase", "--abort"]).await;
        attempt.record(PublishStep::Sync, StepOutcome::Failed(diagnostic));
    }

    async fn stage(&self, filename: &str, attempt: &mut PublishAttempt) {
        let asset = self.settings.asset_path(filename);
        let add = self
            .best_effort(&["add", "--", &asset, &self.settings.metadata_file])
            .await;
        let outcome = if add.success {
            StepOutcome::Succeeded
        } else {
            let diagnostic = self.redact(&add.diagnostic());
            tracing::warn!("git add failed: {}", diagnostic);
            StepOutcome::Failed(diagnostic)
        };
        attempt.record(PublishStep::Stage, outcome);
    }

    /// Returns `false` when there was nothing to commit.
    async fn commit(&self, filename: &str, attempt: &mut PublishAttempt) -> Result<bool, PublishError> {
        let staged = self.git(&["diff", "--cached", "--quiet"]).await?;
        if staged.success {
            tracing::info!("Nothing to commit for {}, skipping push", filename);
            attempt.record(
                PublishStep::Commit,
                StepOutcome::Skipped("nothing staged".to_string()),
            );
            attempt.record(
                PublishStep::Push,
                StepOutcome::Skipped("nothing committed".to_string()),
            );
            return Ok(false);
        }

        let message = PublishSettings::commit_message(filename);
        let commit = self.git(&["commit", "-m", &message]).await?;
        if !commit.success {
            let diagnostic = self.redact(&commit.diagnostic());
            tracing::error!("git commit failed: {}", diagnostic);
            attempt.record(PublishStep::Commit, StepOutcome::Failed(diagnostic.clone()));
            return Err(PublishError::Commit(diagnostic));
        }

        attempt.record(PublishStep::Commit, StepOutcome::Succeeded);
        Ok(true)
    }

    async fn push(&self, attempt: &mut PublishAttempt) -> Result<(), PublishError> {
        let remote = self.settings.remote.as_str();
        let branch = self.settings.branch.as_str();

        let push = self.git(&["push", remote, branch]).await?;
        if push.success {
            attempt.record(PublishStep::Push, StepOutcome::Succeeded);
            return Ok(());
        }

        let diagnostic = self.redact(&push.diagnostic());
        if !self.settings.force_push_fallback {
            tracing::error!("git push failed: {}", diagnostic);
            attempt.record(PublishStep::Push, StepOutcome::Failed(diagnostic.clone()));
            return Err(PublishError::Push(diagnostic));
        }

        tracing::warn!(
            "git push rejected ({}), force-pushing {} to {} (degraded mode)",
            diagnostic,
            branch,
            remote
        );
        let forced = self.git(&["push", "--force", remote, branch]).await?;
        if forced.success {
            attempt.record(
                PublishStep::Push,
                StepOutcome::Recovered("forced push".to_string()),
            );
            return Ok(());
        }

        let diagnostic = self.redact(&forced.diagnostic());
        tracing::error!("Forced push failed: {}", diagnostic);
        attempt.record(PublishStep::Push, StepOutcome::Failed(diagnostic.clone()));
        Err(PublishError::Push(diagnostic))
    }
}
