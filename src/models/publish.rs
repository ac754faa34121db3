use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    ConfigureIdentity,
    EnsureRemote,
    EnsureBranch,
    Sync,
    Stage,
    Commit,
    Push,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::ConfigureIdentity => "identity-config",
            PublishStep::EnsureRemote => "remote-ensure",
            PublishStep::EnsureBranch => "branch-ensure",
            PublishStep::Sync => "remote-sync",
            PublishStep::Stage => "stage",
            PublishStep::Commit => "commit",
            PublishStep::Push => "push",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// Step failed at first and a recovery action made it pass.
    Recovered(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: PublishStep,
    pub outcome: StepOutcome,
}

/// Trace of one publish run. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct PublishAttempt {
    pub filename: String,
    pub steps: Vec<StepRecord>,
}

impl PublishAttempt {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: PublishStep, outcome: StepOutcome) {
        self.steps.push(StepRecord { step, outcome });
    }

    pub fn outcome(&self, step: PublishStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    pub fn committed(&self) -> bool {
        self.outcome(PublishStep::Commit) == Some(&StepOutcome::Succeeded)
    }

    pub fn used_forced_push(&self) -> bool {
        matches!(self.outcome(PublishStep::Push), Some(StepOutcome::Recovered(_)))
    }
}
