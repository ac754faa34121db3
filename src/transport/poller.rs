use crate::context::AppContext;
use crate::error::TransportError;
use crate::services::ingest;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Consecutive polling failures tolerated before giving up.
    pub max_attempts: u32,
    /// Wait after another instance was detected on the same token.
    pub conflict_delay: Duration,
    pub error_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            conflict_delay: Duration::from_secs(30),
            error_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, error: &TransportError) -> Duration {
        match error {
            TransportError::Conflict(_) => self.conflict_delay,
            _ => self.error_delay,
        }
    }
}

/// Polls for events and handles them one at a time.
///
/// Returns only when the retry budget is exhausted.
pub async fn run_polling(ctx: &AppContext, policy: RetryPolicy) -> Result<(), TransportError> {
    let mut failures = 0;

    loop {
        let events = match ctx.transport.next_events().await {
            Ok(events) => {
                failures = 0;
                events
            }
            Err(e) => {
                failures += 1;
                if failures >= policy.max_attempts {
                    tracing::error!(
                        "Giving up after {} consecutive polling failures: {}",
                        failures,
                        e
                    );
                    return Err(e);
                }
                let delay = policy.delay_for(&e);
                tracing::warn!(
                    "Polling failed (attempt {}/{}): {}. Retrying in {:?}",
                    failures,
                    policy.max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        for event in events {
            ingest::handle_event(ctx, event).await;
        }
    }
}
