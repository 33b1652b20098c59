/*!
 * Request pacing.
 *
 * Two independent caps keep the pipeline gentle on the external service:
 * a fixed pause after every processed cell, and an optional minimum spacing
 * between generation calls derived from a requests-per-minute limit.
 */

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Pacing settings
#[derive(Debug, Clone, PartialEq)]
pub struct PacingPolicy {
    /// Pause after each cell that called the model; blank or prefilled cells skip it
    pub delay_after_cell: Duration,
    /// Upper bound on generation calls per minute
    pub max_requests_per_minute: Option<u32>,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            delay_after_cell: Duration::from_millis(300),
            max_requests_per_minute: None,
        }
    }
}

impl PacingPolicy {
    /// No pauses at all
    pub fn unpaced() -> Self {
        Self {
            delay_after_cell: Duration::ZERO,
            max_requests_per_minute: None,
        }
    }

    /// Minimum spacing between two calls, if a per-minute cap is set
    pub fn min_call_interval(&self) -> Option<Duration> {
        self.max_requests_per_minute
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64))
    }
}

/// Enforces a [`PacingPolicy`] for one run
#[derive(Debug)]
pub struct Pacer {
    policy: PacingPolicy,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            last_call: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    /// Wait until another generation call is allowed
    pub async fn before_call(&self) {
        let Some(interval) = self.policy.min_call_interval() else {
            return;
        };

        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                sleep(interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    /// Pause after a processed cell
    pub async fn after_cell(&self) {
        if !self.policy.delay_after_cell.is_zero() {
            sleep(self.policy.delay_after_cell).await;
        }
    }
}
