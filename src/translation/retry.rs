/*!
 * Retrying wrapper around a text generator.
 *
 * Each call is attempted up to `max_attempts` times with the same prompt.
 * Waits between attempts grow exponentially from `min_backoff`, doubling per
 * retry and capped at `max_backoff`. With `transient_only` set, errors that a
 * retry cannot fix (authentication, malformed request or response) fail fast.
 */

use log::{debug, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{GenerationRequest, TextGenerator};

use super::pacing::Pacer;

/// Retry settings
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Wait before the first retry
    pub min_backoff: Duration,
    /// Cap for any single wait
    pub max_backoff: Duration,
    /// Add up to 25% random jitter to each wait
    pub jitter: bool,
    /// Give up immediately on non-transient errors
    pub transient_only: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            jitter: false,
            transient_only: true,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let delay = self.min_backoff.saturating_mul(1u32 << exponent);
        delay.min(self.max_backoff)
    }

    fn backoff_with_jitter(&self, retry: u32) -> Duration {
        let base = self.backoff(retry);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let spread = base.as_millis() as u64 / 4;
        let extra = rand::rng().random_range(0..=spread);
        (base + Duration::from_millis(extra)).min(self.max_backoff)
    }

    fn should_retry(&self, error: &ProviderError) -> bool {
        !self.transient_only || error.is_transient()
    }
}

/// Text generator with bounded retries and exponential backoff
#[derive(Debug, Clone)]
pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    pacer: Option<Arc<Pacer>>,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { inner, policy, pacer: None }
    }

    /// Space every attempt through the given pacer
    pub fn with_pacer(mut self, pacer: Arc<Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate text, retrying per the policy
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, TranslationError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if let Some(pacer) = &self.pacer {
                pacer.before_call().await;
            }

            match self.inner.generate(request).await {
                Ok(text) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", self.inner.name(), attempt);
                    }
                    return Ok(text);
                }
                Err(error) if attempt < max_attempts && self.policy.should_retry(&error) => {
                    let delay = self.policy.backoff_with_jitter(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}. Retrying in {:?}",
                        self.inner.name(),
                        attempt,
                        max_attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(TranslationError::Generation { attempts: attempt, source: error });
                }
            }
        }
    }
}
