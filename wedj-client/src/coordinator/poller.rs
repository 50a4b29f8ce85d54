//! Fixed-interval asset polling
//!
//! One attempt per interval, no backoff. Each attempt first checks that the
//! job is still live; a failed fetch (any error) just waits for the next
//! attempt. After the final attempt's interval has elapsed the poll gives
//! up, so an asset that never appears is abandoned after exactly
//! `max_attempts * interval`.

use std::future::Future;
use std::time::Duration;
use tracing::trace;
use wedj_common::config::ClientConfig;

use crate::backend::AssetPayload;
use crate::error::BackendError;

/// Polling cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.poll_max_attempts,
        }
    }

    /// Time until an asset that never appears is given up on
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Result of polling one asset
#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    /// Fetched successfully; caller must re-check liveness before applying
    Ready(AssetPayload),
    /// Every attempt failed
    Exhausted,
    /// The job stopped being live between attempts
    Abandoned,
}

/// Poll `fetch` until it succeeds, the budget runs out, or `is_live` turns false
///
/// `is_live` is evaluated before every attempt, never cached.
pub async fn poll_asset<L, F, Fut>(policy: PollPolicy, is_live: L, mut fetch: F) -> PollOutcome
where
    L: Fn() -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AssetPayload, BackendError>>,
{
    for attempt in 1..=policy.max_attempts {
        if !is_live() {
            return PollOutcome::Abandoned;
        }

        match fetch().await {
            Ok(payload) => return PollOutcome::Ready(payload),
            Err(e) => {
                trace!(attempt, max_attempts = policy.max_attempts, error = %e, "Asset not ready");
            }
        }

        tokio::time::sleep(policy.interval).await;
    }

    PollOutcome::Exhausted
}
