//! Convergence polling
//!
//! A delete can finish at the resource provider before the Resource Manager
//! cache catches up, and deleting the parent during that window fails. After
//! every delete the orchestrators poll until the resource stops showing up.

use crate::resource::{NetAppApi, ResourceId, ResourceKind};
use std::future::Future;
use std::time::Duration;

/// Fixed-interval, bounded retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between two attempts
    pub interval: Duration,
    /// Attempts before giving up
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Longest time a full run of attempts can take
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    /// 10 second interval, 60 attempts
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 60)
    }
}

/// How a [`retry_until`] loop ended
#[derive(Debug)]
pub enum RetryOutcome<E> {
    /// The predicate held on attempt `attempts`
    Satisfied { attempts: u32 },
    /// Every attempt ran and the predicate never held
    Exhausted { attempts: u32 },
    /// An attempt failed; no further attempts were made
    Failed { attempts: u32, error: E },
}

/// Evaluate `predicate` until it returns `Ok(true)`, sleeping `policy.interval`
/// between attempts. An `Err` ends the loop at once.
pub async fn retry_until<F, Fut, E>(policy: &RetryPolicy, mut predicate: F) -> RetryOutcome<E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.interval).await;
        }

        match predicate(attempt).await {
            Ok(true) => return RetryOutcome::Satisfied { attempts: attempt },
            Ok(false) => {}
            Err(error) => {
                return RetryOutcome::Failed {
                    attempts: attempt,
                    error,
                }
            }
        }
    }

    RetryOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}

/// Result of waiting for a deleted resource to disappear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The service no longer reports the resource
    Gone { attempts: u32 },
    /// Still reported after every attempt
    StillPresent { attempts: u32 },
    /// Polling stopped early on an error
    Aborted,
}

impl WaitOutcome {
    pub fn is_gone(&self) -> bool {
        matches!(self, WaitOutcome::Gone { .. })
    }
}

/// Poll until the resource at `resource_path` is no longer found.
///
/// Best effort: running out of attempts or hitting an error is logged as a
/// warning and reported in the outcome, never returned as an error.
pub async fn wait_until_absent(
    api: &dyn NetAppApi,
    kind: ResourceKind,
    resource_path: &str,
    policy: &RetryPolicy,
) -> WaitOutcome {
    let id = match ResourceId::from_path(kind, resource_path) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Cannot poll {}: {}", resource_path, e);
            return WaitOutcome::Aborted;
        }
    };

    let outcome = retry_until(policy, |attempt| {
        let id = &id;
        async move {
            tracing::debug!("Checking {} is gone (attempt {})", id, attempt);
            api.get(id).await.map(|found| found.is_none())
        }
    })
    .await;

    match outcome {
        RetryOutcome::Satisfied { attempts } => WaitOutcome::Gone { attempts },
        RetryOutcome::Exhausted { attempts } => {
            tracing::warn!(
                "{} still present after {} checks, continuing",
                resource_path,
                attempts
            );
            WaitOutcome::StillPresent { attempts }
        }
        RetryOutcome::Failed { attempts, error } => {
            tracing::warn!(
                "Stopped waiting for {} after {} checks: {}",
                resource_path,
                attempts,
                error
            );
            WaitOutcome::Aborted
        }
    }
}
