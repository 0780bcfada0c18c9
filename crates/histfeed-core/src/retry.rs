//! Bounded-retry execution of one (batch, field-unit) job.
//!
//! The loop is an explicit state machine, `Attempting(n) → Succeeded |
//! Attempting(n+1) → Exhausted`, so it is testable with an injected fake
//! adapter and no network.

use std::time::Duration;

use tracing::{error, warn};

use crate::source_adapter::{FieldUnit, SourceAdapter, SourceError};
use crate::{CanonicalRecord, DateRange, Ticker};

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(3);

/// Fixed-pause retry policy.
///
/// The pause doubles as the inter-batch courtesy delay toward the upstream
/// provider. It is deliberately a fixed interval, not exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per job.
    pub max_retries: u32,
    /// Delay after every failed attempt and after every successful batch.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            pause: DEFAULT_PAUSE,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(max_retries: u32, pause: Duration) -> Self {
        Self { max_retries, pause }
    }

    /// Policy without pauses, for tests that only count attempts.
    pub fn no_pause(max_retries: u32) -> Self {
        Self::fixed(max_retries, Duration::ZERO)
    }
}

/// Per-job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Attempting(u32),
    Succeeded,
    Exhausted,
}

/// Outcome of one job after the retry loop has finished.
#[derive(Debug)]
pub struct JobResult {
    /// Terminal state: `Succeeded` or `Exhausted`.
    pub state: JobState,
    /// Records from the successful attempt; empty when exhausted.
    pub records: Vec<CanonicalRecord>,
    /// Number of attempts actually made.
    pub attempts: u32,
    /// Last typed failure observed, if any attempt produced one.
    ///
    /// Attempts that failed only validation leave no typed cause, so an
    /// exhausted job may end with no error here; the exhaustion log then
    /// falls back to a generic message.
    pub last_error: Option<SourceError>,
}

/// Drive one (batch, field-unit) job to a terminal state.
///
/// A transport error, a decode error, a `false` validation, and a normalize
/// error all consume exactly one attempt, followed by the policy pause.
/// Exhaustion is logged and reported, never raised: the caller sees it only
/// as an absence of rows.
pub async fn run_job(
    adapter: &dyn SourceAdapter,
    batch: &[Ticker],
    unit: &FieldUnit,
    range: &DateRange,
    policy: &RetryPolicy,
) -> JobResult {
    let mut state = JobState::Attempting(1);
    let mut attempts = 0;
    let mut records = Vec::new();
    let mut last_error: Option<SourceError> = None;

    loop {
        match state {
            JobState::Attempting(n) if n > policy.max_retries => {
                state = JobState::Exhausted;
            }
            JobState::Attempting(n) => {
                attempts = n;
                match adapter.pull_batch(batch, unit, range).await {
                    Ok(frame) if adapter.validate(&frame, batch) => {
                        match adapter.normalize(frame, unit, batch) {
                            Ok(rows) => {
                                records = rows;
                                state = JobState::Succeeded;
                                continue;
                            }
                            Err(err) => {
                                warn!(unit = %unit.label(), attempt = n, error = %err, "normalize failed");
                                last_error = Some(err);
                            }
                        }
                    }
                    Ok(_) => {
                        warn!(unit = %unit.label(), attempt = n, "data validation failed");
                    }
                    Err(err) => {
                        warn!(unit = %unit.label(), attempt = n, error = %err, "pull failed");
                        last_error = Some(err);
                    }
                }
                tokio::time::sleep(policy.pause).await;
                state = JobState::Attempting(n + 1);
            }
            JobState::Succeeded => {
                return JobResult {
                    state,
                    records,
                    attempts,
                    last_error,
                };
            }
            JobState::Exhausted => {
                match &last_error {
                    Some(err) => {
                        error!(unit = %unit.label(), attempts, error = %err, "exhausted retries")
                    }
                    None => {
                        error!(unit = %unit.label(), attempts, "no valid data after retries")
                    }
                }
                return JobResult {
                    state,
                    records: Vec::new(),
                    attempts,
                    last_error,
                };
            }
        }
    }
}
