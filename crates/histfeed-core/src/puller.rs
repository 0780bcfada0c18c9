//! The acquisition engine: batching, pre-flight validation, and sequential
//! job driving with failure isolation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::batch::split_batches;
use crate::fields::FieldRegistry;
use crate::retry::{run_job, JobState, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_PAUSE};
use crate::source_adapter::SourceAdapter;
use crate::{CanonicalRecord, ConfigError, DateRange, Ticker};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Validated construction parameters for a pull.
#[derive(Debug, Clone)]
pub struct PullerConfig {
    tickers: Vec<Ticker>,
    range: DateRange,
    batch_size: usize,
    max_retries: u32,
    pause: Duration,
}

impl PullerConfig {
    /// Validate tickers and the date window. Batch size, retry limit, and
    /// pause start at their defaults (5, 5, 3s).
    pub fn new<I, S>(tickers: I, sdate: &str, edate: &str) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tickers = tickers
            .into_iter()
            .map(|raw| Ticker::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if tickers.is_empty() {
            return Err(ConfigError::EmptyTickerList);
        }

        Ok(Self {
            tickers,
            range: DateRange::parse(sdate, edate)?,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            pause: DEFAULT_PAUSE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub const fn range(&self) -> &DateRange {
        &self.range
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Historical data puller for one source adapter.
///
/// Drives every (batch, field-unit) job sequentially, in submission order.
/// Exhausted jobs contribute zero rows and never abort their siblings; the
/// only errors this type raises are configuration errors, all of them before
/// the first wire call.
pub struct HistPuller {
    config: PullerConfig,
    adapter: Arc<dyn SourceAdapter>,
    registry: FieldRegistry,
    batches: Vec<Vec<Ticker>>,
}

impl HistPuller {
    pub fn new(
        config: PullerConfig,
        adapter: Arc<dyn SourceAdapter>,
        registry: FieldRegistry,
    ) -> Result<Self, ConfigError> {
        let batches = split_batches(&config.tickers, config.batch_size)?;
        Ok(Self {
            config,
            adapter,
            registry,
            batches,
        })
    }

    pub fn batches(&self) -> &[Vec<Ticker>] {
        &self.batches
    }

    /// Pull one canonical field. See [`pull`](Self::pull).
    pub async fn pull_one(&self, field: &str) -> Result<Vec<CanonicalRecord>, ConfigError> {
        self.pull(&[field]).await
    }

    /// Pull the requested canonical fields for every configured ticker.
    ///
    /// All requested fields are validated against the registry up front;
    /// an unknown field fails here, before any network activity. After that
    /// the result is always `Ok`: failed jobs are logged and skipped, and a
    /// run where every job exhausts returns an empty record set.
    pub async fn pull<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<Vec<CanonicalRecord>, ConfigError> {
        let resolved = self.registry.validate_request(fields)?;
        let units = self.adapter.plan_units(&resolved);
        let policy = RetryPolicy::fixed(self.config.max_retries, self.config.pause);

        let mut records = Vec::new();
        for unit in &units {
            info!(
                source = %self.adapter.id(),
                unit = %unit.label(),
                tickers = self.config.tickers.len(),
                start = %self.config.range.start(),
                end = %self.config.range.end(),
                "pulling history"
            );

            for (index, batch) in self.batches.iter().enumerate() {
                info!(
                    batch = index + 1,
                    total = self.batches.len(),
                    tickers = ?batch,
                    "pulling batch"
                );

                let outcome =
                    run_job(self.adapter.as_ref(), batch, unit, &self.config.range, &policy).await;
                match outcome.state {
                    JobState::Succeeded => {
                        debug!(batch = index + 1, rows = outcome.records.len(), "batch complete");
                        records.extend(outcome.records);
                        tokio::time::sleep(policy.pause).await;
                    }
                    _ => {
                        error!(
                            batch = index + 1,
                            attempts = outcome.attempts,
                            "batch skipped after exhausting retries"
                        );
                    }
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_tickers_at_construction() {
        let err = PullerConfig::new(["AAPL", ""], "2024-01-01", "2024-06-30")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::EmptyTicker));

        let err = PullerConfig::new(Vec::<String>::new(), "2024-01-01", "2024-06-30")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::EmptyTickerList));
    }

    #[test]
    fn validates_dates_at_construction() {
        let err = PullerConfig::new(["AAPL"], "01/01/2024", "2024-06-30").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidDate { .. }));

        let err = PullerConfig::new(["AAPL"], "2024-06-30", "2024-01-01").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidDateRange { .. }));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = PullerConfig::new(["AAPL"], "2024-01-01", "2024-06-30").expect("valid");
        let err = config.with_batch_size(0).expect_err("must fail");
        assert_eq!(err, ConfigError::InvalidBatchSize);
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = PullerConfig::new(["AAPL"], "2024-01-01", "2024-06-30").expect("valid");
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.pause, Duration::from_secs(3));
    }
}
