//! Behavior of the retry orchestrator and the puller against a scripted
//! adapter: fail-fast field validation, bounded retries with fixed pauses,
//! and per-job failure isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use histfeed_core::{
    parse_date, run_job, CanonicalRecord, ConfigError, DateRange, FieldRegistry, FieldSpec,
    FieldUnit, HistPuller, JobState, ProviderId, PullFuture, PullerConfig, RetryPolicy,
    SourceAdapter, SourceError, Ticker, WideColumn, WideFrame,
};

/// Scripted in-memory adapter.
///
/// The first `fail_transport` pulls error at the transport layer; after
/// that, the first `fail_validations` validations return false. Batches
/// containing a poisoned ticker never validate.
#[derive(Default)]
struct ScriptedAdapter {
    fail_transport: usize,
    fail_validations: usize,
    poison: Option<String>,
    pulls: AtomicUsize,
    validations: AtomicUsize,
}

impl ScriptedAdapter {
    fn failing_validation(times: usize) -> Self {
        Self {
            fail_validations: times,
            ..Self::default()
        }
    }

    fn failing_transport(times: usize) -> Self {
        Self {
            fail_transport: times,
            ..Self::default()
        }
    }

    fn poisoned(ticker: &str) -> Self {
        Self {
            poison: Some(ticker.to_owned()),
            ..Self::default()
        }
    }

    fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for ScriptedAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn plan_units(&self, fields: &[FieldSpec]) -> Vec<FieldUnit> {
        if fields.is_empty() {
            return Vec::new();
        }
        vec![FieldUnit::new(fields.to_vec())]
    }

    fn pull_batch<'a>(
        &'a self,
        batch: &'a [Ticker],
        _unit: &'a FieldUnit,
        _range: &'a DateRange,
    ) -> PullFuture<'a> {
        let call = self.pulls.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(async move {
            if call <= self.fail_transport {
                return Err(SourceError::transport("scripted transport failure"));
            }

            let dates = vec![parse_date("2024-01-02").expect("fixture date")];
            let columns = batch
                .iter()
                .enumerate()
                .map(|(index, ticker)| {
                    WideColumn::new(ticker.as_str(), vec![Some(100.0 + index as f64)])
                })
                .collect();
            WideFrame::new(dates, columns).map_err(|error| SourceError::internal(error.to_string()))
        })
    }

    fn validate(&self, _frame: &WideFrame, batch: &[Ticker]) -> bool {
        if let Some(poison) = &self.poison {
            if batch.iter().any(|ticker| ticker.as_str() == poison) {
                return false;
            }
        }
        let seen = self.validations.fetch_add(1, Ordering::SeqCst);
        seen >= self.fail_validations
    }

    fn normalize(
        &self,
        frame: WideFrame,
        unit: &FieldUnit,
        _batch: &[Ticker],
    ) -> Result<Vec<CanonicalRecord>, SourceError> {
        let mut records = Vec::new();
        for column in frame.columns() {
            let identifier = Ticker::parse(column.name())
                .map_err(|error| SourceError::internal(error.to_string()))?;
            for spec in unit.fields() {
                for (date, cell) in frame.dates().iter().zip(column.values()) {
                    if let Some(record) = CanonicalRecord::emit(
                        *date,
                        identifier.clone(),
                        self.id(),
                        spec,
                        *cell,
                    ) {
                        records.push(record);
                    }
                }
            }
        }
        Ok(records)
    }
}

fn tickers(raw: &[&str]) -> Vec<Ticker> {
    raw.iter()
        .map(|value| Ticker::parse(value).expect("test ticker"))
        .collect()
}

fn close_unit() -> FieldUnit {
    let registry = FieldRegistry::builtin();
    FieldUnit::new(registry.validate_request(&["close"]).expect("known field"))
}

fn range() -> DateRange {
    DateRange::parse("2024-01-01", "2024-06-30").expect("valid range")
}

fn puller(adapter: Arc<ScriptedAdapter>, raw_tickers: &[&str]) -> HistPuller {
    let config = PullerConfig::new(raw_tickers, "2024-01-01", "2024-06-30")
        .expect("valid config")
        .with_batch_size(1)
        .expect("valid batch size")
        .with_max_retries(2)
        .with_pause(Duration::ZERO);
    HistPuller::new(config, adapter, FieldRegistry::builtin()).expect("valid puller")
}

#[tokio::test]
async fn unknown_field_fails_before_any_adapter_call() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let puller = puller(adapter.clone(), &["AAPL", "MSFT"]);

    let err = puller.pull(&["volume"]).await.expect_err("must fail");
    assert!(matches!(err, ConfigError::UnknownField { field } if field == "volume"));
    assert_eq!(adapter.pull_count(), 0);

    // One bad name poisons the whole request, atomically.
    let err = puller
        .pull(&["close", "volume"])
        .await
        .expect_err("must fail");
    assert!(matches!(err, ConfigError::UnknownField { .. }));
    assert_eq!(adapter.pull_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn job_recovers_after_k_validation_failures() {
    let adapter = ScriptedAdapter::failing_validation(2);
    let batch = tickers(&["AAPL"]);
    let unit = close_unit();
    let policy = RetryPolicy::fixed(5, Duration::from_secs(3));

    let started = tokio::time::Instant::now();
    let outcome = run_job(&adapter, &batch, &unit, &range(), &policy).await;

    assert_eq!(outcome.state, JobState::Succeeded);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.records.len(), 1);
    // One fixed pause after each of the two failed attempts.
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn job_exhausts_after_exactly_max_retries() {
    let adapter = ScriptedAdapter::failing_validation(usize::MAX);
    let batch = tickers(&["AAPL"]);
    let unit = close_unit();
    let policy = RetryPolicy::fixed(5, Duration::from_secs(3));

    let started = tokio::time::Instant::now();
    let outcome = run_job(&adapter, &batch, &unit, &range(), &policy).await;

    assert_eq!(outcome.state, JobState::Exhausted);
    assert_eq!(outcome.attempts, 5);
    assert!(outcome.records.is_empty());
    assert_eq!(started.elapsed(), Duration::from_secs(15));
    // Validation-only failures leave no typed cause.
    assert!(outcome.last_error.is_none());
}

#[tokio::test]
async fn exhausted_transport_job_reports_the_last_cause() {
    let adapter = ScriptedAdapter::failing_transport(usize::MAX);
    let batch = tickers(&["AAPL"]);
    let unit = close_unit();
    let policy = RetryPolicy::no_pause(3);

    let outcome = run_job(&adapter, &batch, &unit, &range(), &policy).await;

    assert_eq!(outcome.state, JobState::Exhausted);
    let cause = outcome.last_error.expect("transport cause is kept");
    assert!(cause.message().contains("scripted transport failure"));
}

#[tokio::test]
async fn exhausted_puller_returns_empty_result_not_error() {
    let adapter = Arc::new(ScriptedAdapter::failing_validation(usize::MAX));
    let puller = puller(adapter.clone(), &["AAPL"]);

    let records = puller.pull(&["close"]).await.expect("never raises");
    assert!(records.is_empty());
    // One batch, max_retries attempts.
    assert_eq!(adapter.pull_count(), 2);
}

#[tokio::test]
async fn failed_batches_do_not_abort_siblings() {
    let adapter = Arc::new(ScriptedAdapter::poisoned("BAD"));
    let puller = puller(adapter.clone(), &["BAD", "GOOD", "ALSO"]);

    let records = puller.pull(&["close"]).await.expect("never raises");

    let identifiers: Vec<&str> = records
        .iter()
        .map(|record| record.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["GOOD", "ALSO"]);
}

#[tokio::test]
async fn emitted_scale_always_matches_the_registry() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let puller = puller(adapter, &["AAPL", "MSFT"]);
    let registry = FieldRegistry::builtin();

    let records = puller
        .pull(&["close", "totret"])
        .await
        .expect("never raises");
    assert!(!records.is_empty());

    for record in &records {
        let spec = registry.lookup(&record.field).expect("field is registered");
        assert_eq!(record.scale, spec.scale(), "field {}", record.field);
        assert!(record.value.is_finite());
    }
}

#[tokio::test]
async fn batches_preserve_submission_order() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let config = PullerConfig::new(
        ["A", "B", "C", "D", "E", "F", "G"],
        "2024-01-01",
        "2024-06-30",
    )
    .expect("valid config")
    .with_batch_size(3)
    .expect("valid batch size")
    .with_pause(Duration::ZERO);
    let puller =
        HistPuller::new(config, adapter, FieldRegistry::builtin()).expect("valid puller");

    assert_eq!(puller.batches().len(), 3);

    let records = puller.pull(&["close"]).await.expect("never raises");
    let identifiers: Vec<&str> = records
        .iter()
        .map(|record| record.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["A", "B", "C", "D", "E", "F", "G"]);
}
