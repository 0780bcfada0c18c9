//! Retail market-data service adapter (Yahoo chart API).
//!
//! One wire unit covers every requested field: the chart endpoint returns
//! close, adjusted close, and split events in a single download, and the
//! canonical series are derived from those.
//!
//! Derived series:
//! - `close` is the as-traded close: the provider's close multiplied by the
//!   reverse cumulative product of forward-shifted split factors.
//! - `totret` is the day-over-day percent change of adjusted close, times
//!   100. Requesting it extends the fetch one day back and drops the first
//!   emitted row per ticker, since a return needs the prior close.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::fields::FieldSpec;
use crate::frame::{WideColumn, WideFrame};
use crate::http_client::{HttpClient, HttpRequest};
use crate::source_adapter::{FieldUnit, PullFuture, SourceAdapter, SourceError};
use crate::{CanonicalRecord, DateRange, ProviderId, Ticker};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const SERIES_CLOSE: &str = "close";
const SERIES_ADJ_CLOSE: &str = "adjclose";
const SERIES_SPLITS: &str = "splits";

pub struct YahooAdapter {
    http: Arc<dyn HttpClient>,
}

impl YahooAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    async fn fetch_chart(
        &self,
        ticker: &Ticker,
        range: &DateRange,
    ) -> Result<BTreeMap<Date, TickerDay>, SourceError> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=splits",
            YAHOO_CHART_URL,
            urlencoding::encode(ticker.as_str()),
            unix_timestamp(range.start()),
            unix_timestamp(range.end()),
        );

        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|error| {
                SourceError::transport(format!("yahoo transport error: {}", error.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::upstream(ProviderId::Yahoo, response.status));
        }

        parse_chart_response(&response.body)
    }
}

impl SourceAdapter for YahooAdapter {
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
        unit: &'a FieldUnit,
        range: &'a DateRange,
    ) -> PullFuture<'a> {
        Box::pin(async move {
            let range = if unit.contains("totret") {
                range.with_lead_days(1)
            } else {
                *range
            };

            let mut per_ticker = Vec::with_capacity(batch.len());
            let mut all_dates = BTreeSet::new();
            for ticker in batch {
                let days = self.fetch_chart(ticker, &range).await?;
                all_dates.extend(days.keys().copied());
                per_ticker.push((ticker, days));
            }

            let dates: Vec<Date> = all_dates.into_iter().collect();
            let mut columns = Vec::with_capacity(per_ticker.len() * 3);
            for (ticker, days) in per_ticker {
                let mut close = Vec::with_capacity(dates.len());
                let mut adj_close = Vec::with_capacity(dates.len());
                let mut splits = Vec::with_capacity(dates.len());
                for date in &dates {
                    let day = days.get(date).copied().unwrap_or_default();
                    close.push(day.close);
                    adj_close.push(day.adj_close);
                    splits.push(day.split);
                }
                columns.push(WideColumn::new(column_name(ticker, SERIES_CLOSE), close));
                columns.push(WideColumn::new(
                    column_name(ticker, SERIES_ADJ_CLOSE),
                    adj_close,
                ));
                columns.push(WideColumn::new(column_name(ticker, SERIES_SPLITS), splits));
            }

            WideFrame::new(dates, columns).map_err(|error| SourceError::decode(error.to_string()))
        })
    }

    fn validate(&self, frame: &WideFrame, _batch: &[Ticker]) -> bool {
        if frame.is_empty() {
            tracing::warn!("yahoo returned no data");
            return false;
        }
        if frame.all_missing() {
            tracing::warn!("yahoo data is all missing");
            return false;
        }
        true
    }

    fn normalize(
        &self,
        frame: WideFrame,
        unit: &FieldUnit,
        batch: &[Ticker],
    ) -> Result<Vec<CanonicalRecord>, SourceError> {
        // The leading row exists only to seed the return calculation.
        let start_row = if unit.contains("totret") { 1 } else { 0 };

        let mut records = Vec::new();
        for ticker in batch {
            let close = column_values(&frame, ticker, SERIES_CLOSE)?;
            let adj_close = column_values(&frame, ticker, SERIES_ADJ_CLOSE)?;
            let splits = column_values(&frame, ticker, SERIES_SPLITS)?;

            for spec in unit.fields() {
                let series = match spec.name() {
                    "close" => unadjusted_close(close, splits),
                    "totret" => total_returns(adj_close),
                    other => {
                        return Err(SourceError::invalid_request(format!(
                            "yahoo adapter cannot derive field '{other}'"
                        )))
                    }
                };

                for (index, value) in series.iter().enumerate().skip(start_row) {
                    if let Some(record) = CanonicalRecord::emit(
                        frame.dates()[index],
                        ticker.clone(),
                        ProviderId::Yahoo,
                        spec,
                        *value,
                    ) {
                        records.push(record);
                    }
                }
            }
        }

        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TickerDay {
    close: Option<f64>,
    adj_close: Option<f64>,
    split: Option<f64>,
}

fn column_name(ticker: &Ticker, series: &str) -> String {
    format!("{}:{}", ticker.as_str(), series)
}

fn column_values<'a>(
    frame: &'a WideFrame,
    ticker: &Ticker,
    series: &str,
) -> Result<&'a [Option<f64>], SourceError> {
    let name = column_name(ticker, series);
    frame
        .column(&name)
        .map(WideColumn::values)
        .ok_or_else(|| SourceError::decode(format!("yahoo frame is missing column '{name}'")))
}

fn unix_timestamp(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

/// As-traded close: provider close times the reverse cumulative product of
/// forward-shifted split factors (absent or zero factors count as 1).
fn unadjusted_close(close: &[Option<f64>], splits: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = close.len();
    let mut multiplier = vec![1.0; n];
    let mut acc = 1.0;
    for index in (0..n).rev() {
        let factor = if index + 1 < n {
            splits[index + 1].filter(|f| *f != 0.0).unwrap_or(1.0)
        } else {
            1.0
        };
        acc *= factor;
        multiplier[index] = acc;
    }

    close
        .iter()
        .zip(multiplier)
        .map(|(value, mult)| value.map(|v| v * mult))
        .collect()
}

/// Percent change of adjusted close, times 100. The first row and any row
/// without both sides of the change stay missing.
fn total_returns(adj_close: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut returns = vec![None; adj_close.len()];
    for index in 1..adj_close.len() {
        if let (Some(prev), Some(curr)) = (adj_close[index - 1], adj_close[index]) {
            if prev != 0.0 {
                returns[index] = Some((curr / prev - 1.0) * 100.0);
            }
        }
    }
    returns
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
    #[serde(default)]
    events: Option<YahooEvents>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuoteColumns>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjCloseColumns>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteColumns {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjCloseColumns {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooEvents {
    #[serde(default)]
    splits: BTreeMap<String, YahooSplitEvent>,
}

#[derive(Debug, Deserialize)]
struct YahooSplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

fn parse_chart_response(body: &str) -> Result<BTreeMap<Date, TickerDay>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|error| SourceError::decode(format!("failed to parse yahoo chart: {error}")))?;

    if let Some(error) = &response.chart.error {
        if !error.is_empty() {
            return Err(SourceError::transport(format!("yahoo chart error: {error}")));
        }
    }

    let Some(result) = response.chart.result.as_ref().and_then(|r| r.first()) else {
        return Ok(BTreeMap::new());
    };
    let Some(timestamps) = &result.timestamp else {
        return Ok(BTreeMap::new());
    };

    let close = result
        .indicators
        .quote
        .first()
        .map(|quote| quote.close.as_slice())
        .unwrap_or(&[]);
    let adj_close = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|columns| columns.first())
        .map(|column| column.adjclose.as_slice())
        .unwrap_or(&[]);

    let mut days = BTreeMap::new();
    for (index, &ts) in timestamps.iter().enumerate() {
        let date = date_of_timestamp(ts)?;
        days.insert(
            date,
            TickerDay {
                close: close.get(index).copied().flatten(),
                adj_close: adj_close.get(index).copied().flatten(),
                split: None,
            },
        );
    }

    if let Some(events) = &result.events {
        for event in events.splits.values() {
            if event.denominator == 0.0 {
                continue;
            }
            let date = date_of_timestamp(event.date)?;
            days.entry(date).or_default().split = Some(event.numerator / event.denominator);
        }
    }

    Ok(days)
}

fn date_of_timestamp(ts: i64) -> Result<Date, SourceError> {
    OffsetDateTime::from_unix_timestamp(ts)
        .map(|dt| dt.date())
        .map_err(|error| SourceError::decode(format!("invalid yahoo timestamp {ts}: {error}")))
}
