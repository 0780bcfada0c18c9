//! Institutional terminal adapter (LSEG historical pricing).
//!
//! One wire call per canonical field: the terminal charges per-field history
//! requests, so a unit never spans fields. Responses arrive as a date ×
//! instrument grid for the single requested raw field.

use std::sync::Arc;

use serde::Deserialize;
use time::Date;
use tracing::warn;

use crate::domain::ISO_DATE;
use crate::fields::FieldSpec;
use crate::frame::{WideColumn, WideFrame};
use crate::http_client::{HttpClient, HttpRequest};
use crate::source_adapter::{FieldUnit, PullFuture, SourceAdapter, SourceError};
use crate::{CanonicalRecord, DateRange, ProviderId, Ticker};

const LSEG_HISTORY_URL: &str =
    "https://api.refinitiv.com/data/historical-pricing/v1/interday-summaries";

pub struct LsegAdapter {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl LsegAdapter {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    fn history_url(&self, batch: &[Ticker], spec: &FieldSpec, range: &DateRange) -> String {
        let universe = batch
            .iter()
            .map(Ticker::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}?universe={}&fields={}&start={}&end={}&interval=daily",
            LSEG_HISTORY_URL,
            urlencoding::encode(&universe),
            urlencoding::encode(spec.lseg_field()),
            range.start(),
            range.end(),
        )
    }
}

impl SourceAdapter for LsegAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Lseg
    }

    fn plan_units(&self, fields: &[FieldSpec]) -> Vec<FieldUnit> {
        fields
            .iter()
            .cloned()
            .map(FieldUnit::single)
            .collect()
    }

    fn pull_batch<'a>(
        &'a self,
        batch: &'a [Ticker],
        unit: &'a FieldUnit,
        range: &'a DateRange,
    ) -> PullFuture<'a> {
        Box::pin(async move {
            let spec = unit.fields().first().ok_or_else(|| {
                SourceError::invalid_request("lseg unit must contain exactly one field")
            })?;

            let request = HttpRequest::get(self.history_url(batch, spec, range))
                .with_bearer_token(&self.api_key);
            let response = self.http.execute(request).await.map_err(|error| {
                SourceError::transport(format!("lseg transport error: {}", error.message()))
            })?;

            if !response.is_success() {
                return Err(SourceError::upstream(ProviderId::Lseg, response.status));
            }

            parse_history_response(&response.body)
        })
    }

    fn validate(&self, frame: &WideFrame, batch: &[Ticker]) -> bool {
        if frame.is_empty() {
            warn!("lseg returned no data");
            return false;
        }

        if frame.column_count() != batch.len() {
            warn!(
                expected = batch.len(),
                actual = frame.column_count(),
                "lseg column count does not match batch"
            );
            return false;
        }

        let dead: Vec<&str> = frame
            .columns()
            .iter()
            .filter(|column| !column.has_values())
            .map(WideColumn::name)
            .collect();
        if !dead.is_empty() {
            warn!(columns = ?dead, "lseg columns with no valid data");
            return false;
        }

        true
    }

    fn normalize(
        &self,
        frame: WideFrame,
        unit: &FieldUnit,
        _batch: &[Ticker],
    ) -> Result<Vec<CanonicalRecord>, SourceError> {
        let spec = unit.fields().first().ok_or_else(|| {
            SourceError::invalid_request("lseg unit must contain exactly one field")
        })?;

        let mut records = Vec::new();
        for column in frame.columns() {
            let identifier = Ticker::parse(column.name())
                .map_err(|error| SourceError::decode(error.to_string()))?;
            for (date, cell) in frame.dates().iter().zip(column.values()) {
                if let Some(record) = CanonicalRecord::emit(
                    *date,
                    identifier.clone(),
                    ProviderId::Lseg,
                    spec,
                    *cell,
                ) {
                    records.push(record);
                }
            }
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct LsegHistoryResponse {
    #[serde(default)]
    universe: Vec<String>,
    #[serde(default)]
    rows: Vec<LsegHistoryRow>,
}

#[derive(Debug, Deserialize)]
struct LsegHistoryRow {
    date: String,
    values: Vec<Option<f64>>,
}

fn parse_history_response(body: &str) -> Result<WideFrame, SourceError> {
    let response: LsegHistoryResponse = serde_json::from_str(body)
        .map_err(|error| SourceError::decode(format!("failed to parse lseg response: {error}")))?;

    let mut dates = Vec::with_capacity(response.rows.len());
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); response.universe.len()];

    for row in &response.rows {
        if row.values.len() != response.universe.len() {
            return Err(SourceError::decode(format!(
                "lseg row for {} has {} values, expected {}",
                row.date,
                row.values.len(),
                response.universe.len()
            )));
        }

        let date = Date::parse(&row.date, ISO_DATE).map_err(|_| {
            SourceError::decode(format!("lseg row has unparseable date '{}'", row.date))
        })?;
        dates.push(date);
        for (column, value) in cells.iter_mut().zip(&row.values) {
            column.push(*value);
        }
    }

    let columns = response
        .universe
        .into_iter()
        .zip(cells)
        .map(|(name, values)| WideColumn::new(name, values))
        .collect();

    WideFrame::new(dates, columns).map_err(|error| SourceError::decode(error.to_string()))
}
