use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::date_range::iso_date;
use crate::fields::FieldSpec;
use crate::{ProviderId, Ticker};

/// One row of normalized long-format output.
///
/// `scale` always equals the registry scale of `field` at emission time;
/// rows whose value is missing are dropped before emission, never nulled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub identifier: Ticker,
    pub source: ProviderId,
    pub field: String,
    pub scale: f64,
    pub value: f64,
}

impl CanonicalRecord {
    /// Build a record from a raw cell, dropping missing and non-finite values.
    pub fn emit(
        date: Date,
        identifier: Ticker,
        source: ProviderId,
        spec: &FieldSpec,
        value: Option<f64>,
    ) -> Option<Self> {
        let value = value.filter(|v| v.is_finite())?;
        Some(Self {
            date,
            identifier,
            source,
            field: spec.name().to_owned(),
            scale: spec.scale(),
            value,
        })
    }
}
