//! Provider-raw wide frame.
//!
//! Both adapters parse their wire responses into this date-indexed table of
//! named columns before validation and melting. The retry orchestrator never
//! inspects it; only the adapter that produced a frame knows what its columns
//! mean.

use thiserror::Error;
use time::Date;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// One named column of optional values, aligned to the frame's date index.
///
/// Non-finite values are normalized to missing at construction, so a present
/// cell is always a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct WideColumn {
    name: String,
    values: Vec<Option<f64>>,
}

impl WideColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Whether the column holds at least one present value.
    pub fn has_values(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

/// Date-indexed wide table of provider data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideFrame {
    dates: Vec<Date>,
    columns: Vec<WideColumn>,
}

impl WideFrame {
    pub fn new(dates: Vec<Date>, columns: Vec<WideColumn>) -> Result<Self, FrameError> {
        for column in &columns {
            if column.values.len() != dates.len() {
                return Err(FrameError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: dates.len(),
                    actual: column.values.len(),
                });
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn columns(&self) -> &[WideColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&WideColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// True when no cell in the frame holds a value.
    pub fn all_missing(&self) -> bool {
        self.columns.iter().all(|column| !column.has_values())
    }
}
