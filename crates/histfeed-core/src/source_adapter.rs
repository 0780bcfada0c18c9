//! Source adapter contract.
//!
//! A provider integration implements [`SourceAdapter`]: it plans how the
//! requested canonical fields group into wire calls, fetches one raw frame
//! per (batch, field-unit), declares its own validation predicate, and melts
//! validated frames into canonical records. The retry orchestrator drives
//! these four capabilities and nothing else.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::fields::FieldSpec;
use crate::frame::WideFrame;
use crate::{CanonicalRecord, DateRange, ProviderId, Ticker};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    Upstream,
    Decode,
    InvalidRequest,
    Internal,
}

/// Transient acquisition error.
///
/// Consumed by the retry orchestrator; each one costs the job one attempt
/// and never propagates past the pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn upstream(provider: ProviderId, status: u16) -> Self {
        Self {
            kind: SourceErrorKind::Upstream,
            message: format!("{provider} upstream returned status {status}"),
            retryable: true,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Canonical fields sharing one wire call.
///
/// How fields group into units is adapter policy: the terminal adapter
/// issues one call per field, the retail adapter one call for all of them.
/// The orchestrator only ever sees "pull one unit for one batch".
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUnit {
    fields: Vec<FieldSpec>,
}

impl FieldUnit {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn single(spec: FieldSpec) -> Self {
        Self { fields: vec![spec] }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|spec| spec.name() == name)
    }

    /// Joined field names, for log lines.
    pub fn label(&self) -> String {
        self.fields
            .iter()
            .map(FieldSpec::name)
            .collect::<Vec<_>>()
            .join("+")
    }
}

pub type PullFuture<'a> = Pin<Box<dyn Future<Output = Result<WideFrame, SourceError>> + Send + 'a>>;

/// Provider integration contract.
///
/// Implementations must be `Send + Sync`; the orchestrator shares them
/// behind an `Arc`.
pub trait SourceAdapter: Send + Sync {
    /// Stable provider identifier stamped onto emitted records.
    fn id(&self) -> ProviderId;

    /// Group the resolved request fields into wire-call units.
    fn plan_units(&self, fields: &[FieldSpec]) -> Vec<FieldUnit>;

    /// Fetch the raw frame for one (batch, unit) over the wire.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failures, upstream error
    /// statuses, and undecodable payloads. Each error costs the job one
    /// retry attempt.
    fn pull_batch<'a>(
        &'a self,
        batch: &'a [Ticker],
        unit: &'a FieldUnit,
        range: &'a DateRange,
    ) -> PullFuture<'a>;

    /// Adapter-specific sanity predicate over a fetched frame.
    ///
    /// A `false` result is treated identically to a transport error by the
    /// orchestrator: the attempt is consumed and the job retries.
    fn validate(&self, frame: &WideFrame, batch: &[Ticker]) -> bool;

    /// Melt a validated frame into canonical records, dropping rows with
    /// missing values and stamping source, field, and registry scale.
    fn normalize(
        &self,
        frame: WideFrame,
        unit: &FieldUnit,
        batch: &[Ticker],
    ) -> Result<Vec<CanonicalRecord>, SourceError>;
}
