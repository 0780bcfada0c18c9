//! # Histfeed Core
//!
//! Batched, retrying acquisition of historical time-series fields from
//! external market-data providers, normalized into one canonical long-format
//! record schema, plus a deterministic checksum-validated instrument-id
//! encoder.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (LSEG terminal, Yahoo retail) |
//! | [`batch`] | Order-preserving ticker batching |
//! | [`domain`] | Canonical domain types (ticker, date range, record) |
//! | [`fields`] | Canonical field registry |
//! | [`frame`] | Provider-raw wide frame |
//! | [`http_client`] | HTTP transport seam |
//! | [`instrument_id`] | Deterministic instrument-id encoder |
//! | [`puller`] | The acquisition engine |
//! | [`retry`] | Per-job retry state machine |
//! | [`source`] | Provider identifiers |
//! | [`source_adapter`] | Source adapter contract |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use histfeed_core::{
//!     FieldRegistry, HistPuller, PullerConfig, ReqwestHttpClient, YahooAdapter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = Arc::new(ReqwestHttpClient::new()?);
//!     let config = PullerConfig::new(["AAPL", "MSFT"], "2024-01-01", "2024-06-30")?;
//!     let puller = HistPuller::new(
//!         config,
//!         Arc::new(YahooAdapter::new(http)),
//!         FieldRegistry::builtin(),
//!     )?;
//!
//!     let records = puller.pull(&["close", "totret"]).await?;
//!     println!("{} rows", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Configuration errors ([`ConfigError`], [`InstrumentIdError`]) are raised
//! synchronously, before any network activity, and are never retried.
//! Transient acquisition errors ([`SourceError`]) are consumed by the retry
//! orchestrator: an exhausted job is logged and skipped, surfacing only as
//! an absence of rows. A run where every job exhausts returns an empty
//! record set, not an error — callers must check for emptiness themselves.

pub mod adapters;
pub mod batch;
pub mod domain;
pub mod fields;
pub mod frame;
pub mod http_client;
pub mod instrument_id;
pub mod puller;
pub mod retry;
pub mod source;
pub mod source_adapter;

mod error;

// Adapter implementations
pub use adapters::{LsegAdapter, YahooAdapter};

// Batching
pub use batch::split_batches;

// Domain types
pub use domain::{parse_date, CanonicalRecord, DateRange, Ticker};

// Error types
pub use error::ConfigError;

// Field registry
pub use fields::{FieldRegistry, FieldSpec};

// Frames
pub use frame::{FrameError, WideColumn, WideFrame};

// HTTP transport
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};

// Instrument identifiers
pub use instrument_id::{AssetClass, InstrumentId, InstrumentIdError};

// Puller
pub use puller::{HistPuller, PullerConfig, DEFAULT_BATCH_SIZE};

// Retry orchestration
pub use retry::{run_job, JobResult, JobState, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_PAUSE};

// Source identifiers
pub use source::ProviderId;

// Source adapter contract
pub use source_adapter::{FieldUnit, PullFuture, SourceAdapter, SourceError, SourceErrorKind};
