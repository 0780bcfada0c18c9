//! CLI argument definitions for histfeed.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pull` | Pull historical fields for a ticker list |
//! | `encode-id` | Encode a deterministic instrument id |
//! | `fields` | List the canonical field registry |
//!
//! # Examples
//!
//! ```bash
//! # Daily unadjusted closes and total returns from Yahoo
//! histfeed pull AAPL MSFT --start 2024-01-01 --end 2024-06-30 --fields close,totret
//!
//! # The same request against the LSEG terminal (needs HISTFEED_LSEG_API_KEY)
//! histfeed pull AAPL.O --start 2024-01-01 --end 2024-06-30 --source lseg
//!
//! # Instrument id for Apple equity
//! histfeed encode-id equity AAPL US0378331005
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Batched, retrying historical market-data puller.
#[derive(Debug, Parser)]
#[command(
    name = "histfeed",
    author,
    version,
    about = "Pull historical market data into canonical long-format records"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    Yahoo,
    Lseg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pull historical fields for a list of tickers.
    Pull(PullArgs),
    /// Encode a deterministic, checksum-validated instrument id.
    EncodeId(EncodeIdArgs),
    /// List the canonical field registry.
    Fields,
}

#[derive(Debug, Args)]
pub struct PullArgs {
    /// Tickers to pull, in provider syntax (e.g. AAPL, VOD.L, ^GSPC).
    #[arg(required = true)]
    pub tickers: Vec<String>,

    /// Start date, YYYY-MM-DD (inclusive).
    #[arg(long)]
    pub start: String,

    /// End date, YYYY-MM-DD.
    #[arg(long)]
    pub end: String,

    /// Canonical fields to pull.
    #[arg(long, value_delimiter = ',', default_value = "close")]
    pub fields: Vec<String>,

    /// Data source to pull from.
    #[arg(long, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Tickers per upstream request.
    #[arg(long, default_value_t = 5)]
    pub batch_size: usize,

    /// Attempts per batch before it is skipped.
    #[arg(long, default_value_t = 5)]
    pub max_retries: u32,

    /// Seconds to wait between attempts and between batches.
    #[arg(long, default_value_t = 3)]
    pub pause_secs: u64,
}

#[derive(Debug, Args)]
pub struct EncodeIdArgs {
    /// Asset class (equity, etf, index, crypto, currency, commodity).
    pub asset_class: String,

    /// Short instrument code, up to 4 alphanumeric characters.
    pub code: String,

    /// Hash source; for equities, a valid ISIN.
    pub hash_source: String,
}
