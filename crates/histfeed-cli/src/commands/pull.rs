use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use histfeed_core::{
    FieldRegistry, HistPuller, HttpClient, LsegAdapter, PullerConfig, ReqwestHttpClient,
    SourceAdapter, YahooAdapter,
};

use crate::cli::{OutputFormat, PullArgs, SourceSelector};
use crate::error::CliError;
use crate::output;

const LSEG_API_KEY_VAR: &str = "HISTFEED_LSEG_API_KEY";

pub async fn run(args: &PullArgs, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let http: Arc<dyn HttpClient> = Arc::new(
        ReqwestHttpClient::new().map_err(|error| CliError::Transport(error.to_string()))?,
    );

    let adapter: Arc<dyn SourceAdapter> = match args.source {
        SourceSelector::Yahoo => Arc::new(YahooAdapter::new(http)),
        SourceSelector::Lseg => {
            let api_key = std::env::var(LSEG_API_KEY_VAR).map_err(|_| CliError::MissingApiKey {
                var: LSEG_API_KEY_VAR,
            })?;
            Arc::new(LsegAdapter::new(http, api_key))
        }
    };

    let config = PullerConfig::new(&args.tickers, &args.start, &args.end)?
        .with_batch_size(args.batch_size)?
        .with_max_retries(args.max_retries)
        .with_pause(Duration::from_secs(args.pause_secs));

    let puller = HistPuller::new(config, adapter, FieldRegistry::builtin())?;
    let records = puller.pull(&args.fields).await?;

    info!(rows = records.len(), "pull complete");
    output::render_records(&records, format, pretty)
}
