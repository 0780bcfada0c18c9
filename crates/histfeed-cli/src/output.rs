//! Record rendering for the terminal.

use std::io::Write;

use histfeed_core::CanonicalRecord;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render_records(
    records: &[CanonicalRecord],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let rendered = if pretty {
                serde_json::to_string_pretty(records)?
            } else {
                serde_json::to_string(records)?
            };
            writeln!(out, "{rendered}")?;
        }
        OutputFormat::Csv => {
            writeln!(out, "date,identifier,source,field,scale,value")?;
            for record in records {
                writeln!(
                    out,
                    "{},{},{},{},{},{}",
                    record.date,
                    record.identifier,
                    record.source,
                    record.field,
                    record.scale,
                    record.value
                )?;
            }
        }
    }
    Ok(())
}

pub fn render_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
