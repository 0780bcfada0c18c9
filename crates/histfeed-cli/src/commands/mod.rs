mod encode_id;
mod fields;
mod pull;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Pull(args) => pull::run(args, cli.format, cli.pretty).await,
        Command::EncodeId(args) => encode_id::run(args),
        Command::Fields => fields::run(cli.pretty),
    }
}
