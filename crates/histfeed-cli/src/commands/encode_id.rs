use histfeed_core::InstrumentId;

use crate::cli::EncodeIdArgs;
use crate::error::CliError;

pub fn run(args: &EncodeIdArgs) -> Result<(), CliError> {
    let id = InstrumentId::encode(&args.asset_class, &args.code, &args.hash_source)?;
    println!("{id}");
    Ok(())
}
