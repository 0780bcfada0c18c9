use serde_json::json;

use histfeed_core::FieldRegistry;

use crate::error::CliError;
use crate::output;

pub fn run(pretty: bool) -> Result<(), CliError> {
    let registry = FieldRegistry::builtin();
    let fields: Vec<_> = registry
        .specs()
        .map(|spec| {
            json!({
                "name": spec.name(),
                "lseg_field": spec.lseg_field(),
                "yahoo_field": spec.yahoo_field(),
                "scale": spec.scale(),
            })
        })
        .collect();

    output::render_json(&json!({ "fields": fields }), pretty)
}
