//! Lookup command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, pretty_json};
use crate::format_error_output;
use dashboard_config::{DashboardEnv, load_app_config};
use dashboard_shared::{ErrorCode, ErrorEnvelope};

/// Resolve a table id to its source and sort parameters.
pub fn run_lookup(
    mode: OutputMode,
    env: &DashboardEnv,
    table_id: &str,
) -> Result<CliOutput, CliError> {
    let config = load_app_config(env);
    let Some(table) = config.get_table_config(table_id) else {
        let error = ErrorEnvelope::expected(
            ErrorCode::new("config", "table_not_found"),
            "table id is not in the active mapping",
        )
        .with_metadata("table_id", table_id);
        return Ok(format_error_output(mode, &error));
    };

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "table": serde_json::to_value(&table)?,
        }))?
    } else {
        format!(
            "status: ok\ntype: {}\nid: {}\nname: {}\ndate_field: {}\nsort_direction: {}\nis_legacy: {}\n",
            table.source,
            table.descriptor.id,
            table.descriptor.name,
            table.descriptor.date_field,
            table.descriptor.sort_direction,
            table.is_legacy
        )
    };

    Ok(CliOutput::ok(stdout))
}
