//! Validate-request command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, pretty_json};
use crate::format_error_output;
use dashboard_config::{DashboardEnv, load_app_config, parse_records_request_json};

/// Validate a records request (JSON) against the active profile.
pub fn run_validate_request(
    mode: OutputMode,
    env: &DashboardEnv,
    input_json: &str,
) -> Result<CliOutput, CliError> {
    let config = load_app_config(env);
    let request = match parse_records_request_json(input_json, &config) {
        Ok(request) => request.into_inner(),
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let sort = request.sort.as_ref().map(|(field, direction)| {
        serde_json::json!({ "field": field.as_ref(), "direction": direction.as_str() })
    });
    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "request": {
                "baseId": request.base_id.as_ref(),
                "tableId": request.table_id.as_ref(),
                "maxRecords": request.max_records,
                "filterByFormula": request.filter_formula.as_deref(),
                "sort": sort,
            },
        }))?
    } else {
        let max_records = request
            .max_records
            .map_or_else(|| "all".to_string(), |value| value.to_string());
        let sort = request
            .sort
            .as_ref()
            .map_or_else(
                || "none".to_string(),
                |(field, direction)| format!("{field} {direction}"),
            );
        format!(
            "status: ok\nbase_id: {}\ntable_id: {}\nmax_records: {max_records}\nsort: {sort}\n",
            request.base_id, request.table_id
        )
    };

    Ok(CliOutput::ok(stdout))
}
