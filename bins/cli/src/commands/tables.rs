//! Tables command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, pretty_json};
use dashboard_config::{DashboardEnv, load_optional_client_config, resolve_app_config};
use std::fmt::Write as _;

/// List the active table mapping.
pub fn run_tables(mode: OutputMode, env: &DashboardEnv) -> Result<CliOutput, CliError> {
    let client = load_optional_client_config(env);
    let mapping = if client.is_some() { "client" } else { "placeholder" };
    let config = resolve_app_config(env, client.as_ref());

    let stdout = if mode.is_json() {
        let tables: Vec<serde_json::Value> = config
            .fresh_tables
            .iter()
            .map(|(source, descriptor)| {
                serde_json::json!({
                    "type": source.as_str(),
                    "id": descriptor.id.as_ref(),
                    "name": descriptor.name.as_ref(),
                    "dateField": descriptor.date_field.as_ref(),
                    "sortDirection": descriptor.sort_direction.as_str(),
                })
            })
            .collect();
        pretty_json(&serde_json::json!({
            "status": "ok",
            "environment": config.environment.as_str(),
            "mapping": mapping,
            "tables": tables,
        }))?
    } else {
        let mut out = format!("status: ok\nmapping: {mapping}\ntables:\n");
        for (source, descriptor) in &config.fresh_tables {
            let _ = writeln!(out, "  {source}: {} ({})", descriptor.id, descriptor.name);
        }
        out
    };

    Ok(CliOutput::ok(stdout))
}
