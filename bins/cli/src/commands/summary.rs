//! Summary command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, pretty_json};
use crate::format_error_output;
use dashboard_config::{DashboardEnv, load_client_config_from_path};
use dashboard_shared::{ErrorCode, ErrorEnvelope};

/// Print the presentation summary of the configured client.
pub fn run_summary(mode: OutputMode, env: &DashboardEnv) -> Result<CliOutput, CliError> {
    let Some(path) = env.client_config_path.as_deref() else {
        let error = ErrorEnvelope::expected(
            ErrorCode::new("config", "client_config_missing"),
            "no client config; pass --client-config or set DASHBOARD_CLIENT_CONFIG",
        );
        return Ok(format_error_output(mode, &error));
    };
    let client = match load_client_config_from_path(path) {
        Ok(client) => client,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };
    let summary = client.get_client_summary();

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "summary": serde_json::to_value(&summary)?,
        }))?
    } else {
        let join = |items: &[Box<str>]| {
            items
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(", ")
        };
        format!(
            "status: ok\nclient_id: {}\nbusiness_name: {}\nbase_id: {}\nenabled_sources: {}\ndisabled_sources: {}\ntabs: {}\ndefault_tab: {}\n",
            summary.client_info.client_id,
            summary.client_info.business_name,
            summary.airtable_configuration.base_id,
            join(&summary.data_sources.enabled_sources),
            join(&summary.data_sources.disabled_sources),
            join(&summary.tab_configuration.enabled_tabs),
            summary.tab_configuration.default_tab
        )
    };

    Ok(CliOutput::ok(stdout))
}
