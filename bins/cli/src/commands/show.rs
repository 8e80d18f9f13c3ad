//! Show command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::format_error_output;
use dashboard_config::{AppConfig, DashboardEnv, load_app_config, to_pretty_json};
use serde::Serialize;

/// JSON body of `show`; serialized directly so table mappings keep their order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowPayload<'a> {
    status: &'static str,
    environment: &'static str,
    client_config: Option<String>,
    effective_config: &'a AppConfig,
}

/// Print the effective profile.
pub fn run_show(mode: OutputMode, env: &DashboardEnv) -> Result<CliOutput, CliError> {
    let config = load_app_config(env);

    let stdout = if mode.is_json() {
        let payload = ShowPayload {
            status: "ok",
            environment: config.environment.as_str(),
            client_config: env
                .client_config_path
                .as_ref()
                .map(|path| path.to_string_lossy().to_string()),
            effective_config: &config,
        };
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let config_json = match to_pretty_json(&config) {
            Ok(config_json) => config_json,
            Err(error) => return Ok(format_error_output(mode, &error)),
        };
        format!(
            "status: ok\nenvironment: {}\nconfig:\n{config_json}",
            config.environment
        )
    };

    Ok(CliOutput::ok(stdout))
}
