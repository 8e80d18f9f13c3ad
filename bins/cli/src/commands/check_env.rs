//! Check-env command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, pretty_json};
use crate::format_error_output;
use dashboard_config::{DashboardEnv, Environment};
use dashboard_shared::{ErrorCode, ErrorEnvelope};

/// Report whether the upstream API credentials are configured.
pub fn run_check_env(mode: OutputMode, env: &DashboardEnv) -> Result<CliOutput, CliError> {
    let missing = env.missing_credentials();
    if !missing.is_empty() {
        let error = ErrorEnvelope::expected(
            ErrorCode::new("config", "missing_credentials"),
            "required API credentials are not set",
        )
        .with_metadata("missing", missing.join(","));
        return Ok(format_error_output(mode, &error));
    }

    let environment = Environment::resolve(env.environment.as_deref());
    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "environment": environment.as_str(),
            "credentials": { "claude": true, "airtable": true },
        }))?
    } else {
        format!("status: ok\nenvironment: {environment}\ncredentials: configured\n")
    };

    Ok(CliOutput::ok(stdout))
}
