//! Config loading helpers (env + client file + profile).
//!
//! The loader owns the process-start merge order:
//! - base defaults and profile overrides (`AppConfig::resolve`)
//! - the client config file, when one is configured
//! - env overrides (`apply_env_overrides`)
//!
//! A client config that cannot be read is logged and replaced by the
//! placeholder mapping; only env parse errors reach the caller.

use crate::client::{ClientConfig, ClientConfigFile};
use crate::env::{DashboardEnv, apply_env_overrides};
use crate::profile::{AppConfig, Environment};
use crate::tables::TableMappingProvider;
use dashboard_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Parse a client config from JSON text.
pub fn parse_client_config_json(input: &str) -> Result<ClientConfig, ErrorEnvelope> {
    parse_client_config(input, ConfigFormat::Json)
}

/// Parse a client config from TOML text.
pub fn parse_client_config_toml(input: &str) -> Result<ClientConfig, ErrorEnvelope> {
    parse_client_config(input, ConfigFormat::Toml)
}

/// Read and parse a client config file; the format follows the extension.
pub fn load_client_config_from_path(path: &Path) -> Result<ClientConfig, ErrorEnvelope> {
    let format = detect_config_format(path)?;
    let text = read_config_file(path)?;
    parse_client_config(&text, format)
        .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))
}

/// Load the configured client, if any.
///
/// Failures are logged and reported as `None` so callers fall back to the
/// placeholder mapping.
pub fn load_optional_client_config(env: &DashboardEnv) -> Option<ClientConfig> {
    let path = env.client_config_path.as_deref()?;
    match load_client_config_from_path(path) {
        Ok(client) => {
            tracing::info!(
                path = %path.display(),
                client = client.client_name(),
                enabled = client.enabled_sources().len(),
                "loaded client config"
            );
            Some(client)
        },
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                code = %error.code,
                error = %error.message,
                "client config unavailable; using placeholder tables"
            );
            None
        },
    }
}

/// Resolve the profile selected by `env`, backed by `client` when present.
pub fn resolve_app_config(env: &DashboardEnv, client: Option<&ClientConfig>) -> AppConfig {
    let environment = Environment::resolve(env.environment.as_deref());
    let provider: Option<&dyn TableMappingProvider> = client.map(|client| {
        let provider: &dyn TableMappingProvider = client;
        provider
    });
    let config = AppConfig::resolve(environment, provider);
    if provider.is_none() {
        tracing::debug!(%environment, "no client config; placeholder tables active");
    }
    apply_env_overrides(config, env)
}

/// Load the full application config from parsed env settings. Never fails.
pub fn load_app_config(env: &DashboardEnv) -> AppConfig {
    let client = load_optional_client_config(env);
    resolve_app_config(env, client.as_ref())
}

/// Load the application config from the process environment.
pub fn load_app_config_std_env() -> Result<AppConfig, ErrorEnvelope> {
    let env = DashboardEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    Ok(load_app_config(&env))
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &AppConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_client_config(input: &str, format: ConfigFormat) -> Result<ClientConfig, ErrorEnvelope> {
    let file: ClientConfigFile = match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid client config JSON: {error}"),
            )
            .with_metadata("source", "client_config")
        })?,
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid client config TOML: {error}"),
            )
            .with_metadata("source", "client_config")
        })?,
    };

    ClientConfig::from_file(file).map_err(ErrorEnvelope::from)
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "client_config_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "client_config_permission_denied")
            },
            _ => ErrorCode::new("config", "client_config_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read client config: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported client config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}
