//! Environment variable parsing and env-to-profile merging.
//!
//! This module keeps env parsing:
//! - strict for server and credential settings (invalid values fail fast)
//! - lenient for the environment selector (unknown values mean production)
//! - safe (secret values are redacted in error metadata)

use crate::profile::AppConfig;
use dashboard_shared::{ErrorCode, ErrorEnvelope, SecretString, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Env var: deployment environment selector.
pub const ENV_DASHBOARD_ENV: &str = "DASHBOARD_ENV";
/// Env var: deployment environment selector (alias).
pub const ENV_DASHBOARD_ENV_ALIAS: &str = "FLASK_ENV";
/// Env var: path to the client config file (JSON or TOML).
pub const ENV_CLIENT_CONFIG: &str = "DASHBOARD_CLIENT_CONFIG";
/// Env var: server bind host.
pub const ENV_HOST: &str = "HOST";
/// Env var: server bind port.
pub const ENV_PORT: &str = "PORT";
/// Env var: allowed cross-origin sources as CSV.
pub const ENV_CORS_ORIGINS: &str = "DASHBOARD_CORS_ORIGINS";
/// Env var: Claude API key (secret).
pub const ENV_CLAUDE_API_KEY: &str = "CLAUDE_API_KEY";
/// Env var: Airtable API key (secret).
pub const ENV_AIRTABLE_API_KEY: &str = "AIRTABLE_API_KEY";

/// Every variable read by [`DashboardEnv::from_std_env`].
pub const ENV_VARS: [&str; 8] = [
    ENV_DASHBOARD_ENV,
    ENV_DASHBOARD_ENV_ALIAS,
    ENV_CLIENT_CONFIG,
    ENV_HOST,
    ENV_PORT,
    ENV_CORS_ORIGINS,
    ENV_CLAUDE_API_KEY,
    ENV_AIRTABLE_API_KEY,
];

const MAX_CORS_ORIGINS: usize = 64;

/// Typed env-derived settings for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardEnv {
    /// Raw environment selector, passed to `Environment::resolve` as-is.
    /// A blank primary variable defers to the alias.
    pub environment: Option<String>,
    /// Client config file location.
    pub client_config_path: Option<PathBuf>,
    /// Override for `server.host`.
    pub host: Option<Box<str>>,
    /// Override for `server.port`.
    pub port: Option<u16>,
    /// Override for `corsOrigins` (normalized, sorted, deduplicated). A blank
    /// list counts as unset.
    pub cors_origins: Option<Vec<Box<str>>>,
    /// Claude API key.
    pub claude_api_key: Option<SecretString>,
    /// Airtable API key.
    pub airtable_api_key: Option<SecretString>,
}

impl DashboardEnv {
    /// Parse env settings from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            environment: [ENV_DASHBOARD_ENV, ENV_DASHBOARD_ENV_ALIAS]
                .iter()
                .find_map(|var| {
                    map.get(*var)
                        .filter(|value| !value.trim().is_empty())
                        .cloned()
                }),
            client_config_path: parse_optional_trimmed_string(map, ENV_CLIENT_CONFIG)?
                .map(|path| PathBuf::from(path.as_ref())),
            host: parse_optional_trimmed_string(map, ENV_HOST)?,
            port: parse_optional_u16(map, ENV_PORT)?,
            cors_origins: parse_optional_csv_origins(map, ENV_CORS_ORIGINS)?,
            claude_api_key: parse_optional_secret(map, ENV_CLAUDE_API_KEY)?,
            airtable_api_key: parse_optional_secret(map, ENV_AIRTABLE_API_KEY)?,
        })
    }

    /// Parse env settings from the current process environment.
    ///
    /// Variables whose value is not valid unicode are treated as unset.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Names of the credential variables that are not set.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.claude_api_key.is_none() {
            missing.push(ENV_CLAUDE_API_KEY);
        }
        if self.airtable_api_key.is_none() {
            missing.push(ENV_AIRTABLE_API_KEY);
        }
        missing
    }
}

/// Apply env overrides to a resolved profile (env wins over profile values).
#[must_use]
pub fn apply_env_overrides(base: AppConfig, env: &DashboardEnv) -> AppConfig {
    let mut config = base;
    if let Some(host) = env.host.as_ref() {
        config.server.host.clone_from(host);
    }
    if let Some(port) = env.port {
        config.server.port = port;
    }
    if let Some(origins) = env.cors_origins.as_ref() {
        config.cors_origins.clone_from(origins);
    }
    config
}

/// Errors raised while parsing env settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var (or CSV entry) had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// CSV list exceeds a safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::CsvTooLarge { .. } => ErrorCode::new("config", "invalid_env_csv"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be a port number"),
            Self::InvalidUrl { var, .. } => {
                write!(formatter, "{var} must contain http(s) origins")
            },
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidUrl { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", redact_if_secret(var, &value))
            },
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptySecret { var });
    }

    Ok(Some(SecretString::new(trimmed.to_owned())))
}

fn parse_optional_u16(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u16>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_csv_origins(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Vec<Box<str>>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let items = parse_csv(raw);
    if items.is_empty() {
        return Ok(None);
    }
    if items.len() > MAX_CORS_ORIGINS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CORS_ORIGINS,
        });
    }

    let mut normalized = Vec::with_capacity(items.len());
    for item in items {
        let parsed = Url::parse(&item).map_err(|_| EnvParseError::InvalidUrl {
            var,
            value: item.clone(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EnvParseError::InvalidUrl { var, value: item });
        }
        normalized.push(parsed.origin().ascii_serialization().into_boxed_str());
    }

    normalized.sort_unstable();
    normalized.dedup();
    Ok(Some(normalized))
}

fn parse_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Environment, resolve_profile};
    use dashboard_shared::REDACTED_VALUE;
    use std::error::Error;

    fn env_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_map_yields_no_overrides() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&BTreeMap::new())?;
        assert_eq!(env, DashboardEnv::default());
        assert_eq!(
            env.missing_credentials(),
            vec![ENV_CLAUDE_API_KEY, ENV_AIRTABLE_API_KEY]
        );
        Ok(())
    }

    #[test]
    fn primary_selector_wins_over_alias() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&env_map(&[
            (ENV_DASHBOARD_ENV, "testing"),
            (ENV_DASHBOARD_ENV_ALIAS, "development"),
        ]))?;
        assert_eq!(env.environment.as_deref(), Some("testing"));

        let env = DashboardEnv::from_map(&env_map(&[(ENV_DASHBOARD_ENV_ALIAS, "Development")]))?;
        assert_eq!(
            Environment::resolve(env.environment.as_deref()),
            Environment::Development
        );
        Ok(())
    }

    #[test]
    fn blank_primary_selector_falls_through_to_alias() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&env_map(&[
            (ENV_DASHBOARD_ENV, ""),
            (ENV_DASHBOARD_ENV_ALIAS, "development"),
        ]))?;
        assert_eq!(env.environment.as_deref(), Some("development"));
        assert_eq!(
            Environment::resolve(env.environment.as_deref()),
            Environment::Development
        );
        Ok(())
    }

    #[test]
    fn blank_cors_origins_keep_profile_list() -> Result<(), Box<dyn Error>> {
        for raw in ["", "  ", " , ,"] {
            let env = DashboardEnv::from_map(&env_map(&[(ENV_CORS_ORIGINS, raw)]))?;
            assert_eq!(env.cors_origins, None);

            let profile = resolve_profile(Some("development"), None);
            let expected = profile.cors_origins.clone();
            let config = apply_env_overrides(profile, &env);
            assert_eq!(config.cors_origins, expected);
            assert!(!config.cors_origins.is_empty());
        }
        Ok(())
    }

    #[test]
    fn blank_selector_is_not_an_error() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&env_map(&[(ENV_DASHBOARD_ENV, "  ")]))?;
        assert_eq!(
            Environment::resolve(env.environment.as_deref()),
            Environment::Production
        );
        Ok(())
    }

    #[test]
    fn invalid_port_is_rejected() -> Result<(), Box<dyn Error>> {
        let error = DashboardEnv::from_map(&env_map(&[(ENV_PORT, "80000")])).err();
        let envelope: ErrorEnvelope = error
            .ok_or_else(|| std::io::Error::other("expected port error"))?
            .into();

        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_int"));
        assert_eq!(
            envelope.metadata.get("value").map(String::as_str),
            Some("80000")
        );
        Ok(())
    }

    #[test]
    fn cors_origins_are_normalized_deterministically() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&env_map(&[(
            ENV_CORS_ORIGINS,
            " https://app.example.com/ ,http://localhost:3000,https://app.example.com",
        )]))?;

        let origins = env
            .cors_origins
            .as_ref()
            .ok_or_else(|| std::io::Error::other("missing origins"))?;
        let as_str: Vec<&str> = origins.iter().map(AsRef::as_ref).collect();
        assert_eq!(
            as_str,
            vec!["http://localhost:3000", "https://app.example.com"]
        );

        let error = DashboardEnv::from_map(&env_map(&[(ENV_CORS_ORIGINS, "ftp://files")])).err();
        assert!(matches!(error, Some(EnvParseError::InvalidUrl { .. })));
        Ok(())
    }

    #[test]
    fn secret_values_are_redacted_in_error_metadata() -> Result<(), Box<dyn Error>> {
        let error = DashboardEnv::from_map(&env_map(&[(ENV_AIRTABLE_API_KEY, "   ")])).err();
        let envelope: ErrorEnvelope = error
            .ok_or_else(|| std::io::Error::other("expected secret error"))?
            .into();

        assert_eq!(envelope.code, ErrorCode::new("config", "empty_env_var"));
        assert_eq!(
            envelope.metadata.get("env_var").map(String::as_str),
            Some(ENV_AIRTABLE_API_KEY)
        );
        assert!(
            !envelope.metadata.contains_key("value"),
            "empty secrets should not echo value"
        );
        assert_eq!(
            redact_if_secret(ENV_CLAUDE_API_KEY, "sk-live"),
            REDACTED_VALUE
        );
        Ok(())
    }

    #[test]
    fn overrides_replace_server_and_cors_settings() -> Result<(), Box<dyn Error>> {
        let env = DashboardEnv::from_map(&env_map(&[
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "9000"),
            (ENV_CORS_ORIGINS, "https://dash.example.com"),
            (ENV_CLAUDE_API_KEY, "sk-test"),
        ]))?;
        let config = apply_env_overrides(resolve_profile(None, None), &env);

        assert_eq!(config.server.host.as_ref(), "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        let origins: Vec<&str> = config.cors_origins.iter().map(AsRef::as_ref).collect();
        assert_eq!(origins, vec!["https://dash.example.com"]);
        assert_eq!(config.pagination.max_total_records, 5_000);
        assert_eq!(env.missing_credentials(), vec![ENV_AIRTABLE_API_KEY]);
        assert_eq!(
            env.claude_api_key.as_ref().map(SecretString::expose),
            Some("sk-test")
        );
        Ok(())
    }
}
