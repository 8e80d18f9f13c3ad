//! Environment profiles: base defaults plus per-environment overrides.
//!
//! A profile is resolved once at process start and read for the rest of the
//! process. Resolution never fails:
//! - unknown or missing environment names select production
//! - a missing table-mapping provider selects the placeholder mapping

use crate::sources::{SortDirection, SourceKey};
use crate::tables::{
    TableConfig, TableDescriptor, TableMapping, TableMappingProvider, placeholder_tables,
};
use serde::Serialize;
use std::fmt;

/// Default Claude messages endpoint.
pub const DEFAULT_CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default Airtable REST base URL.
pub const DEFAULT_AIRTABLE_BASE_URL: &str = "https://api.airtable.com/v0";
/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Log line layout used by every profile except development.
pub const BASE_LOG_FORMAT: &str = "%(asctime)s | %(levelname)-8s | %(name)s | %(message)s";
/// Wider log line layout used in development.
pub const VERBOSE_LOG_FORMAT: &str =
    "%(asctime)s | %(levelname)-8s | %(name)-15s | %(funcName)-20s | %(message)s";
/// Timestamp layout for log lines.
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BASE_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
];
const PRODUCTION_CORS_ORIGINS: [&str; 2] = ["http://localhost:8000", "http://127.0.0.1:8000"];

/// Deployment environment selected from a single env var.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    Development,
    /// Automated test runs.
    Testing,
    /// Everything else.
    Production,
}

impl Environment {
    /// Select an environment from a raw env value.
    ///
    /// Matching ignores ASCII case; anything other than `development` or
    /// `testing` (including no value) selects production.
    #[must_use]
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            _ => Self::Production,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Everything.
    Debug,
    /// Informational and above.
    Info,
    /// Warnings and errors.
    Warning,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Uppercase level name (e.g. `WARNING`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Matching `tracing` level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Upstream API endpoints and timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    /// Claude messages endpoint.
    pub claude_api_url: Box<str>,
    /// Airtable REST base URL.
    pub airtable_base_url: Box<str>,
    /// Claude request timeout in seconds.
    pub claude_timeout_secs: u64,
    /// Airtable request timeout in seconds.
    pub airtable_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            claude_api_url: DEFAULT_CLAUDE_API_URL.into(),
            airtable_base_url: DEFAULT_AIRTABLE_BASE_URL.into(),
            claude_timeout_secs: 30,
            airtable_timeout_secs: 15,
        }
    }
}

/// Bind address for the HTTP server that consumes this profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Bind host.
    pub host: Box<str>,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

/// Record paging limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSettings {
    /// Records fetched per upstream request.
    pub max_records_per_request: u32,
    /// Total records fetched across all pages.
    pub max_total_records: u32,
    /// Pages fetched before giving up.
    pub max_pagination_pages: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_records_per_request: 100,
            max_total_records: 10_000,
            max_pagination_pages: 50,
        }
    }
}

/// Parameters for the logging setup that consumes this profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSettings {
    /// Minimum level.
    pub level: LogLevel,
    /// Line format.
    pub format: Box<str>,
    /// Timestamp format.
    pub date_format: Box<str>,
    /// Rotate the log file past this size.
    pub file_max_bytes: u64,
    /// Rotated files kept.
    pub backup_count: u32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: BASE_LOG_FORMAT.into(),
            date_format: LOG_DATE_FORMAT.into(),
            file_max_bytes: 10 * 1024 * 1024,
            backup_count: 5,
        }
    }
}

/// Fully resolved configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Selected environment.
    pub environment: Environment,
    /// Debug mode.
    pub debug: bool,
    /// Upstream APIs.
    pub api: ApiSettings,
    /// Server bind address.
    pub server: ServerSettings,
    /// Paging limits.
    pub pagination: PaginationSettings,
    /// Logging parameters.
    pub logging: LoggingSettings,
    /// Allowed cross-origin sources.
    pub cors_origins: Vec<Box<str>>,
    /// Active table mapping.
    pub fresh_tables: TableMapping,
    /// Deprecated secondary mapping, always empty. Checked after
    /// `fresh_tables` so older table ids could be resolved if it were filled.
    pub legacy_tables: TableMapping,
}

impl AppConfig {
    fn base(environment: Environment, fresh_tables: TableMapping) -> Self {
        Self {
            environment,
            debug: false,
            api: ApiSettings::default(),
            server: ServerSettings::default(),
            pagination: PaginationSettings::default(),
            logging: LoggingSettings::default(),
            cors_origins: BASE_CORS_ORIGINS.iter().copied().map(Box::from).collect(),
            fresh_tables,
            legacy_tables: TableMapping::new(),
        }
    }

    /// Resolve the profile for `environment`.
    ///
    /// Without a provider the active mapping is [`placeholder_tables`].
    #[must_use]
    pub fn resolve(environment: Environment, provider: Option<&dyn TableMappingProvider>) -> Self {
        let fresh_tables = provider.map_or_else(placeholder_tables, |p| p.fresh_tables());
        let mut config = Self::base(environment, fresh_tables);
        ProfileOverrides::for_environment(environment).apply(&mut config);
        config
    }

    /// Look up a table id in the fresh mapping, then the legacy mapping.
    #[must_use]
    pub fn get_table_config(&self, table_id: &str) -> Option<TableConfig> {
        self.find_table(table_id)
            .map(|(source, descriptor, is_legacy)| TableConfig {
                descriptor: descriptor.clone(),
                source,
                is_legacy,
            })
    }

    /// Every table id in the active mapping, in mapping order.
    #[must_use]
    pub fn get_all_table_ids(&self) -> Vec<&str> {
        self.fresh_tables
            .iter()
            .map(|(_, descriptor)| descriptor.id.as_ref())
            .collect()
    }

    /// Sort field and direction for paging through `table_id`.
    #[must_use]
    pub fn sort_for_table(&self, table_id: &str) -> Option<(&str, SortDirection)> {
        self.find_table(table_id)
            .map(|(_, descriptor, _)| (descriptor.date_field.as_ref(), descriptor.sort_direction))
    }

    fn find_table(&self, table_id: &str) -> Option<(SourceKey, &TableDescriptor, bool)> {
        if let Some((source, descriptor)) = self.fresh_tables.find_by_id(table_id) {
            return Some((source, descriptor, false));
        }
        self.legacy_tables
            .find_by_id(table_id)
            .map(|(source, descriptor)| (source, descriptor, true))
    }
}

/// Resolve a profile straight from the raw environment selector value.
#[must_use]
pub fn resolve_profile(
    env_value: Option<&str>,
    provider: Option<&dyn TableMappingProvider>,
) -> AppConfig {
    AppConfig::resolve(Environment::resolve(env_value), provider)
}

/// Fields a profile changes on top of the base defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileOverrides {
    /// Debug mode.
    pub debug: Option<bool>,
    /// Log level.
    pub log_level: Option<LogLevel>,
    /// Log line format.
    pub log_format: Option<&'static str>,
    /// Total record cap.
    pub max_total_records: Option<u32>,
    /// Page cap.
    pub max_pagination_pages: Option<u32>,
    /// Allowed cross-origin sources.
    pub cors_origins: Option<&'static [&'static str]>,
}

impl ProfileOverrides {
    /// Overrides for `environment`.
    #[must_use]
    pub const fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                debug: Some(true),
                log_level: Some(LogLevel::Debug),
                log_format: Some(VERBOSE_LOG_FORMAT),
                max_total_records: None,
                max_pagination_pages: None,
                cors_origins: None,
            },
            Environment::Production => Self {
                debug: Some(false),
                log_level: Some(LogLevel::Info),
                log_format: None,
                max_total_records: Some(5_000),
                max_pagination_pages: None,
                cors_origins: Some(&PRODUCTION_CORS_ORIGINS),
            },
            Environment::Testing => Self {
                debug: Some(true),
                log_level: Some(LogLevel::Warning),
                log_format: None,
                max_total_records: Some(100),
                max_pagination_pages: Some(5),
                cors_origins: None,
            },
        }
    }

    /// Merge these overrides into `config`; `None` keeps the base value.
    pub fn apply(self, config: &mut AppConfig) {
        set_value(&mut config.debug, self.debug);
        set_value(&mut config.logging.level, self.log_level);
        set_value(
            &mut config.pagination.max_total_records,
            self.max_total_records,
        );
        set_value(
            &mut config.pagination.max_pagination_pages,
            self.max_pagination_pages,
        );
        if let Some(format) = self.log_format {
            config.logging.format = format.into();
        }
        if let Some(origins) = self.cors_origins {
            config.cors_origins = origins.iter().copied().map(Box::from).collect();
        }
    }
}

fn set_value<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
