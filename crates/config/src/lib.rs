//! # dashboard-config
//!
//! Environment profiles and per-client table mappings for the analytics
//! dashboard backend. Resolution happens once at process start and the
//! resulting [`AppConfig`] is read-only afterwards.
//!
//! This crate depends on `shared` only.

/// Client identity, enabled sources, and the derived table mapping.
pub mod client;
/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + client file + profile).
pub mod load;
/// Environment profiles and table lookups.
pub mod profile;
/// Records request DTO and validation.
pub mod requests;
/// Data-source keys.
pub mod sources;
/// Table descriptors and mappings.
pub mod tables;

pub use client::{
    AirtableConfiguration, ClientConfig, ClientConfigBuilder, ClientConfigError, ClientConfigFile,
    ClientInfo, ClientSummary, DataSources, OVERVIEW_TAB, TabConfiguration,
};
pub use env::{DashboardEnv, EnvParseError, apply_env_overrides};
pub use load::{
    load_app_config, load_app_config_std_env, load_client_config_from_path,
    load_optional_client_config, parse_client_config_json, parse_client_config_toml,
    resolve_app_config, to_pretty_json,
};
pub use profile::{
    ApiSettings, AppConfig, Environment, LogLevel, LoggingSettings, PaginationSettings,
    ProfileOverrides, ServerSettings, resolve_profile,
};
pub use requests::{
    RecordsRequest, RecordsRequestDto, RequestValidationError, ValidatedRecordsRequest,
    parse_records_request_json, validate_records_request,
};
pub use sources::{SortDirection, SourceKey};
pub use tables::{
    TableConfig, TableDescriptor, TableMapping, TableMappingProvider, placeholder_table_id,
    placeholder_tables,
};

/// Process-wide accessor for the sample client.
pub fn get_client_config() -> ClientConfig {
    ClientConfig::cellular_zone()
}

/// Base id of the sample client.
pub fn get_base_id() -> String {
    get_client_config().get_base_id().to_owned()
}

/// Fresh table mapping of the sample client.
pub fn get_fresh_tables() -> TableMapping {
    get_client_config().derived_fresh_tables()
}

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
