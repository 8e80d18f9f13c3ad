//! Per-client deployment settings and the derived fresh-table mapping.
//!
//! A `ClientConfig` is built once at startup (from code or a file) and read
//! for the rest of the process. None of its operations fail: a source with a
//! missing, empty, or `"null"` table id is simply disabled.

use crate::sources::SourceKey;
use crate::tables::{TableDescriptor, TableMapping, TableMappingProvider};
use dashboard_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Literal string some deployments use to mean "no table".
const NULL_TABLE_ID: &str = "null";

/// Tab that always leads the dashboard and is selected by default.
pub const OVERVIEW_TAB: &str = "overview";

/// Static settings for one client deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    client_name: Box<str>,
    business_name: Box<str>,
    base_id: Box<str>,
    table_ids: BTreeMap<SourceKey, Option<Box<str>>>,
    enabled_sources: Vec<SourceKey>,
    disabled_sources: Vec<SourceKey>,
}

impl ClientConfig {
    /// Start building a client config.
    pub fn builder(
        client_name: impl Into<Box<str>>,
        business_name: impl Into<Box<str>>,
        base_id: impl Into<Box<str>>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self {
                client_name: client_name.into(),
                business_name: business_name.into(),
                base_id: base_id.into(),
                table_ids: BTreeMap::new(),
                enabled_sources: Vec::new(),
                disabled_sources: Vec::new(),
            },
        }
    }

    /// The sample deployment shipped with the dashboard template.
    #[must_use]
    pub fn cellular_zone() -> Self {
        Self::builder("Cellular Zone", "Cellular Zone", "app9JgRBZC2GNlaKM")
            .table_id(SourceKey::Ghl, Some("tbl0Er1mMwZO1Pvfj"))
            .table_id(SourceKey::GoogleAds, Some("tblIhvVihVoghHfVa"))
            .table_id(SourceKey::Pos, None)
            .table_id(SourceKey::MetaAds, None)
            .table_id(SourceKey::MetaAdsSimplified, None)
            .table_id(SourceKey::MetaAdsSummary, None)
            .table_id(SourceKey::MetaAdsPerformance, None)
            .enable(SourceKey::Ghl)
            .enable(SourceKey::GoogleAds)
            .build()
    }

    /// Client display name.
    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Legal/business name shown to users.
    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    /// Sources explicitly enabled, in configured order.
    #[must_use]
    pub fn enabled_sources(&self) -> &[SourceKey] {
        &self.enabled_sources
    }

    /// Sources explicitly disabled, in configured order.
    #[must_use]
    pub fn disabled_sources(&self) -> &[SourceKey] {
        &self.disabled_sources
    }

    /// True iff `source` is enabled and has a usable table id.
    ///
    /// This is the gate for visibility anywhere downstream.
    #[must_use]
    pub fn is_enabled(&self, source: SourceKey) -> bool {
        self.enabled_sources.contains(&source) && self.get_table_id(source).is_some()
    }

    /// Raw table id for `source`, ignoring the enabled-sources list.
    ///
    /// Callers deciding visibility must check [`Self::is_enabled`] instead.
    #[must_use]
    pub fn get_table_id(&self, source: SourceKey) -> Option<&str> {
        self.table_ids
            .get(&source)
            .and_then(Option::as_deref)
            .filter(|id| is_usable_table_id(id))
    }

    /// Backing store (Airtable base) identifier.
    #[must_use]
    pub fn get_base_id(&self) -> &str {
        &self.base_id
    }

    /// Table mapping for every enabled source.
    #[must_use]
    pub fn derived_fresh_tables(&self) -> TableMapping {
        SourceKey::ALL
            .into_iter()
            .filter(|source| self.is_enabled(*source))
            .filter_map(|source| {
                self.get_table_id(source).map(|id| {
                    (
                        source,
                        TableDescriptor::for_source(source, id, &self.client_name),
                    )
                })
            })
            .collect()
    }

    /// Presentation-layer summary of this client.
    #[must_use]
    pub fn get_client_summary(&self) -> ClientSummary {
        let enabled_sources: Vec<Box<str>> = self
            .enabled_sources
            .iter()
            .map(|source| Box::from(source.as_str()))
            .collect();
        let mut enabled_tabs = Vec::with_capacity(enabled_sources.len() + 1);
        enabled_tabs.push(Box::from(OVERVIEW_TAB));
        enabled_tabs.extend(enabled_sources.iter().cloned());

        ClientSummary {
            client_info: ClientInfo {
                client_id: client_id_from_name(&self.client_name).into_boxed_str(),
                business_name: self.business_name.clone(),
            },
            data_sources: DataSources {
                enabled_sources,
                disabled_sources: self
                    .disabled_sources
                    .iter()
                    .map(|source| Box::from(source.as_str()))
                    .collect(),
            },
            tab_configuration: TabConfiguration {
                enabled_tabs,
                default_tab: Box::from(OVERVIEW_TAB),
            },
            airtable_configuration: AirtableConfiguration {
                base_id: self.base_id.clone(),
            },
        }
    }

    /// Build a client config from its file representation.
    pub fn from_file(file: ClientConfigFile) -> Result<Self, ClientConfigError> {
        let client_name = required_field("clientName", file.client_name)?;
        let business_name = match file.business_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
            _ => client_name.clone(),
        };
        let base_id = required_field("airtableBaseId", file.airtable_base_id)?;

        let mut builder = Self::builder(client_name, business_name, base_id);
        for (raw, id) in file.table_ids {
            let source = parse_source("tableIds", &raw)?;
            builder = builder.table_id(source, id.as_deref());
        }
        for raw in &file.enabled_sources {
            builder = builder.enable(parse_source("enabledSources", raw)?);
        }
        for raw in &file.disabled_sources {
            builder = builder.disable(parse_source("disabledSources", raw)?);
        }
        Ok(builder.build())
    }
}

impl TableMappingProvider for ClientConfig {
    fn fresh_tables(&self) -> TableMapping {
        self.derived_fresh_tables()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set (or clear with `None`) the table id for `source`.
    #[must_use]
    pub fn table_id(mut self, source: SourceKey, id: Option<&str>) -> Self {
        self.config.table_ids.insert(source, id.map(Box::from));
        self
    }

    /// Add `source` to the enabled list (duplicates are ignored).
    #[must_use]
    pub fn enable(mut self, source: SourceKey) -> Self {
        if !self.config.enabled_sources.contains(&source) {
            self.config.enabled_sources.push(source);
        }
        self
    }

    /// Add `source` to the disabled list (duplicates are ignored).
    #[must_use]
    pub fn disable(mut self, source: SourceKey) -> Self {
        if !self.config.disabled_sources.contains(&source) {
            self.config.disabled_sources.push(source);
        }
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Frontend-facing client summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    /// Client identity.
    pub client_info: ClientInfo,
    /// Source enablement lists.
    pub data_sources: DataSources,
    /// Dashboard tab layout.
    pub tab_configuration: TabConfiguration,
    /// Backing store settings.
    pub airtable_configuration: AirtableConfiguration,
}

/// Client identity block of [`ClientSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    /// Lowercased client name with spaces replaced by underscores.
    pub client_id: Box<str>,
    /// Business name.
    pub business_name: Box<str>,
}

/// Source enablement block of [`ClientSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSources {
    /// Enabled source keys as configured.
    pub enabled_sources: Vec<Box<str>>,
    /// Disabled source keys as configured.
    pub disabled_sources: Vec<Box<str>>,
}

/// Tab layout block of [`ClientSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabConfiguration {
    /// `overview` followed by the enabled sources.
    pub enabled_tabs: Vec<Box<str>>,
    /// Always `overview`.
    pub default_tab: Box<str>,
}

/// Backing store block of [`ClientSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirtableConfiguration {
    /// Airtable base id.
    pub base_id: Box<str>,
}

/// File representation of a client config (JSON or TOML).
///
/// A table id of `null` (JSON), `"null"`, `""`, or a missing key all disable
/// the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientConfigFile {
    /// Client display name.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Business name (defaults to the client name).
    #[serde(default)]
    pub business_name: Option<String>,
    /// Airtable base id.
    #[serde(default)]
    pub airtable_base_id: Option<String>,
    /// Source key -> table id.
    #[serde(default)]
    pub table_ids: BTreeMap<String, Option<String>>,
    /// Enabled source keys.
    #[serde(default)]
    pub enabled_sources: Vec<String>,
    /// Disabled source keys.
    #[serde(default)]
    pub disabled_sources: Vec<String>,
}

/// Errors raised while building a client config from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientConfigError {
    /// A required field is missing or blank.
    MissingField {
        /// Field name in the file.
        field: &'static str,
    },
    /// A source key is not one of the known keys.
    UnknownSource {
        /// Field that referenced the key.
        field: &'static str,
        /// Raw key.
        key: String,
    },
}

impl ClientConfigError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingField { .. } => ErrorCode::new("config", "client_missing_field"),
            Self::UnknownSource { .. } => ErrorCode::new("config", "unknown_source"),
        }
    }
}

impl fmt::Display for ClientConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(formatter, "{field} must be non-empty"),
            Self::UnknownSource { field, key } => {
                write!(formatter, "{field} references unknown source: {key}")
            },
        }
    }
}

impl std::error::Error for ClientConfigError {}

impl From<ClientConfigError> for ErrorEnvelope {
    fn from(error: ClientConfigError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ClientConfigError::MissingField { field } => envelope.with_metadata("field", field),
            ClientConfigError::UnknownSource { field, key } => envelope
                .with_metadata("field", field)
                .with_metadata("key", key),
        }
    }
}

fn is_usable_table_id(id: &str) -> bool {
    !id.is_empty() && id != NULL_TABLE_ID
}

fn client_id_from_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

fn required_field(field: &'static str, value: Option<String>) -> Result<String, ClientConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(ClientConfigError::MissingField { field }),
    }
}

fn parse_source(field: &'static str, raw: &str) -> Result<SourceKey, ClientConfigError> {
    SourceKey::parse(raw.trim()).ok_or_else(|| ClientConfigError::UnknownSource {
        field,
        key: raw.to_owned(),
    })
}
