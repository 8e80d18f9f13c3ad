//! Table descriptors, the ordered table mapping, and the placeholder fallback.

use crate::sources::{SortDirection, SourceKey};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::{iter, slice};

/// Placeholder display-name prefix used when no client config is available.
pub const PLACEHOLDER_CLIENT_NAME: &str = "CLIENT_NAME";

/// One data source's backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    /// Opaque external table identifier.
    pub id: Box<str>,
    /// Human-readable table name.
    pub name: Box<str>,
    /// Field used for date sorting.
    pub date_field: Box<str>,
    /// Sort direction on `date_field`.
    pub sort_direction: SortDirection,
}

impl TableDescriptor {
    /// Build a descriptor for `source` using its fixed date field.
    pub fn for_source(source: SourceKey, id: impl Into<Box<str>>, client_name: &str) -> Self {
        Self {
            id: id.into(),
            name: format!("{client_name} {}", source.display_suffix()).into_boxed_str(),
            date_field: source.date_field().into(),
            sort_direction: SortDirection::Desc,
        }
    }
}

/// Table mapping keyed by source, iterating in insertion order.
///
/// Each source appears at most once; re-inserting a source replaces its
/// descriptor in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMapping(Vec<Entry>);

type Entry = (SourceKey, TableDescriptor);
type EntryRef<'a> = (&'a SourceKey, &'a TableDescriptor);
type EntryFn = for<'a> fn(&'a Entry) -> EntryRef<'a>;

/// Borrowing iterator over mapping entries, in mapping order.
pub type Iter<'a> = iter::Map<slice::Iter<'a, Entry>, EntryFn>;

impl TableMapping {
    /// Empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert the descriptor for `source`, replacing an existing one in place.
    pub fn insert(&mut self, source: SourceKey, descriptor: TableDescriptor) {
        match self.0.iter_mut().find(|(key, _)| *key == source) {
            Some((_, slot)) => *slot = descriptor,
            None => self.0.push((source, descriptor)),
        }
    }

    /// Descriptor for `source`, if mapped.
    #[must_use]
    pub fn get(&self, source: SourceKey) -> Option<&TableDescriptor> {
        self.0
            .iter()
            .find(|(key, _)| *key == source)
            .map(|(_, descriptor)| descriptor)
    }

    /// True when `source` has a descriptor.
    #[must_use]
    pub fn contains(&self, source: SourceKey) -> bool {
        self.get(source).is_some()
    }

    /// Number of mapped sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mapped source keys in mapping order.
    pub fn keys(&self) -> impl Iterator<Item = SourceKey> + '_ {
        self.0.iter().map(|(source, _)| *source)
    }

    /// Entries in mapping order.
    pub fn iter(&self) -> Iter<'_> {
        let entry: EntryFn = entry_ref;
        self.0.iter().map(entry)
    }

    /// First entry whose table id equals `table_id`.
    #[must_use]
    pub fn find_by_id(&self, table_id: &str) -> Option<(SourceKey, &TableDescriptor)> {
        self.0
            .iter()
            .find(|(_, descriptor)| descriptor.id.as_ref() == table_id)
            .map(|(source, descriptor)| (*source, descriptor))
    }
}

fn entry_ref(entry: &Entry) -> EntryRef<'_> {
    (&entry.0, &entry.1)
}

impl<'a> IntoIterator for &'a TableMapping {
    type Item = EntryRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(SourceKey, TableDescriptor)> for TableMapping {
    fn from_iter<I: IntoIterator<Item = (SourceKey, TableDescriptor)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (source, descriptor) in iter {
            mapping.insert(source, descriptor);
        }
        mapping
    }
}

impl Serialize for TableMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (source, descriptor) in &self.0 {
            map.serialize_entry(source, descriptor)?;
        }
        map.end()
    }
}

/// Result of a table-id lookup: the descriptor plus its owning source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableConfig {
    /// Matched descriptor.
    #[serde(flatten)]
    pub descriptor: TableDescriptor,
    /// Source key that owns the table.
    #[serde(rename = "type")]
    pub source: SourceKey,
    /// True when the match came from the legacy mapping.
    pub is_legacy: bool,
}

/// Supplies the active fresh-table mapping to a profile.
///
/// Profiles built without a provider fall back to [`placeholder_tables`].
pub trait TableMappingProvider {
    /// Current fresh-table mapping.
    fn fresh_tables(&self) -> TableMapping;
}

impl TableMappingProvider for TableMapping {
    fn fresh_tables(&self) -> TableMapping {
        self.clone()
    }
}

/// Sources included in the placeholder mapping (`meta_ads_performance` has no template).
pub const PLACEHOLDER_SOURCES: [SourceKey; 6] = [
    SourceKey::Ghl,
    SourceKey::Pos,
    SourceKey::MetaAds,
    SourceKey::MetaAdsSummary,
    SourceKey::MetaAdsSimplified,
    SourceKey::GoogleAds,
];

/// Template table id for `source`, e.g. `CLIENT_META_ADS_TABLE_ID`.
#[must_use]
pub fn placeholder_table_id(source: SourceKey) -> String {
    format!("CLIENT_{}_TABLE_ID", source.as_str().to_ascii_uppercase())
}

/// Fixed template mapping used when no client config is available, in
/// [`PLACEHOLDER_SOURCES`] order.
#[must_use]
pub fn placeholder_tables() -> TableMapping {
    PLACEHOLDER_SOURCES
        .into_iter()
        .map(|source| {
            (
                source,
                TableDescriptor::for_source(
                    source,
                    placeholder_table_id(source),
                    PLACEHOLDER_CLIENT_NAME,
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_mapping_has_six_template_entries() {
        let tables = placeholder_tables();
        assert_eq!(tables.len(), 6);
        assert!(!tables.contains(SourceKey::MetaAdsPerformance));

        let expected = [
            (SourceKey::Ghl, "CLIENT_GHL_TABLE_ID", "CLIENT_NAME GHL"),
            (SourceKey::Pos, "CLIENT_POS_TABLE_ID", "CLIENT_NAME POS"),
            (
                SourceKey::GoogleAds,
                "CLIENT_GOOGLE_ADS_TABLE_ID",
                "CLIENT_NAME Google Ads",
            ),
            (
                SourceKey::MetaAds,
                "CLIENT_META_ADS_TABLE_ID",
                "CLIENT_NAME Meta Ads",
            ),
            (
                SourceKey::MetaAdsSummary,
                "CLIENT_META_ADS_SUMMARY_TABLE_ID",
                "CLIENT_NAME Meta Ads Summary",
            ),
            (
                SourceKey::MetaAdsSimplified,
                "CLIENT_META_ADS_SIMPLIFIED_TABLE_ID",
                "CLIENT_NAME Meta Ads Simplified",
            ),
        ];
        for (source, id, name) in expected {
            let descriptor = tables.get(source);
            assert_eq!(descriptor.map(|d| d.id.as_ref()), Some(id));
            assert_eq!(descriptor.map(|d| d.name.as_ref()), Some(name));
            assert_eq!(
                descriptor.map(|d| d.date_field.as_ref()),
                Some(source.date_field())
            );
            assert_eq!(
                descriptor.map(|d| d.sort_direction),
                Some(SortDirection::Desc)
            );
        }
    }

    #[test]
    fn placeholder_mapping_keeps_template_order() -> Result<(), Box<dyn std::error::Error>> {
        let tables = placeholder_tables();
        let keys: Vec<SourceKey> = tables.keys().collect();
        assert_eq!(keys, PLACEHOLDER_SOURCES.to_vec());

        let json = serde_json::to_string(&tables)?;
        let positions: Vec<usize> = [
            "\"ghl\"",
            "\"pos\"",
            "\"meta_ads\"",
            "\"meta_ads_summary\"",
            "\"meta_ads_simplified\"",
            "\"google_ads\"",
        ]
        .iter()
        .filter_map(|key| json.find(key))
        .collect();
        assert_eq!(positions.len(), 6);
        assert!(positions.is_sorted());
        Ok(())
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut tables = placeholder_tables();
        tables.insert(
            SourceKey::Pos,
            TableDescriptor::for_source(SourceKey::Pos, "tblReplacedPos001", "Acme"),
        );
        assert_eq!(tables.len(), 6);
        assert_eq!(tables.keys().nth(1), Some(SourceKey::Pos));
        assert_eq!(
            tables.get(SourceKey::Pos).map(|d| d.id.as_ref()),
            Some("tblReplacedPos001")
        );
    }

    #[test]
    fn find_by_id_returns_owning_source() {
        let tables = placeholder_tables();
        let found = tables.find_by_id("CLIENT_POS_TABLE_ID");
        assert_eq!(found.map(|(source, _)| source), Some(SourceKey::Pos));
        assert!(tables.find_by_id("tblMissing").is_none());
    }

    #[test]
    fn table_config_serializes_flat_with_type() -> Result<(), Box<dyn std::error::Error>> {
        let config = TableConfig {
            descriptor: TableDescriptor::for_source(SourceKey::Ghl, "tbl1", "Acme"),
            source: SourceKey::Ghl,
            is_legacy: false,
        };
        let value = serde_json::to_value(&config)?;
        assert_eq!(
            value,
            serde_json::json!({
                "id": "tbl1",
                "name": "Acme GHL",
                "date_field": "Date Created",
                "sort_direction": "desc",
                "type": "ghl",
                "is_legacy": false
            })
        );
        Ok(())
    }
}
