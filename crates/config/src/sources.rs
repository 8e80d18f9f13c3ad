//! Data-source keys and their fixed per-source metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One category of external dashboard data.
///
/// Declaration order is the order in which client table mappings are built,
/// so ordered collections keyed by `SourceKey` iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    /// `GoHighLevel` CRM leads.
    Ghl,
    /// Point-of-sale transactions.
    Pos,
    /// Google Ads campaign rows.
    GoogleAds,
    /// Meta Ads raw export.
    MetaAds,
    /// Meta Ads summary export.
    MetaAdsSummary,
    /// Meta Ads per-period simplified export.
    MetaAdsSimplified,
    /// Meta Ads daily performance export.
    MetaAdsPerformance,
}

impl SourceKey {
    /// Every source key, in construction order.
    pub const ALL: [Self; 7] = [
        Self::Ghl,
        Self::Pos,
        Self::GoogleAds,
        Self::MetaAds,
        Self::MetaAdsSummary,
        Self::MetaAdsSimplified,
        Self::MetaAdsPerformance,
    ];

    /// Wire identifier (e.g. `google_ads`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ghl => "ghl",
            Self::Pos => "pos",
            Self::GoogleAds => "google_ads",
            Self::MetaAds => "meta_ads",
            Self::MetaAdsSummary => "meta_ads_summary",
            Self::MetaAdsSimplified => "meta_ads_simplified",
            Self::MetaAdsPerformance => "meta_ads_performance",
        }
    }

    /// Parse a wire identifier. Matching is exact.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == input)
    }

    /// Suffix appended to the client name to form the table display name.
    #[must_use]
    pub const fn display_suffix(self) -> &'static str {
        match self {
            Self::Ghl => "GHL",
            Self::Pos => "POS",
            Self::GoogleAds => "Google Ads",
            Self::MetaAds => "Meta Ads",
            Self::MetaAdsSummary => "Meta Ads Summary",
            Self::MetaAdsSimplified => "Meta Ads Simplified",
            Self::MetaAdsPerformance => "Meta Ads Performance",
        }
    }

    /// Field used to sort records when paging through the table.
    #[must_use]
    pub const fn date_field(self) -> &'static str {
        match self {
            Self::Ghl => "Date Created",
            Self::Pos => "Created",
            Self::GoogleAds | Self::MetaAdsPerformance => "Date",
            Self::MetaAds | Self::MetaAdsSummary => "Reporting ends",
            Self::MetaAdsSimplified => "period",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Sort direction applied on the date field. Only descending exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Newest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Wire value sent as the sort direction parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
