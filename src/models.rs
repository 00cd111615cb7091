//! Data models for the articulation pipeline.
//!
//! This module contains the core data structures used throughout the
//! application: the upstream institution catalog shapes, derived partner
//! agreements, and the final major catalog.

use serde::{Deserialize, Serialize};

/// A display name entry for an institution.
///
/// One institution can carry several names (historical names, campus
/// names). Upstream omits the boolean flags for some entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionName {
    /// The display name itself.
    pub name: String,
    /// Whether this name has department-level data.
    #[serde(default)]
    pub has_departments: bool,
    /// Whether this name should be hidden from selection lists.
    #[serde(default)]
    pub hide_in_list: bool,
}

/// An institution from the upstream catalog.
///
/// Fetched once per session via `GET /api/institutions` and treated as
/// read-only thereafter. Identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    /// Upstream institution identifier.
    pub id: i64,
    /// Short code (e.g. campus abbreviation). Absent for some entries.
    #[serde(default)]
    pub code: Option<String>,
    /// Whether this is a community college.
    #[serde(default)]
    pub is_community_college: bool,
    /// Display names for this institution.
    #[serde(default)]
    pub names: Vec<InstitutionName>,
}

impl Institution {
    /// Returns the primary display name, preferring names not hidden
    /// from lists.
    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .find(|n| !n.hide_in_list)
            .or_else(|| self.names.first())
            .map(|n| n.name.as_str())
            .unwrap_or("(unnamed)")
    }
}

/// A raw agreement record from `GET /api/institutions/{id}/agreements`.
///
/// Every field can be absent upstream; absence is a normal branch, not
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAgreement {
    /// Free-text name of the partner institution.
    #[serde(default)]
    pub institution_name: Option<String>,
    /// Whether the partner is a community college.
    #[serde(default)]
    pub is_community_college: bool,
    /// Academic-year ids from the sending side, oldest first.
    #[serde(default)]
    pub sending_year_ids: Option<Vec<i64>>,
    /// Academic-year ids from the receiving side, oldest first.
    #[serde(default)]
    pub receiving_year_ids: Option<Vec<i64>>,
}

/// A partner agreement with its institution id and academic year resolved.
///
/// Derived, never persisted; recomputed on every receiving-institution
/// selection. Entries with an unresolved id or year are kept but inert:
/// the aggregator skips them without a network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerAgreement {
    /// Catalog id of the partner, when a name match was found.
    pub source_institution_id: Option<i64>,
    /// Whether the partner is a community college.
    pub is_community_college: bool,
    /// Most recent known shared academic year, when any year is known.
    pub academic_year_id: Option<i64>,
}

impl PartnerAgreement {
    /// Derive the agreement from a raw record and a resolved partner id.
    ///
    /// The academic year is the *last* element of `sending_year_ids`,
    /// falling back to the last of `receiving_year_ids` when the sending
    /// list is absent or empty.
    pub fn from_raw(raw: &RawAgreement, source_institution_id: Option<i64>) -> Self {
        let academic_year_id = last_year(raw.sending_year_ids.as_deref())
            .or_else(|| last_year(raw.receiving_year_ids.as_deref()));

        Self {
            source_institution_id,
            is_community_college: raw.is_community_college,
            academic_year_id,
        }
    }

    /// Whether this agreement can be queried for major reports.
    pub fn is_viable(&self) -> bool {
        self.source_institution_id.is_some() && self.academic_year_id.is_some()
    }
}

fn last_year(years: Option<&[i64]>) -> Option<i64> {
    years.and_then(|ys| ys.last().copied())
}

/// A single major-agreement report from the upstream reports endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorReport {
    /// Human-readable major label; arbitrary casing and whitespace.
    #[serde(default)]
    pub label: Option<String>,
    /// Opaque report key.
    #[serde(default)]
    pub key: Option<String>,
}

/// Response envelope for `GET /api/agreements?...&categoryCode=major`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorReportsResponse {
    /// Reports for the queried triple; absent means none.
    #[serde(default)]
    pub reports: Option<Vec<MajorReport>>,
}

impl MajorReportsResponse {
    /// Raw labels in report order, with absent labels as empty strings.
    pub fn labels(&self) -> Vec<String> {
        self.reports
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|r| r.label.clone().unwrap_or_default())
            .collect()
    }
}

/// The final deduplicated, sorted major list for one receiving
/// institution, plus the default selection.
///
/// Rebuilt wholesale on every selection; never patched in place.
#[derive(Debug, Clone, Default)]
pub struct MajorCatalog {
    /// Normalized major labels, lexicographically sorted.
    pub majors: Vec<String>,
    /// First element of the sorted list, when non-empty.
    pub default_major: Option<String>,
}

impl MajorCatalog {
    /// Build a catalog from an already-deduplicated label list.
    ///
    /// Sorts by default lexicographic string ordering (not locale-aware)
    /// and picks the first element as the default selection.
    pub fn new(mut majors: Vec<String>) -> Self {
        majors.sort();
        let default_major = majors.first().cloned();
        Self {
            majors,
            default_major,
        }
    }

    /// Whether the catalog holds no majors at all.
    pub fn is_empty(&self) -> bool {
        self.majors.is_empty()
    }
}
