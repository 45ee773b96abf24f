//! # Filter Engine
//!
//! Maps a store snapshot and a [`FilterState`] to the ordered
//! [`FilteredView`]. The pipeline has three predicate stages applied in a
//! fixed order, each narrowing the output of the previous one:
//!
//! ```text
//! records ─▶ search ─▶ status ─▶ date range ─▶ view
//! ```
//!
//! No stage sorts. The view is always a subsequence of the store in the
//! store's order.
//!
//! ## Date range quirk
//!
//! The date stage only applies when both bounds are set. A range with only
//! a start or only an end does not filter anything. This mirrors the
//! behavior existing operators rely on and is kept as is.
//!
//! ## Memoization
//!
//! [`FilterEngine`] remembers the last `(store revision, filter state)`
//! pair and its output. Recomputation is `O(n)` and happens only when
//! either half of the key changes.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use credreg_core::{CertificateRecord, CertificateStatus};

use crate::store::RecordStore;

/// Which record fields the search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Student name, degree title, or identifier.
    #[default]
    All,
    /// Student name only.
    Student,
    /// Degree title only.
    Degree,
    /// Certificate identifier only.
    Id,
}

impl SearchField {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Student => "student",
            Self::Degree => "degree",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "student" => Ok(Self::Student),
            "degree" => Ok(Self::Degree),
            "id" => Ok(Self::Id),
            other => Err(format!(
                "unknown search field {other:?} (expected all, student, degree, id)"
            )),
        }
    }
}

/// Status predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// No status filtering.
    #[default]
    All,
    /// Active records only.
    Active,
    /// Revoked records only.
    Revoked,
}

impl StatusFilter {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }

    fn admits(&self, status: CertificateStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == CertificateStatus::Active,
            Self::Revoked => status == CertificateStatus::Revoked,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            other => Err(format!(
                "unknown status {other:?} (expected all, active, revoked)"
            )),
        }
    }
}

/// Issue-date bounds, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// First admitted day.
    pub start: Option<NaiveDate>,
    /// Last admitted day.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range with both bounds set.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether either bound is set.
    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether `date` passes the date stage. One-sided ranges admit
    /// everything.
    pub fn admits(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }
}

/// The composable predicate set driving the filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Substring to search for. Empty disables the search stage.
    pub search_term: String,
    /// Fields the search term is matched against.
    pub search_field: SearchField,
    /// Status predicate.
    pub status_filter: StatusFilter,
    /// Issue-date bounds.
    pub date_range: DateRange,
}

impl FilterState {
    /// Whether any user-visible filter is set. A one-sided date range
    /// counts even though it does not narrow the view.
    pub fn has_active_filters(&self) -> bool {
        !self.search_term.is_empty()
            || self.status_filter != StatusFilter::All
            || self.date_range.is_set()
    }

    /// Reset every field to its default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Ordered subsequence of store records admitted by a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FilteredView {
    records: Vec<CertificateRecord>,
}

impl FilteredView {
    /// Records in store order.
    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }

    /// Iterate over records in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, CertificateRecord> {
        self.records.iter()
    }

    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a FilteredView {
    type Item = &'a CertificateRecord;
    type IntoIter = std::slice::Iter<'a, CertificateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Apply the three-stage predicate pipeline to `records`.
pub fn apply(records: &[CertificateRecord], state: &FilterState) -> FilteredView {
    let needle = state.search_term.to_lowercase();
    let records = records
        .iter()
        .filter(|r| search_stage(r, &needle, state.search_field))
        .filter(|r| state.status_filter.admits(r.status()))
        .filter(|r| state.date_range.admits(r.issue_date))
        .cloned()
        .collect();
    FilteredView { records }
}

fn search_stage(record: &CertificateRecord, needle: &str, field: SearchField) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hit = |haystack: &str| haystack.to_lowercase().contains(needle);
    match field {
        SearchField::Student => hit(&record.student_name),
        SearchField::Degree => hit(&record.degree_title),
        SearchField::Id => hit(record.id.as_str()),
        SearchField::All => {
            hit(&record.student_name) || hit(&record.degree_title) || hit(record.id.as_str())
        }
    }
}

/// Memoizing wrapper around [`apply`].
#[derive(Debug, Default)]
pub struct FilterEngine {
    key: Option<(u64, FilterState)>,
    view: FilteredView,
}

impl FilterEngine {
    /// Create an engine with an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the view up to date with `store` and `state`. Returns `true`
    /// if the view was recomputed, `false` on a memo hit.
    pub fn recompute(&mut self, store: &RecordStore, state: &FilterState) -> bool {
        if let Some((revision, last)) = &self.key {
            if *revision == store.revision() && last == state {
                return false;
            }
        }
        self.view = apply(store.records(), state);
        self.key = Some((store.revision(), state.clone()));
        tracing::debug!(
            visible = self.view.len(),
            total = store.len(),
            revision = store.revision(),
            "recomputed filtered view"
        );
        true
    }

    /// The most recently computed view.
    pub fn view(&self) -> &FilteredView {
        &self.view
    }
}
