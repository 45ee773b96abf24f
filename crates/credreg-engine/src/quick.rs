//! # Quick Filters
//!
//! One-click shortcuts that set a single [`FilterState`] field. Each
//! shortcut leaves every other field untouched, so they compose with an
//! existing search.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::filter::{DateRange, FilterState, StatusFilter};

/// Length of the "recent" window, in days.
pub const RECENT_WINDOW_DAYS: u64 = 30;

/// Predefined filter shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickFilter {
    /// Issued within the last thirty days, today included.
    RecentThirtyDays,
    /// Issued during the current calendar year.
    ThisYear,
    /// Active certificates only.
    ActiveOnly,
    /// Revoked certificates only.
    RevokedOnly,
}

impl QuickFilter {
    /// Every shortcut, in menu order.
    pub const ALL: [QuickFilter; 4] = [
        Self::RecentThirtyDays,
        Self::ThisYear,
        Self::ActiveOnly,
        Self::RevokedOnly,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RecentThirtyDays => "Recent (Last 30 days)",
            Self::ThisYear => "This Year",
            Self::ActiveOnly => "Active Only",
            Self::RevokedOnly => "Revoked Only",
        }
    }

    /// Short command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecentThirtyDays => "recent",
            Self::ThisYear => "this-year",
            Self::ActiveOnly => "active",
            Self::RevokedOnly => "revoked",
        }
    }

    /// Apply the shortcut to `state`, with `today` as the reference day.
    pub fn apply(&self, state: &mut FilterState, today: NaiveDate) {
        match self {
            Self::RecentThirtyDays => {
                let start = today
                    .checked_sub_days(Days::new(RECENT_WINDOW_DAYS))
                    .unwrap_or(NaiveDate::MIN);
                state.date_range = DateRange::between(start, today);
            }
            Self::ThisYear => {
                let year = today.year();
                // Both always exist for a year taken from a valid date.
                if let (Some(start), Some(end)) = (
                    NaiveDate::from_ymd_opt(year, 1, 1),
                    NaiveDate::from_ymd_opt(year, 12, 31),
                ) {
                    state.date_range = DateRange::between(start, end);
                }
            }
            Self::ActiveOnly => state.status_filter = StatusFilter::Active,
            Self::RevokedOnly => state.status_filter = StatusFilter::Revoked,
        }
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuickFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|q| q.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown quick filter {s:?} (expected recent, this-year, active, revoked)")
            })
    }
}
