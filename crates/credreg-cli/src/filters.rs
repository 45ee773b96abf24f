//! # Filter Flags
//!
//! `--search`, `--field`, `--status`, `--from`, `--to` and `--quick`,
//! shared by `list` and `export`. Quick filters are applied first, so an
//! explicit flag for the same field wins.

use chrono::NaiveDate;
use clap::Args;

use credreg_engine::{DateRange, FilterState, QuickFilter, SearchField, StatusFilter};

/// Filter arguments.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive substring to search for.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Field the search applies to: all, student, degree, id.
    #[arg(long, value_name = "FIELD")]
    pub field: Option<SearchField>,

    /// Status filter: all, active, revoked.
    #[arg(long, value_name = "STATUS")]
    pub status: Option<StatusFilter>,

    /// Earliest issue date (inclusive). Only applied together with --to.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Latest issue date (inclusive). Only applied together with --from.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Quick filter: recent, this-year, active, revoked. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub quick: Vec<QuickFilter>,
}

impl FilterArgs {
    /// Build the filter state these flags describe, with `today` as the
    /// reference day for quick filters.
    pub fn to_state(&self, today: NaiveDate) -> FilterState {
        let mut state = FilterState::default();
        for quick in &self.quick {
            quick.apply(&mut state, today);
        }
        if let Some(term) = &self.search {
            state.search_term = term.clone();
        }
        if let Some(field) = self.field {
            state.search_field = field;
        }
        if let Some(status) = self.status {
            state.status_filter = status;
        }
        if self.from.is_some() || self.to.is_some() {
            state.date_range = DateRange {
                start: self.from,
                end: self.to,
            };
            if self.from.is_none() || self.to.is_none() {
                tracing::warn!("date range needs both --from and --to; ignoring the single bound");
            }
        }
        state
    }
}
