//! # credreg-engine: Query and Revocation Engine
//!
//! Everything the registry console does between "listing fetched" and
//! "user sees rows": the in-memory [`RecordStore`], the three-stage filter
//! pipeline and its memoizing [`FilterEngine`], the bounded
//! [`SearchHistory`], the [`QuickFilter`] shortcuts, the single-flight
//! [`RevocationWorkflow`], and the tabular [`export`].
//!
//! [`Console`] ties these together behind one lock and publishes
//! [`ChangeEvent`]s to subscribers.
//!
//! ## Filter pipeline
//!
//! ```text
//! store.records()
//!   └─ search (term, field)  ─ case-insensitive substring
//!       └─ status            ─ all | active | revoked
//!           └─ date range    ─ inclusive, only when both bounds set
//!               └─ FilteredView (store order preserved)
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `credreg-core`. Registry I/O is reached through the
//!   [`credreg_core::RecordSource`] and [`credreg_core::RevokeTransport`]
//!   traits.
//! - No lock is held across `.await`.

pub mod console;
pub mod events;
pub mod export;
pub mod filter;
pub mod history;
pub mod metrics;
pub mod quick;
pub mod revocation;
pub mod store;

pub use console::{Console, Notice, NoticeKind, ViewSummary};
pub use events::{ChangeEvent, EventBus, SubscriptionId};
pub use export::{export_file_name, serialize as export_csv, EXPORT_HEADER};
pub use filter::{apply, DateRange, FilterEngine, FilterState, FilteredView, SearchField, StatusFilter};
pub use history::{SearchHistory, HISTORY_CAPACITY};
pub use metrics::ConsoleMetrics;
pub use quick::{QuickFilter, RECENT_WINDOW_DAYS};
pub use revocation::{
    ApplyTicket, RevocationError, RevocationOutcome, RevocationState, RevocationWorkflow,
};
pub use store::RecordStore;
