//! # Console
//!
//! Coordinates the record store, filter state, filter engine, search
//! history and revocation workflow behind a single lock, and publishes a
//! [`ChangeEvent`] stream to subscribers.
//!
//! ## Locking
//!
//! All state lives behind one `parking_lot::Mutex`. The lock is never held
//! across `.await`: [`Console::load`] fetches before locking, and
//! [`Console::confirm_revoke`] takes the lock to enter `APPLYING`, releases
//! it for the external call, then takes it again to apply the outcome.
//! Meanwhile other callers see `APPLYING` and their `request_revoke` is
//! rejected.
//!
//! ## Event ordering
//!
//! Every mutating call recomputes the filtered view before releasing the
//! lock, then publishes the collected events with the lock released.
//! Subscribers therefore always observe state strictly after the
//! mutation, and may read from the console while handling an event.

use std::fmt;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use credreg_core::{
    CertificateId, CertificateRecord, CertificateStatus, RecordSource, RevokeTransport,
    StoreError, TransportError,
};

use crate::events::{ChangeEvent, EventBus, SubscriptionId};
use crate::export;
use crate::filter::{DateRange, FilterEngine, FilterState, FilteredView, SearchField, StatusFilter};
use crate::history::SearchHistory;
use crate::metrics::ConsoleMetrics;
use crate::quick::QuickFilter;
use crate::revocation::{RevocationError, RevocationOutcome, RevocationState, RevocationWorkflow};
use crate::store::RecordStore;

const LOAD_FAILED_MESSAGE: &str = "Failed to load certificates. Please try again.";
const REVOKED_MESSAGE: &str = "Certificate revoked successfully";
const REVOKE_FAILED_MESSAGE: &str = "Failed to revoke certificate. Please try again.";
const REVOKE_INTERRUPTED_MESSAGE: &str =
    "Revocation was interrupted. Reload to check the certificate's status.";

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// An operation succeeded.
    Success,
    /// An operation failed; the user may retry.
    Error,
}

/// The latest non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Message text.
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Counts describing the current view against the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    /// Records in the filtered view.
    pub visible: usize,
    /// Records in the store.
    pub total: usize,
    /// Active records in the store.
    pub active: usize,
    /// Revoked records in the store.
    pub revoked: usize,
}

impl fmt::Display for ViewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} of {} certificates ({} active, {} revoked)",
            self.visible, self.total, self.active, self.revoked
        )
    }
}

#[derive(Debug, Default)]
struct ConsoleState {
    store: RecordStore,
    filter: FilterState,
    engine: FilterEngine,
    history: SearchHistory,
    workflow: RevocationWorkflow,
    notice: Option<Notice>,
}

impl ConsoleState {
    fn refresh_view(&mut self, events: &mut Vec<ChangeEvent>) {
        if self.engine.recompute(&self.store, &self.filter) {
            events.push(ChangeEvent::ViewRecomputed {
                visible: self.engine.view().len(),
                total: self.store.len(),
            });
        }
    }

    fn edit_filter(&mut self, events: &mut Vec<ChangeEvent>, f: impl FnOnce(&mut FilterState)) {
        let before = self.filter.clone();
        f(&mut self.filter);
        if self.filter != before {
            events.push(ChangeEvent::FilterChanged);
        }
    }

    fn note_workflow(&self, before: &RevocationState, events: &mut Vec<ChangeEvent>) {
        let now = self.workflow.state();
        if now != before {
            events.push(ChangeEvent::RevocationStateChanged { state: now.clone() });
        }
    }
}

/// Returns the workflow to idle if a `confirm_revoke` future is dropped
/// while the registry call is outstanding.
struct AbandonOnDrop<'a> {
    console: &'a Console,
    id: Option<CertificateId>,
}

impl AbandonOnDrop<'_> {
    fn disarm(mut self) {
        self.id = None;
    }
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.console.abandon_apply(&id);
        }
    }
}

/// The record-management console.
#[derive(Debug, Default)]
pub struct Console {
    state: Mutex<ConsoleState>,
    bus: RwLock<EventBus>,
    metrics: ConsoleMetrics,
}

impl Console {
    /// Create a console with an empty store and default filters.
    pub fn new() -> Self {
        Self::default()
    }

    fn update<R>(&self, f: impl FnOnce(&mut ConsoleState, &mut Vec<ChangeEvent>) -> R) -> R {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.lock();
            let result = f(&mut state, &mut events);
            state.refresh_view(&mut events);
            result
        };
        if !events.is_empty() {
            let bus = self.bus.read();
            for event in &events {
                bus.publish(event);
            }
        }
        result
    }

    // -- Subscriptions --------------------------------------------------------

    /// Register a change subscriber. Subscribers must not call
    /// [`Console::subscribe`] or [`Console::unsubscribe`] themselves.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.bus.write().subscribe(f)
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.write().unsubscribe(id)
    }

    // -- Loading --------------------------------------------------------------

    /// Fetch the full listing from `source` and replace the store.
    ///
    /// The previous contents stay visible while the fetch is outstanding.
    ///
    /// # Errors
    ///
    /// [`StoreError::LoadFailure`] if the fetch failed or the listing was
    /// malformed. The store is then empty and an error notice is raised.
    pub async fn load<S: RecordSource>(&self, source: &S) -> Result<usize, StoreError> {
        tracing::debug!("fetching certificate listing");
        let fetched = source.fetch_all().await;
        self.ingest(fetched)
    }

    /// Replace the store with the outcome of a registry fetch.
    ///
    /// # Errors
    ///
    /// See [`Console::load`].
    pub fn ingest(
        &self,
        fetched: Result<Vec<CertificateRecord>, TransportError>,
    ) -> Result<usize, StoreError> {
        let result = self.update(|s, events| {
            let outcome = match fetched {
                Ok(records) => s.store.load(records),
                Err(e) => Err(s.store.load_failed(e.message)),
            };
            match &outcome {
                Ok(count) => events.push(ChangeEvent::Loaded { count: *count }),
                Err(e) => {
                    let reason = match e {
                        StoreError::LoadFailure { reason } => reason.clone(),
                        other => other.to_string(),
                    };
                    events.push(ChangeEvent::LoadFailed { reason });
                    s.notice = Some(Notice::error(LOAD_FAILED_MESSAGE));
                }
            }
            outcome
        });
        self.metrics.record_load(result.is_ok());
        match &result {
            Ok(count) => tracing::info!(count, "loaded certificate listing"),
            Err(e) => tracing::warn!(error = %e, "certificate listing load failed"),
        }
        result
    }

    // -- Filters --------------------------------------------------------------

    /// Current filter state.
    pub fn filter_state(&self) -> FilterState {
        self.state.lock().filter.clone()
    }

    /// Replace every filter field at once.
    pub fn set_filter_state(&self, filter: FilterState) {
        self.update(|s, events| s.edit_filter(events, |f| *f = filter));
    }

    /// Set the live search term. Does not touch the search history.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.update(|s, events| s.edit_filter(events, |f| f.search_term = term));
    }

    /// Choose which fields the search term applies to.
    pub fn set_search_field(&self, field: SearchField) {
        self.update(|s, events| s.edit_filter(events, |f| f.search_field = field));
    }

    /// Set the status predicate.
    pub fn set_status_filter(&self, status: StatusFilter) {
        self.update(|s, events| s.edit_filter(events, |f| f.status_filter = status));
    }

    /// Set the issue-date bounds.
    pub fn set_date_range(&self, range: DateRange) {
        self.update(|s, events| s.edit_filter(events, |f| f.date_range = range));
    }

    /// Apply a quick-filter shortcut relative to `today`.
    pub fn apply_quick_filter(&self, quick: QuickFilter, today: NaiveDate) {
        self.update(|s, events| s.edit_filter(events, |f| quick.apply(f, today)));
    }

    /// Reset every filter field.
    pub fn clear_filters(&self) {
        self.update(|s, events| s.edit_filter(events, FilterState::clear));
    }

    /// Whether any filter is set.
    pub fn has_active_filters(&self) -> bool {
        self.state.lock().filter.has_active_filters()
    }

    // -- Search history -------------------------------------------------------

    /// Submit a search: set the term and record it in the history.
    pub fn submit_search(&self, term: &str) {
        let term = term.to_string();
        self.update(|s, events| {
            if s.history.record(&term) {
                events.push(ChangeEvent::HistoryChanged);
            }
            s.edit_filter(events, |f| f.search_term = term);
        });
    }

    /// Re-run the history entry at `index` (0 is the most recent). Returns
    /// the term, or `None` if there is no such entry.
    pub fn recall_search(&self, index: usize) -> Option<String> {
        self.update(|s, events| {
            let term = s.history.get(index)?.to_string();
            if s.history.record(&term) {
                events.push(ChangeEvent::HistoryChanged);
            }
            let next = term.clone();
            s.edit_filter(events, |f| f.search_term = next);
            Some(term)
        })
    }

    /// Past search terms, most recent first.
    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.to_vec()
    }

    /// Forget every past search term.
    pub fn clear_history(&self) {
        self.update(|s, events| {
            if !s.history.is_empty() {
                s.history.clear();
                events.push(ChangeEvent::HistoryChanged);
            }
        });
    }

    // -- View -----------------------------------------------------------------

    /// Snapshot of the filtered view.
    pub fn view(&self) -> FilteredView {
        self.state.lock().engine.view().clone()
    }

    /// Snapshot of every record in store order.
    pub fn records(&self) -> Vec<CertificateRecord> {
        self.state.lock().store.records().to_vec()
    }

    /// Look up a single record.
    pub fn record(&self, id: &CertificateId) -> Option<CertificateRecord> {
        self.state.lock().store.get(id).cloned()
    }

    /// Counts for the current view.
    pub fn summary(&self) -> ViewSummary {
        let state = self.state.lock();
        ViewSummary {
            visible: state.engine.view().len(),
            total: state.store.len(),
            active: state.store.count_status(CertificateStatus::Active),
            revoked: state.store.count_status(CertificateStatus::Revoked),
        }
    }

    /// Serialize the current view as comma-separated text.
    pub fn export_csv(&self) -> String {
        let state = self.state.lock();
        export::serialize(state.engine.view())
    }

    // -- Revocation -----------------------------------------------------------

    /// Current revocation workflow state.
    pub fn revocation_state(&self) -> RevocationState {
        self.state.lock().workflow.state().clone()
    }

    /// Outcome of the most recent completed revocation attempt.
    pub fn last_revocation(&self) -> Option<RevocationOutcome> {
        self.state.lock().workflow.last_outcome().cloned()
    }

    /// Open a confirmation for revoking `id`.
    ///
    /// # Errors
    ///
    /// [`RevocationError::Busy`] while another revocation is pending or in
    /// flight.
    pub fn request_revoke(&self, id: CertificateId) -> Result<(), RevocationError> {
        self.update(|s, events| {
            let before = s.workflow.state().clone();
            let result = s.workflow.request_revoke(id);
            s.note_workflow(&before, events);
            result
        })
    }

    /// Abandon the pending confirmation.
    ///
    /// # Errors
    ///
    /// [`RevocationError::InvalidTransition`] if none is pending.
    pub fn cancel_revoke(&self) -> Result<CertificateId, RevocationError> {
        self.update(|s, events| {
            let before = s.workflow.state().clone();
            let result = s.workflow.cancel();
            s.note_workflow(&before, events);
            result
        })
    }

    /// Confirm the pending revocation of `id` and carry it out through
    /// `transport`.
    ///
    /// # Errors
    ///
    /// - [`RevocationError::InvalidTransition`] if `id` is not pending.
    /// - [`RevocationError::Store`] for `NotFound` / `AlreadyRevoked`.
    /// - [`RevocationError::RevokeCallFailure`] if the registry call failed.
    ///
    /// Except for an invalid transition, every failure leaves the workflow
    /// idle with an error notice and the record unchanged. Dropping the
    /// returned future before the registry answers does the same.
    pub async fn confirm_revoke<T: RevokeTransport>(
        &self,
        id: &CertificateId,
        transport: &T,
    ) -> Result<CertificateRecord, RevocationError> {
        let ticket = self.update(|s, events| {
            let before = s.workflow.state().clone();
            let result = s.workflow.begin_apply(id, &s.store);
            s.note_workflow(&before, events);
            if let Err(e @ RevocationError::Store(_)) = &result {
                s.notice = Some(Notice::error(e.to_string()));
            }
            result
        });
        let ticket = match ticket {
            Ok(ticket) => ticket,
            Err(e) => {
                if matches!(e, RevocationError::Store(_)) {
                    self.metrics.record_revocation(false);
                }
                return Err(e);
            }
        };

        tracing::info!(%id, "revoking certificate");
        let guard = AbandonOnDrop {
            console: self,
            id: Some(ticket.id().clone()),
        };
        let call = transport.revoke(ticket.id()).await;
        guard.disarm();

        let result = self.update(|s, events| {
            let before = s.workflow.state().clone();
            let result = s.workflow.finish_apply(ticket, call, &mut s.store);
            match &result {
                Ok(record) => {
                    events.push(ChangeEvent::Revoked {
                        id: record.id.clone(),
                    });
                    s.notice = Some(Notice::success(REVOKED_MESSAGE));
                }
                Err(RevocationError::RevokeCallFailure { .. }) => {
                    s.notice = Some(Notice::error(REVOKE_FAILED_MESSAGE));
                }
                Err(e) => s.notice = Some(Notice::error(e.to_string())),
            }
            s.note_workflow(&before, events);
            result
        });
        self.metrics.record_revocation(result.is_ok());
        if result.is_ok() {
            tracing::info!(%id, "certificate revoked");
        }
        result
    }

    fn abandon_apply(&self, id: &CertificateId) {
        let abandoned = self.update(|s, events| {
            let before = s.workflow.state().clone();
            let abandoned = s.workflow.abandon(id);
            if abandoned {
                s.notice = Some(Notice::error(REVOKE_INTERRUPTED_MESSAGE));
            }
            s.note_workflow(&before, events);
            abandoned
        });
        if abandoned {
            self.metrics.record_revocation(false);
        }
    }

    // -- Notices and counters -------------------------------------------------

    /// The latest user-visible notice.
    pub fn notice(&self) -> Option<Notice> {
        self.state.lock().notice.clone()
    }

    /// Dismiss the current notice.
    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }

    /// Load and revocation counters.
    pub fn metrics(&self) -> &ConsoleMetrics {
        &self.metrics
    }
}
