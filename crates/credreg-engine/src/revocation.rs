//! # Revocation Workflow
//!
//! Explicit state machine guarding the irreversible `Active → Revoked`
//! transition behind user confirmation, with at most one revocation in
//! flight at any time.
//!
//! ## Transitions
//!
//! ```text
//!        request_revoke(id)            begin_apply(id)
//! IDLE ─────────────────▶ CONFIRM_PENDING ────────────▶ APPLYING
//!  ▲                           │                          │
//!  │          cancel()         │       finish_apply()     │
//!  ├───────────────────────────┘     (success | failure)  │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! `begin_apply` and `finish_apply` bracket the external revoke call. The
//! caller releases its lock between them, so other callers can observe
//! `APPLYING` and are turned away. Any `request_revoke` while a
//! confirmation is pending or a call is in flight is rejected with
//! [`RevocationError::Busy`], including for the same identifier.
//!
//! Every failure returns the machine to `IDLE` with a recorded
//! [`RevocationOutcome::Failed`] message and leaves the record unchanged.

use std::fmt;

use thiserror::Error;

use credreg_core::{CertificateId, CertificateRecord, StoreError, TransportError};

use crate::store::RecordStore;

/// Workflow states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RevocationState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Waiting for the user to confirm revoking the identifier.
    ConfirmPending(CertificateId),
    /// The external revoke call for the identifier is in flight.
    Applying(CertificateId),
}

impl RevocationState {
    /// The canonical state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::ConfirmPending(_) => "CONFIRM_PENDING",
            Self::Applying(_) => "APPLYING",
        }
    }

    /// The identifier the workflow is engaged with, if any.
    pub fn target(&self) -> Option<&CertificateId> {
        match self {
            Self::Idle => None,
            Self::ConfirmPending(id) | Self::Applying(id) => Some(id),
        }
    }
}

impl fmt::Display for RevocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(id) => write!(f, "{}({id})", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// Result of the most recent completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationOutcome {
    /// The record was revoked.
    Revoked(CertificateId),
    /// The attempt failed; the record is unchanged.
    Failed {
        /// The targeted identifier.
        id: CertificateId,
        /// User-visible reason.
        message: String,
    },
}

/// Errors returned by workflow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    /// Another revocation is pending confirmation or in flight.
    #[error("revocation of {in_flight} is already {state}; finish or cancel it first")]
    Busy {
        /// The identifier currently engaged.
        in_flight: CertificateId,
        /// Name of the blocking state.
        state: &'static str,
    },

    /// The operation is not valid from the current state.
    #[error("cannot {action} from state {from}: {reason}")]
    InvalidTransition {
        /// Name of the current state.
        from: &'static str,
        /// The attempted operation.
        action: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A store precondition failed (`NotFound`, `AlreadyRevoked`).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The external revoke call failed.
    #[error("revoke call for {id} failed: {source}")]
    RevokeCallFailure {
        /// The targeted identifier.
        id: CertificateId,
        /// Transport-level cause.
        source: TransportError,
    },
}

/// Proof that [`RevocationWorkflow::begin_apply`] succeeded. Consumed by
/// [`RevocationWorkflow::finish_apply`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an in-flight revocation must be finished"]
pub struct ApplyTicket {
    id: CertificateId,
}

impl ApplyTicket {
    /// The identifier being revoked.
    pub fn id(&self) -> &CertificateId {
        &self.id
    }
}

/// The revocation state machine.
#[derive(Debug, Clone, Default)]
pub struct RevocationWorkflow {
    state: RevocationState,
    last_outcome: Option<RevocationOutcome>,
}

impl RevocationWorkflow {
    /// Create an idle workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &RevocationState {
        &self.state
    }

    /// Outcome of the most recent completed attempt.
    pub fn last_outcome(&self) -> Option<&RevocationOutcome> {
        self.last_outcome.as_ref()
    }

    /// `IDLE → CONFIRM_PENDING(id)`.
    ///
    /// # Errors
    ///
    /// [`RevocationError::Busy`] unless the workflow is idle.
    pub fn request_revoke(&mut self, id: CertificateId) -> Result<(), RevocationError> {
        if let Some(in_flight) = self.state.target() {
            tracing::warn!(
                requested = %id,
                %in_flight,
                state = self.state.as_str(),
                "revocation request rejected: workflow busy"
            );
            return Err(RevocationError::Busy {
                in_flight: in_flight.clone(),
                state: self.state.as_str(),
            });
        }
        self.state = RevocationState::ConfirmPending(id);
        Ok(())
    }

    /// `CONFIRM_PENDING → IDLE` without mutation. Returns the identifier
    /// whose confirmation was abandoned.
    ///
    /// # Errors
    ///
    /// [`RevocationError::InvalidTransition`] unless a confirmation is pending.
    pub fn cancel(&mut self) -> Result<CertificateId, RevocationError> {
        match std::mem::take(&mut self.state) {
            RevocationState::ConfirmPending(id) => Ok(id),
            other => {
                let from = other.as_str();
                self.state = other;
                Err(RevocationError::InvalidTransition {
                    from,
                    action: "cancel",
                    reason: "no confirmation is pending".to_string(),
                })
            }
        }
    }

    /// `CONFIRM_PENDING(id) → APPLYING(id)`, after checking the store
    /// preconditions.
    ///
    /// # Errors
    ///
    /// - [`RevocationError::InvalidTransition`] if `id` is not the pending
    ///   confirmation. State is unchanged.
    /// - [`RevocationError::Store`] with `NotFound` or `AlreadyRevoked`.
    ///   The workflow returns to `IDLE` with a failed outcome.
    pub fn begin_apply(
        &mut self,
        id: &CertificateId,
        store: &RecordStore,
    ) -> Result<ApplyTicket, RevocationError> {
        match &self.state {
            RevocationState::ConfirmPending(pending) if pending == id => {}
            RevocationState::ConfirmPending(pending) => {
                return Err(RevocationError::InvalidTransition {
                    from: self.state.as_str(),
                    action: "confirm",
                    reason: format!("pending confirmation is for {pending}, not {id}"),
                });
            }
            other => {
                return Err(RevocationError::InvalidTransition {
                    from: other.as_str(),
                    action: "confirm",
                    reason: format!("no confirmation is pending for {id}"),
                });
            }
        }

        let precondition = match store.get(id) {
            None => Err(StoreError::NotFound { id: id.clone() }),
            Some(record) if !record.is_valid() => {
                Err(StoreError::AlreadyRevoked { id: id.clone() })
            }
            Some(_) => Ok(()),
        };
        if let Err(e) = precondition {
            self.fail(id.clone(), e.to_string());
            return Err(e.into());
        }

        self.state = RevocationState::Applying(id.clone());
        Ok(ApplyTicket { id: id.clone() })
    }

    /// `APPLYING → IDLE`, applying the result of the external call.
    ///
    /// On success the record is marked revoked in `store` and returned.
    ///
    /// # Errors
    ///
    /// - [`RevocationError::RevokeCallFailure`] if the call failed.
    /// - [`RevocationError::Store`] if the store rejected the mutation.
    /// - [`RevocationError::InvalidTransition`] if the ticket does not
    ///   match the in-flight identifier. State is unchanged.
    ///
    /// In the first two cases the record is unchanged and the workflow
    /// is idle with a failed outcome.
    pub fn finish_apply(
        &mut self,
        ticket: ApplyTicket,
        call: Result<(), TransportError>,
        store: &mut RecordStore,
    ) -> Result<CertificateRecord, RevocationError> {
        if self.state != RevocationState::Applying(ticket.id.clone()) {
            return Err(RevocationError::InvalidTransition {
                from: self.state.as_str(),
                action: "finish",
                reason: format!("{} is not in flight", ticket.id),
            });
        }
        let ApplyTicket { id } = ticket;

        if let Err(source) = call {
            self.fail(id.clone(), source.to_string());
            return Err(RevocationError::RevokeCallFailure { id, source });
        }

        match store.mark_revoked(&id) {
            Ok(record) => {
                self.state = RevocationState::Idle;
                self.last_outcome = Some(RevocationOutcome::Revoked(id));
                Ok(record)
            }
            Err(e) => {
                self.fail(id, e.to_string());
                Err(e.into())
            }
        }
    }

    /// `APPLYING(id) → IDLE` when the result of the external call will
    /// never be delivered. The record is left unchanged and the attempt is
    /// recorded as failed, although the registry may have applied it.
    ///
    /// Returns `false`, changing nothing, unless `id` is in flight.
    pub fn abandon(&mut self, id: &CertificateId) -> bool {
        if !matches!(&self.state, RevocationState::Applying(in_flight) if in_flight == id) {
            return false;
        }
        self.fail(
            id.clone(),
            "interrupted before the registry answered".to_string(),
        );
        true
    }

    fn fail(&mut self, id: CertificateId, message: String) {
        tracing::warn!(%id, %message, "revocation failed");
        self.state = RevocationState::Idle;
        self.last_outcome = Some(RevocationOutcome::Failed { id, message });
    }
}
