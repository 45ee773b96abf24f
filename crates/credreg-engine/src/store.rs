//! # Record Store
//!
//! Holds the authoritative in-memory sequence of certificate records, in
//! the order the registry delivered them.
//!
//! ## Invariants
//!
//! - Insertion order is the registry's delivery order and never changes.
//! - Identifiers are unique. A listing containing a duplicate identifier
//!   is rejected as malformed.
//! - After a load failure the store is empty, never partially populated.
//! - The only in-place mutation is `Active → Revoked` on a single record,
//!   which preserves the record's position and every other field.
//!
//! Every successful mutation bumps [`RecordStore::revision`], which the
//! filter engine uses as part of its memoization key.

use std::collections::HashMap;

use credreg_core::{CertificateId, CertificateRecord, CertificateStatus, StoreError};

/// The in-memory certificate record set.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<CertificateRecord>,
    index: HashMap<CertificateId, usize>,
    revision: u64,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full record set with a fresh registry listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LoadFailure`] if the listing repeats an
    /// identifier. The store is left empty in that case.
    pub fn load(&mut self, records: Vec<CertificateRecord>) -> Result<usize, StoreError> {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), pos).is_some() {
                return Err(self.load_failed(format!(
                    "registry returned duplicate certificate id {}",
                    record.id
                )));
            }
        }
        let count = records.len();
        self.records = records;
        self.index = index;
        self.revision += 1;
        Ok(count)
    }

    /// Record that the registry fetch failed: clear the store and return
    /// the corresponding [`StoreError::LoadFailure`].
    pub fn load_failed(&mut self, reason: impl Into<String>) -> StoreError {
        self.records.clear();
        self.index.clear();
        self.revision += 1;
        StoreError::LoadFailure {
            reason: reason.into(),
        }
    }

    /// Revoke the record with the given identifier in place.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record has this identifier.
    /// - [`StoreError::AlreadyRevoked`] if the record is already revoked.
    ///   Nothing is modified and the revision is not bumped.
    pub fn mark_revoked(&mut self, id: &CertificateId) -> Result<CertificateRecord, StoreError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        let record = &mut self.records[pos];
        record.revoke()?;
        self.revision += 1;
        Ok(record.clone())
    }

    /// Look up a record by identifier.
    pub fn get(&self, id: &CertificateId) -> Option<&CertificateRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    /// All records in delivery order.
    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotonic counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of records with the given status.
    pub fn count_status(&self, status: CertificateStatus) -> usize {
        self.records.iter().filter(|r| r.status() == status).count()
    }
}
