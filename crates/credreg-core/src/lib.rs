//! # credreg-core: Foundational Types for the Credential Registry Console
//!
//! Defines the record model shared by every other crate in the workspace:
//! the `CertificateId` newtype, the `CertificateRecord` held by the
//! in-memory store, its one-way `CertificateStatus`, issue-date parsing and
//! formatting, and the structured error hierarchy.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** A certificate identifier is a `CertificateId`,
//!    never a bare `String`. Empty identifiers are rejected at construction.
//!
//! 2. **One-way status.** `CertificateStatus` only moves `Active → Revoked`.
//!    The status field is private to `CertificateRecord`; the only mutator is
//!    [`CertificateRecord::revoke`], which rejects a second revocation.
//!
//! 3. **Calendar dates, not timestamps.** Issue dates are `chrono::NaiveDate`.
//!    Range filtering compares whole days.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credreg-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod record;
pub mod temporal;
pub mod traits;

// Re-export primary types for ergonomic imports.
pub use error::{DateError, IdentifierError, StoreError, TransportError};
pub use identity::CertificateId;
pub use record::{CertificateRecord, CertificateStatus, VERIFIED_MARKER};
pub use temporal::{export_stamp, format_display, format_numeric, parse_issue_date};
pub use traits::{RecordSource, RevokeTransport};
