//! gquota core: quota record model, metric naming, and the shared error surface.
//!
//! This crate defines how a provider quota line becomes a named gauge value.
//! It carries no transport or runtime dependencies so the exporter, tests,
//! and any other consumer can share the same derivation rules.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A missing field in a quota entry surfaces as `QuotaError::MalformedRecord`
//! rather than taking the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod quota;

/// Shared result type.
pub use error::{QuotaError, Result};
pub use quota::{QuotaRecord, RawQuota, Scope, ValueKind};
