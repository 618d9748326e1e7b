//! gquota exporter library entry.
//!
//! Wires the quota source, publisher, gauge registry, refresh loop, and HTTP
//! endpoints into one exporter process. Consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod publisher;
pub mod router;
pub mod scheduler;
pub mod source;
