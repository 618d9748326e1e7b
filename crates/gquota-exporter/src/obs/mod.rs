//! In-process gauge registry rendered in Prometheus text format.
//!
//! Families and series are created on first use and never removed; the
//! `/metrics` handler renders whatever the last refresh cycles wrote.

pub mod registry;

pub use registry::{GaugeFamily, MetricRegistry};
