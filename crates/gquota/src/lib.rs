//! Top-level facade crate for gquota.
//!
//! Re-exports the core quota model and the exporter library so users can depend on a single crate.

pub mod core {
    pub use gquota_core::*;
}

pub mod exporter {
    pub use gquota_exporter::*;
}
