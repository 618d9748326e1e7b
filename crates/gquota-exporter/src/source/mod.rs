//! Quota sources.
//!
//! The publisher only sees the `QuotaSource` trait; `ComputeApiClient`
//! talks to the Compute Engine REST API, tests plug in fixed data.

pub mod compute;

use async_trait::async_trait;
use serde::Deserialize;

use gquota_core::quota::RawQuota;
use gquota_core::Result;

pub use compute::ComputeApiClient;

/// One region and its quota entries, as returned by `regions.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionQuotas {
    pub name: String,
    pub quotas: Vec<RawQuota>,
}

impl RegionQuotas {
    pub fn new(name: impl Into<String>, quotas: Vec<RawQuota>) -> Self {
        Self {
            name: name.into(),
            quotas,
        }
    }
}

/// Where quota listings come from.
#[async_trait]
pub trait QuotaSource: Send + Sync {
    /// Regional quotas, one entry per region.
    async fn regions(&self, project_id: &str) -> Result<Vec<RegionQuotas>>;
    /// Project-wide quotas.
    async fn project_quotas(&self, project_id: &str) -> Result<Vec<RawQuota>>;
}
