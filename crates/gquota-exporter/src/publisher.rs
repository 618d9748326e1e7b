//! Quota publisher: provider listings -> registry writes.
//!
//! One cycle is regional quotas, then project-wide quotas, then the freshness
//! timestamp. Any error stops the cycle where it happened. Values written
//! before the error stay in the registry and the timestamp is left alone, so
//! it only ever marks a fully successful refresh.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use gquota_core::error::{QuotaError, Result};
use gquota_core::quota::{
    help_text, metric_name, QuotaRecord, RawQuota, Scope, ValueKind, QUOTA_LABELS,
    TIMESTAMP_METRIC_HELP, TIMESTAMP_METRIC_NAME,
};

use crate::obs::MetricRegistry;
use crate::source::{QuotaSource, RegionQuotas};

/// Which step of a cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Regional,
    Global,
}

impl CycleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleStage::Regional => "regional",
            CycleStage::Global => "global",
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Unix time written to the timestamp gauge.
    pub updated_at: f64,
    pub regions: usize,
    /// Regional plus global records published.
    pub records: usize,
}

#[derive(Debug, Error)]
#[error("{stage} quota refresh failed: {error}")]
pub struct CycleFailure {
    pub stage: CycleStage,
    #[source]
    pub error: QuotaError,
}

pub type CycleResult = std::result::Result<CycleReport, CycleFailure>;

pub struct QuotaPublisher {
    project_id: String,
    source: Arc<dyn QuotaSource>,
    registry: Arc<MetricRegistry>,
}

impl QuotaPublisher {
    pub fn new(
        project_id: impl Into<String>,
        source: Arc<dyn QuotaSource>,
        registry: Arc<MetricRegistry>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            source,
            registry,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.registry)
    }

    /// Write one reading of one resource.
    pub fn publish_value(&self, value: f64, resource: &str, kind: ValueKind, scope: &Scope) {
        let name = metric_name(resource, kind);
        let gauge = self
            .registry
            .get_or_create(&name, &help_text(resource), &QUOTA_LABELS);
        gauge.set(&[self.project_id.as_str(), scope.label()], value);
    }

    /// Write limit, usage, and ratio for one record.
    pub fn publish_record(&self, record: &QuotaRecord) {
        for (kind, value) in record.values() {
            self.publish_value(value, &record.resource_name, kind, &record.scope);
        }
    }

    /// Publish every entry of one region. Stops at the first malformed entry.
    pub fn publish_region_quotas(&self, region: &RegionQuotas) -> Result<usize> {
        self.publish_raw(&region.quotas, Scope::Region(region.name.clone()))
    }

    /// Publish project-wide entries under `region="global"`.
    pub fn publish_global_quotas(&self, quotas: &[RawQuota]) -> Result<usize> {
        self.publish_raw(quotas, Scope::Global)
    }

    fn publish_raw(&self, quotas: &[RawQuota], scope: Scope) -> Result<usize> {
        for raw in quotas {
            let record = QuotaRecord::from_raw(raw, scope.clone())?;
            self.publish_record(&record);
        }
        Ok(quotas.len())
    }

    /// Fetch and publish regional quotas. Returns (regions, records).
    pub async fn refresh_regional(&self) -> Result<(usize, usize)> {
        let regions = self.source.regions(&self.project_id).await?;
        let mut records = 0;
        for region in &regions {
            records += self.publish_region_quotas(region)?;
        }
        Ok((regions.len(), records))
    }

    /// Fetch and publish project-wide quotas. Returns records published.
    pub async fn refresh_global(&self) -> Result<usize> {
        let quotas = self.source.project_quotas(&self.project_id).await?;
        self.publish_global_quotas(&quotas)
    }

    /// Stamp the freshness gauge with the current time and return it.
    pub fn refresh_timestamp(&self) -> f64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.set_timestamp(now);
        now
    }

    fn set_timestamp(&self, unixtime: f64) {
        let gauge = self
            .registry
            .get_or_create(TIMESTAMP_METRIC_NAME, TIMESTAMP_METRIC_HELP, &[]);
        gauge.set(&[], unixtime);
    }

    /// Run one full refresh. Never panics on bad data; failures come back as `CycleFailure`.
    pub async fn run_cycle(&self) -> CycleResult {
        let (regions, regional_records) =
            self.refresh_regional().await.map_err(|error| CycleFailure {
                stage: CycleStage::Regional,
                error,
            })?;

        let global_records = self.refresh_global().await.map_err(|error| CycleFailure {
            stage: CycleStage::Global,
            error,
        })?;

        let updated_at = self.refresh_timestamp();
        Ok(CycleReport {
            updated_at,
            regions,
            records: regional_records + global_records,
        })
    }

    /// `run_cycle` plus logging; the form the scheduler calls.
    pub async fn run_logged(&self) -> CycleResult {
        let res = self.run_cycle().await;
        match &res {
            Ok(report) => tracing::info!(
                project_id = %self.project_id,
                regions = report.regions,
                records = report.records,
                updated_at = report.updated_at,
                "quota refresh complete"
            ),
            Err(failure) => tracing::error!(
                project_id = %self.project_id,
                stage = %failure.stage,
                kind = failure.error.kind().as_str(),
                error = %failure.error,
                "quota refresh failed"
            ),
        }
        res
    }
}
