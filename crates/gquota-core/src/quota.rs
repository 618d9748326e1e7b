//! Quota records and the rules that turn them into gauge identities.
//!
//! Naming rules:
//! - Metric name is `gcloud_<resource lowercased>_quota_<kind>`.
//! - Ratio is `usage / limit`, or exactly `0.0` when the limit is not positive.
//! - Region label is the region name, or `"global"` for project-wide quotas.

use serde::Deserialize;

use crate::error::{QuotaError, Result};

/// Name of the freshness gauge stamped after each successful refresh.
pub const TIMESTAMP_METRIC_NAME: &str = "gcloud_exporter_last_update_unixtime";

/// Help text of the freshness gauge.
pub const TIMESTAMP_METRIC_HELP: &str =
    "Date of last successful quotas data update as unix timestamp/epoch";

/// Label names carried by every quota gauge, in exposition order.
pub const QUOTA_LABELS: [&str; 2] = ["project_id", "region"];

/// Region label value for project-wide quotas.
pub const GLOBAL_SCOPE: &str = "global";

/// One quota entry as the provider sends it.
///
/// Fields are optional so a missing one is reported when the entry is
/// published, not when the whole response is decoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuota {
    /// Resource identifier (e.g., "CPUS").
    #[serde(default)]
    pub metric: Option<String>,
    /// Ceiling; `<= 0` means unbounded or unknown.
    #[serde(default)]
    pub limit: Option<f64>,
    /// Current consumption.
    #[serde(default)]
    pub usage: Option<f64>,
}

impl RawQuota {
    pub fn new(metric: impl Into<String>, limit: f64, usage: f64) -> Self {
        Self {
            metric: Some(metric.into()),
            limit: Some(limit),
            usage: Some(usage),
        }
    }
}

/// Where a quota applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Region(String),
    Global,
}

impl Scope {
    /// Value of the `region` label.
    pub fn label(&self) -> &str {
        match self {
            Scope::Region(name) => name,
            Scope::Global => GLOBAL_SCOPE,
        }
    }
}

/// Validated quota line.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaRecord {
    pub resource_name: String,
    pub limit: f64,
    pub usage: f64,
    pub scope: Scope,
}

impl QuotaRecord {
    /// Validate a provider entry. Every field is required.
    pub fn from_raw(raw: &RawQuota, scope: Scope) -> Result<Self> {
        let resource_name = raw
            .metric
            .clone()
            .ok_or_else(|| missing("metric", &scope))?;
        let limit = raw.limit.ok_or_else(|| missing("limit", &scope))?;
        let usage = raw.usage.ok_or_else(|| missing("usage", &scope))?;

        Ok(Self {
            resource_name,
            limit,
            usage,
            scope,
        })
    }

    pub fn ratio(&self) -> f64 {
        usage_ratio(self.usage, self.limit)
    }

    /// The three readings published for this record, in publish order.
    pub fn values(&self) -> [(ValueKind, f64); 3] {
        [
            (ValueKind::Limit, self.limit),
            (ValueKind::Usage, self.usage),
            (ValueKind::Ratio, self.ratio()),
        ]
    }
}

fn missing(field: &str, scope: &Scope) -> QuotaError {
    QuotaError::MalformedRecord(format!(
        "missing `{field}` in quota entry (region={})",
        scope.label()
    ))
}

/// Which reading of a quota a gauge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Limit,
    Usage,
    Ratio,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Limit => "limit",
            ValueKind::Usage => "usage",
            ValueKind::Ratio => "ratio",
        }
    }
}

/// Derive the gauge name for a resource reading.
pub fn metric_name(resource: &str, kind: ValueKind) -> String {
    format!("gcloud_{}_quota_{}", resource.to_lowercase(), kind.as_str())
}

/// Help text attached when a resource's gauge is first created.
pub fn help_text(resource: &str) -> String {
    format!("Google Cloud quota for {resource} resource")
}

/// `usage / limit`, or `0.0` when the limit is zero, negative, or NaN.
pub fn usage_ratio(usage: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        usage / limit
    } else {
        0.0
    }
}
