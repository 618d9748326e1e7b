//! Exporter config loader.
//!
//! An optional YAML file (path in `QE_CONFIG`) is read first, then `QE_*`
//! environment variables override individual fields. The merged result is
//! validated once; any problem is a `QuotaError::Config`.

pub mod schema;

use std::fs;

use gquota_core::error::{QuotaError, Result};

pub use schema::ExporterConfig;

pub const ENV_CONFIG_FILE: &str = "QE_CONFIG";
pub const ENV_PROJECT_ID: &str = "QE_PROJECT_ID";
pub const ENV_REFRESH_INTERVAL: &str = "QE_REFRESH_INTERVAL";
pub const ENV_LISTEN: &str = "QE_LISTEN";
pub const ENV_API_BASE: &str = "QE_API_BASE";
pub const ENV_ACCESS_TOKEN: &str = "QE_ACCESS_TOKEN";
pub const ENV_REQUEST_TIMEOUT: &str = "QE_REQUEST_TIMEOUT";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn from_env() -> Result<ExporterConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load through an arbitrary variable lookup (the environment in production).
pub fn from_lookup<F>(lookup: F) -> Result<ExporterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup(ENV_CONFIG_FILE) {
        Some(path) => parse_file(&path)?,
        None => ExporterConfig::default(),
    };

    if let Some(v) = lookup(ENV_PROJECT_ID) {
        cfg.project_id = v;
    }
    if let Some(v) = lookup(ENV_REFRESH_INTERVAL) {
        cfg.refresh_interval_secs = parse_secs(ENV_REFRESH_INTERVAL, &v)?;
    }
    if let Some(v) = lookup(ENV_LISTEN) {
        cfg.listen = v;
    }
    if let Some(v) = lookup(ENV_API_BASE) {
        cfg.api_base = v;
    }
    if let Some(v) = lookup(ENV_ACCESS_TOKEN) {
        cfg.access_token = Some(v).filter(|t| !t.is_empty());
    }
    if let Some(v) = lookup(ENV_REQUEST_TIMEOUT) {
        cfg.request_timeout_secs = parse_secs(ENV_REQUEST_TIMEOUT, &v)?;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn parse_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| QuotaError::Config(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}

fn parse_str(s: &str) -> Result<ExporterConfig> {
    serde_yaml::from_str(s).map_err(|e| QuotaError::Config(format!("invalid yaml: {e}")))
}

fn parse_secs(key: &str, v: &str) -> Result<u64> {
    v.trim()
        .parse::<u64>()
        .map_err(|_| QuotaError::Config(format!("{key} must be a number")))
}
