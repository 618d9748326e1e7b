use std::net::SocketAddr;

use serde::Deserialize;
use gquota_core::error::{QuotaError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// Cloud project whose quotas are exported. Required.
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            refresh_interval_secs: default_refresh_interval_secs(),
            listen: default_listen(),
            api_base: default_api_base(),
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(QuotaError::Config("QE_PROJECT_ID must be defined".into()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(QuotaError::Config(
                "refresh_interval_secs must be a positive number".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(QuotaError::Config(
                "request_timeout_secs must be a positive number".into(),
            ));
        }
        self.listen_addr()?;
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(QuotaError::Config(format!(
                "api_base must be an http(s) URL: {}",
                self.api_base
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| QuotaError::Config(format!("listen must be a valid SocketAddr: {e}")))
    }
}

fn default_refresh_interval_secs() -> u64 {
    60
}
fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_api_base() -> String {
    "https://compute.googleapis.com/compute/v1".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}
