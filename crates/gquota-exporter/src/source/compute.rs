//! Compute Engine quota client.
//!
//! - `GET {api_base}/projects/{project}/regions?fields=items(name,quotas)`
//! - `GET {api_base}/projects/{project}?fields=quotas`
//!
//! `items`, `quotas`, and each region's `quotas` are required. A body
//! without them is a fetch error, never an empty listing.
//!
//! Credentials are not acquired here. If an access token is configured it is
//! sent as a bearer header as-is.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use gquota_core::error::{QuotaError, Result};
use gquota_core::quota::RawQuota;

use super::{QuotaSource, RegionQuotas};
use crate::config::ExporterConfig;

#[derive(Debug, Deserialize)]
struct RegionList {
    items: Vec<RegionQuotas>,
}

#[derive(Debug, Deserialize)]
struct ProjectQuotas {
    quotas: Vec<RawQuota>,
}

pub struct ComputeApiClient {
    http: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

impl ComputeApiClient {
    pub fn new(api_base: &str, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuotaError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn from_config(cfg: &ExporterConfig) -> Result<Self> {
        Self::new(
            &cfg.api_base,
            cfg.access_token.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn regions_url(&self, project_id: &str) -> String {
        format!(
            "{}/projects/{}/regions?fields=items(name,quotas)",
            self.api_base, project_id
        )
    }

    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}?fields=quotas", self.api_base, project_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| QuotaError::Fetch(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuotaError::Fetch(format!("GET {url}: {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| QuotaError::Fetch(format!("GET {url}: invalid body: {e}")))
    }
}

#[async_trait]
impl QuotaSource for ComputeApiClient {
    async fn regions(&self, project_id: &str) -> Result<Vec<RegionQuotas>> {
        let list: RegionList = self.get_json(&self.regions_url(project_id)).await?;
        tracing::debug!(project_id, regions = list.items.len(), "fetched regional quotas");
        Ok(list.items)
    }

    async fn project_quotas(&self, project_id: &str) -> Result<Vec<RawQuota>> {
        let project: ProjectQuotas = self.get_json(&self.project_url(project_id)).await?;
        tracing::debug!(project_id, quotas = project.quotas.len(), "fetched project quotas");
        Ok(project.quotas)
    }
}
