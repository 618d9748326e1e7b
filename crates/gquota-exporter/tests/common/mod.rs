//! Fixed-data quota source shared by integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use gquota_core::error::{QuotaError, Result};
use gquota_core::quota::RawQuota;
use gquota_exporter::source::{QuotaSource, RegionQuotas};

#[derive(Debug, Deserialize)]
struct RegionList {
    items: Vec<RegionQuotas>,
}

#[derive(Debug, Deserialize)]
struct ProjectQuotas {
    quotas: Vec<RawQuota>,
}

pub fn load_regions(name: &str) -> Vec<RegionQuotas> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str::<RegionList>(&s).unwrap().items
}

pub fn load_project(name: &str) -> Vec<RawQuota> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str::<ProjectQuotas>(&s).unwrap().quotas
}

/// Serves whatever is currently loaded; `None` makes that call fail.
#[derive(Default)]
pub struct FixedSource {
    pub regions: Mutex<Option<Vec<RegionQuotas>>>,
    pub project: Mutex<Option<Vec<RawQuota>>>,
}

impl FixedSource {
    pub fn new(regions: Option<Vec<RegionQuotas>>, project: Option<Vec<RawQuota>>) -> Self {
        Self {
            regions: Mutex::new(regions),
            project: Mutex::new(project),
        }
    }

    pub fn set_regions(&self, regions: Option<Vec<RegionQuotas>>) {
        *self.regions.lock().unwrap() = regions;
    }

    pub fn set_project(&self, project: Option<Vec<RawQuota>>) {
        *self.project.lock().unwrap() = project;
    }
}

#[async_trait]
impl QuotaSource for FixedSource {
    async fn regions(&self, _project_id: &str) -> Result<Vec<RegionQuotas>> {
        self.regions
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| QuotaError::Fetch("regions.list: 403 Forbidden".into()))
    }

    async fn project_quotas(&self, _project_id: &str) -> Result<Vec<RawQuota>> {
        self.project
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| QuotaError::Fetch("projects.get: connection reset".into()))
    }
}
