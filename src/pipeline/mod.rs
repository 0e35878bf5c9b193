//! Crawl-and-extract pipeline
//!
//! This module contains:
//! - `PipelineRequest`: the caller's input, validated before any network I/O
//! - `RecordAggregator`: cross-page deduplication of extracted records
//! - `PipelineReport`: the immutable summary of a completed run
//! - `Pipeline`: the driver tying crawler, oracle, aggregator and reporter together

mod aggregator;
mod coordinator;

pub use aggregator::{aggregate, DedupKey, RecordAggregator};
pub use coordinator::{Pipeline, PipelineHandle, PipelineSettings};

use crate::config::CrawlerConfig;
use crate::oracle::CompanyRecord;
use crate::url::normalize_url;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Deepest crawl a request may ask for
pub const MAX_DEPTH_LIMIT: u32 = 3;

/// Largest page budget a request may ask for
pub const MAX_PAGES_LIMIT: u32 = 50;

/// Input to one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub start_url: String,
    pub max_depth: u32,
    pub max_pages: u32,
}

impl Default for PipelineRequest {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_depth: 2,
            max_pages: 20,
        }
    }
}

impl PipelineRequest {
    /// Creates a request with the default depth and page budget
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            ..Self::default()
        }
    }

    /// Creates a request using the budgets from the `[crawler]` section
    pub fn from_config(start_url: impl Into<String>, config: &CrawlerConfig) -> Self {
        Self {
            start_url: start_url.into(),
            max_depth: config.max_depth,
            max_pages: config.max_pages,
        }
    }

    /// Checks the request and returns the normalized seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - Normalized absolute HTTP(S) seed
    /// * `Err(ValidationError)` - Bad URL, or a budget outside its range
    pub fn validate(&self) -> Result<Url, ValidationError> {
        let seed = normalize_url(&self.start_url)
            .map_err(|_| ValidationError::InvalidStartUrl(self.start_url.clone()))?;

        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ValidationError::MaxDepthOutOfRange(self.max_depth));
        }

        if self.max_pages < 1 || self.max_pages > MAX_PAGES_LIMIT {
            return Err(ValidationError::MaxPagesOutOfRange(self.max_pages));
        }

        Ok(seed)
    }
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Normalized seed URL
    pub start_url: String,

    /// Pages visited, failed ones included
    pub pages_crawled: u32,

    /// Number of distinct companies after deduplication
    pub companies_found: usize,

    pub max_depth: u32,

    /// Distinct companies in first-seen order
    pub companies: Vec<CompanyRecord>,
}
