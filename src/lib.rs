//! SiteScout: a bounded same-domain crawler feeding a structured-extraction pipeline
//!
//! This crate walks a website breadth-first under strict depth and page budgets,
//! extracts clean text from every visited page, hands that text to an external
//! extraction oracle (an LLM call) and collects the deduplicated company records
//! it returns, reporting progress as an ordered event stream along the way.

pub mod config;
pub mod crawler;
pub mod oracle;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod url;

use serde::Serialize;
use thiserror::Error;

/// Main error type for SiteScout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] oracle::OracleError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Rejected pipeline inputs
///
/// These are raised before any network activity and are never confused with
/// runtime crawl failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start_url must be an absolute HTTP or HTTPS URL, got '{0}'")]
    InvalidStartUrl(String),

    #[error("max_depth must be between 0 and 3, got {0}")]
    MaxDepthOutOfRange(u32),

    #[error("max_pages must be between 1 and 50, got {0}")]
    MaxPagesOutOfRange(u32),
}

/// Page-local fetch failures
///
/// A fetch error is recorded on the page it happened to and never stops the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("HTTP status {code}")]
    HttpStatus { code: u16 },
}

/// Faults that end a pipeline invocation without a report
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Internal pipeline error: {0}")]
    Internal(String),
}

/// Result type alias for SiteScout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, PageResult};
pub use oracle::{CompanyRecord, ExtractionOracle};
pub use pipeline::{Pipeline, PipelineReport, PipelineRequest};
pub use progress::{ProgressEvent, ProgressSink};
pub use url::{normalize_url, DomainScope};
