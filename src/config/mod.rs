//! Configuration module for SiteScout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error for the binary: every section has defaults.
//!
//! # Example
//!
//! ```no_run
//! use sitescout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitescout.toml")).unwrap();
//! println!("Default max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, OracleConfig, OutputConfig, UserAgentConfig,
    DEFAULT_SYSTEM_PROMPT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
