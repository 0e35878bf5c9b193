//! Output module for rendering pipeline reports
//!
//! This module handles:
//! - Formatting a `PipelineReport` as a Markdown document
//! - Printing a report summary and stored-response listings to the terminal
//! - Serializing a report as pretty JSON

mod markdown;
mod summary;

pub use markdown::{format_report_markdown, write_report_markdown};
pub use summary::{format_report_json, print_report, print_responses};

use thiserror::Error;

/// Errors that can occur while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
