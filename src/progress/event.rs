//! Progress events and their wire shape

use crate::pipeline::PipelineReport;
use crate::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One step of a pipeline invocation, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The request passed validation and the crawl is about to begin
    Started {
        start_url: String,
        max_depth: u32,
        max_pages: u32,
    },

    /// A page was visited; `error` is set when its fetch failed
    PageFetched {
        index: u32,
        url: String,
        depth: u32,
        error: Option<FetchError>,
    },

    /// The oracle finished with a page
    ExtractionProgress {
        index: u32,
        url: String,
        page_companies: usize,
        companies_so_far: usize,
    },

    /// Free-form pipeline status line, streamed as a `progress` record
    Message { text: String },

    /// Terminal: the run finished and produced a report
    Complete { report: PipelineReport },

    /// Terminal: the run was rejected, cancelled, or hit an internal fault
    Error { reason: String },
}

impl ProgressEvent {
    /// Returns true for `Complete` and `Error`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Short snake_case name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::PageFetched { .. } => "page_fetched",
            Self::ExtractionProgress { .. } => "extraction_progress",
            Self::Message { .. } => "message",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// Human-readable status line for this event
    pub fn message(&self) -> String {
        match self {
            Self::Started { start_url, .. } => format!("Starting scrape of {}...", start_url),
            Self::PageFetched {
                index,
                url,
                error: None,
                ..
            } => format!("Fetched page {}: {}", index, url),
            Self::PageFetched {
                url,
                error: Some(error),
                ..
            } => format!("Failed to fetch {}: {}", url, error),
            Self::ExtractionProgress {
                index,
                page_companies: 0,
                ..
            } => format!("No companies found on page {}.", index),
            Self::ExtractionProgress {
                companies_so_far, ..
            } => format!("Found {} companies so far...", companies_so_far),
            Self::Message { text } => text.clone(),
            Self::Complete { report } => {
                format!("✅ Complete! Found {} companies.", report.companies_found)
            }
            Self::Error { reason } => format!("Error: {}", reason),
        }
    }

    /// Converts the event into the record sent to streaming clients
    pub fn to_wire(&self) -> WireEvent {
        let kind = match self {
            Self::Started { .. }
            | Self::PageFetched { .. }
            | Self::ExtractionProgress { .. }
            | Self::Message { .. } => WireKind::Progress,
            Self::Complete { .. } => WireKind::Complete,
            Self::Error { .. } => WireKind::Error,
        };

        let data = match self {
            Self::Started {
                start_url,
                max_depth,
                max_pages,
            } => Some(json!({
                "start_url": start_url,
                "max_depth": max_depth,
                "max_pages": max_pages,
            })),
            Self::PageFetched {
                index,
                url,
                depth,
                error,
            } => Some(json!({
                "index": index,
                "url": url,
                "depth": depth,
                "error": error,
            })),
            Self::ExtractionProgress {
                index,
                url,
                page_companies,
                companies_so_far,
            } => Some(json!({
                "index": index,
                "url": url,
                "page_companies": page_companies,
                "companies_so_far": companies_so_far,
            })),
            Self::Complete { report } => serde_json::to_value(report).ok(),
            Self::Message { .. } | Self::Error { .. } => None,
        };

        WireEvent {
            kind,
            message: self.message(),
            data,
        }
    }
}

/// Wire-level event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    Progress,
    /// Conversational reply from a front end; pipeline events never use it
    Message,
    Complete,
    Error,
}

/// Event record as streamed to clients: `{type, message, data?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "type")]
    pub kind: WireKind,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
