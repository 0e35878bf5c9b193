//! Storage module for persisting pipeline invocations
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Saving a request together with the event sequence it produced
//! - Reading stored invocations back, newest first

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ResponseStore, StorageError, StorageResult};

use crate::pipeline::{PipelineReport, PipelineRequest};
use crate::progress::{WireEvent, WireKind};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens or creates a response database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, StorageError> {
    SqliteStorage::new(path)
}

/// A stored pipeline invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub id: i64,
    pub request: PipelineRequest,
    pub events: Vec<WireEvent>,
    pub status: ResponseStatus,
    pub config_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResponseRecord {
    /// Recovers the report carried by the `complete` event, if there is one
    pub fn report(&self) -> Option<PipelineReport> {
        self.events
            .iter()
            .rev()
            .find(|event| event.kind == WireKind::Complete)
            .and_then(|event| event.data.clone())
            .and_then(|data| serde_json::from_value(data).ok())
    }
}

/// How a stored invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Complete,
    Error,
    Incomplete,
}

impl ResponseStatus {
    /// Derives the status from the last event of a sequence
    pub fn from_events(events: &[WireEvent]) -> Self {
        match events.last().map(|event| event.kind) {
            Some(WireKind::Complete) => Self::Complete,
            Some(WireKind::Error) => Self::Error,
            _ => Self::Incomplete,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Incomplete => "incomplete",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(Self::Complete),
            "error" => Some(Self::Error),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }
}
