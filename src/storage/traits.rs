//! Storage traits and error types
//!
//! This module defines the trait interface for response stores and the
//! associated error types.

use crate::pipeline::PipelineRequest;
use crate::progress::WireEvent;
use crate::storage::ResponseRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Response not found: {0}")]
    ResponseNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence collaborator for pipeline invocations
///
/// The pipeline never calls a store itself; callers hand over the request and
/// the event sequence once an invocation has finished.
pub trait ResponseStore {
    /// Stores one invocation
    ///
    /// # Arguments
    ///
    /// * `request` - The request that was run
    /// * `events` - Every event emitted, in order
    /// * `config_hash` - Hash of the config file in effect, if one was loaded
    ///
    /// # Returns
    ///
    /// The ID of the new record
    fn save_response(
        &mut self,
        request: &PipelineRequest,
        events: &[WireEvent],
        config_hash: Option<&str>,
    ) -> StorageResult<i64>;

    /// Gets a stored invocation by ID
    fn get_response(&self, id: i64) -> StorageResult<ResponseRecord>;

    /// Lists stored invocations, newest first
    fn list_responses(&self) -> StorageResult<Vec<ResponseRecord>>;
}
