//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ResponseStore trait.

use crate::pipeline::PipelineRequest;
use crate::progress::WireEvent;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResponseStore, StorageError, StorageResult};
use crate::storage::{ResponseRecord, ResponseStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SELECT_COLUMNS: &str =
    "SELECT id, request_body, response_body, status, config_hash, created_at FROM responses";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Raw column values of one `responses` row
struct ResponseRow {
    id: i64,
    request_body: String,
    response_body: String,
    status: String,
    config_hash: Option<String>,
    created_at: String,
}

impl ResponseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            request_body: row.get(1)?,
            response_body: row.get(2)?,
            status: row.get(3)?,
            config_hash: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_record(self) -> StorageResult<ResponseRecord> {
        let request: PipelineRequest = serde_json::from_str(&self.request_body)
            .map_err(|e| StorageError::Serialization(format!("request {}: {}", self.id, e)))?;
        let events: Vec<WireEvent> = serde_json::from_str(&self.response_body)
            .map_err(|e| StorageError::Serialization(format!("response {}: {}", self.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StorageError::Serialization(format!("created_at {}: {}", self.id, e)))?
            .with_timezone(&Utc);

        Ok(ResponseRecord {
            id: self.id,
            request,
            status: ResponseStatus::from_db_string(&self.status)
                .unwrap_or_else(|| ResponseStatus::from_events(&events)),
            events,
            config_hash: self.config_hash,
            created_at,
        })
    }
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ResponseStore for SqliteStorage {
    fn save_response(
        &mut self,
        request: &PipelineRequest,
        events: &[WireEvent],
        config_hash: Option<&str>,
    ) -> StorageResult<i64> {
        let request_body = serde_json::to_string(request)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let response_body = serde_json::to_string(events)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let status = ResponseStatus::from_events(events);
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO responses (request_body, response_body, status, config_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request_body,
                response_body,
                status.to_db_string(),
                config_hash,
                now
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Saved response {} with {} events", id, events.len());
        Ok(id)
    }

    fn get_response(&self, id: i64) -> StorageResult<ResponseRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;

        let row = stmt
            .query_row(params![id], ResponseRow::from_row)
            .optional()?
            .ok_or(StorageError::ResponseNotFound(id))?;

        row.into_record()
    }

    fn list_responses(&self) -> StorageResult<Vec<ResponseRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id DESC", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], ResponseRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ResponseRow::into_record).collect()
    }
}
