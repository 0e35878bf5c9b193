//! Extraction oracle boundary
//!
//! The oracle turns page text into structured company records. The pipeline
//! treats it as a fallible black box with no retained state: any failure is
//! absorbed as "zero records for this page".

mod anthropic;
mod parse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use anthropic::AnthropicOracle;
pub use parse::{extract_json_payload, parse_company_records};

/// A company and its physical address, attributed to the page it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    pub address: String,
    pub source_url: String,
}

impl CompanyRecord {
    /// Creates a record, trimming the name and address
    ///
    /// Returns `None` if either the name or the address is blank.
    pub fn new(
        company_name: impl AsRef<str>,
        address: impl AsRef<str>,
        source_url: impl Into<String>,
    ) -> Option<Self> {
        let company_name = company_name.as_ref().trim();
        let address = address.as_ref().trim();

        if company_name.is_empty() || address.is_empty() {
            return None;
        }

        Some(Self {
            company_name: company_name.to_string(),
            address: address.to_string(),
            source_url: source_url.into(),
        })
    }
}

/// Extraction call failures
///
/// All of these are page-local: the pipeline logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed oracle response: {0}")]
    Malformed(String),
}

/// Converts page text into company records
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Extracts records from one page's text
    ///
    /// # Arguments
    ///
    /// * `text` - Cleaned, already truncated page text
    /// * `source_url` - Page the text came from; copied into every record
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CompanyRecord>)` - Records in oracle order, possibly empty
    /// * `Err(OracleError)` - The call failed or its answer could not be read
    async fn extract(
        &self,
        text: &str,
        source_url: &str,
    ) -> Result<Vec<CompanyRecord>, OracleError>;
}
