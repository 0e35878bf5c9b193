//! Cross-page record deduplication

use super::PipelineReport;
use crate::crawler::PageResult;
use crate::oracle::CompanyRecord;
use std::collections::HashSet;

/// Normalized identity of a company record
///
/// Name and address are lowercased and their whitespace collapsed, so
/// `"ACME  Corp"` at `"123 main st"` and `"Acme Corp"` at `"123 Main St"` are
/// the same company.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    company_name: String,
    address: String,
}

impl DedupKey {
    /// Builds the key for a record
    ///
    /// Returns `None` if the name or address normalizes to nothing.
    pub fn of(record: &CompanyRecord) -> Option<Self> {
        let company_name = normalize_part(&record.company_name);
        let address = normalize_part(&record.address);

        if company_name.is_empty() || address.is_empty() {
            return None;
        }

        Some(Self {
            company_name,
            address,
        })
    }
}

fn normalize_part(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Insertion-ordered, first-seen-wins record set
#[derive(Debug, Default)]
pub struct RecordAggregator {
    seen: HashSet<DedupKey>,
    companies: Vec<CompanyRecord>,
    pages_crawled: u32,
}

impl RecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one page and its extracted records into the set
    ///
    /// The page always counts toward `pages_crawled`. Records from a failed
    /// page are ignored, as are records whose key is already present.
    ///
    /// # Returns
    ///
    /// The number of records that were new
    pub fn ingest(&mut self, page: &PageResult, records: Vec<CompanyRecord>) -> usize {
        self.pages_crawled += 1;

        if !page.is_ok() {
            return 0;
        }

        let mut added = 0;
        for record in records {
            let Some(key) = DedupKey::of(&record) else {
                continue;
            };

            if self.seen.insert(key) {
                self.companies.push(record);
                added += 1;
            }
        }
        added
    }

    /// Number of distinct companies so far
    pub fn companies_found(&self) -> usize {
        self.companies.len()
    }

    /// Number of pages ingested so far
    pub fn pages_crawled(&self) -> u32 {
        self.pages_crawled
    }

    /// Produces the final report
    pub fn finish(self, start_url: impl Into<String>, max_depth: u32) -> PipelineReport {
        PipelineReport {
            start_url: start_url.into(),
            pages_crawled: self.pages_crawled,
            companies_found: self.companies.len(),
            max_depth,
            companies: self.companies,
        }
    }
}

/// Aggregates a whole sequence of pages and their records into a report
pub fn aggregate<I>(start_url: impl Into<String>, max_depth: u32, pages: I) -> PipelineReport
where
    I: IntoIterator<Item = (PageResult, Vec<CompanyRecord>)>,
{
    let mut aggregator = RecordAggregator::new();
    for (page, records) in pages {
        aggregator.ingest(&page, records);
    }
    aggregator.finish(start_url, max_depth)
}
