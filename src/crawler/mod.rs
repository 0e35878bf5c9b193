//! Crawler module for same-domain site traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a per-request timeout and identifying user agent
//! - HTML text and link extraction
//! - The FIFO frontier and visited set
//! - The lazy, ordered page sequence that ties them together

mod extractor;
mod fetcher;
mod frontier;
mod traversal;

pub use extractor::{extract_text, ContentExtractor, ExtractedContent, ExtractorLimits};
pub use fetcher::{build_http_client, validate_fetch_url, Fetch, HttpFetcher};
pub use frontier::{CrawlTarget, Frontier};
pub use traversal::{CrawlLimits, Crawler, PageResult};
