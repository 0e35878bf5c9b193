//! Integration tests for SiteScout
//!
//! These tests use wiremock to stand in for target websites and the oracle
//! endpoint, and drive the real HTTP fetcher, crawler and pipeline end-to-end.

mod crawl_tests;
mod pipeline_tests;
