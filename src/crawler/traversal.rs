//! Breadth-first traversal of one site
//!
//! `Crawler` is a pull-based, finite sequence of `PageResult`s: every call to
//! `next_page` visits exactly one page (fetch, extract, enqueue links) and
//! nothing happens between calls. A crawler cannot be restarted; build a new
//! one for a new run.

use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::Fetch;
use crate::crawler::frontier::{CrawlTarget, Frontier};
use crate::FetchError;
use futures::stream::{self, Stream};
use url::Url;

/// Hard ceilings for one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Deepest level whose pages are fetched (seed = 0)
    pub max_depth: u32,

    /// Most pages fetched, failed pages included
    pub max_pages: u32,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 20,
        }
    }
}

/// Outcome of visiting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Normalized URL that was requested
    pub url: Url,

    /// Link hops from the seed
    pub depth: u32,

    /// Cleaned visible text; empty when the fetch failed
    pub text: String,

    /// Same-domain links discovered on the page, in document order
    pub links: Vec<Url>,

    /// Why the page could not be fetched, if it could not
    pub error: Option<FetchError>,
}

impl PageResult {
    fn failed(target: CrawlTarget, error: FetchError) -> Self {
        Self {
            url: target.url,
            depth: target.depth,
            text: String::new(),
            links: Vec::new(),
            error: Some(error),
        }
    }

    /// Returns true if the page was fetched successfully
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Sequential same-domain crawler
pub struct Crawler<'a> {
    fetcher: &'a dyn Fetch,
    extractor: ContentExtractor,
    frontier: Frontier,
    limits: CrawlLimits,
    pages_crawled: u32,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler whose frontier holds only the seed
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of page HTML
    /// * `seed` - Normalized absolute seed URL
    /// * `limits` - Depth and page ceilings
    /// * `extractor` - Text/link extractor scoped to the seed's site
    pub fn new(
        fetcher: &'a dyn Fetch,
        seed: Url,
        limits: CrawlLimits,
        extractor: ContentExtractor,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            frontier: Frontier::with_seed(seed),
            limits,
            pages_crawled: 0,
        }
    }

    /// Number of pages visited so far, failed ones included
    pub fn pages_crawled(&self) -> u32 {
        self.pages_crawled
    }

    /// Number of targets still waiting in the frontier
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    /// Visits the next page
    ///
    /// Returns `None` once the page budget is spent or the frontier is empty.
    /// Fetch failures are returned as a `PageResult` with `error` set; they
    /// never end the sequence.
    pub async fn next_page(&mut self) -> Option<PageResult> {
        if self.pages_crawled >= self.limits.max_pages {
            if !self.frontier.is_empty() {
                tracing::debug!(
                    "Page budget of {} reached, discarding {} queued URLs",
                    self.limits.max_pages,
                    self.frontier.len()
                );
                self.frontier.discard_pending();
            }
            return None;
        }

        let target = self.frontier.next_target()?;
        self.pages_crawled += 1;

        tracing::info!("Crawling {} at depth {}", target.url, target.depth);

        let html = match self.fetcher.fetch(target.url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", target.url, e);
                return Some(PageResult::failed(target, e));
            }
        };

        let content = self.extractor.extract(&html, &target.url);

        let child_depth = target.depth + 1;
        if child_depth <= self.limits.max_depth {
            for link in &content.links {
                if self.frontier.offer(link.clone(), child_depth) {
                    tracing::debug!("Queued {} at depth {}", link, child_depth);
                }
            }
        }

        Some(PageResult {
            url: target.url,
            depth: target.depth,
            text: content.text,
            links: content.links,
            error: None,
        })
    }

    /// Turns the crawler into a `Stream` of pages
    pub fn into_stream(self) -> impl Stream<Item = PageResult> + 'a {
        stream::unfold(self, |mut crawler| async move {
            let page = crawler.next_page().await?;
            Some((page, crawler))
        })
    }
}
