//! Pipeline driver
//!
//! One invocation walks the site page by page. Each visited page is reported,
//! its text goes through the oracle, and the records are folded into the
//! aggregator before the next page is fetched. Nothing runs in parallel within
//! an invocation, and nothing is shared between invocations.

use super::{PipelineReport, PipelineRequest, RecordAggregator};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::{
    ContentExtractor, CrawlLimits, Crawler, ExtractorLimits, Fetch, HttpFetcher, PageResult,
};
use crate::oracle::{AnthropicOracle, CompanyRecord, ExtractionOracle};
use crate::progress::{ChannelSink, ProgressEvent, ProgressReporter, ProgressSink};
use crate::url::DomainScope;
use crate::{PipelineError, ScoutError};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Knobs that shape a crawl but are not part of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSettings {
    pub extractor: ExtractorLimits,
    pub treat_www_as_same_domain: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            extractor: ExtractorLimits {
                max_text_chars: config.max_text_chars,
                max_links: config.max_links_per_page,
            },
            treat_www_as_same_domain: config.treat_www_as_same_domain,
        }
    }
}

/// A running invocation started with `Pipeline::spawn`
pub struct PipelineHandle {
    /// Progress events in emission order; closes after the terminal event
    pub events: UnboundedReceiver<ProgressEvent>,

    /// Resolves to the invocation's result
    pub join: JoinHandle<Result<PipelineReport, PipelineError>>,
}

impl PipelineHandle {
    /// Waits for the invocation to finish, discarding any unread events
    pub async fn finish(self) -> Result<PipelineReport, PipelineError> {
        drop(self.events);
        self.join
            .await
            .map_err(|e| PipelineError::Internal(format!("pipeline task failed: {}", e)))?
    }
}

/// Crawl-and-extract pipeline
///
/// Holds only the collaborators; all per-run state lives inside `run`, so a
/// single `Pipeline` can serve any number of concurrent invocations.
pub struct Pipeline {
    fetcher: Arc<dyn Fetch>,
    oracle: Arc<dyn ExtractionOracle>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Creates a pipeline with default extractor limits
    pub fn new(fetcher: Arc<dyn Fetch>, oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self {
            fetcher,
            oracle,
            settings: PipelineSettings::default(),
        }
    }

    /// Replaces the crawl settings
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the HTTP fetcher and Anthropic oracle described by the config
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(ScoutError)` - HTTP client could not be built or the API key is missing
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher)?;
        let oracle = AnthropicOracle::from_config(&config.oracle)?;

        tracing::debug!("Using oracle model {}", oracle.model());

        Ok(Self::new(Arc::new(fetcher), Arc::new(oracle))
            .with_settings(PipelineSettings::from_config(&config.crawler)))
    }

    /// Runs one invocation to completion
    ///
    /// Events go to `sink` in strict causal order and end with exactly one
    /// terminal event: `Complete` when a report is returned, `Error` otherwise.
    /// A rejected request produces only the `Error` event.
    ///
    /// # Arguments
    ///
    /// * `request` - Seed URL and budgets
    /// * `sink` - Receiver of progress events
    /// * `cancel` - Observed between pages and while waiting on the network
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineReport)` - The crawl finished; page-local failures are inside
    /// * `Err(PipelineError)` - Validation failure, cancellation, or internal fault
    pub async fn run<S: ProgressSink>(
        &self,
        request: &PipelineRequest,
        sink: S,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let mut reporter = ProgressReporter::new(sink);

        let outcome = match request.validate() {
            Ok(seed) => self.crawl_and_extract(seed, request, &mut reporter, cancel).await,
            Err(e) => {
                tracing::warn!("Rejected request for '{}': {}", request.start_url, e);
                Err(PipelineError::from(e))
            }
        };

        match outcome {
            Ok(report) => {
                tracing::info!(
                    "Pipeline complete for {}: {} pages crawled, {} companies found",
                    report.start_url,
                    report.pages_crawled,
                    report.companies_found
                );
                reporter.emit(ProgressEvent::Complete {
                    report: report.clone(),
                });
                Ok(report)
            }
            Err(e) => {
                if matches!(e, PipelineError::Internal(_)) {
                    tracing::error!("Pipeline failed for '{}': {}", request.start_url, e);
                }
                reporter.emit(ProgressEvent::Error {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Starts an invocation on its own task
    ///
    /// The returned handle's receiver yields the events as they happen and
    /// closes once the terminal event has been sent.
    pub fn spawn(self: Arc<Self>, request: PipelineRequest, cancel: CancellationToken) -> PipelineHandle {
        let (sender, events) = mpsc::unbounded_channel();

        let join = tokio::spawn(async move {
            self.run(&request, ChannelSink::new(sender), &cancel).await
        });

        PipelineHandle { events, join }
    }

    async fn crawl_and_extract<S: ProgressSink>(
        &self,
        seed: Url,
        request: &PipelineRequest,
        reporter: &mut ProgressReporter<S>,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let scope = DomainScope::for_seed(&seed, self.settings.treat_www_as_same_domain)
            .map_err(|e| PipelineError::Internal(format!("cannot scope {}: {}", seed, e)))?;
        let extractor = ContentExtractor::new(scope, self.settings.extractor);
        let limits = CrawlLimits {
            max_depth: request.max_depth,
            max_pages: request.max_pages,
        };

        let start_url = seed.to_string();
        let mut crawler = Crawler::new(self.fetcher.as_ref(), seed, limits, extractor);
        let mut aggregator = RecordAggregator::new();

        tracing::info!(
            "Starting scrape of {} with max_depth={} max_pages={}",
            start_url,
            request.max_depth,
            request.max_pages
        );
        reporter.emit(ProgressEvent::Started {
            start_url: start_url.clone(),
            max_depth: request.max_depth,
            max_pages: request.max_pages,
        });

        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                page = crawler.next_page() => page,
            };

            let Some(page) = next else {
                break;
            };

            let index = crawler.pages_crawled();
            reporter.emit(ProgressEvent::PageFetched {
                index,
                url: page.url.to_string(),
                depth: page.depth,
                error: page.error.clone(),
            });

            let records = self.extract_page(&page, index, reporter, cancel).await?;
            let analyzed = records.is_some();
            let records = records.unwrap_or_default();
            let page_companies = records.len();
            aggregator.ingest(&page, records);

            if analyzed {
                reporter.emit(ProgressEvent::ExtractionProgress {
                    index,
                    url: page.url.to_string(),
                    page_companies,
                    companies_so_far: aggregator.companies_found(),
                });
            }
        }

        Ok(aggregator.finish(start_url, request.max_depth))
    }

    /// Runs the oracle over one page
    ///
    /// Returns `Ok(None)` when the page was not sent to the oracle (failed
    /// fetch or no text) and `Ok(Some(records))` otherwise, with oracle
    /// failures absorbed as zero records.
    async fn extract_page<S: ProgressSink>(
        &self,
        page: &PageResult,
        index: u32,
        reporter: &mut ProgressReporter<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<CompanyRecord>>, PipelineError> {
        if !page.is_ok() {
            return Ok(None);
        }

        if page.text.trim().is_empty() {
            tracing::debug!("No text on {}, skipping extraction", page.url);
            return Ok(None);
        }

        reporter.emit(ProgressEvent::Message {
            text: format!("Analyzing page {}...", index),
        });

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = self.oracle.extract(&page.text, page.url.as_str()) => result,
        };

        match result {
            Ok(records) => Ok(Some(records)),
            Err(e) => {
                tracing::warn!("Extraction failed for {}: {}", page.url, e);
                Ok(Some(Vec::new()))
            }
        }
    }
}
