//! Traversal engine - orchestrates one crawl run
//!
//! The engine combines the fetcher, the link normalizer, the frontier and the
//! stop-condition evaluator into the two traversal disciplines:
//! - Breadth-first: drain the lowest depth in bounded batches fetched concurrently
//! - Depth-first: one sequential fetch at a time, popped at random from the
//!   deepest pending depth, so a failed page falls back to its siblings
//!
//! Fetches run concurrently but never touch `RunState`. Every completion goes
//! through `Traversal::apply`, the single sequential step that records the page,
//! emits its event, enqueues its links and evaluates the stop conditions.

use crate::config::{validate_request, CrawlRequest, CrawlerConfig, SearchType};
use crate::crawler::evaluator::{evaluate, StopCheck, StopDecision};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::parser::{KeywordMatcher, PageDocument};
use crate::output::{CrawlEvent, PageVisitedEvent};
use crate::state::{PageRecord, RunState, RunStatus, StopReason};
use crate::url::validate_seed;
use crate::{FetchError, TrailError};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the event channel created by `spawn_crawl`
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub status: RunStatus,
    pub reason: StopReason,

    /// Visited pages in visit order
    pub pages: Vec<PageRecord>,
}

/// The traversal engine, generic over where pages come from
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    settings: CrawlerConfig,
    rng_seed: Option<u64>,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates an engine
    ///
    /// `settings` supplies the limit ceilings, the default page cap, the
    /// breadth-mode concurrency bound and the fetch timeout.
    pub fn new(fetcher: F, settings: CrawlerConfig) -> Self {
        Self {
            fetcher,
            settings,
            rng_seed: None,
        }
    }

    /// Fixes the seed of the depth-first random choice (for reproducible walks)
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn settings(&self) -> &CrawlerConfig {
        &self.settings
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Breadth-first run from `seed_url` down to `depth_limit`, using the configured page cap
    pub async fn run_breadth_first(
        &self,
        seed_url: &str,
        depth_limit: u32,
        keyword: Option<&str>,
        events: mpsc::Sender<CrawlEvent>,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome, TrailError> {
        let request = CrawlRequest::new(seed_url, SearchType::Breadth, depth_limit, &self.settings)
            .with_keyword(keyword);
        self.run(&request, events, cancel).await
    }

    /// Depth-first run from `seed_url` at most `step_limit` hops deep, using the configured page cap
    pub async fn run_depth_first(
        &self,
        seed_url: &str,
        step_limit: u32,
        keyword: Option<&str>,
        events: mpsc::Sender<CrawlEvent>,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome, TrailError> {
        let request = CrawlRequest::new(seed_url, SearchType::Depth, step_limit, &self.settings)
            .with_keyword(keyword);
        self.run(&request, events, cancel).await
    }

    /// Runs one crawl
    ///
    /// Events are pushed into `events` as pages are visited, followed by exactly
    /// one `CrawlEvent::Complete`. Dropping the receiving side cancels the run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run ended; see `status` and `reason`
    /// * `Err(TrailError::InvalidSeed)` - The seed is not an absolute http(s) URL
    /// * `Err(TrailError::Config)` - The request exceeds the configured ceilings
    pub async fn run(
        &self,
        request: &CrawlRequest,
        events: mpsc::Sender<CrawlEvent>,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome, TrailError> {
        validate_request(request, &self.settings)?;
        let keyword = match request.keyword.as_deref() {
            Some(keyword) => KeywordMatcher::new(keyword)?,
            None => None,
        };

        let mut state = RunState::new(request.limit);

        let seed_url = match validate_seed(&request.seed_url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!("Rejecting seed '{}': {}", request.seed_url, e);
                state.transition(RunStatus::Failed)?;
                // The caller may already be gone; the error below still reports the failure
                let _ = events
                    .send(CrawlEvent::Complete {
                        reason: StopReason::InvalidSeed,
                        pages_visited: 0,
                    })
                    .await;
                return Err(TrailError::InvalidSeed {
                    url: request.seed_url.clone(),
                    reason: e.to_string(),
                });
            }
        };

        state.start(&seed_url)?;
        tracing::info!(
            "Starting {} crawl of {} (limit {}, max {} pages, keyword {:?})",
            request.search_type,
            seed_url,
            request.limit,
            request.max_total_pages,
            keyword.as_ref().map(KeywordMatcher::keyword)
        );

        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut traversal = Traversal {
            fetcher: &self.fetcher,
            state,
            keyword,
            limit: request.limit,
            max_total_pages: request.max_total_pages,
            max_in_flight: self.settings.max_in_flight.max(1),
            events,
            cancel: cancel.child_token(),
            rng,
        };

        let start_time = Instant::now();
        let reason = match request.search_type {
            SearchType::Breadth => traversal.breadth_first().await,
            SearchType::Depth => traversal.depth_first().await,
        };
        let outcome = traversal.finish(reason).await?;

        tracing::info!(
            "Crawl {} ({}): {} pages in {:.2?}",
            outcome.status,
            outcome.reason,
            outcome.pages.len(),
            start_time.elapsed()
        );
        Ok(outcome)
    }
}

/// Per-run working set; lives for the duration of one `Crawler::run`
struct Traversal<'a, F: PageFetcher> {
    fetcher: &'a F,
    state: RunState,
    keyword: Option<KeywordMatcher>,
    limit: u32,
    max_total_pages: usize,
    max_in_flight: usize,
    events: mpsc::Sender<CrawlEvent>,
    cancel: CancellationToken,
    rng: StdRng,
}

impl<'a, F: PageFetcher> Traversal<'a, F> {
    fn is_cancelled(&self) -> bool {
        self.state.is_stopped() || self.cancel.is_cancelled() || self.events.is_closed()
    }

    /// Marks the run cancelled; nothing is applied after this
    fn stop_cancelled(&mut self) -> StopDecision {
        self.state.stop(StopReason::Cancelled);
        StopDecision::Stop(StopReason::Cancelled)
    }

    /// Builds the evaluator snapshot from the current state
    fn stop_check<'r>(&'r self, last_page: Option<&'r PageRecord>, in_flight: usize) -> StopCheck<'r> {
        StopCheck {
            last_page,
            pages_visited: self.state.pages().len(),
            frontier_exhausted: self.state.frontier().is_exhausted(),
            in_flight,
            links_beyond_limit: self.state.links_beyond_limit(),
            limit: self.limit,
            max_total_pages: self.max_total_pages,
            keyword_configured: self.keyword.is_some(),
        }
    }

    /// Decision when there is nothing left to pop
    fn drained(&self) -> StopReason {
        match evaluate(&self.stop_check(None, 0)) {
            StopDecision::Stop(reason) => reason,
            StopDecision::Continue => StopReason::Exhausted,
        }
    }

    async fn breadth_first(&mut self) -> StopReason {
        loop {
            if self.is_cancelled() {
                return StopReason::Cancelled;
            }

            let Some(depth) = self.state.frontier().lowest_pending_depth() else {
                return self.drained();
            };
            let pending = self.state.frontier().pending_at(depth);

            let remaining = self
                .max_total_pages
                .saturating_sub(self.state.pages().len());
            let batch = self
                .state
                .frontier_mut()
                .pop_breadth(self.max_in_flight.min(remaining));
            if batch.is_empty() {
                return self.drained();
            }

            tracing::debug!(
                "Fetching {} of {} pending pages at depth {}",
                batch.len(),
                pending,
                depth
            );

            let fetcher = self.fetcher;
            let mut in_flight: FuturesUnordered<_> = batch
                .into_iter()
                .map(|entry| {
                    let cancel = self.cancel.clone();
                    async move {
                        let result = fetcher.fetch(&entry.url, &cancel).await;
                        (entry, result)
                    }
                })
                .collect();

            while let Some((entry, result)) = in_flight.next().await {
                let still_running = in_flight.len();
                if let StopDecision::Stop(reason) = self.apply(entry, result, still_running).await {
                    // Dropping the remaining futures aborts their requests
                    return reason;
                }
            }
        }
    }

    async fn depth_first(&mut self) -> StopReason {
        let mut last_depth: Option<u32> = None;
        loop {
            if self.is_cancelled() {
                return StopReason::Cancelled;
            }

            let deepest = self.state.frontier().deepest_pending_depth();
            if let (Some(from), Some(to)) = (last_depth, deepest) {
                if to <= from {
                    tracing::debug!("Backtracking from depth {} to {}", from, to);
                }
            }

            let Some(entry) = self.state.frontier_mut().pop_depth_random(&mut self.rng) else {
                return self.drained();
            };

            last_depth = Some(entry.depth);
            let result = self.fetcher.fetch(&entry.url, &self.cancel).await;
            if let StopDecision::Stop(reason) = self.apply(entry, result, 0).await {
                return reason;
            }
        }
    }

    /// Applies one completed fetch to the run state
    ///
    /// Nothing is mutated once the run is cancelled, including while the
    /// event send waits for room in the channel. A failed fetch records
    /// nothing and contributes no links.
    async fn apply(
        &mut self,
        entry: FrontierEntry,
        result: Result<PageDocument, FetchError>,
        in_flight: usize,
    ) -> StopDecision {
        if self.is_cancelled() {
            return self.stop_cancelled();
        }

        let document = match result {
            Ok(document) => document,
            Err(e) if e.is_cancelled() => return self.stop_cancelled(),
            Err(e) => {
                tracing::warn!("Fetch failed at depth {}: {}", entry.depth, e);
                return evaluate(&self.stop_check(None, in_flight));
            }
        };

        let record = PageRecord {
            keyword_matched: self
                .keyword
                .as_ref()
                .is_some_and(|matcher| matcher.is_match(&document)),
            title: document.title().to_string(),
            url: entry.url,
            referrer_url: entry.referrer,
            depth: entry.depth,
        };

        let id = self.state.last_event_id() + 1;
        let event = CrawlEvent::PageVisited(PageVisitedEvent::from_record(id, &record));

        // A full channel must not hold an event past cancellation
        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.events.send(event) => Some(result.is_ok()),
        };
        match sent {
            None => return self.stop_cancelled(),
            Some(false) => {
                tracing::info!("Event sink closed, cancelling run");
                self.cancel.cancel();
                return self.stop_cancelled();
            }
            Some(true) => {}
        }
        self.state.record_page(record.clone());

        let links = document.extract_links(&record.url);
        let found = links.len();
        let summary = self.state.enqueue_links(&record.url, record.depth, links);
        tracing::debug!(
            "Visited {} (depth {}): {} links, {} new, {} seen, {} beyond limit",
            record.url,
            record.depth,
            found,
            summary.enqueued,
            summary.duplicates,
            summary.beyond_limit
        );

        evaluate(&self.stop_check(Some(&record), in_flight))
    }

    /// Moves the run to its terminal status and sends the completion event
    async fn finish(mut self, reason: StopReason) -> Result<CrawlOutcome, TrailError> {
        // A cancellation seen inside `apply` outranks the loop's reason
        self.state.stop(reason);
        let reason = self.state.stop_reason().unwrap_or(reason);
        let pages_visited = self.state.pages().len();
        let status = reason.terminal_status(pages_visited);
        self.state.transition(status)?;

        if self
            .events
            .send(CrawlEvent::Complete {
                reason,
                pages_visited,
            })
            .await
            .is_err()
        {
            tracing::debug!("Event sink closed before completion event");
        }

        Ok(CrawlOutcome {
            status,
            reason,
            pages: self.state.into_pages(),
        })
    }
}

/// A crawl running on its own task
pub struct CrawlHandle {
    events: mpsc::Receiver<CrawlEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Result<CrawlOutcome, TrailError>>,
}

/// Starts `request` on a new task and returns its handle
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_trail::config::{Config, CrawlRequest, SearchType};
/// use sumi_trail::crawler::{spawn_crawl, Crawler, HttpFetcher};
///
/// # async fn example() -> Result<(), sumi_trail::TrailError> {
/// let config = Config::default();
/// let crawler = Arc::new(Crawler::new(HttpFetcher::new(&config)?, config.crawler.clone()));
/// let request = CrawlRequest::new("https://example.com/", SearchType::Breadth, 2, &config.crawler);
///
/// let mut handle = spawn_crawl(crawler, request);
/// while let Some(event) = handle.next_event().await {
///     println!("{:?}", event);
/// }
/// let outcome = handle.join().await?;
/// # Ok(())
/// # }
/// ```
pub fn spawn_crawl<F>(crawler: Arc<Crawler<F>>, request: CrawlRequest) -> CrawlHandle
where
    F: PageFetcher + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move { crawler.run(&request, tx, token).await });

    CrawlHandle {
        events: rx,
        cancel,
        task,
    }
}

impl CrawlHandle {
    /// Next event of the run; `None` once the run has ended and all events were read
    pub async fn next_event(&mut self) -> Option<CrawlEvent> {
        self.events.recv().await
    }

    /// Requests cancellation; the run ends with `StopReason::Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the run's cancellation token
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to end, discarding any unread events
    pub async fn join(mut self) -> Result<CrawlOutcome, TrailError> {
        while self.events.recv().await.is_some() {}
        self.task.await?
    }
}
