//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the fetch engine to the link frontier and the
//! extraction sink, and owns the run lifecycle:
//! - Validating and preflighting the configuration
//! - Reserving and scheduling the root page
//! - Admitting discovered links under the shared lock
//! - Pushing completed records onto the output stream
//! - Closing the stream once the engine has drained

use crate::config::{normalize_and_validate, validate_engine_config, CrawlConfig, EngineConfig};
use crate::crawler::engine::{Engine, EventSink, PageContext, Visitor};
use crate::crawler::fetcher::{build_http_client, preflight, FetchResult};
use crate::crawler::frontier::{Admission, LinkFrontier};
use crate::crawler::parser::{LinkCandidate, PageEvent};
use crate::crawler::sink::ExtractionSink;
use crate::crawler::stream::PageStream;
use crate::sanitize::Sanitizer;
use crate::state::{
    lock_state, new_shared_state, CrawlCounters, CrawlPhase, PageRecord, SharedState,
};
use crate::url::LinkScope;
use crate::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Records awaiting hand-off to the consumer
const OUTPUT_CAPACITY: usize = 1;

/// Event handlers for one crawl run
///
/// Dropping the session drops the only sender of the output stream, which
/// ends the stream for the consumer.
struct CrawlSession {
    state: SharedState,
    frontier: LinkFrontier,
    sink: ExtractionSink,
    output: mpsc::Sender<PageRecord>,
}

impl CrawlSession {
    /// Admits a discovered link and schedules it while the lock is held
    fn follow(&self, link: &LinkCandidate, visitor: &Visitor) {
        let mut state = lock_state(&self.state);

        if let Admission::Admitted(url) = self.frontier.admit(&mut state, link, Instant::now()) {
            if !visitor.visit(url) {
                state.counters.beyond_depth += 1;
            }
        }
    }

    /// Reserves the root and schedules it at depth 0
    fn seed(&self, root: &Visitor) -> bool {
        let mut state = lock_state(&self.state);

        match self.frontier.admit_seed(&mut state, Instant::now()) {
            Admission::Admitted(url) => {
                tracing::debug!("Seeding crawl with {}", url);
                root.visit(url)
            }
            Admission::Rejected(reason) => {
                tracing::warn!("Crawl root rejected: {}", reason);
                false
            }
        }
    }

    fn count(&self, update: impl FnOnce(&mut CrawlCounters)) {
        update(&mut lock_state(&self.state).counters);
    }
}

impl EventSink for CrawlSession {
    fn on_event(&self, page: &PageContext, event: PageEvent, visitor: &Visitor) {
        let key = page.key();

        match event {
            PageEvent::BodyFound(raw) => self.sink.on_body(&self.state, key, &raw),
            PageEvent::TitleFound(title) => self.sink.on_title(&self.state, key, title),
            PageEvent::MetaFound { kind, content } => {
                self.sink.on_meta(&self.state, key, kind, content)
            }
            PageEvent::LinkFound(link) => self.follow(&link, visitor),
        }
    }

    async fn on_page_finished(&self, page: &PageContext) {
        self.count(|counters| counters.fetched += 1);

        let Some(record) = self.sink.take_completed(&self.state, page.key()) else {
            tracing::debug!("Dropping {}: empty body", page.url);
            return;
        };

        tracing::debug!("Emitting {}", record.url);

        // Waits here until the consumer takes the previous record
        if self.output.send(record).await.is_err() {
            let mut state = lock_state(&self.state);
            if !state.is_cancelled() {
                tracing::warn!("Output stream dropped by consumer, cancelling crawl");
            }
            state.cancel();
            state.counters.emitted = state.counters.emitted.saturating_sub(1);
        }
    }

    fn on_fetch_failed(&self, page: &PageContext, result: &FetchResult) {
        tracing::debug!("Fetch of {} failed: {:?}", page.url, result);
        self.count(|counters| counters.fetch_failures += 1);
    }

    fn is_closed(&self) -> bool {
        self.output.is_closed() || lock_state(&self.state).is_cancelled()
    }
}

/// Crawls one domain and streams its page records
///
/// # Example
///
/// ```no_run
/// use feedcast_crawler::{CrawlConfig, Crawler};
///
/// # async fn example() -> feedcast_crawler::Result<()> {
/// let mut stream = Crawler::new(CrawlConfig::for_domain("example.com")).run().await?;
/// while let Some(page) = stream.next().await {
///     println!("{}: {}", page.url, page.title);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    config: CrawlConfig,
    engine: EngineConfig,
    state: SharedState,
}

impl Crawler {
    /// Creates a crawler with the default engine settings
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            engine: EngineConfig::default(),
            state: new_shared_state(),
        }
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn phase(&self) -> CrawlPhase {
        lock_state(&self.state).phase()
    }

    /// Starts the crawl and returns its output stream
    ///
    /// Validation and the preflight request happen before this returns; any
    /// failure there is returned as an error and no stream is produced. The
    /// crawl itself runs on a spawned task, so this must be called within a
    /// Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(PageStream)` - The crawl is running
    /// * `Err(CrawlError)` - Invalid configuration or unreachable domain
    pub async fn run(self) -> Result<PageStream> {
        let Self {
            mut config,
            engine: engine_config,
            state,
        } = self;

        lock_state(&state).transition(CrawlPhase::Validating)?;

        let (client, sanitizer) = match prepare(&mut config, &engine_config).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::info!("Crawl of {:?} rejected: {}", config.domain, e);
                lock_state(&state).transition(CrawlPhase::Closed)?;
                return Err(e);
            }
        };

        tracing::info!(
            "Starting crawl of {} (max_pages={}, max_duration={}s, max_depth={})",
            config.domain,
            config.max_pages,
            config.max_duration,
            config.max_depth
        );

        let deadline = Instant::now() + config.max_duration();
        let scope = LinkScope::new(config.scheme, &config.domain);
        let (tx, rx) = mpsc::channel(OUTPUT_CAPACITY);

        let session = Arc::new(CrawlSession {
            state: Arc::clone(&state),
            frontier: LinkFrontier::new(scope, &config, deadline),
            sink: ExtractionSink::new(sanitizer),
            output: tx,
        });

        let (engine, root) = Engine::new(
            client,
            Arc::clone(&session),
            &engine_config,
            u32::from(config.max_depth),
        );

        session.seed(&root);
        drop(root);
        drop(session);

        lock_state(&state).transition(CrawlPhase::Running)?;

        let task_state = Arc::clone(&state);
        let domain = config.domain.clone();
        tokio::spawn(async move {
            let session = engine.run().await;
            finish(&task_state, &domain);
            drop(session);
        });

        Ok(PageStream::new(rx, state, config.domain))
    }
}

/// Normalizes and validates the configuration, then checks the root answers
async fn prepare(
    config: &mut CrawlConfig,
    engine: &EngineConfig,
) -> Result<(Client, Sanitizer)> {
    normalize_and_validate(config)?;
    validate_engine_config(engine)?;

    let client = build_http_client(engine)?;
    preflight(&client, &config.domain, &config.root_url()).await?;

    Ok((client, Sanitizer::new()?))
}

/// Moves a drained run to `Closed` and logs its outcome
fn finish(state: &SharedState, domain: &str) {
    let mut state = lock_state(state);

    for phase in [CrawlPhase::Draining, CrawlPhase::Closed] {
        if let Err(e) = state.transition(phase) {
            tracing::warn!("{}", e);
        }
    }

    let counters = &state.counters;
    tracing::info!(
        "Crawl of {} finished: {} pages reserved, {} fetched, {} emitted, {} links rejected{}",
        domain,
        counters.admitted,
        counters.fetched,
        counters.emitted,
        counters.total_rejected(),
        if state.is_cancelled() { " (cancelled)" } else { "" }
    );
}

/// Runs a crawl with the default engine settings
///
/// This is the main entry point for starting a crawl.
///
/// # Arguments
///
/// * `config` - What to crawl and the crawl budgets
///
/// # Returns
///
/// * `Ok(PageStream)` - Stream of completed page records
/// * `Err(CrawlError)` - Crawl could not start
pub async fn crawl(config: CrawlConfig) -> Result<PageStream> {
    Crawler::new(config).run().await
}
