//! Fetch engine: bounded-parallel page tasks with hop-count tracking
//!
//! Every visit request carries the [`Visitor`] for the page it targets, one
//! level deeper than the visitor that issued it. The engine holds no sender
//! of its own, so its request channel ends exactly when every queued request
//! and every running page task has dropped its visitor: that is the drain.

use crate::config::EngineConfig;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::{parse_page, PageEvent};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// The page an event belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub url: Url,

    /// Hops from the crawl root; the root is at depth 0
    pub depth: u32,
}

impl PageContext {
    /// Ledger and record key of the page
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

/// Receiver of everything the engine observes on fetched pages
///
/// `on_event` runs synchronously on the page's task, in document handler
/// order; `on_page_finished` runs once all of a page's events are delivered.
pub trait EventSink: Send + Sync + 'static {
    fn on_event(&self, page: &PageContext, event: PageEvent, visitor: &Visitor);

    fn on_page_finished(&self, page: &PageContext) -> impl Future<Output = ()> + Send;

    /// Called instead of any event when a fetch does not yield an HTML page
    fn on_fetch_failed(&self, _page: &PageContext, _result: &FetchResult) {}

    /// When true, pages not yet started are skipped
    fn is_closed(&self) -> bool {
        false
    }
}

/// A URL queued for fetching
#[derive(Debug)]
pub struct VisitRequest {
    pub url: Url,
    pub depth: u32,

    /// Visitor handed to the page's link handlers
    visitor: Visitor,
}

/// Handle used to schedule visits at one depth
#[derive(Debug, Clone)]
pub struct Visitor {
    tx: mpsc::UnboundedSender<VisitRequest>,
    depth: u32,
    max_depth: u32,
}

impl Visitor {
    /// Depth of the pages this visitor schedules
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Schedules a visit to `url`
    ///
    /// Returns false without scheduling anything when the visit would exceed
    /// the depth budget or the engine is gone.
    pub fn visit(&self, url: Url) -> bool {
        if self.depth > self.max_depth {
            tracing::trace!("Not visiting {}: depth {} > {}", url, self.depth, self.max_depth);
            return false;
        }

        let request = VisitRequest {
            url,
            depth: self.depth,
            visitor: self.descend(),
        };
        self.tx.send(request).is_ok()
    }

    fn descend(&self) -> Visitor {
        Visitor {
            tx: self.tx.clone(),
            depth: self.depth + 1,
            max_depth: self.max_depth,
        }
    }
}

/// Runs page tasks until all scheduled work has drained
pub struct Engine<S> {
    client: Client,
    sink: Arc<S>,
    semaphore: Arc<Semaphore>,
    politeness_delay: Duration,
    rx: mpsc::UnboundedReceiver<VisitRequest>,
}

impl<S: EventSink> Engine<S> {
    /// Creates an engine and the root visitor (depth 0)
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client shared by all page tasks
    /// * `sink` - Receiver of page events
    /// * `config` - Parallelism ceiling and politeness delay
    /// * `max_depth` - Deepest hop count that may still be visited
    ///
    /// # Returns
    ///
    /// The engine plus the visitor for scheduling the root. The engine only
    /// drains once that visitor, and every clone of it, is dropped.
    pub fn new(
        client: Client,
        sink: Arc<S>,
        config: &EngineConfig,
        max_depth: u32,
    ) -> (Self, Visitor) {
        let (tx, rx) = mpsc::unbounded_channel();

        let engine = Self {
            client,
            sink,
            semaphore: Arc::new(Semaphore::new(config.parallelism)),
            politeness_delay: config.politeness_delay(),
            rx,
        };

        let root = Visitor {
            tx,
            depth: 0,
            max_depth,
        };

        (engine, root)
    }

    /// Processes visit requests until the request channel drains
    ///
    /// Returns the sink so the caller decides when it is dropped.
    pub async fn run(mut self) -> Arc<S> {
        let mut workers = JoinSet::new();
        let mut scheduled = 0usize;

        loop {
            tokio::select! {
                request = self.rx.recv() => match request {
                    Some(request) => {
                        scheduled += 1;
                        workers.spawn(process_page(
                            self.client.clone(),
                            Arc::clone(&self.sink),
                            Arc::clone(&self.semaphore),
                            self.politeness_delay,
                            request,
                        ));
                    }
                    None => break,
                },
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    log_join(joined);
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            log_join(joined);
        }

        tracing::debug!("Fetch engine drained after {} visits", scheduled);
        self.sink
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::warn!("Page task failed: {}", e);
    }
}

/// Fetches one page and delivers its events
///
/// The parallelism slot is held through the politeness delay.
async fn process_page<S: EventSink>(
    client: Client,
    sink: Arc<S>,
    semaphore: Arc<Semaphore>,
    politeness_delay: Duration,
    request: VisitRequest,
) {
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return;
    };

    let VisitRequest {
        url,
        depth,
        visitor,
    } = request;

    if sink.is_closed() {
        tracing::debug!("Skipping {}: crawl cancelled", url);
        return;
    }

    let page = PageContext { url, depth };
    tracing::debug!("Fetching {} (depth {})", page.url, page.depth);

    let result = fetch_url(&client, page.key()).await;

    match &result {
        FetchResult::Success { body, .. } => {
            for event in parse_page(body) {
                sink.on_event(&page, event, &visitor);
            }
            sink.on_page_finished(&page).await;
        }
        _ => sink.on_fetch_failed(&page, &result),
    }

    tokio::time::sleep(politeness_delay).await;
}
