use crate::output::CrawlStatistics;
use crate::state::{lock_state, CrawlPhase, PageRecord, SharedState};
use tokio::sync::mpsc;

/// Consumer end of a running crawl
///
/// Yields completed page records in completion order and ends once the crawl
/// has drained. At most one record waits for hand-off, so a slow consumer
/// slows the crawl down. Dropping the stream cancels the crawl: pages not
/// yet started are skipped and no further links are admitted.
#[derive(Debug)]
pub struct PageStream {
    rx: mpsc::Receiver<PageRecord>,
    state: SharedState,
    domain: String,
}

impl PageStream {
    pub(crate) fn new(rx: mpsc::Receiver<PageRecord>, state: SharedState, domain: String) -> Self {
        Self { rx, state, domain }
    }

    /// Waits for the next completed record; `None` once the crawl is over
    pub async fn next(&mut self) -> Option<PageRecord> {
        self.rx.recv().await
    }

    /// Drains the stream into a vector
    pub async fn collect(mut self) -> Vec<PageRecord> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record);
        }
        records
    }

    /// The normalized domain being crawled
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn phase(&self) -> CrawlPhase {
        lock_state(&self.state).phase()
    }

    /// Snapshot of the crawl counters
    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics::from_state(&self.domain, &lock_state(&self.state))
    }
}
