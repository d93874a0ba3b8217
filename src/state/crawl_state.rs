use crate::crawler::Rejection;
use crate::state::{CrawlPhase, PageField, PageRecord};
use crate::{CrawlError, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// State shared between the frontier, the sink and the stream
pub type SharedState = Arc<Mutex<CrawlState>>;

/// Creates an empty shared state in the `Idle` phase
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(CrawlState::new()))
}

/// Locks the shared state
///
/// Handlers never leave the state half-updated across a panic point, so a
/// poisoned lock still guards consistent data and is recovered.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, CrawlState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running totals for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    /// Links (root included) reserved in the ledger
    pub admitted: u64,

    /// Rejected link candidates by reason
    pub rejected: BTreeMap<Rejection, u64>,

    /// Admitted links the fetch engine refused for exceeding the depth budget
    pub beyond_depth: u64,

    /// Pages fetched with an HTML response
    pub fetched: u64,

    /// Pages whose fetch failed or returned a non-HTML/error response
    pub fetch_failures: u64,

    /// Records pushed onto the output stream
    pub emitted: u64,

    /// Finished pages dropped because their body was empty
    pub without_body: u64,
}

impl CrawlCounters {
    pub fn record_rejection(&mut self, reason: Rejection) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Visitation ledger, page records and run bookkeeping
///
/// Link admission and record reservation are the same act, so the ledger
/// and the record map live behind one lock.
#[derive(Debug, Default)]
pub struct CrawlState {
    ledger: HashSet<String>,
    records: HashMap<String, PageRecord>,
    reserved: usize,
    phase: CrawlPhase,
    cancelled: bool,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    pub counters: CrawlCounters,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` is already in the ledger
    pub fn is_reserved(&self, key: &str) -> bool {
        self.ledger.contains(key)
    }

    /// Inserts `url` into the ledger with an empty placeholder record
    ///
    /// Returns false, changing nothing, if the URL was already reserved.
    pub fn reserve(&mut self, url: &Url) -> bool {
        let key = url.as_str();
        if !self.ledger.insert(key.to_string()) {
            return false;
        }

        self.records.entry(key.to_string()).or_default();
        self.reserved += 1;
        self.counters.admitted += 1;
        true
    }

    /// Number of pages reserved so far, root included
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn record(&self, key: &str) -> Option<&PageRecord> {
        self.records.get(key)
    }

    /// Merges one field into the record for `key`, creating it if needed
    pub fn apply(&mut self, key: &str, field: PageField) {
        self.records.entry(key.to_string()).or_default().apply(field);
    }

    /// Returns a copy of the record for `key`, URL stamped, if it is complete
    ///
    /// Updates the emitted / without-body counters accordingly.
    pub fn completed_record(&mut self, key: &str) -> Option<PageRecord> {
        match self.records.get(key) {
            Some(record) if record.is_complete() => {
                let mut record = record.clone();
                record.url = key.to_string();
                self.counters.emitted += 1;
                Some(record)
            }
            _ => {
                self.counters.without_body += 1;
                None
            }
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves the run to `to`, stamping start and finish times
    pub fn transition(&mut self, to: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        match to {
            CrawlPhase::Validating => self.started_at = Some(Utc::now()),
            CrawlPhase::Closed => self.finished_at = Some(Utc::now()),
            _ => {}
        }

        self.phase = to;
        Ok(())
    }

    /// Marks the run as abandoned by its consumer
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}
