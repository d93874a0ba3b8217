//! Statistics snapshot of a crawl run
//!
//! This module turns the shared crawl counters into a plain value for
//! display and reporting.

use crate::crawler::Rejection;
use crate::state::{CrawlPhase, CrawlState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// The crawled domain
    pub domain: String,

    /// Phase of the run when the snapshot was taken
    pub phase: CrawlPhase,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages reserved in the ledger, root included
    pub pages_reserved: u64,

    /// Rejected link candidates by reason
    pub rejected: BTreeMap<Rejection, u64>,

    /// Reserved pages the fetch engine refused for depth
    pub beyond_depth: u64,

    /// Pages fetched with an HTML response
    pub pages_fetched: u64,

    /// Fetches that failed or were not HTML
    pub fetch_failures: u64,

    /// Records delivered on the output stream
    pub records_emitted: u64,

    /// Finished pages dropped for an empty body
    pub records_without_body: u64,
}

impl CrawlStatistics {
    /// Takes a snapshot of `state`
    pub fn from_state(domain: &str, state: &CrawlState) -> Self {
        let counters = &state.counters;

        Self {
            domain: domain.to_string(),
            phase: state.phase(),
            started_at: state.started_at(),
            finished_at: state.finished_at(),
            pages_reserved: counters.admitted,
            rejected: counters.rejected.clone(),
            beyond_depth: counters.beyond_depth,
            pages_fetched: counters.fetched,
            fetch_failures: counters.fetch_failures,
            records_emitted: counters.emitted,
            records_without_body: counters.without_body,
        }
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }

    /// Wall-clock run time in seconds, once the run has finished
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => {
                Some((finished - started).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }

    /// Share of fetched pages that produced a record, in percent
    pub fn emission_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            0.0
        } else {
            (self.records_emitted as f64 / self.pages_fetched as f64) * 100.0
        }
    }
}

/// Writes statistics in a formatted manner
///
/// # Arguments
///
/// * `writer` - Destination of the report
/// * `stats` - The statistics to display
pub fn write_statistics<W: Write>(writer: &mut W, stats: &CrawlStatistics) -> io::Result<()> {
    writeln!(writer, "=== Crawl Statistics: {} ===\n", stats.domain)?;

    writeln!(writer, "Overview:")?;
    writeln!(writer, "  Phase: {}", stats.phase)?;
    if let Some(duration) = stats.duration_seconds() {
        writeln!(writer, "  Duration: {:.2}s", duration)?;
    }
    writeln!(writer, "  Pages reserved: {}", stats.pages_reserved)?;
    writeln!(writer, "  Pages fetched: {}", stats.pages_fetched)?;
    writeln!(writer, "  Fetch failures: {}", stats.fetch_failures)?;
    writeln!(writer, "  Beyond depth: {}", stats.beyond_depth)?;
    writeln!(writer)?;

    if !stats.rejected.is_empty() {
        writeln!(writer, "Rejected Links ({}):", stats.total_rejected())?;
        // Sort reasons by count (descending)
        let mut reasons: Vec<_> = stats.rejected.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in reasons {
            writeln!(writer, "  {}: {}", reason, count)?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "Emission Rate: {:.1}% ({} emitted, {} without body, {} fetched)",
        stats.emission_rate(),
        stats.records_emitted,
        stats.records_without_body,
        stats.pages_fetched
    )
}

/// Prints statistics to stderr, keeping stdout free for records
pub fn print_statistics(stats: &CrawlStatistics) {
    let stderr = io::stderr();
    if let Err(e) = write_statistics(&mut stderr.lock(), stats) {
        tracing::warn!("Failed to print statistics: {}", e);
    }
}
