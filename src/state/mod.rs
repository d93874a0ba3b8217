//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of a run (idle, validating, running, draining, closed)
//! - `PageRecord`: the extracted summary of one page
//! - `CrawlState`: visitation ledger, page records and counters behind one mutex

mod crawl_state;
mod phase;
mod record;

// Re-export main types
pub use crawl_state::{lock_state, new_shared_state, CrawlCounters, CrawlState, SharedState};
pub use phase::CrawlPhase;
pub use record::{PageField, PageRecord};
