//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and the preflight check
//! - HTML parsing into page events
//! - The bounded-parallel fetch engine with hop-count tracking
//! - Link admission against the domain scope and budgets
//! - Accumulation of page records and the output stream
//! - Overall crawl coordination

mod coordinator;
mod engine;
mod fetcher;
mod frontier;
mod parser;
mod sink;
mod stream;

pub use coordinator::{crawl, Crawler};
pub use engine::{Engine, EventSink, PageContext, VisitRequest, Visitor};
pub use fetcher::{build_http_client, fetch_url, preflight, FetchResult};
pub use frontier::{Admission, LinkFrontier, Rejection};
pub use parser::{parse_page, LinkCandidate, MetaKind, PageEvent};
pub use sink::ExtractionSink;
pub use stream::PageStream;
