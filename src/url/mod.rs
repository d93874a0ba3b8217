//! URL handling module
//!
//! This module provides domain normalization, href cleanup and the
//! same-domain scope that decides which links a crawl may follow.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{normalize_domain, strip_fragment_and_query};
pub use scope::LinkScope;
