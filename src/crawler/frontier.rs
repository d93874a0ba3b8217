//! Link frontier: canonicalization, scoping and budget checks for
//! discovered links
//!
//! Every decision is taken against a `&mut CrawlState` the caller already
//! holds locked, so checking the ledger, checking the budgets and reserving
//! the URL happen as one step.

use crate::config::CrawlConfig;
use crate::crawler::parser::LinkCandidate;
use crate::state::CrawlState;
use crate::url::{strip_fragment_and_query, LinkScope};
use std::fmt;
use std::time::Instant;
use url::Url;

/// Why a link candidate was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    /// Nothing left after stripping fragment and query
    Empty,
    /// `rel` contains `nofollow`
    NoFollow,
    /// `javascript:` or `mailto:` href
    PseudoUrl,
    /// Inside a `<header>`/`<footer>` and those links are not followed
    HeaderFooter,
    /// Not on the configured domain (or its `www.` variant)
    OutOfScope,
    /// Already in the visitation ledger
    Duplicate,
    /// Page budget exhausted
    PageBudget,
    /// Wall-clock deadline passed
    Deadline,
    /// Output stream abandoned by its consumer
    Cancelled,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NoFollow => "nofollow",
            Self::PseudoUrl => "pseudo-url",
            Self::HeaderFooter => "header-footer",
            Self::OutOfScope => "out-of-scope",
            Self::Duplicate => "duplicate",
            Self::PageBudget => "page-budget",
            Self::Deadline => "deadline",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of offering a link to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Reserved in the ledger; the caller must schedule the visit
    Admitted(Url),
    Rejected(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Admission rules for one crawl
#[derive(Debug, Clone)]
pub struct LinkFrontier {
    scope: LinkScope,
    keep_header_footer_links: bool,
    max_pages: usize,
    deadline: Instant,
}

impl LinkFrontier {
    pub fn new(scope: LinkScope, config: &CrawlConfig, deadline: Instant) -> Self {
        Self {
            scope,
            keep_header_footer_links: config.keep_header_footer_links,
            max_pages: usize::from(config.max_pages),
            deadline,
        }
    }

    pub fn scope(&self) -> &LinkScope {
        &self.scope
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Decides whether a link observed on a visited page is followed
    ///
    /// # Admission Steps
    ///
    /// 1. Strip fragment and query
    /// 2. Reject empty, nofollow, `javascript:`/`mailto:` and (unless opted
    ///    in) header/footer links
    /// 3. Canonicalize against the domain scope
    /// 4. Reject duplicates, then an exhausted page budget, then a passed
    ///    deadline, then a cancelled crawl
    /// 5. Reserve the URL with an empty placeholder record
    ///
    /// Rejections are counted in `state.counters`.
    pub fn admit(&self, state: &mut CrawlState, link: &LinkCandidate, now: Instant) -> Admission {
        let admission = match self.canonicalize(link) {
            Ok(url) => self.reserve(state, url, now),
            Err(reason) => Admission::Rejected(reason),
        };

        match &admission {
            Admission::Admitted(url) => tracing::trace!("Admitted {}", url),
            Admission::Rejected(reason) => {
                tracing::trace!("Rejected {:?}: {}", link.href, reason);
                state.counters.record_rejection(*reason);
            }
        }

        admission
    }

    /// Reserves the crawl root under the same bookkeeping as any link
    pub fn admit_seed(&self, state: &mut CrawlState, now: Instant) -> Admission {
        match self.scope.root_url() {
            Some(root) => self.reserve(state, root, now),
            None => Admission::Rejected(Rejection::OutOfScope),
        }
    }

    fn canonicalize(&self, link: &LinkCandidate) -> Result<Url, Rejection> {
        let href = strip_fragment_and_query(&link.href);

        if href.is_empty() {
            return Err(Rejection::Empty);
        }

        if is_nofollow(link.rel.as_deref()) {
            return Err(Rejection::NoFollow);
        }

        if is_pseudo_url(href) {
            return Err(Rejection::PseudoUrl);
        }

        if link.in_header_footer && !self.keep_header_footer_links {
            return Err(Rejection::HeaderFooter);
        }

        self.scope.canonicalize(href).ok_or(Rejection::OutOfScope)
    }

    fn reserve(&self, state: &mut CrawlState, url: Url, now: Instant) -> Admission {
        if state.is_reserved(url.as_str()) {
            return Admission::Rejected(Rejection::Duplicate);
        }

        if state.reserved() >= self.max_pages {
            return Admission::Rejected(Rejection::PageBudget);
        }

        if now > self.deadline {
            return Admission::Rejected(Rejection::Deadline);
        }

        if state.is_cancelled() {
            return Admission::Rejected(Rejection::Cancelled);
        }

        state.reserve(&url);
        Admission::Admitted(url)
    }
}

/// `rel` is a space-separated token list
fn is_nofollow(rel: Option<&str>) -> bool {
    rel.map(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("nofollow"))
    })
    .unwrap_or(false)
}

fn is_pseudo_url(href: &str) -> bool {
    let lowered = href.trim_start().to_ascii_lowercase();
    lowered.starts_with("javascript:") || lowered.starts_with("mailto:")
}
