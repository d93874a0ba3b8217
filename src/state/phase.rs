/// Crawl phase definitions for tracking a run's lifecycle
///
/// A run moves `Idle → Validating → Running → Draining → Closed`; a failed
/// validation jumps straight from `Validating` to `Closed`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Crawler built, nothing started
    #[default]
    Idle,

    /// Configuration is being normalized, validated and preflighted
    Validating,

    /// Root scheduled; pages are being fetched and links admitted
    Running,

    /// The fetch engine has drained; the output stream is about to close
    Draining,

    /// Output stream closed; terminal
    Closed,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true while pages may still be fetched or emitted
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Running)
                | (Self::Validating, Self::Closed)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Closed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Closed => "closed",
        }
    }

    /// Returns all phases in lifecycle order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Validating,
            Self::Running,
            Self::Draining,
            Self::Closed,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
