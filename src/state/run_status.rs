/// Run status and stop reason definitions for a crawl run
///
/// `RunStatus` is the engine's state machine; `StopReason` explains which
/// terminal condition ended the run.
use serde::Serialize;
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunStatus {
    // ===== Active States =====
    /// Run created, seed not yet validated
    Idle,

    /// Seed accepted, pages are being fetched
    Running,

    // ===== Terminal States =====
    /// A normal stop condition ended the run
    Completed,

    /// The run was cancelled from outside
    Stopped,

    /// Invalid seed, or nothing could be visited
    Failed,
}

impl RunStatus {
    /// Returns true if this is a terminal state
    ///
    /// Terminal states are absorbing: no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    /// Returns true if a run in this state may move to `next`
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running) | (Self::Idle, Self::Failed) => true,
            (Self::Running, next) => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The terminal condition explaining why a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopReason {
    /// The depth/step limit bounded the walk
    LimitReached,

    /// The configured keyword appeared on the last visited page
    KeywordFound,

    /// No pending entries remain at any depth within the limit
    Exhausted,

    /// The per-run page cap was hit
    MaxPagesReached,

    /// Cancelled by the caller or by the event sink going away
    Cancelled,

    /// The seed URL failed validation; the run never started
    InvalidSeed,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LimitReached => "LimitReached",
            Self::KeywordFound => "KeywordFound",
            Self::Exhausted => "Exhausted",
            Self::MaxPagesReached => "MaxPagesReached",
            Self::Cancelled => "Cancelled",
            Self::InvalidSeed => "InvalidSeed",
        }
    }

    /// The terminal run status this reason leads to, given how many pages were visited
    pub fn terminal_status(&self, pages_visited: usize) -> RunStatus {
        match self {
            Self::Cancelled => RunStatus::Stopped,
            Self::InvalidSeed => RunStatus::Failed,
            _ if pages_visited == 0 => RunStatus::Failed,
            _ => RunStatus::Completed,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
