//! Coordinator state machine phases.

use std::fmt;

use crate::download::DownloadOutcome;

/// Where the coordinator is in handling a request.
///
/// `Idle -> RequestingPermission -> Fetching -> Publishing -> Cleaning -> Done`.
/// Denial jumps straight from `RequestingPermission` to `Done`, and a fetch
/// error skips `Publishing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    RequestingPermission,
    Fetching,
    Publishing,
    Cleaning,
    Done(DownloadOutcome),
}

impl Phase {
    /// Whether a new request may start from this phase.
    pub fn accepts_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Done(_))
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        !self.accepts_start()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::RequestingPermission => write!(f, "requesting permission"),
            Phase::Fetching => write!(f, "fetching"),
            Phase::Publishing => write!(f, "publishing"),
            Phase::Cleaning => write!(f, "cleaning up"),
            Phase::Done(outcome) if outcome.is_success() => write!(f, "done"),
            Phase::Done(_) => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;

    #[test]
    fn test_accepts_start() {
        assert!(Phase::Idle.accepts_start());
        assert!(Phase::Done(DownloadOutcome::Failure(FailureReason::PermissionDenied)).accepts_start());
        assert!(Phase::RequestingPermission.is_busy());
        assert!(Phase::Fetching.is_busy());
        assert!(Phase::Publishing.is_busy());
        assert!(Phase::Cleaning.is_busy());
    }
}
