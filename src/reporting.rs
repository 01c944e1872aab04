//! Score reporting: the bridge that transmits the final score out of the
//! game process.
//!
//! The game only depends on the two-outcome contract — delivered or not —
//! and treats reporting as best-effort, fire-and-forget: a rejected or
//! unavailable reporter is logged and surfaced to the player only as the
//! absence of a success confirmation.  It never halts or rolls back a
//! finished round.

use bevy::prelude::*;

/// Outcome of one report attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The platform accepted the score.
    Delivered,
    /// The platform rejected the score or was unreachable.
    NotDelivered,
}

/// External collaborator contract: transmit a final score.
///
/// Called at most once per finished round; must never block gameplay.
pub trait ScoreReporter: Send + Sync {
    fn report(&self, score: u32) -> ReportOutcome;
}

/// Default reporter: logs the final score locally.
///
/// Stands in for the platform bridge when the game runs outside its host
/// chat platform.
pub struct LogReporter;

impl ScoreReporter for LogReporter {
    fn report(&self, score: u32) -> ReportOutcome {
        info!("final score: {score}");
        ReportOutcome::Delivered
    }
}

/// Resource wrapping the injected reporter implementation.
#[derive(Resource)]
pub struct ScoreReporting {
    reporter: Box<dyn ScoreReporter>,
}

impl ScoreReporting {
    pub fn new(reporter: Box<dyn ScoreReporter>) -> Self {
        Self { reporter }
    }

    /// Forward a final score to the collaborator.
    pub fn report(&self, score: u32) -> ReportOutcome {
        self.reporter.report(score)
    }
}

impl Default for ScoreReporting {
    fn default() -> Self {
        Self::new(Box::new(LogReporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every reported score; used by the round-flow tests.
    pub struct RecordingReporter {
        pub scores: Arc<Mutex<Vec<u32>>>,
        pub outcome: ReportOutcome,
    }

    impl ScoreReporter for RecordingReporter {
        fn report(&self, score: u32) -> ReportOutcome {
            self.scores.lock().unwrap().push(score);
            self.outcome
        }
    }

    #[test]
    fn log_reporter_delivers() {
        assert_eq!(LogReporter.report(7), ReportOutcome::Delivered);
    }

    #[test]
    fn resource_forwards_to_injected_reporter() {
        let scores = Arc::new(Mutex::new(Vec::new()));
        let reporting = ScoreReporting::new(Box::new(RecordingReporter {
            scores: scores.clone(),
            outcome: ReportOutcome::NotDelivered,
        }));

        assert_eq!(reporting.report(12), ReportOutcome::NotDelivered);
        assert_eq!(*scores.lock().unwrap(), vec![12]);
    }
}
