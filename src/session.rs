//! Game session state: phase machine, score, lives, and tower offset.
//!
//! ## States
//!
//! | State      | Description                                          |
//! |------------|------------------------------------------------------|
//! | `Idle`     | Before the first start; main menu shown              |
//! | `Running`  | Round in progress; all gameplay systems active       |
//! | `Paused`   | Terminal for the round — reached by an explicit stop |
//! | `Finished` | Terminal — lives exhausted or animation overflow     |
//!
//! `Paused` and `Finished` are both terminal for gameplay input; they differ
//! only in which overlay is shown and whether the flow reads as a manual stop
//! or an automatic end-of-round.  A restart fully resets [`GameSession`] and
//! re-enters `Running` after a short setup delay.
//!
//! [`GameSession`] is mutated from three logical sources — player input, the
//! ground-contact resolver, and the state machine's own lifecycle — but never
//! concurrently: every mutation happens inside the system that reads the
//! value, so no stale-cache read/modify/write can interleave.

use crate::constants::STARTING_LIVES;
use bevy::prelude::*;

// ── Phase machine ─────────────────────────────────────────────────────────────

/// Top-level game phase.
///
/// Gameplay systems run under `.run_if(in_state(GamePhase::Running))`; the
/// drop-resolution ledger deliberately keeps ticking in terminal phases so
/// drops in flight at end-of-round still resolve.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Before the first start; main menu shown.
    #[default]
    Idle,
    /// Round in progress.
    Running,
    /// Round ended by an explicit stop.
    Paused,
    /// Round ended by lives exhaustion or animation overflow.
    Finished,
}

/// Why a round ended.  Unified by the end-of-round handler; all three
/// triggers share the same closing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Player pressed stop.
    Stopped,
    /// The active entity's animation exceeded its travel boundary.
    Overflow,
    /// Lives reached zero or below.
    LivesExhausted,
}

impl EndReason {
    /// The terminal phase this reason transitions into.
    pub fn terminal_phase(self) -> GamePhase {
        match self {
            EndReason::Stopped => GamePhase::Paused,
            EndReason::Overflow | EndReason::LivesExhausted => GamePhase::Finished,
        }
    }
}

/// Request to close the current round.
///
/// Written by the stop-input, overflow, and ground-penalty systems; consumed
/// by the single end-of-round handler in [`crate::game`].  Funnelling all
/// three triggers through one queue keeps the closing sequence exactly-once
/// even when two triggers fire in the same frame.
#[derive(Message, Debug, Clone, Copy)]
pub struct RoundEndRequested {
    pub reason: EndReason,
}

// ── Stack entries ─────────────────────────────────────────────────────────────

/// A committed, non-physical position in the base tower.
///
/// In practice only the immovable base plate occupies one; created at game
/// start and never removed during a round.
#[derive(Debug, Clone, Copy)]
pub struct StackEntry {
    pub lateral: f32,
    pub vertical: f32,
    pub kind: crate::catalog::IngredientKind,
}

// ── Session state ─────────────────────────────────────────────────────────────

/// Outcome of one ground penalty, returned to the resolver so it can act on
/// the values computed inside the same callback that wrote them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// Score after the deduction (already floored at 0).
    pub score: u32,
    /// Lives after the decrement; may be transiently negative.
    pub lives: i32,
    /// True when this penalty left lives at or below zero.
    pub lives_exhausted: bool,
}

/// Per-round mutable session state.
///
/// Reset atomically by [`GameSession::reset`] at the start of each round.
#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    /// Current score; never negative.
    pub score: u32,
    /// Lives remaining.  Starts at the configured count; allowed to go
    /// transiently negative — game-over logic fires at ≤ 0.
    pub lives: i32,
    /// Cumulative downward shift applied to the immovable base so tower
    /// growth stays inside the fixed camera frame.
    pub tower_offset: f32,
    /// Count of drops that resolved as landed.
    pub drops_landed: u32,
    /// Authoritative final score, set exactly once by the penalty that
    /// brings lives to ≤ 0.  The end-of-round handler prefers this over the
    /// live score to avoid racing asynchronous score-mutating timers.
    pub final_score: Option<u32>,
    /// Latch set by the end-of-round handler; makes stop/overflow/
    /// lives-exhausted triggers idempotent within and across frames.
    pub round_closed: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            score: 0,
            lives: STARTING_LIVES,
            tower_offset: 0.0,
            drops_landed: 0,
            final_score: None,
            round_closed: false,
        }
    }
}

impl GameSession {
    /// Reset every field for a fresh round.
    pub fn reset(&mut self, starting_lives: i32) {
        self.score = 0;
        self.lives = starting_lives;
        self.tower_offset = 0.0;
        self.drops_landed = 0;
        self.final_score = None;
        self.round_closed = false;
    }

    /// A tracked drop survived its observation delay: +1 score, +1 landed.
    pub fn apply_landed(&mut self) {
        self.score += 1;
        self.drops_landed += 1;
    }

    /// A tracked drop hit the ground: −1 life, −1 score floored at zero.
    ///
    /// When the decrement brings lives to ≤ 0 the post-penalty score is
    /// captured into [`Self::final_score`] (once), so the end-of-round
    /// handler reads an unambiguous value instead of a possibly-stale one.
    pub fn apply_ground_penalty(&mut self) -> PenaltyOutcome {
        self.lives -= 1;
        self.score = self.score.saturating_sub(1);
        let lives_exhausted = self.lives <= 0;
        if lives_exhausted && self.final_score.is_none() {
            self.final_score = Some(self.score);
        }
        PenaltyOutcome {
            score: self.score,
            lives: self.lives,
            lives_exhausted,
        }
    }

    /// Advance the tower offset by a dropped ingredient's stacking height.
    pub fn advance_tower(&mut self, height: f32) {
        self.tower_offset += height;
    }

    /// The score the end-of-round handler reports: the captured final score
    /// if a penalty triggered game-over, else the live score.
    pub fn authoritative_score(&self) -> u32 {
        self.final_score.unwrap_or(self.score)
    }
}
