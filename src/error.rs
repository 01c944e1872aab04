//! Game-specific error types.
//!
//! The collision/timer callback paths never propagate errors — invalid input
//! and stale identifiers are guarded no-ops by design.  Errors here cover the
//! startup preconditions that *must* hold before a round can run, chiefly the
//! ingredient catalog invariants.

use std::fmt;

/// Top-level error enum for the stacking game.
#[derive(Debug)]
pub enum GameError {
    /// The droppable ingredient pool is empty.  `select_random` has nothing
    /// to draw from; validated once at startup rather than per draw.
    EmptyCatalog,

    /// An ingredient type carries a spawn-rarity weight ≤ 0, which would
    /// either never spawn or corrupt the weighted pool.
    NonPositiveRarity {
        /// Human-readable name of the offending ingredient kind.
        kind: &'static str,
        /// The rejected weight value.
        rarity: f32,
    },

    /// An ingredient type's sticky strength is outside the supported scale.
    StickyStrengthOutOfRange {
        /// Human-readable name of the offending ingredient kind.
        kind: &'static str,
        /// The rejected strength value.
        strength: f32,
        /// Inclusive upper bound of the scale.
        max: f32,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::EmptyCatalog => {
                write!(f, "ingredient catalog has no droppable types")
            }
            GameError::NonPositiveRarity { kind, rarity } => write!(
                f,
                "ingredient '{}' has non-positive spawn rarity {}",
                kind, rarity
            ),
            GameError::StickyStrengthOutOfRange {
                kind,
                strength,
                max,
            } => write!(
                f,
                "ingredient '{}' sticky strength {} outside [0, {}]",
                kind, strength, max
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_offending_kind() {
        let err = GameError::NonPositiveRarity {
            kind: "patty",
            rarity: 0.0,
        };
        assert!(err.to_string().contains("patty"));

        let err = GameError::StickyStrengthOutOfRange {
            kind: "sauce",
            strength: 2.0,
            max: 1.2,
        };
        assert!(err.to_string().contains("sauce"));
        assert!(err.to_string().contains("1.2"));
    }
}
