//! Drop tracker: per-drop bookkeeping for the landed/fell decision.
//!
//! ## Flow
//!
//! 1. When the player drops the active ingredient, the state machine calls
//!    [`DropLedger::submit`] with the entity and its last animated position.
//! 2. Each frame, [`drop_resolution_system`] advances every record's elapsed
//!    time.  A record that reaches the observation delay while still present
//!    resolves as **landed**: +1 score, +1 successful-drop count.
//! 3. The ground-contact resolver removes records early via
//!    [`DropLedger::remove`]; such a drop resolves as **fell** and the
//!    delayed check becomes a no-op for it.
//!
//! This race between the delay and the ground resolver is the sole mechanism
//! by which a drop is rewarded.  Resolution deliberately keeps running in
//! terminal phases: drops in flight when the round ends still resolve
//! normally, and no new drop can be issued outside `Running`, so nothing
//! needs suppressing.

use crate::catalog::IngredientKind;
use crate::config::GameConfig;
use crate::session::GameSession;
use bevy::prelude::*;

/// One physics-tracked drop awaiting its landed/fell resolution.
#[derive(Debug, Clone, Copy)]
pub struct DropRecord {
    /// Stable identifier of the physics body.
    pub entity: Entity,
    pub kind: IngredientKind,
    /// Spatial position at drop time.
    pub drop_pos: Vec2,
    /// Seconds since submission.
    pub elapsed: f32,
}

/// Insertion-ordered ledger of unresolved drops.
///
/// An identifier, once removed, is never reinserted — both resolution paths
/// go through removal, so resolution is idempotent per entity.
#[derive(Resource, Debug, Default)]
pub struct DropLedger {
    records: Vec<DropRecord>,
}

impl DropLedger {
    /// Register a dropped entity at its current animated position.
    pub fn submit(&mut self, entity: Entity, kind: IngredientKind, drop_pos: Vec2) {
        self.records.push(DropRecord {
            entity,
            kind,
            drop_pos,
            elapsed: 0.0,
        });
    }

    /// Remove and return the record for `entity`, if still unresolved.
    pub fn remove(&mut self, entity: Entity) -> Option<DropRecord> {
        let idx = self.records.iter().position(|r| r.entity == entity)?;
        Some(self.records.remove(idx))
    }

    /// Whether `entity` is still awaiting resolution.
    pub fn contains(&self, entity: Entity) -> bool {
        self.records.iter().any(|r| r.entity == entity)
    }

    /// Advance every record by `dt` and drain those that have survived the
    /// observation delay.  Returned records resolved as landed this tick.
    pub fn tick(&mut self, dt: f32, resolve_delay: f32) -> Vec<DropRecord> {
        for record in &mut self.records {
            record.elapsed += dt;
        }
        let mut landed = Vec::new();
        self.records.retain(|record| {
            if record.elapsed >= resolve_delay {
                landed.push(*record);
                false
            } else {
                true
            }
        });
        landed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Per-frame system: resolve drops whose observation delay has elapsed.
///
/// Runs in every phase (see module docs) — the ledger is emptied by the
/// round reset, so ticking outside a round is a no-op.
pub fn drop_resolution_system(
    time: Res<Time>,
    mut ledger: ResMut<DropLedger>,
    mut session: ResMut<GameSession>,
    config: Res<GameConfig>,
) {
    for record in ledger.tick(time.delta_secs(), config.drop_resolve_delay_secs) {
        session.apply_landed();
        info!(
            "drop landed: {} at ({:.2}, {:.2}) → score {}",
            record.kind.name(),
            record.drop_pos.x,
            record.drop_pos.y,
            session.score
        );
    }
}
