//! Centralised gameplay and physics constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every constant and can override any
//! subset at startup from `assets/game.toml`.
//!
//! ## Tuning guidance
//!
//! Each constant includes the tested range and the observable consequence of
//! changing it.

// ── World Layout ──────────────────────────────────────────────────────────────

/// Half-width of the ground slab (world units).
///
/// The slab spans ±GROUND_HALF_WIDTH around the tower axis; any dropped
/// ingredient that misses the tower lands on it and costs a life.
pub const GROUND_HALF_WIDTH: f32 = 8.0;

/// Half-height of the ground slab (world units).  The slab's top surface sits
/// at y = 0.
pub const GROUND_HALF_HEIGHT: f32 = 0.25;

/// Half-width of the immovable base plate the tower is built on.
///
/// Narrower → more drops miss and fall to the ground.  Tested range: 0.6–1.0.
pub const BASE_HALF_WIDTH: f32 = 0.7;

/// Half-height of the immovable base plate.
pub const BASE_HALF_HEIGHT: f32 = 0.3;

/// Y coordinate of the base plate's centre before any tower offset is applied.
/// The plate rests directly on the ground slab: centre = slab top + half-height.
pub const BASE_CENTER_Y: f32 = 0.3;

// ── Active Entity Animation ───────────────────────────────────────────────────

/// X coordinate where a freshly spawned ingredient enters its animation path.
pub const ACTIVE_PATH_START_X: f32 = -4.2;

/// Height of the pre-drop animation path above the ground (world units).
pub const ACTIVE_PATH_Y: f32 = 5.2;

/// Lateral traversal speed of the animated ingredient (units/s).
///
/// Faster → harder timing.  Tested range: 1.6–3.0.
pub const ACTIVE_PATH_SPEED: f32 = 2.2;

/// X coordinate beyond which the animated ingredient has overflowed its
/// travel boundary, force-ending the round.
pub const OVERFLOW_BOUNDARY_X: f32 = 4.2;

// ── Drop Resolution ───────────────────────────────────────────────────────────

/// Observation delay before a submitted drop is resolved as "landed"
/// (seconds).  A drop still tracked when the delay elapses scores a point;
/// one removed earlier by a ground contact does not.
///
/// Shortening this makes the landed/fell race easier to win but lets
/// still-toppling ingredients score.
pub const DROP_RESOLVE_DELAY_SECS: f32 = 2.0;

/// Delay between a successful drop submission and the next ingredient spawn
/// (seconds).
pub const NEXT_SPAWN_DELAY_SECS: f32 = 0.9;

/// Delay between a game reset and the transition to the running phase
/// (seconds).  Lets the reset state propagate before the first spawn.
pub const SETUP_DELAY_SECS: f32 = 0.5;

// ── Ground Penalty ────────────────────────────────────────────────────────────

/// How long a body's identifier stays in the ground-contact dedup set
/// (seconds).  Within this window, repeated contact callbacks for the same
/// body cost at most one life and one score point.
pub const GROUND_DEDUP_EXPIRY_SECS: f32 = 0.5;

/// Lives at the start of each round.
pub const STARTING_LIVES: i32 = 3;

// ── Adhesion (Sticky Ingredients) ─────────────────────────────────────────────

/// Upper bound of the sticky-strength scale.  Strengths are clamped to
/// [0, STICKY_STRENGTH_MAX] before scaling any effect.
pub const STICKY_STRENGTH_MAX: f32 = 1.2;

/// One-time downward corrective impulse at strength 0 / strength max.
/// Tested range: 2.0–4.0; larger values visibly slam ingredients down.
pub const STICKY_IMPULSE_MIN: f32 = 2.0;
pub const STICKY_IMPULSE_MAX: f32 = 4.0;

/// Linear/angular damping applied to the sticky body at strength 0 / max.
pub const STICKY_DAMPING_MIN: f32 = 0.8;
pub const STICKY_DAMPING_MAX: f32 = 0.95;

/// Contact friction applied to the sticky body at strength 0 / max.
pub const STICKY_FRICTION_MIN: f32 = 2.0;
pub const STICKY_FRICTION_MAX: f32 = 5.0;

/// Strength above which the sticky body's mass is reduced to improve drop
/// acceptance.
pub const STICKY_MASS_REDUCTION_THRESHOLD: f32 = 0.8;

/// Density multiplier applied to strongly sticky bodies (strength above
/// [`STICKY_MASS_REDUCTION_THRESHOLD`]).
pub const STICKY_MASS_SCALE: f32 = 0.6;

/// Interval between sticky-joint maintenance passes (seconds).
pub const STICKY_TICK_SECS: f32 = 0.1;

/// Separation beyond which the maintenance pass applies an attractive force
/// (world units).
pub const STICKY_SEPARATION_THRESHOLD: f32 = 0.5;

/// Gain of the inverse-distance attractive force.  Force magnitude is
/// `gain / distance`, so the pull strengthens as the pair drifts closer to
/// the threshold and never diverges at range.
pub const STICKY_ATTRACT_GAIN: f32 = 1.8;

/// Fraction of the attractive force retained on the vertical axis.  Below
/// 1.0 the pull is biased toward lateral correction, which re-centres a
/// sliding ingredient without pinning it down.
pub const STICKY_VERTICAL_BIAS: f32 = 0.35;

/// Maximum lifetime of a sticky joint record (seconds).  The maintenance
/// loop self-terminates at this age even if the pair stays separated.
pub const STICKY_LIFETIME_SECS: f32 = 10.0;

// ── Ingredients ───────────────────────────────────────────────────────────────

/// Half-width of every droppable ingredient (world units).
pub const INGREDIENT_HALF_WIDTH: f32 = 0.55;

/// Collider density for dropped ingredients.  With ~1.1 × 0.2-unit cuboids
/// this lands masses near 0.7–1.0, which the sticky impulse range assumes.
pub const INGREDIENT_DENSITY: f32 = 3.0;

/// Clearance above the tallest tracked body from which the terminal closing
/// ingredient (top bun) is dropped at end-of-round.
pub const TERMINAL_DROP_CLEARANCE: f32 = 1.6;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Orthographic projection scale.  At 0.02 a 680-px-tall window frames
/// ~13.6 world units vertically — the full drop path plus ground.
pub const CAMERA_SCALE: f32 = 0.02;

/// Y coordinate the fixed camera is centred on.
pub const CAMERA_CENTER_Y: f32 = 2.6;
