//! Stacker — a physics ingredient-stacking tower game.
//!
//! Ingredients spawn one at a time, traverse an animated pre-drop path, and
//! are dropped by the player to build a tower on an immovable base plate.
//! Rapier owns the rigid bodies; the core game logic decides when a drop
//! scores, when a life is lost, and when the round ends.

pub mod adhesion;
pub mod arena;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod drops;
pub mod error;
pub mod game;
pub mod graphics;
pub mod ground;
pub mod hud;
pub mod menu;
pub mod reporting;
pub mod session;
pub mod testing;
