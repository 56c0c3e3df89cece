//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entity creation order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod modes;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{overlaps, resolve_collisions};
pub use modes::{BonusLaneMode, JumpAbility, Raindrop, Weather};
pub use spawn::{COLLECTIBLE_LADDER, lane_is_clear, pick_collectible, pick_obstacle, spawn_entity};
pub use state::{
    Action, CashParticle, CollectibleKind, Entity, EntityKind, GameEvent, GamePhase, GameState,
    ObstacleKind, Player, TimeOfDay,
};
pub use tick::{TickInput, apply_action, tick};
