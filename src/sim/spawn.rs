//! Procedural entity spawning
//!
//! Lane, kind and variant are rolled independently. A spawn is dropped (not
//! retried) when its lane already has something near the spawn depth.

use rand::Rng;

use super::state::{CollectibleKind, Entity, EntityKind, GameState, ObstacleKind};
use crate::consts::*;

/// Collectible drop table as (exclusive lower bound, variant), highest first.
/// A roll above a bound selects that variant; anything else is a Bottle.
pub const COLLECTIBLE_LADDER: [(f32, CollectibleKind); 9] = [
    (0.97, CollectibleKind::Oscar),
    (0.90, CollectibleKind::Gorboy),
    (0.82, CollectibleKind::Lexnode),
    (0.74, CollectibleKind::Trashcoin),
    (0.66, CollectibleKind::Gorbhouse),
    (0.58, CollectibleKind::Gorbhouse2),
    (0.45, CollectibleKind::Gameboy),
    (0.30, CollectibleKind::Can),
    (0.15, CollectibleKind::Glass),
];

/// Map a roll in [0, 1) onto the drop table
pub fn pick_collectible(roll: f32) -> CollectibleKind {
    COLLECTIBLE_LADDER
        .iter()
        .find(|(bound, _)| roll > *bound)
        .map(|&(_, kind)| kind)
        .unwrap_or(CollectibleKind::Bottle)
}

/// Even split between the two obstacle variants
pub fn pick_obstacle(roll: f32) -> ObstacleKind {
    if roll > 0.5 {
        ObstacleKind::Ellison
    } else {
        ObstacleKind::TrashCan
    }
}

/// True if no live entity in `lane` lies within `gap` of depth `z`
pub fn lane_is_clear(entities: &[Entity], lane: usize, z: f32, gap: f32) -> bool {
    !entities
        .iter()
        .any(|e| !e.collected && e.lane == lane && (e.pos.z - z).abs() < gap)
}

/// Roll a new entity at the far end of the road.
///
/// Returns the new entity's id, or `None` when the lane was too crowded.
pub fn spawn_entity(state: &mut GameState) -> Option<u32> {
    let lane = state.rng.random_range(0..LANE_COUNT);
    let is_collectible = state.rng.random::<f32>() > state.tuning.collectible_threshold;
    let kind = if is_collectible {
        EntityKind::Collectible(pick_collectible(state.rng.random::<f32>()))
    } else {
        EntityKind::Obstacle(pick_obstacle(state.rng.random::<f32>()))
    };

    if !lane_is_clear(&state.entities, lane, SPAWN_DISTANCE, state.tuning.min_spawn_gap) {
        log::trace!("Spawn skipped: lane {lane} crowded");
        return None;
    }

    let id = state.next_entity_id();
    state.entities.push(Entity::new(id, kind, lane, SPAWN_DISTANCE));
    Some(id)
}
