//! Collision detection and scoring
//!
//! Overlap is tested on the ground plane only (lateral and depth extents).
//! Height is not considered, so a jumping truck still collides.

use rand::Rng;

use super::state::{CollectibleKind, Entity, EntityKind, GameEvent, GamePhase, GameState, Player};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Axis-aligned overlap between the truck and an entity in x and z
pub fn overlaps(player: &Player, entity: &Entity) -> bool {
    let dz = (player.pos.z - entity.pos.z).abs();
    let dx = (player.pos.x - entity.pos.x).abs();
    dz < (player.size.z + entity.size.z) / 2.0 && dx < (player.size.x + entity.size.x) / 2.0
}

/// Resolve every overlap for this tick in entity order.
///
/// Processing stops as soon as the run ends, so a single tick can never report
/// the game over twice.
pub fn resolve_collisions(state: &mut GameState) {
    for i in 0..state.entities.len() {
        let entity = &state.entities[i];
        if entity.collected || !overlaps(&state.player, entity) {
            continue;
        }
        let kind = entity.kind;
        state.entities[i].collected = true;

        match kind {
            EntityKind::Collectible(variant) => collect(state, variant),
            EntityKind::Obstacle(_) => {
                hit(state);
                if state.phase == GamePhase::GameOver {
                    break;
                }
            }
        }
    }
}

fn collect(state: &mut GameState, variant: CollectibleKind) {
    state.combo += 1;
    if state.combo % state.tuning.items_per_combo == 0 {
        state.multiplier = (state.multiplier + 1).min(state.tuning.max_multiplier);
        state.emit(GameEvent::MultiplierChanged(state.multiplier));
    }

    state.score += u64::from(variant.base_score()) * u64::from(state.multiplier);
    state.emit(GameEvent::ScoreChanged(state.score));
    state.play(SoundEffect::Collect);

    match variant {
        CollectibleKind::Gorboy => {
            state.jump.grant(state.tuning.jump_charges);
            log::debug!("Jump charges refilled to {}", state.jump.charges);
        }
        CollectibleKind::Oscar => {
            let duration =
                state.tuning.bonus_min_ticks + state.rng.random::<f32>() * state.tuning.bonus_extra_ticks;
            state.bonus.activate(duration);
            // The center lane does not exist in the two-lane layout
            if state.player.lane == 1 {
                state.player.lane = if state.rng.random_bool(0.5) { 0 } else { LANE_COUNT - 1 };
            }
            log::debug!("Bonus lanes active for {duration:.0} ticks");
        }
        _ => {}
    }
}

fn hit(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.emit(GameEvent::LivesChanged(state.lives));

    state.combo = 0;
    state.multiplier = 1;
    state.emit(GameEvent::MultiplierChanged(1));

    state.play(SoundEffect::Hit);
    state.screen_shake = HIT_SHAKE;

    if state.lives == 0 {
        state.play(SoundEffect::GameOver);
        state.phase = GamePhase::GameOver;
        state.emit(GameEvent::GameOver {
            final_score: state.score,
        });
        log::info!("Game over with score {}", state.score);
    }
}
