//! Recycle Rush - A three-lane pseudo-3D endless runner
//!
//! Core modules:
//! - `projection`: Fixed-camera perspective projection (world -> canvas)
//! - `sim`: Deterministic simulation (spawning, movement, collisions, power modes)
//! - `audio`: Lookahead music sequencer and one-shot sound effects
//! - `renderer`: Display list construction and WebGPU drawing
//! - `platform`: Frame scheduling and browser asset loading
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod projection;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use projection::{Camera, Projected, project};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep; balance values are per 60 Hz tick
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Logical canvas resolution (2:3 portrait)
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 900.0;

    /// Lateral distance between lane centers
    pub const LANE_WIDTH: f32 = 160.0;
    /// Three-lane layout
    pub const LANE_X_POSITIONS: [f32; 3] = [-LANE_WIDTH, 0.0, LANE_WIDTH];
    /// Two-lane layout used while bonus mode is active
    pub const BONUS_LANE_X_POSITIONS: [f32; 2] = [-LANE_WIDTH, LANE_WIDTH];
    pub const LANE_COUNT: usize = 3;

    /// Camera
    pub const CAMERA_HEIGHT: f32 = 180.0;
    pub const CAMERA_DISTANCE: f32 = 300.0;
    pub const FOV: f32 = 600.0;
    /// Screen Y of the vanishing line
    pub const HORIZON_Y: f32 = CANVAS_HEIGHT * 0.35;
    /// Effective depth at or below which nothing is drawn
    pub const NEAR_PLANE: f32 = 10.0;

    /// Player truck
    pub const PLAYER_Z: f32 = 200.0;
    pub const PLAYER_WIDTH: f32 = 130.0;
    pub const PLAYER_HEIGHT: f32 = 130.0;
    pub const PLAYER_DEPTH: f32 = 180.0;
    /// Fraction of the remaining lateral distance covered per tick
    pub const LANE_SWITCH_SPEED: f32 = 0.15;

    /// Entities spawn (and stop being drawn) this far down the road
    pub const SPAWN_DISTANCE: f32 = 5000.0;
    /// Entities are culled once this far behind the camera plane
    pub const DESPAWN_MARGIN: f32 = 100.0;

    /// Obstacle box
    pub const OBSTACLE_WIDTH: f32 = 100.0;
    pub const OBSTACLE_HEIGHT: f32 = 120.0;
    pub const OBSTACLE_DEPTH: f32 = 60.0;

    /// Road marker dash period (world units)
    pub const ROAD_MARKER_PERIOD: f32 = 400.0;

    /// Screen shake ticks applied on an obstacle hit
    pub const HIT_SHAKE: u32 = 20;

    /// Raindrops regenerated on each storm
    pub const RAINDROP_COUNT: usize = 100;
    /// Lightning flash length in ticks
    pub const LIGHTNING_FLASH_TICKS: u32 = 15;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of `value` along `[min, max]`, clamped to `[0, 1]`
#[inline]
pub fn progress(value: f32, min: f32, max: f32) -> f32 {
    if max <= min {
        return 1.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
