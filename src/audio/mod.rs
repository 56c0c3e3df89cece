//! Audio system
//!
//! Procedurally generated music and sound effects - no external files needed!
//! Scheduling and patch design are plain data so they can be tested natively;
//! the Web Audio backend only turns them into nodes.

pub mod sequencer;
pub mod synth;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use sequencer::{ScheduledStep, Sequencer, Voice, step_voices, tempo_for_speed};
pub use synth::{FilterKind, FilterSpec, Patch, Ramp, Source, Sweep, Waveform};
#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

/// Volumes at or below this are treated as muted
pub const SILENCE: f32 = 0.01;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Collectible picked up
    Collect,
    /// Truck hit an obstacle
    Hit,
    /// Last life lost
    GameOver,
    /// Speed passed another milestone
    SpeedUp,
}
