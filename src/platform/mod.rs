//! Platform layer
//!
//! Browser-facing plumbing that is not gameplay:
//! - Frame scheduling (fixed-timestep accumulator, idle/running loop state)
//! - Sprite loading (wasm only; decoding checks are portable)

pub mod assets;
pub mod scheduler;

pub use assets::{AssetError, decode_rgba};
pub use scheduler::{FrameScheduler, LoopState};
