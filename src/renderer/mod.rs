//! WebGPU rendering module
//!
//! The scene is composed as a display list of screen-space commands through the
//! perspective projection, tessellated into triangles and drawn by wgpu.

pub mod assets;
pub mod backdrop;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use assets::{AssetTable, SpriteId, SpriteImage};
pub use backdrop::{Backdrop, Palette};
pub use pipeline::{RenderError, RenderState, canvas_to_ndc, fits_texture_limit};
pub use scene::{Batch, DisplayList, DrawCmd, Mesh, Scene};
pub use vertex::{SpriteVertex, Vertex};
