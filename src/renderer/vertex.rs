//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Flat-coloured vertex, position in canvas pixels until upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Textured vertex for sprite quads
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Multiplied with the texel; alpha carries sprite fade
    pub tint: [f32; 4],
}

impl SpriteVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32, tint: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            tint,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const F2: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: F2,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: F2 * 2,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Build an RGBA colour from a `0xRRGGBB` literal
pub const fn hex(rgb: u32) -> [f32; 4] {
    hexa(rgb, 1.0)
}

/// Build an RGBA colour from a `0xRRGGBB` literal and an alpha
pub const fn hexa(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Same colour with a different alpha
pub const fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

/// Colors for game elements
pub mod colors {
    use super::{hex, hexa};

    pub const WHITE: [f32; 4] = hex(0xffffff);
    pub const BLACK: [f32; 4] = hex(0x000000);

    // Brand neon
    pub const NEON_GREEN: [f32; 4] = hex(0x14f195);
    pub const NEON_GREEN_DARK: [f32; 4] = hex(0x0b8c56);
    pub const NEON_MAGENTA: [f32; 4] = hex(0xff00ff);
    pub const NEON_PURPLE: [f32; 4] = hex(0x9945ff);
    pub const GOLD: [f32; 4] = hex(0xfbbf24);
    pub const GOLD_DEEP: [f32; 4] = hex(0xf59e0b);

    // World
    pub const GROUND: [f32; 4] = hex(0x111827);
    pub const ROAD: [f32; 4] = hex(0x1f2937);
    pub const OBSTACLE: [f32; 4] = hex(0x6b7280);
    pub const SHADOW: [f32; 4] = hexa(0x000000, 0.4);
    pub const TRUCK_SHADOW: [f32; 4] = hexa(0x000000, 0.5);
    pub const RAIN: [f32; 4] = [150.0 / 255.0, 200.0 / 255.0, 1.0, 0.5];

    // Procedural truck
    pub const TRUCK_BODY: [f32; 4] = NEON_GREEN;
    pub const TRUCK_BODY_TOP: [f32; 4] = hex(0x10c479);
    pub const TRUCK_BODY_SIDE: [f32; 4] = NEON_GREEN_DARK;
    pub const TRUCK_CABIN: [f32; 4] = NEON_PURPLE;
    pub const TRUCK_CABIN_TOP: [f32; 4] = hex(0x7c3aed);
    pub const TRUCK_CABIN_SIDE: [f32; 4] = hex(0x6d28d9);
    pub const WHEEL: [f32; 4] = hex(0x111111);
    pub const WHEEL_TOP: [f32; 4] = hex(0x333333);
    pub const WHEEL_SIDE: [f32; 4] = BLACK;

    // Recyclables without art
    pub const BOTTLE: [f32; 4] = hex(0x3b82f6);
    pub const CAN: [f32; 4] = hex(0xef4444);
    pub const GLASS: [f32; 4] = hex(0x10b981);

    // HUD
    pub const PANEL: [f32; 4] = hexa(0x000000, 0.6);
    pub const PANEL_DARK: [f32; 4] = hexa(0x000000, 0.7);
    pub const BAR_TRACK: [f32; 4] = hex(0x374151);

    /// Window light colours cycled across the skyline
    pub const CITY_LIGHTS: [[f32; 4]; 3] = [NEON_GREEN, NEON_MAGENTA, NEON_PURPLE];
}
