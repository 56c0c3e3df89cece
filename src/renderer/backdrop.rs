//! Procedural parallax backdrop: stars and two city skyline layers

use rand::Rng;

use super::vertex::{colors, hex};
use crate::consts::{CANVAS_WIDTH, HORIZON_Y};
use crate::sim::TimeOfDay;

const STAR_COUNT: usize = 60;
/// Skylines extend this far past both canvas edges to cover parallax drift
const SKYLINE_OVERSCAN: f32 = 200.0;

/// Parallax factors applied to the player's lane offset
pub const STAR_PARALLAX: f32 = 0.05;
pub const BACK_CITY_PARALLAX: f32 = 0.1;
pub const FRONT_CITY_PARALLAX: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub x: f32,
    pub w: f32,
    pub h: f32,
}

/// Window-light placement for one skyline layer
#[derive(Debug, Clone, Copy)]
pub struct LightPattern {
    /// Vertical spacing between lights
    pub spacing: f32,
    /// Inset of the first light from the roof and wall
    pub inset: f32,
    /// Horizontal jump for odd columns
    pub column_step: f32,
    /// Colour index stride per light
    pub color_stride: f32,
    pub size: (f32, f32),
    /// Extra halo drawn behind each light
    pub glow: f32,
}

pub const BACK_LIGHTS: LightPattern = LightPattern {
    spacing: 12.0,
    inset: 5.0,
    column_step: 10.0,
    color_stride: 7.0,
    size: (4.0, 6.0),
    glow: 2.0,
};

pub const FRONT_LIGHTS: LightPattern = LightPattern {
    spacing: 10.0,
    inset: 3.0,
    column_step: 8.0,
    color_stride: 5.0,
    size: (3.0, 5.0),
    glow: 3.0,
};

/// One window light: screen position (without parallax), size, colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLight {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: [f32; 4],
}

impl Building {
    /// Lights stacked down the building face
    pub fn lights(&self, pattern: &LightPattern) -> impl Iterator<Item = WindowLight> + '_ {
        let count = (self.h / pattern.spacing).floor() as usize;
        let pattern = *pattern;
        (0..count).map(move |i| {
            let fi = i as f32;
            let color_idx =
                ((self.x + fi * pattern.color_stride).rem_euclid(3.0)).floor() as usize % 3;
            let column = (self.x + fi).rem_euclid(2.0).floor();
            WindowLight {
                x: self.x + pattern.inset + column * pattern.column_step,
                y: HORIZON_Y - self.h + pattern.inset + fi * pattern.spacing,
                w: pattern.size.0,
                h: pattern.size.1,
                color: colors::CITY_LIGHTS[color_idx],
            }
        })
    }
}

/// Static backdrop geometry, generated once per page load
#[derive(Debug, Clone, Default)]
pub struct Backdrop {
    pub stars: Vec<Star>,
    pub back_city: Vec<Building>,
    pub front_city: Vec<Building>,
}

impl Backdrop {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.random::<f32>() * CANVAS_WIDTH,
                y: rng.random::<f32>() * HORIZON_Y * 0.8,
                size: rng.random::<f32>() * 2.0 + 0.5,
                opacity: rng.random::<f32>() * 0.8 + 0.2,
            })
            .collect();

        // Back buildings overlap their neighbour by 5px
        let back_city = skyline(rng, (30.0, 50.0), (15.0, 30.0), 5.0);
        let front_city = skyline(rng, (20.0, 40.0), (10.0, 25.0), 0.0);

        Self {
            stars,
            back_city,
            front_city,
        }
    }
}

/// Buildings from left overscan to right overscan; ranges are (min, span)
fn skyline<R: Rng + ?Sized>(
    rng: &mut R,
    width: (f32, f32),
    height: (f32, f32),
    overlap: f32,
) -> Vec<Building> {
    let mut buildings = Vec::new();
    let mut x = -SKYLINE_OVERSCAN;
    while x < CANVAS_WIDTH + SKYLINE_OVERSCAN {
        let w = width.0 + rng.random::<f32>() * width.1;
        let h = height.0 + rng.random::<f32>() * height.1;
        buildings.push(Building { x, w, h });
        x += w - overlap;
    }
    buildings
}

/// Sky and skyline colours for the current conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sky_top: [f32; 4],
    pub sky_bottom: [f32; 4],
    pub city_back: [f32; 4],
    pub city_front: [f32; 4],
}

impl Palette {
    pub const DAY: Palette = Palette {
        sky_top: hex(0x1e40af),
        sky_bottom: hex(0x60a5fa),
        city_back: hex(0x374151),
        city_front: hex(0x6b7280),
    };

    pub const EVENING: Palette = Palette {
        sky_top: hex(0x7c2d12),
        sky_bottom: hex(0xfb923c),
        city_back: hex(0x431407),
        city_front: hex(0x92400e),
    };

    pub const NIGHT: Palette = Palette {
        sky_top: hex(0x0f172a),
        sky_bottom: hex(0x312e81),
        city_back: hex(0x1e1b4b),
        city_front: hex(0x4c1d95),
    };

    pub const STORM: Palette = Palette {
        sky_top: hex(0x0a0a0a),
        sky_bottom: hex(0x1f2937),
        city_back: hex(0x111827),
        city_front: hex(0x1f2937),
    };

    /// Storms override the time of day
    pub fn for_conditions(time_of_day: TimeOfDay, storming: bool) -> Self {
        if storming {
            return Self::STORM;
        }
        match time_of_day {
            TimeOfDay::Day => Self::DAY,
            TimeOfDay::Evening => Self::EVENING,
            TimeOfDay::Night => Self::NIGHT,
        }
    }
}
