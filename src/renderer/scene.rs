//! Frame composition
//!
//! Builds a display list for one frame from the read-only game state. The list
//! is in canvas pixels and painter's order; [`DisplayList::tessellate`] turns it
//! into vertex batches for the GPU.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::assets::{AssetTable, SpriteId};
use super::backdrop::{
    BACK_CITY_PARALLAX, BACK_LIGHTS, Backdrop, Building, FRONT_CITY_PARALLAX, FRONT_LIGHTS,
    LightPattern, Palette, STAR_PARALLAX,
};
use super::shapes;
use super::vertex::{SpriteVertex, Vertex, colors, with_alpha};
use crate::consts::*;
use crate::projection::{Camera, Projected};
use crate::settings::Settings;
use crate::sim::{CollectibleKind, Entity, EntityKind, GameState, Player};

/// One screen-space draw operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        min: Vec2,
        size: Vec2,
        color: [f32; 4],
    },
    Gradient {
        min: Vec2,
        size: Vec2,
        from: [f32; 4],
        to: [f32; 4],
        horizontal: bool,
    },
    StrokeRect {
        min: Vec2,
        size: Vec2,
        width: f32,
        color: [f32; 4],
    },
    Quad {
        corners: [Vec2; 4],
        color: [f32; 4],
    },
    Triangle {
        points: [Vec2; 3],
        color: [f32; 4],
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        color: [f32; 4],
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: [f32; 4],
    },
    /// Rectangle in a frame rotated by `angle` around `origin`
    RotatedRect {
        origin: Vec2,
        angle: f32,
        local_min: Vec2,
        size: Vec2,
        color: [f32; 4],
    },
    Sprite {
        id: SpriteId,
        center: Vec2,
        size: Vec2,
        angle: f32,
        alpha: f32,
    },
}

impl DrawCmd {
    /// Same command shifted by `d` pixels
    pub fn translated(self, d: Vec2) -> Self {
        match self {
            DrawCmd::Rect { min, size, color } => DrawCmd::Rect {
                min: min + d,
                size,
                color,
            },
            DrawCmd::Gradient {
                min,
                size,
                from,
                to,
                horizontal,
            } => DrawCmd::Gradient {
                min: min + d,
                size,
                from,
                to,
                horizontal,
            },
            DrawCmd::StrokeRect {
                min,
                size,
                width,
                color,
            } => DrawCmd::StrokeRect {
                min: min + d,
                size,
                width,
                color,
            },
            DrawCmd::Quad { corners, color } => DrawCmd::Quad {
                corners: corners.map(|c| c + d),
                color,
            },
            DrawCmd::Triangle { points, color } => DrawCmd::Triangle {
                points: points.map(|p| p + d),
                color,
            },
            DrawCmd::Ellipse {
                center,
                radii,
                color,
            } => DrawCmd::Ellipse {
                center: center + d,
                radii,
                color,
            },
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => DrawCmd::Line {
                from: from + d,
                to: to + d,
                width,
                color,
            },
            DrawCmd::RotatedRect {
                origin,
                angle,
                local_min,
                size,
                color,
            } => DrawCmd::RotatedRect {
                origin: origin + d,
                angle,
                local_min,
                size,
                color,
            },
            DrawCmd::Sprite {
                id,
                center,
                size,
                angle,
                alpha,
            } => DrawCmd::Sprite {
                id,
                center: center + d,
                size,
                angle,
                alpha,
            },
        }
    }
}

/// A contiguous run of vertices drawn with one pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Batch {
    Colored { first: u32, count: u32 },
    Sprite { id: SpriteId, first: u32, count: u32 },
}

/// Tessellated frame ready for upload
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub colored: Vec<Vertex>,
    pub sprites: Vec<SpriteVertex>,
    pub batches: Vec<Batch>,
}

impl Mesh {
    fn extend_colored(&mut self, first: usize) {
        let added = (self.colored.len() - first) as u32;
        if added == 0 {
            return;
        }
        if let Some(Batch::Colored { count, .. }) = self.batches.last_mut() {
            *count += added;
        } else {
            self.batches.push(Batch::Colored {
                first: first as u32,
                count: added,
            });
        }
    }

    fn extend_sprite(&mut self, sprite: SpriteId, first: usize) {
        let added = (self.sprites.len() - first) as u32;
        match self.batches.last_mut() {
            Some(Batch::Sprite { id, count, .. }) if *id == sprite => *count += added,
            _ => self.batches.push(Batch::Sprite {
                id: sprite,
                first: first as u32,
                count: added,
            }),
        }
    }
}

/// Ordered draw commands for one frame
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    cmds: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = DrawCmd>) {
        self.cmds.extend(cmds);
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Convert to triangles, merging neighbouring commands that share a pipeline
    pub fn tessellate(&self) -> Mesh {
        let mut mesh = Mesh::default();
        for cmd in &self.cmds {
            let first = mesh.colored.len();
            let out = &mut mesh.colored;
            match *cmd {
                DrawCmd::Rect { min, size, color } => shapes::rect(out, min, size, color),
                DrawCmd::Gradient {
                    min,
                    size,
                    from,
                    to,
                    horizontal,
                } => shapes::gradient_rect(out, min, size, from, to, horizontal),
                DrawCmd::StrokeRect {
                    min,
                    size,
                    width,
                    color,
                } => shapes::stroke_rect(out, min, size, width, color),
                DrawCmd::Quad { corners, color } => shapes::quad(out, corners, color),
                DrawCmd::Triangle { points, color } => shapes::triangle(out, points, color),
                DrawCmd::Ellipse {
                    center,
                    radii,
                    color,
                } => shapes::ellipse(out, center, radii, color, shapes::ELLIPSE_SEGMENTS),
                DrawCmd::Line {
                    from,
                    to,
                    width,
                    color,
                } => shapes::line(out, from, to, width, color),
                DrawCmd::RotatedRect {
                    origin,
                    angle,
                    local_min,
                    size,
                    color,
                } => shapes::rotated_rect(out, origin, angle, local_min, size, color),
                DrawCmd::Sprite {
                    id,
                    center,
                    size,
                    angle,
                    alpha,
                } => {
                    let first = mesh.sprites.len();
                    shapes::sprite_quad(&mut mesh.sprites, center, size, angle, [1.0, 1.0, 1.0, alpha]);
                    mesh.extend_sprite(id, first);
                    continue;
                }
            }
            mesh.extend_colored(first);
        }
        mesh
    }
}

/// Face colours of a procedural box
#[derive(Debug, Clone, Copy)]
struct BoxColors {
    front: [f32; 4],
    top: [f32; 4],
    side: [f32; 4],
}

impl BoxColors {
    const TRUCK_BODY: BoxColors = BoxColors {
        front: colors::TRUCK_BODY,
        top: colors::TRUCK_BODY_TOP,
        side: colors::TRUCK_BODY_SIDE,
    };
    const TRUCK_CABIN: BoxColors = BoxColors {
        front: colors::TRUCK_CABIN,
        top: colors::TRUCK_CABIN_TOP,
        side: colors::TRUCK_CABIN_SIDE,
    };
    const WHEEL: BoxColors = BoxColors {
        front: colors::WHEEL,
        top: colors::WHEEL_TOP,
        side: colors::WHEEL_SIDE,
    };

    fn collectible(kind: CollectibleKind) -> Self {
        let front = match kind {
            CollectibleKind::Bottle => colors::BOTTLE,
            CollectibleKind::Can => colors::CAN,
            CollectibleKind::Glass => colors::GLASS,
            _ => colors::WHITE,
        };
        BoxColors {
            front,
            top: colors::WHITE,
            side: front,
        }
    }
}

/// Either the player or an entity, for the depth sort
#[derive(Clone, Copy)]
enum Drawable<'a> {
    Player(&'a Player),
    Entity(&'a Entity),
}

impl Drawable<'_> {
    fn z(&self) -> f32 {
        match self {
            Drawable::Player(p) => p.pos.z,
            Drawable::Entity(e) => e.pos.z,
        }
    }
}

/// Bonus-mode HUD bar geometry
const BONUS_BAR_WIDTH: f32 = 200.0;
const BONUS_BAR_Y: f32 = 140.0;

/// Per-page renderer state: camera, backdrop and the shake jitter source
pub struct Scene {
    camera: Camera,
    backdrop: Backdrop,
    /// Kept apart from the simulation rng so drawing never perturbs a run
    jitter: Pcg32,
}

impl Scene {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let backdrop = Backdrop::generate(&mut rng);
        Self {
            camera: Camera::DEFAULT,
            backdrop,
            jitter: rng,
        }
    }

    /// Compose one frame; `time_ms` drives idle animation only
    pub fn build(
        &mut self,
        state: &GameState,
        settings: &Settings,
        assets: &AssetTable,
        time_ms: f64,
    ) -> DisplayList {
        let mut list = DisplayList::new();
        self.background(&mut list, state, settings, assets);

        let mut world = DisplayList::new();
        self.road(&mut world, state);
        self.entities(&mut world, state, assets, time_ms);
        if settings.cash_particles {
            self.cash(&mut world, state);
        }

        let shake = self.shake_offset(state, settings);
        list.extend(world.cmds.into_iter().map(|c| c.translated(shake)));

        overlays(&mut list, state, settings, time_ms);
        list
    }

    fn project(&self, x: f32, y: f32, z: f32) -> Projected {
        self.camera.project(Vec3::new(x, y, z))
    }

    fn shake_offset(&mut self, state: &GameState, settings: &Settings) -> Vec2 {
        if state.screen_shake == 0 || !settings.effective_screen_shake() {
            return Vec2::ZERO;
        }
        let mag = state.screen_shake as f32 * 0.5;
        Vec2::new(
            (self.jitter.random::<f32>() - 0.5) * mag,
            (self.jitter.random::<f32>() - 0.5) * mag,
        )
    }

    // === Background ===

    fn background(
        &self,
        list: &mut DisplayList,
        state: &GameState,
        settings: &Settings,
        assets: &AssetTable,
    ) {
        let storming = state.weather.storming;
        let palette = Palette::for_conditions(state.time_of_day, storming);
        let canvas = Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT);

        if assets.contains(SpriteId::Background) && !storming {
            list.push(DrawCmd::Sprite {
                id: SpriteId::Background,
                center: canvas / 2.0,
                size: canvas,
                angle: 0.0,
                alpha: 1.0,
            });
        } else {
            list.push(DrawCmd::Gradient {
                min: Vec2::ZERO,
                size: Vec2::new(CANVAS_WIDTH, HORIZON_Y),
                from: palette.sky_top,
                to: palette.sky_bottom,
                horizontal: false,
            });
        }

        if state.weather.lightning_flash > 0 && settings.effective_lightning_flash() {
            list.push(DrawCmd::Rect {
                min: Vec2::ZERO,
                size: canvas,
                color: with_alpha(colors::WHITE, state.weather.flash_intensity() * 0.8),
            });
        }

        let player_x = state.player.pos.x;
        if settings.quality.starfield_enabled() {
            let dx = -player_x * STAR_PARALLAX;
            for s in &self.backdrop.stars {
                list.push(DrawCmd::Ellipse {
                    center: Vec2::new(s.x + dx, s.y),
                    radii: Vec2::splat(s.size),
                    color: with_alpha(colors::WHITE, s.opacity),
                });
            }
        }

        let lights = settings.quality.city_lights();
        skyline(
            list,
            &self.backdrop.back_city,
            -player_x * BACK_CITY_PARALLAX,
            palette.city_back,
            lights.then_some(&BACK_LIGHTS),
        );
        skyline(
            list,
            &self.backdrop.front_city,
            -player_x * FRONT_CITY_PARALLAX,
            palette.city_front,
            lights.then_some(&FRONT_LIGHTS),
        );

        list.push(DrawCmd::Rect {
            min: Vec2::new(0.0, HORIZON_Y),
            size: Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT - HORIZON_Y),
            color: colors::GROUND,
        });
    }

    // === World ===

    fn road(&self, list: &mut DisplayList, state: &GameState) {
        let half = LANE_WIDTH * 3.0 / 2.0;
        // Just inside the near plane so the trapezoid reaches the screen bottom
        let z_near = self.camera.min_visible_z() + 1.0;
        let near_l = self.project(-half, 0.0, z_near);
        let near_r = self.project(half, 0.0, z_near);
        let far_l = self.project(-half, 0.0, SPAWN_DISTANCE);
        let far_r = self.project(half, 0.0, SPAWN_DISTANCE);
        if near_l.visible && near_r.visible {
            list.push(DrawCmd::Quad {
                corners: [near_l.point(), near_r.point(), far_r.point(), far_l.point()],
                color: colors::ROAD,
            });
        }

        let cutoff = -CAMERA_DISTANCE + 50.0;
        if state.bonus.active {
            // One solid gold centre line
            let mut z = -200.0;
            while z < SPAWN_DISTANCE {
                let z_pos = z - state.road_offset;
                z += 50.0;
                if z_pos < cutoff {
                    continue;
                }
                self.marker(list, 0.0, z_pos, 40.0, 6.0, 2.0, colors::GOLD);
            }
        } else {
            let dividers = [
                LANE_X_POSITIONS[0] + LANE_WIDTH / 2.0,
                LANE_X_POSITIONS[1] + LANE_WIDTH / 2.0,
            ];
            for x in dividers {
                let mut z = -200.0;
                while z < SPAWN_DISTANCE {
                    let z_pos = z - state.road_offset;
                    z += ROAD_MARKER_PERIOD;
                    if z_pos < cutoff {
                        continue;
                    }
                    self.marker(list, x, z_pos, 200.0, 4.0, 1.0, colors::NEON_PURPLE);
                }
            }
        }
    }

    /// A glowing dash on the road surface
    #[allow(clippy::too_many_arguments)]
    fn marker(
        &self,
        list: &mut DisplayList,
        x: f32,
        z: f32,
        length: f32,
        width: f32,
        min_width: f32,
        color: [f32; 4],
    ) {
        let p1 = self.project(x, 0.0, z);
        let p2 = self.project(x, 0.0, z + length);
        if !(p1.visible && p2.visible) {
            return;
        }
        let width = (width * p1.scale).max(min_width);
        list.push(DrawCmd::Line {
            from: p1.point(),
            to: p2.point(),
            width: width * 3.0,
            color: with_alpha(color, 0.25),
        });
        list.push(DrawCmd::Line {
            from: p1.point(),
            to: p2.point(),
            width,
            color,
        });
    }

    fn entities(&self, list: &mut DisplayList, state: &GameState, assets: &AssetTable, time_ms: f64) {
        let mut items: Vec<Drawable<'_>> = state
            .entities
            .iter()
            .filter(|e| !e.collected)
            .map(Drawable::Entity)
            .collect();
        items.push(Drawable::Player(&state.player));
        // Far to near; stable so equal depths keep creation order
        items.sort_by(|a, b| b.z().total_cmp(&a.z()));

        for item in items {
            match item {
                Drawable::Player(p) => self.player(list, p, assets),
                Drawable::Entity(e) => self.entity(list, e, assets, time_ms),
            }
        }
    }

    fn player(&self, list: &mut DisplayList, p: &Player, assets: &AssetTable) {
        if let Some(id) = assets.resolve(&SpriteId::PLAYER_CANDIDATES) {
            self.grounded_sprite(list, id, p.pos, p.size.x, p.size.y);
            return;
        }

        let shadow = self.project(p.pos.x, 0.0, p.pos.z);
        if shadow.visible {
            list.push(DrawCmd::Ellipse {
                center: shadow.point(),
                radii: Vec2::new(p.size.x * shadow.scale, p.size.x * 0.4 * shadow.scale),
                color: colors::TRUCK_SHADOW,
            });
        }

        let Vec3 { x, y, z } = p.pos;
        let (w, h, d) = (p.size.x, p.size.y, p.size.z);
        self.cube(list, Vec3::new(x, y + 20.0, z), Vec3::new(w, h * 0.6, d), BoxColors::TRUCK_BODY);
        self.cube(
            list,
            Vec3::new(x, y + h * 0.6, z - 20.0),
            Vec3::new(w * 0.9, h * 0.4, d * 0.4),
            BoxColors::TRUCK_CABIN,
        );
        let wx = w / 2.0 + 5.0;
        for (dx, dz) in [(-wx, -25.0), (wx, -25.0), (-wx, 25.0), (wx, 25.0)] {
            self.cube(
                list,
                Vec3::new(x + dx, y + 10.0, z + dz),
                Vec3::new(12.0, 22.0, 25.0),
                BoxColors::WHEEL,
            );
        }
    }

    fn entity(&self, list: &mut DisplayList, e: &Entity, assets: &AssetTable, time_ms: f64) {
        let sprite = assets.resolve(SpriteId::candidates_for(e.kind));
        match (e.kind, sprite) {
            (EntityKind::Obstacle(_), Some(id)) => {
                self.grounded_sprite(list, id, e.pos, e.size.x, e.size.y);
            }
            (EntityKind::Obstacle(_), None) => {
                let p = self.project(e.pos.x, e.size.y / 2.0, e.pos.z);
                if p.visible {
                    let size = Vec2::new(e.size.x, e.size.y) * p.scale;
                    list.push(DrawCmd::Rect {
                        min: p.point() - size / 2.0,
                        size,
                        color: colors::OBSTACLE,
                    });
                }
            }
            (EntityKind::Collectible(_), Some(id)) => {
                let bounce = ((time_ms / 200.0).sin() * 8.0) as f32;
                let sway = ((time_ms / 500.0).sin() * 0.1) as f32;
                let p = self.project(e.pos.x, e.pos.y + e.size.y / 2.0 + bounce, e.pos.z);
                if p.visible {
                    list.push(DrawCmd::Sprite {
                        id,
                        center: p.point(),
                        size: Vec2::new(e.size.x, e.size.y) * p.scale,
                        angle: sway,
                        alpha: 1.0,
                    });
                }
            }
            (EntityKind::Collectible(kind), None) => {
                let bounce = ((time_ms / 300.0).sin() * 5.0) as f32;
                self.cube(
                    list,
                    Vec3::new(e.pos.x, e.pos.y + 10.0 + bounce, e.pos.z),
                    e.size,
                    BoxColors::collectible(kind),
                );
            }
        }
    }

    /// Sprite standing on the ground plane with a shadow ellipse under it
    fn grounded_sprite(&self, list: &mut DisplayList, id: SpriteId, pos: Vec3, w: f32, h: f32) {
        let p = self.project(pos.x, pos.y + h / 2.0, pos.z);
        if !p.visible {
            return;
        }
        let size = Vec2::new(w, h) * p.scale;

        let shadow = self.project(pos.x, 0.0, pos.z);
        if shadow.visible {
            list.push(DrawCmd::Ellipse {
                center: shadow.point(),
                radii: Vec2::new(size.x / 2.0, size.x / 5.0),
                color: colors::SHADOW,
            });
        }

        list.push(DrawCmd::Sprite {
            id,
            center: p.point(),
            size,
            angle: 0.0,
            alpha: 1.0,
        });
    }

    /// Box with its base centred at `base`; only the faces the camera can see
    fn cube(&self, list: &mut DisplayList, base: Vec3, size: Vec3, colors: BoxColors) {
        let Vec3 { x, y, z } = base;
        let (hw, hd, h) = (size.x / 2.0, size.z / 2.0, size.y);

        let f_bottom_l = self.project(x - hw, y, z - hd);
        if !f_bottom_l.visible {
            return;
        }
        let f_bottom_r = self.project(x + hw, y, z - hd).point();
        let f_top_l = self.project(x - hw, y + h, z - hd).point();
        let f_top_r = self.project(x + hw, y + h, z - hd).point();
        let b_bottom_l = self.project(x - hw, y, z + hd).point();
        let b_bottom_r = self.project(x + hw, y, z + hd).point();
        let b_top_l = self.project(x - hw, y + h, z + hd).point();
        let b_top_r = self.project(x + hw, y + h, z + hd).point();
        let f_bottom_l = f_bottom_l.point();

        list.push(DrawCmd::Quad {
            corners: [f_top_l, f_top_r, b_top_r, b_top_l],
            color: colors.top,
        });
        // Left of centre shows its right face and vice versa
        if x < 0.0 {
            list.push(DrawCmd::Quad {
                corners: [f_top_r, f_bottom_r, b_bottom_r, b_top_r],
                color: colors.side,
            });
        }
        if x > 0.0 {
            list.push(DrawCmd::Quad {
                corners: [f_top_l, f_bottom_l, b_bottom_l, b_top_l],
                color: colors.side,
            });
        }
        list.push(DrawCmd::Quad {
            corners: [f_bottom_l, f_bottom_r, f_top_r, f_top_l],
            color: colors.front,
        });
    }

    fn cash(&self, list: &mut DisplayList, state: &GameState) {
        for bill in &state.cash {
            let p = self.camera.project(bill.pos);
            if !p.visible {
                continue;
            }
            let size = 25.0 * bill.scale * p.scale;
            let alpha = (bill.life * 2.0).min(1.0);
            list.push(DrawCmd::RotatedRect {
                origin: p.point(),
                angle: bill.rotation,
                local_min: Vec2::new(-size, -size / 2.5),
                size: Vec2::new(size * 2.0, size),
                color: with_alpha(colors::NEON_GREEN, alpha),
            });
            list.push(DrawCmd::RotatedRect {
                origin: p.point(),
                angle: bill.rotation,
                local_min: Vec2::new(-size * 0.8, -size / 4.0),
                size: Vec2::new(size * 1.6, size * 0.7),
                color: with_alpha(colors::NEON_GREEN_DARK, alpha),
            });
        }
    }
}

fn skyline(
    list: &mut DisplayList,
    buildings: &[Building],
    dx: f32,
    color: [f32; 4],
    lights: Option<&LightPattern>,
) {
    for b in buildings {
        list.push(DrawCmd::Rect {
            min: Vec2::new(b.x + dx, HORIZON_Y - b.h),
            size: Vec2::new(b.w, b.h),
            color,
        });
        let Some(pattern) = lights else { continue };
        for light in b.lights(pattern) {
            let g = pattern.glow;
            list.push(DrawCmd::Rect {
                min: Vec2::new(light.x + dx - g, light.y - g),
                size: Vec2::new(light.w + 2.0 * g, light.h + 2.0 * g),
                color: with_alpha(light.color, 0.35),
            });
            list.push(DrawCmd::Rect {
                min: Vec2::new(light.x + dx, light.y),
                size: Vec2::new(light.w, light.h),
                color: light.color,
            });
        }
    }
}

// === Screen-space overlays ===

fn overlays(list: &mut DisplayList, state: &GameState, settings: &Settings, time_ms: f64) {
    if state.weather.storming {
        for drop in state
            .weather
            .raindrops
            .iter()
            .step_by(settings.quality.rain_stride())
        {
            list.push(DrawCmd::Line {
                from: Vec2::new(drop.x, drop.y),
                to: Vec2::new(drop.x - drop.length * 0.3, drop.y + drop.length),
                width: 1.0,
                color: colors::RAIN,
            });
        }
    }

    let charges = state.jump.charges;
    if charges > 0 {
        let origin = Vec2::new(20.0, CANVAS_HEIGHT - 60.0);
        list.push(DrawCmd::Rect {
            min: origin - Vec2::splat(5.0),
            size: Vec2::new(130.0, 50.0),
            color: colors::PANEL,
        });
        list.push(DrawCmd::Rect {
            min: origin + Vec2::new(0.0, 10.0),
            size: Vec2::new(45.0, 6.0),
            color: colors::NEON_GREEN,
        });
        for i in 0..charges {
            let x = origin.x + 60.0 + i as f32 * 25.0;
            list.push(DrawCmd::Triangle {
                points: [
                    Vec2::new(x, origin.y + 25.0),
                    Vec2::new(x + 10.0, origin.y + 5.0),
                    Vec2::new(x + 20.0, origin.y + 25.0),
                ],
                color: colors::NEON_PURPLE,
            });
        }
    }

    if state.bonus.active {
        let progress = state.bonus.remaining();
        let pulse = ((time_ms / 100.0).sin() * 0.3 + 0.7) as f32;
        let bar_x = (CANVAS_WIDTH - BONUS_BAR_WIDTH) / 2.0;
        let panel_min = Vec2::new(bar_x - 10.0, BONUS_BAR_Y - 30.0);
        let panel_size = Vec2::new(BONUS_BAR_WIDTH + 20.0, 60.0);
        let track_min = Vec2::new(bar_x, BONUS_BAR_Y + 5.0);
        let track_size = Vec2::new(BONUS_BAR_WIDTH, 15.0);

        list.push(DrawCmd::Rect {
            min: panel_min,
            size: panel_size,
            color: colors::PANEL_DARK,
        });
        list.push(DrawCmd::StrokeRect {
            min: panel_min,
            size: panel_size,
            width: 2.0,
            color: with_alpha(colors::GOLD, pulse),
        });
        list.push(DrawCmd::Rect {
            min: track_min,
            size: track_size,
            color: colors::BAR_TRACK,
        });
        if progress > 0.0 {
            list.push(DrawCmd::Gradient {
                min: track_min,
                size: Vec2::new(BONUS_BAR_WIDTH * progress, track_size.y),
                from: colors::GOLD,
                to: colors::GOLD_DEEP,
                horizontal: true,
            });
        }
        list.push(DrawCmd::StrokeRect {
            min: track_min,
            size: track_size,
            width: 2.0,
            color: colors::GOLD,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::assets::SpriteImage;
    use crate::settings::QualityPreset;
    use crate::sim::{ObstacleKind, Raindrop, TimeOfDay};

    fn image() -> SpriteImage {
        SpriteImage {
            width: 2,
            height: 2,
            rgba: vec![255; 16],
        }
    }

    fn playing() -> GameState {
        let mut state = GameState::new(5);
        // Night skyline colours never collide with the entity palette
        state.time_of_day = TimeOfDay::Night;
        state.start_run(5);
        state.entities.clear();
        state
    }

    fn push_entity(state: &mut GameState, kind: EntityKind, lane: usize, z: f32) {
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, kind, lane, z));
    }

    fn sprites(list: &DisplayList) -> Vec<SpriteId> {
        list.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Sprite { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn lines_of(list: &DisplayList, color: [f32; 4]) -> usize {
        list.commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { color: c, .. } if *c == color))
            .count()
    }

    fn has_rect(list: &DisplayList, color: [f32; 4]) -> bool {
        list.commands()
            .iter()
            .any(|c| matches!(c, DrawCmd::Rect { color: c, .. } if *c == color))
    }

    fn has_quad(list: &DisplayList, color: [f32; 4]) -> bool {
        list.commands()
            .iter()
            .any(|c| matches!(c, DrawCmd::Quad { color: c, .. } if *c == color))
    }

    #[test]
    fn test_obstacle_falls_back_sprite_then_rect() {
        let mut state = playing();
        push_entity(&mut state, EntityKind::Obstacle(ObstacleKind::Ellison), 0, 1500.0);
        let settings = Settings::default();
        let mut scene = Scene::new(1);

        let mut assets = AssetTable::new();
        let bare = scene.build(&state, &settings, &assets, 0.0);
        assert!(has_rect(&bare, colors::OBSTACLE));

        assets.insert(SpriteId::TrashCan, image());
        let with_can = scene.build(&state, &settings, &assets, 0.0);
        assert!(!has_rect(&with_can, colors::OBSTACLE));
        assert!(sprites(&with_can).contains(&SpriteId::TrashCan));

        assets.insert(SpriteId::Ellison, image());
        let with_art = scene.build(&state, &settings, &assets, 0.0);
        assert!(sprites(&with_art).contains(&SpriteId::Ellison));
        assert!(!sprites(&with_art).contains(&SpriteId::TrashCan));
    }

    #[test]
    fn test_collectible_without_art_is_a_box() {
        let mut state = playing();
        push_entity(&mut state, EntityKind::Collectible(CollectibleKind::Bottle), 2, 800.0);
        let mut scene = Scene::new(1);
        let list = scene.build(&state, &Settings::default(), &AssetTable::new(), 0.0);
        assert!(has_quad(&list, colors::BOTTLE));
        // Top face is always white
        assert!(has_quad(&list, colors::WHITE));
    }

    #[test]
    fn test_player_without_art_is_procedural_truck() {
        let state = playing();
        let mut scene = Scene::new(1);
        let list = scene.build(&state, &Settings::default(), &AssetTable::new(), 0.0);
        assert!(has_quad(&list, colors::TRUCK_BODY));
        assert!(has_quad(&list, colors::TRUCK_CABIN));
        assert!(sprites(&list).is_empty());
    }

    #[test]
    fn test_entities_draw_far_to_near() {
        let mut state = playing();
        push_entity(&mut state, EntityKind::Collectible(CollectibleKind::Gameboy), 0, 100.0);
        push_entity(&mut state, EntityKind::Obstacle(ObstacleKind::Ellison), 2, 1000.0);

        let mut assets = AssetTable::new();
        for id in [SpriteId::Gameboy, SpriteId::Ellison, SpriteId::Player] {
            assets.insert(id, image());
        }
        let mut scene = Scene::new(1);
        let list = scene.build(&state, &Settings::default(), &assets, 0.0);
        assert_eq!(
            sprites(&list),
            vec![SpriteId::Ellison, SpriteId::Player, SpriteId::Gameboy]
        );
    }

    #[test]
    fn test_collected_entities_are_not_drawn() {
        let mut state = playing();
        push_entity(&mut state, EntityKind::Collectible(CollectibleKind::Gameboy), 0, 500.0);
        state.entities[0].collected = true;
        let mut assets = AssetTable::new();
        assets.insert(SpriteId::Gameboy, image());
        let mut scene = Scene::new(1);
        let list = scene.build(&state, &Settings::default(), &assets, 0.0);
        assert!(!sprites(&list).contains(&SpriteId::Gameboy));
    }

    #[test]
    fn test_bonus_mode_swaps_lane_markers() {
        let mut state = playing();
        let settings = Settings::default();
        let assets = AssetTable::new();
        let mut scene = Scene::new(1);

        let normal = scene.build(&state, &settings, &assets, 0.0);
        assert!(lines_of(&normal, colors::NEON_PURPLE) > 0);
        assert_eq!(lines_of(&normal, colors::GOLD), 0);

        state.bonus.activate(600.0);
        let bonus = scene.build(&state, &settings, &assets, 0.0);
        assert_eq!(lines_of(&bonus, colors::NEON_PURPLE), 0);
        assert!(lines_of(&bonus, colors::GOLD) > 0);
        // HUD timer bar is full right after activation
        assert!(bonus.commands().iter().any(|c| matches!(
            c,
            DrawCmd::Gradient { size, horizontal: true, .. } if (size.x - BONUS_BAR_WIDTH).abs() < 1e-3
        )));
    }

    #[test]
    fn test_low_quality_thins_rain() {
        let mut state = playing();
        state.weather.storming = true;
        state.weather.raindrops = (0..RAINDROP_COUNT)
            .map(|i| Raindrop {
                x: i as f32 * 5.0,
                y: 10.0,
                speed: 10.0,
                length: 15.0,
            })
            .collect();
        let mut scene = Scene::new(1);
        let assets = AssetTable::new();

        let medium = scene.build(&state, &Settings::default(), &assets, 0.0);
        assert_eq!(lines_of(&medium, colors::RAIN), RAINDROP_COUNT);

        let mut low = Settings::default();
        low.quality = QualityPreset::Low;
        let thinned = scene.build(&state, &low, &assets, 0.0);
        assert_eq!(lines_of(&thinned, colors::RAIN), RAINDROP_COUNT.div_ceil(3));
    }

    #[test]
    fn test_flash_respects_reduced_motion() {
        let mut state = playing();
        state.weather.lightning_flash = LIGHTNING_FLASH_TICKS;
        let flash = with_alpha(colors::WHITE, 0.8);
        let mut scene = Scene::new(1);
        let assets = AssetTable::new();

        let list = scene.build(&state, &Settings::default(), &assets, 0.0);
        assert!(has_rect(&list, flash));

        let mut calm = Settings::default();
        calm.reduced_motion = true;
        let list = scene.build(&state, &calm, &assets, 0.0);
        assert!(!has_rect(&list, flash));
    }

    #[test]
    fn test_jump_panel_shows_one_icon_per_charge() {
        let mut state = playing();
        state.jump.grant(3);
        let mut scene = Scene::new(1);
        let list = scene.build(&state, &Settings::default(), &AssetTable::new(), 0.0);
        let icons = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::Triangle { .. }))
            .count();
        assert_eq!(icons, 3);
    }

    #[test]
    fn test_tessellate_batches_by_pipeline() {
        let mut list = DisplayList::new();
        list.push(DrawCmd::Rect {
            min: Vec2::ZERO,
            size: Vec2::ONE,
            color: colors::WHITE,
        });
        list.push(DrawCmd::Rect {
            min: Vec2::ONE,
            size: Vec2::ONE,
            color: colors::BLACK,
        });
        for _ in 0..2 {
            list.push(DrawCmd::Sprite {
                id: SpriteId::Oscar,
                center: Vec2::ZERO,
                size: Vec2::ONE,
                angle: 0.0,
                alpha: 1.0,
            });
        }
        list.push(DrawCmd::Sprite {
            id: SpriteId::Lexnode,
            center: Vec2::ZERO,
            size: Vec2::ONE,
            angle: 0.0,
            alpha: 1.0,
        });
        list.push(DrawCmd::Triangle {
            points: [Vec2::ZERO, Vec2::X, Vec2::Y],
            color: colors::GOLD,
        });

        let mesh = list.tessellate();
        assert_eq!(
            mesh.batches,
            vec![
                Batch::Colored { first: 0, count: 12 },
                Batch::Sprite {
                    id: SpriteId::Oscar,
                    first: 0,
                    count: 12
                },
                Batch::Sprite {
                    id: SpriteId::Lexnode,
                    first: 12,
                    count: 6
                },
                Batch::Colored { first: 12, count: 3 },
            ]
        );
        assert_eq!(mesh.colored.len(), 15);
        assert_eq!(mesh.sprites.len(), 18);
    }

    #[test]
    fn test_shake_moves_world_but_not_hud() {
        let mut state = playing();
        state.jump.grant(1);
        let settings = Settings::default();
        let assets = AssetTable::new();
        let mut scene = Scene::new(9);
        let still = scene.build(&state, &settings, &assets, 0.0);

        state.screen_shake = HIT_SHAKE;
        let shaken = scene.build(&state, &settings, &assets, 0.0);
        assert_eq!(still.len(), shaken.len());

        let road = |l: &DisplayList| {
            l.commands()
                .iter()
                .find(|c| matches!(c, DrawCmd::Quad { color, .. } if *color == colors::ROAD))
                .cloned()
        };
        assert_ne!(road(&still), road(&shaken));

        let panel = |l: &DisplayList| {
            l.commands()
                .iter()
                .find(|c| matches!(c, DrawCmd::Rect { color, .. } if *color == colors::PANEL))
                .cloned()
        };
        assert_eq!(panel(&still), panel(&shaken));
    }
}
