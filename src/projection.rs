//! Fixed-camera perspective projection
//!
//! Maps a world point (lane offset, height, depth) onto the canvas with a single
//! divide: `scale = fov / (z + camera_distance)`. There is no view matrix; every
//! shape is drawn by projecting its corners independently and connecting them.

use glam::{Vec2, Vec3};

use crate::consts::*;

/// Camera model shared by the whole render pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera height above the ground plane
    pub height: f32,
    /// Camera distance behind the world origin along z
    pub distance: f32,
    /// Focal constant (pixels at unit depth)
    pub fov: f32,
    /// Screen Y of the horizon
    pub horizon_y: f32,
    /// Canvas width, used to center the road
    pub canvas_width: f32,
    /// Effective depth at or below which points are invisible
    pub near_plane: f32,
}

impl Camera {
    pub const DEFAULT: Camera = Camera {
        height: CAMERA_HEIGHT,
        distance: CAMERA_DISTANCE,
        fov: FOV,
        horizon_y: HORIZON_Y,
        canvas_width: CANVAS_WIDTH,
        near_plane: NEAR_PLANE,
    };

    /// Project a world point onto the canvas
    pub fn project(&self, p: Vec3) -> Projected {
        let depth = p.z + self.distance;
        if depth <= self.near_plane {
            return Projected::HIDDEN;
        }

        let scale = self.fov / depth;
        Projected {
            x: self.canvas_width / 2.0 + p.x * scale,
            // World y points up, screen y points down
            y: self.horizon_y + (self.height - p.y) * scale,
            scale,
            visible: true,
        }
    }

    /// Lowest world z that is still in front of the near plane
    pub fn min_visible_z(&self) -> f32 {
        self.near_plane - self.distance
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of projecting one world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub visible: bool,
}

impl Projected {
    pub const HIDDEN: Projected = Projected {
        x: 0.0,
        y: 0.0,
        scale: 0.0,
        visible: false,
    };

    #[inline]
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Project through the default camera
#[inline]
pub fn project(p: Vec3) -> Projected {
    Camera::DEFAULT.project(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_origin_projects_below_horizon_center() {
        let p = project(Vec3::ZERO);
        assert!(p.visible);
        assert!((p.x - CANVAS_WIDTH / 2.0).abs() < 1e-4);
        assert!((p.scale - FOV / CAMERA_DISTANCE).abs() < 1e-6);
        // Ground at camera height below the eye lands under the horizon
        assert!(p.y > HORIZON_Y);
    }

    #[test]
    fn test_near_plane_hides_point() {
        let at_near = project(Vec3::new(0.0, 0.0, NEAR_PLANE - CAMERA_DISTANCE));
        assert!(!at_near.visible);
        assert_eq!(at_near.scale, 0.0);

        let behind = project(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE - 50.0));
        assert!(!behind.visible);

        let just_in_front = project(Vec3::new(0.0, 0.0, NEAR_PLANE - CAMERA_DISTANCE + 0.5));
        assert!(just_in_front.visible);
    }

    #[test]
    fn test_spawn_distance_smaller_than_player_depth() {
        let far = project(Vec3::new(LANE_WIDTH, 0.0, SPAWN_DISTANCE));
        let near = project(Vec3::new(LANE_WIDTH, 0.0, PLAYER_Z));
        assert!(far.visible && near.visible);
        assert!(far.scale < near.scale);
    }

    #[test]
    fn test_taller_points_draw_higher() {
        let ground = project(Vec3::new(0.0, 0.0, 500.0));
        let raised = project(Vec3::new(0.0, 100.0, 500.0));
        assert!(raised.y < ground.y);
    }

    #[test]
    fn test_horizon_approached_at_distance() {
        let p = project(Vec3::new(0.0, CAMERA_HEIGHT, 1_000_000.0));
        assert!((p.y - HORIZON_Y).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_farther_is_smaller(
            x in -400.0f32..400.0,
            y in 0.0f32..300.0,
            z in (NEAR_PLANE - CAMERA_DISTANCE + 1.0)..SPAWN_DISTANCE,
            dz in 1.0f32..2000.0,
        ) {
            let near = project(Vec3::new(x, y, z));
            let far = project(Vec3::new(x, y, z + dz));
            prop_assert!(near.visible && far.visible);
            prop_assert!(far.scale < near.scale);
        }

        #[test]
        fn prop_lane_offset_is_symmetric(x in 0.0f32..500.0, z in 0.0f32..SPAWN_DISTANCE) {
            let left = project(Vec3::new(-x, 0.0, z));
            let right = project(Vec3::new(x, 0.0, z));
            let center = CANVAS_WIDTH / 2.0;
            prop_assert!(((center - left.x) - (right.x - center)).abs() < 1e-2);
            prop_assert!((left.y - right.y).abs() < 1e-4);
        }
    }
}
