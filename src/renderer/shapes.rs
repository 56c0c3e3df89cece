//! Triangle generation for 2D primitives
//!
//! Everything appends to a caller-owned vertex list in canvas pixels.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::{SpriteVertex, Vertex};

/// Segments for full ellipses (shadows, stars)
pub const ELLIPSE_SEGMENTS: u32 = 20;

fn push(out: &mut Vec<Vertex>, p: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(p.x, p.y, color));
}

/// Filled triangle
pub fn triangle(out: &mut Vec<Vertex>, pts: [Vec2; 3], color: [f32; 4]) {
    for p in pts {
        push(out, p, color);
    }
}

/// Filled quad from four corners in winding order
pub fn quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    triangle(out, [a, b, c], color);
    triangle(out, [a, c, d], color);
}

/// Axis-aligned rectangle
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: [f32; 4]) {
    let max = min + size;
    quad(
        out,
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
        color,
    );
}

/// Rectangle with a linear gradient, vertical (`horizontal = false`) or horizontal
pub fn gradient_rect(
    out: &mut Vec<Vertex>,
    min: Vec2,
    size: Vec2,
    from: [f32; 4],
    to: [f32; 4],
    horizontal: bool,
) {
    let max = min + size;
    let tl = Vec2::new(min.x, min.y);
    let tr = Vec2::new(max.x, min.y);
    let br = Vec2::new(max.x, max.y);
    let bl = Vec2::new(min.x, max.y);
    let (c_tl, c_tr, c_br, c_bl) = if horizontal {
        (from, to, to, from)
    } else {
        (from, from, to, to)
    };
    push(out, tl, c_tl);
    push(out, tr, c_tr);
    push(out, br, c_br);
    push(out, tl, c_tl);
    push(out, br, c_br);
    push(out, bl, c_bl);
}

/// Rectangle outline drawn as four bands centred on the edges
pub fn stroke_rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, width: f32, color: [f32; 4]) {
    let h = width / 2.0;
    let max = min + size;
    rect(out, Vec2::new(min.x - h, min.y - h), Vec2::new(size.x + width, width), color);
    rect(out, Vec2::new(min.x - h, max.y - h), Vec2::new(size.x + width, width), color);
    rect(out, Vec2::new(min.x - h, min.y + h), Vec2::new(width, size.y - width), color);
    rect(out, Vec2::new(max.x - h, min.y + h), Vec2::new(width, size.y - width), color);
}

/// Rectangle given in a local frame that is rotated by `angle` around `origin`
pub fn rotated_rect(
    out: &mut Vec<Vertex>,
    origin: Vec2,
    angle: f32,
    local_min: Vec2,
    size: Vec2,
    color: [f32; 4],
) {
    let rot = Vec2::from_angle(angle);
    let local_max = local_min + size;
    let corners = [
        local_min,
        Vec2::new(local_max.x, local_min.y),
        local_max,
        Vec2::new(local_min.x, local_max.y),
    ]
    .map(|c| origin + rot.rotate(c));
    quad(out, corners, color);
}

/// Line segment with thickness, square caps
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = dir.perp() * (width / 2.0);
    quad(out, [from + perp, to + perp, to - perp, from - perp], color);
}

/// Filled ellipse as a triangle fan
pub fn ellipse(out: &mut Vec<Vertex>, center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        push(out, center, color);
        push(
            out,
            center + Vec2::new(radii.x * theta1.cos(), radii.y * theta1.sin()),
            color,
        );
        push(
            out,
            center + Vec2::new(radii.x * theta2.cos(), radii.y * theta2.sin()),
            color,
        );
    }
}

/// Convex polygon as a triangle fan; fewer than three points draws nothing
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
    if points.len() < 3 {
        return;
    }
    for pair in points[1..].windows(2) {
        triangle(out, [points[0], pair[0], pair[1]], color);
    }
}

/// Textured quad centred on `center`, rotated by `angle`
pub fn sprite_quad(
    out: &mut Vec<SpriteVertex>,
    center: Vec2,
    size: Vec2,
    angle: f32,
    tint: [f32; 4],
) {
    let rot = Vec2::from_angle(angle);
    let h = size / 2.0;
    let corner = |x: f32, y: f32| center + rot.rotate(Vec2::new(x, y));
    let tl = corner(-h.x, -h.y);
    let tr = corner(h.x, -h.y);
    let br = corner(h.x, h.y);
    let bl = corner(-h.x, h.y);

    out.push(SpriteVertex::new(tl.x, tl.y, 0.0, 0.0, tint));
    out.push(SpriteVertex::new(tr.x, tr.y, 1.0, 0.0, tint));
    out.push(SpriteVertex::new(br.x, br.y, 1.0, 1.0, tint));
    out.push(SpriteVertex::new(tl.x, tl.y, 0.0, 0.0, tint));
    out.push(SpriteVertex::new(br.x, br.y, 1.0, 1.0, tint));
    out.push(SpriteVertex::new(bl.x, bl.y, 0.0, 1.0, tint));
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_rect_is_two_triangles() {
        let mut v = Vec::new();
        rect(&mut v, Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0), RED);
        assert_eq!(v.len(), 6);
        let xs: Vec<f32> = v.iter().map(|v| v.position[0]).collect();
        assert!(xs.iter().all(|&x| x == 10.0 || x == 40.0));
    }

    #[test]
    fn test_vertical_gradient_colors_rows() {
        let mut v = Vec::new();
        let top = [0.0; 4];
        let bottom = [1.0; 4];
        gradient_rect(&mut v, Vec2::ZERO, Vec2::new(10.0, 10.0), top, bottom, false);
        for vert in &v {
            let expected = if vert.position[1] == 0.0 { top } else { bottom };
            assert_eq!(vert.color, expected);
        }
    }

    #[test]
    fn test_ellipse_stays_inside_radii() {
        let mut v = Vec::new();
        ellipse(&mut v, Vec2::new(5.0, 5.0), Vec2::new(4.0, 2.0), RED, 16);
        assert_eq!(v.len(), 48);
        for vert in &v {
            let dx = (vert.position[0] - 5.0) / 4.0;
            let dy = (vert.position[1] - 5.0) / 2.0;
            assert!(dx * dx + dy * dy <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_degenerate_line_and_polygon_draw_nothing() {
        let mut v = Vec::new();
        line(&mut v, Vec2::ONE, Vec2::ONE, 3.0, RED);
        polygon(&mut v, &[Vec2::ZERO, Vec2::ONE], RED);
        assert!(v.is_empty());
    }

    #[test]
    fn test_line_has_requested_width() {
        let mut v = Vec::new();
        line(&mut v, Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, RED);
        let ys: Vec<f32> = v.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|&y| (y.abs() - 2.0).abs() < 1e-5));
    }

    #[test]
    fn test_rotated_rect_keeps_origin_offset() {
        let mut v = Vec::new();
        // Quarter turn maps local +x onto screen +y
        rotated_rect(
            &mut v,
            Vec2::new(100.0, 100.0),
            std::f32::consts::FRAC_PI_2,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 1.0),
            RED,
        );
        let max_y = v.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_sprite_quad_uv_corners() {
        let mut v = Vec::new();
        sprite_quad(&mut v, Vec2::new(50.0, 50.0), Vec2::new(20.0, 10.0), 0.0, [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [40.0, 45.0]);
        assert_eq!(v[0].uv, [0.0, 0.0]);
        assert_eq!(v[2].position, [60.0, 55.0]);
        assert_eq!(v[2].uv, [1.0, 1.0]);
    }
}
