//! Shape generation for particle variants
//!
//! Rotations are baked into the returned geometry so the surface never needs a
//! transform stack.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::sim::state::TrailPoint;

/// Spikes (outer + inner points) on a star particle
pub const STAR_POINTS: usize = 10;
/// Rotated segments around a quantum particle
pub const QUANTUM_SEGMENTS: usize = 8;

/// Star polygon around `center`, alternating outer (2r) and inner (0.8r) radii
pub fn star_polygon(center: Vec2, radius: f32, rotation: f32) -> Vec<Vec2> {
    (0..STAR_POINTS)
        .map(|i| {
            let angle = (i as f32 / STAR_POINTS as f32) * TAU + rotation;
            let r = if i % 2 == 0 { radius * 2.0 } else { radius * 0.8 };
            center + Vec2::from_angle(angle) * r
        })
        .collect()
}

/// One quantum segment: the local rectangle (-0.6r, -0.6r, 1.2r x 0.3r)
/// rotated by `angle` about `center`
pub fn quantum_segment(center: Vec2, radius: f32, angle: f32) -> [Vec2; 4] {
    let rot = Vec2::from_angle(angle);
    let min = Vec2::splat(-radius * 0.6);
    let size = Vec2::new(radius * 1.2, radius * 0.3);
    [
        min,
        min + Vec2::new(size.x, 0.0),
        min + size,
        min + Vec2::new(0.0, size.y),
    ]
    .map(|corner| center + rot.rotate(corner))
}

/// Rotation of quantum segment `index` (segments are pre-rotated by one step)
#[inline]
pub fn quantum_segment_angle(rotation: f32, index: usize) -> f32 {
    rotation + (index + 1) as f32 * TAU / QUANTUM_SEGMENTS as f32
}

/// A circle in a trail fan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailDot {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

/// Fan of shrinking, fading circles; index 0 (newest) is largest and brightest
pub fn trail_fan(trail: &[TrailPoint], render_size: f32, depth: f32) -> Vec<TrailDot> {
    let len = trail.len() as f32;
    trail
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let fade = 1.0 - i as f32 / len;
            TrailDot {
                center: point.pos,
                radius: render_size * fade * 0.6,
                alpha: fade * point.alpha * depth,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_alternates_radii() {
        let pts = star_polygon(Vec2::new(5.0, 5.0), 2.0, 0.0);
        assert_eq!(pts.len(), STAR_POINTS);
        for (i, p) in pts.iter().enumerate() {
            let r = p.distance(Vec2::new(5.0, 5.0));
            let expected = if i % 2 == 0 { 4.0 } else { 1.6 };
            assert!((r - expected).abs() < 1e-4, "point {} at radius {}", i, r);
        }
        // First spike points along +x when unrotated
        assert!((pts[0] - Vec2::new(9.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_star_rotation() {
        let pts = star_polygon(Vec2::ZERO, 1.0, std::f32::consts::FRAC_PI_2);
        assert!((pts[0] - Vec2::new(0.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn test_quantum_segment_unrotated() {
        let quad = quantum_segment(Vec2::new(10.0, 10.0), 10.0, 0.0);
        assert!((quad[0] - Vec2::new(4.0, 4.0)).length() < 1e-4);
        assert!((quad[2] - Vec2::new(16.0, 7.0)).length() < 1e-4);
    }

    #[test]
    fn test_quantum_segment_angles_cover_circle() {
        let last = quantum_segment_angle(0.0, QUANTUM_SEGMENTS - 1);
        assert!((last - TAU).abs() < 1e-5);
        let first = quantum_segment_angle(0.5, 0);
        assert!((first - (0.5 + TAU / 8.0)).abs() < 1e-6);
    }

    #[test]
    fn test_trail_fan_shrinks_and_fades() {
        let trail: Vec<TrailPoint> = (0..4)
            .map(|i| TrailPoint {
                pos: Vec2::new(i as f32, 0.0),
                alpha: 0.5,
            })
            .collect();
        let dots = trail_fan(&trail, 4.0, 1.0);
        assert_eq!(dots.len(), 4);
        for pair in dots.windows(2) {
            assert!(pair[0].radius > pair[1].radius);
            assert!(pair[0].alpha > pair[1].alpha);
        }
        assert!((dots[0].radius - 2.4).abs() < 1e-6);
        assert!((dots[0].alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_trail() {
        assert!(trail_fan(&[], 3.0, 1.0).is_empty());
    }
}
