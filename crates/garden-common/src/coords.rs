//! 2-D geometry helpers in screen space.
//!
//! Plant-local positions use the screen convention: `+x` right, `+y` down.
//! Angles are radians measured counter-clockwise from `+x`, so an angle of
//! `PI / 2` points straight up.

use glam::Vec2;

/// Angle of a stem growing straight up.
pub const UPRIGHT: f32 = std::f32::consts::FRAC_PI_2;

/// Unit direction for an angle, with y flipped so positive angles rise.
#[must_use]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), -angle.sin())
}

/// Point reached by travelling `distance` from `origin` along `angle`.
#[must_use]
pub fn polar_offset(origin: Vec2, angle: f32, distance: f32) -> Vec2 {
    origin + direction(angle) * distance
}

/// Vertical extent between two points, ignoring direction.
#[must_use]
pub fn height_between(a: Vec2, b: Vec2) -> f32 {
    (b.y - a.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_upright_points_up() {
        let tip = polar_offset(Vec2::ZERO, UPRIGHT, 10.0);
        assert!(tip.x.abs() < 1e-4);
        assert!((tip.y + 10.0).abs() < 1e-4);
        assert!((height_between(Vec2::ZERO, tip) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_distance_stays_put() {
        let origin = Vec2::new(3.0, -4.0);
        assert_eq!(polar_offset(origin, 1.3, 0.0), origin);
    }

    proptest! {
        #[test]
        fn proptest_offset_length_matches_distance(
            angle in -10.0f32..10.0,
            distance in 0.0f32..1000.0,
        ) {
            let tip = polar_offset(Vec2::ZERO, angle, distance);
            prop_assert!((tip.length() - distance).abs() <= distance * 1e-4 + 1e-3);
        }
    }
}
