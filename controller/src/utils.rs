use std::f32::consts::{PI, TAU};

use crate::YAW_EPS;

/// Yaw (about +Y) that faces the planar direction `(x, z)`, with yaw 0 facing +Z.
///
/// Returns `None` when the direction is too short to define a heading.
pub fn yaw_from_xz(x: f32, z: f32) -> Option<f32> {
    if x * x + z * z > YAW_EPS {
        return Some(x.atan2(z));
    }

    None
}

/// Wrap an angle into `[-PI, PI)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Signed shortest rotation taking `from` to `to`, within `[-PI, PI)`.
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Move `current` toward `target` by `fraction` of the remaining gap.
#[inline]
pub fn approach(current: f32, target: f32, fraction: f32) -> f32 {
    current + (target - current) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_zero_faces_positive_z() {
        assert_eq!(yaw_from_xz(0.0, 1.0), Some(0.0));
        let east = yaw_from_xz(1.0, 0.0).unwrap();
        assert!((east - PI / 2.0).abs() < 1.0e-6);
        assert!(yaw_from_xz(0.0, 0.0).is_none());
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for a in [-10.0_f32, -PI, -1.0, 0.0, 1.0, PI - 0.01, 7.0, 100.0] {
            let w = wrap_angle(a);
            assert!((-PI..PI).contains(&w), "{a} wrapped to {w}");
            // Same direction as the input.
            assert!((w.sin() - a.sin()).abs() < 1.0e-3);
            assert!((w.cos() - a.cos()).abs() < 1.0e-3);
        }
    }

    #[test]
    fn shortest_delta_crosses_the_seam() {
        // From just below +PI to just above -PI is a small positive turn.
        let d = shortest_angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1.0e-5);

        let d = shortest_angle_delta(-PI + 0.1, PI - 0.1);
        assert!((d + 0.2).abs() < 1.0e-5);
    }

    #[test]
    fn approach_moves_by_fraction_of_gap() {
        assert!((approach(0.0, 1.9, 0.15) - 0.285).abs() < 1.0e-6);
        assert_eq!(approach(2.0, 2.0, 0.15), 2.0);
    }
}
