use nalgebra::{UnitQuaternion, Vector3};

/// Wraps an angle in degrees into (-180, 180].
pub fn wrap_deg(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(360.0);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Signed shortest angular difference `to - from`, in (-180, 180] degrees.
pub fn delta_deg(from_deg: f64, to_deg: f64) -> f64 {
    wrap_deg(to_deg - from_deg)
}

/// Decomposes a rotation into intrinsic yaw-pitch-roll angles, in degrees.
///
/// Convention: `R = Ry(yaw) * Rx(pitch) * Rz(roll)`, right-handed, Y up.
/// Yaw and roll are in (-180, 180], pitch in [-90, 90]. Near gimbal lock
/// (|pitch| ~ 90 deg) roll is folded into yaw and reported as zero.
pub fn euler_yxz_deg(q: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    let m = q.to_rotation_matrix().into_inner();

    let sp = (-m[(1, 2)]).clamp(-1.0, 1.0);
    let pitch = sp.asin();

    let (yaw, roll) = if sp.abs() < 1.0 - 1e-9 {
        (
            m[(0, 2)].atan2(m[(2, 2)]),
            m[(1, 0)].atan2(m[(1, 1)]),
        )
    } else {
        // Gimbal lock: only yaw +/- roll is observable.
        ((-m[(2, 0)]).atan2(m[(0, 0)]), 0.0)
    };

    (yaw.to_degrees(), pitch.to_degrees(), roll.to_degrees())
}

/// Composes a rotation from intrinsic yaw-pitch-roll angles, in degrees.
/// Inverse of [`euler_yxz_deg`] away from gimbal lock.
pub fn quat_from_yxz_deg(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians())
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch_deg.to_radians())
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_deg() {
        assert_eq!(wrap_deg(0.0), 0.0);
        assert_eq!(wrap_deg(180.0), 180.0);
        assert_eq!(wrap_deg(-180.0), 180.0);
        assert_eq!(wrap_deg(190.0), -170.0);
        assert_eq!(wrap_deg(-190.0), 170.0);
        assert_eq!(wrap_deg(360.0), 0.0);
        assert_eq!(wrap_deg(725.0), 5.0);
        assert_eq!(wrap_deg(-725.0), -5.0);
    }

    #[test]
    fn test_delta_deg() {
        assert_eq!(delta_deg(10.0, 30.0), 20.0);
        assert_eq!(delta_deg(30.0, 10.0), -20.0);
        assert_eq!(delta_deg(350.0, 10.0), 20.0);
        assert_eq!(delta_deg(10.0, 350.0), -20.0);
        assert_eq!(delta_deg(-170.0, 170.0), -20.0);
    }

    #[test]
    fn test_euler_roundtrip() {
        let cases = [
            (0.0, 0.0, 0.0),
            (30.0, 0.0, 0.0),
            (0.0, 45.0, 0.0),
            (0.0, 0.0, -60.0),
            (120.0, -30.0, 75.0),
            (-170.0, 85.0, -120.0),
        ];

        for (yaw, pitch, roll) in cases {
            let q = quat_from_yxz_deg(yaw, pitch, roll);
            let (y, p, r) = euler_yxz_deg(&q);

            assert_relative_eq!(y, yaw, epsilon = 1e-9);
            assert_relative_eq!(p, pitch, epsilon = 1e-9);
            assert_relative_eq!(r, roll, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_euler_gimbal_lock_is_finite() {
        let q = quat_from_yxz_deg(40.0, 90.0, 0.0);
        let (y, p, r) = euler_yxz_deg(&q);

        assert!(y.is_finite() && p.is_finite() && r.is_finite());
        assert_relative_eq!(p, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_angles_in_wrapped_range() {
        let q = quat_from_yxz_deg(200.0, 0.0, 200.0);
        let (y, _, r) = euler_yxz_deg(&q);

        assert_relative_eq!(y, -160.0, epsilon = 1e-9);
        assert_relative_eq!(r, -160.0, epsilon = 1e-9);
    }
}
