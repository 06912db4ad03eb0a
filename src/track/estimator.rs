use nalgebra::{UnitQuaternion, Vector3};

use crate::{
    math::angles::{delta_deg, euler_yxz_deg},
    track::calibration::CalibrationFrame,
};

/// Tilt is clamped here before the tangent, keeping the sway bounded by
/// `tan(89.9 deg) * L` for any input orientation.
pub const MAX_TILT_DEG: f64 = 89.9;

/// Roll offsets below this are treated as "sensor mounted straight".
const MOUNT_OFFSET_EPS_DEG: f64 = 0.1;

/// Parameters of the pendulum model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorParams {
    /// Pendulum length L: fixed vertical drop from anchor to body (m).
    pub pendulum_length_m: f64,

    /// Fixed roll applied around the sensor's own forward axis, so a
    /// side-mounted sensor reads level. Typically -90 or +90.
    pub mounting_roll_offset_deg: f64,

    /// Optional cap on the horizontal sway magnitude (m). `None` disables
    /// the clamp.
    pub max_sway_radius_m: Option<f64>,
}

impl EstimatorParams {
    pub fn new(pendulum_length_m: f64) -> Self {
        EstimatorParams {
            pendulum_length_m,
            mounting_roll_offset_deg: 0.0,
            max_sway_radius_m: None,
        }
    }
}

/// Applies the mounting roll offset to a raw sensor orientation.
///
/// The rotation is composed on the right so it acts about the sensor's own
/// forward axis, not the world's.
pub fn mount_adjusted(raw: &UnitQuaternion<f64>, roll_offset_deg: f64) -> UnitQuaternion<f64> {
    if roll_offset_deg.abs() > MOUNT_OFFSET_EPS_DEG {
        raw * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll_offset_deg.to_radians())
    } else {
        *raw
    }
}

/// Pendulum position estimate: pure function of the current orientation,
/// the calibration frame, the anchor position and the model parameters.
///
/// Tilt relative to the neutral pose displaces the body horizontally by
/// `tan(tilt) * L` (exact tangent model, not a small-angle approximation);
/// the local sway is then rotated into world space by the yaw travelled
/// since calibration, and the body hangs L below the anchor.
pub fn compute(
    raw: &UnitQuaternion<f64>,
    frame: &CalibrationFrame,
    anchor_m: &Vector3<f64>,
    params: &EstimatorParams,
) -> Vector3<f64> {
    let length = params.pendulum_length_m;
    let oriented = mount_adjusted(raw, params.mounting_roll_offset_deg);

    // Pitch and roll relative to the neutral pose.
    let relative = frame.neutral_pitch_roll.inverse() * oriented;
    let (_, pitch_deg, roll_deg) = euler_yxz_deg(&relative);

    // Tangent blows up at 90 deg; clamp well before the singularity.
    let pitch_deg = pitch_deg.clamp(-MAX_TILT_DEG, MAX_TILT_DEG);
    let roll_deg = roll_deg.clamp(-MAX_TILT_DEG, MAX_TILT_DEG);

    let sway_z = pitch_deg.to_radians().tan() * length;
    let sway_x = roll_deg.to_radians().tan() * length;

    // Heading travelled since calibration rotates local sway into world.
    let (yaw_deg, _, _) = euler_yxz_deg(&oriented);
    let yaw_delta_deg = delta_deg(frame.neutral_yaw_deg, yaw_deg);

    let heading =
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_delta_deg.to_radians());
    let mut world_sway = heading.transform_vector(&Vector3::new(sway_x, 0.0, sway_z));

    if let Some(radius) = params.max_sway_radius_m {
        let magnitude = world_sway.norm();
        if magnitude > radius && magnitude > 0.0 {
            world_sway *= radius / magnitude;
        }
    }

    anchor_m + Vector3::new(world_sway.x, -length, world_sway.z)
}
