use nalgebra::UnitQuaternion;

use crate::math::angles::{euler_yxz_deg, quat_from_yxz_deg};

/// Neutral pose captured from the first sample of a session.
///
/// `neutral_pitch_roll` is the observed orientation with yaw zeroed out, so
/// later samples can be expressed relative to it without undoing the user's
/// heading. `neutral_yaw_deg` keeps the full heading separately, to rotate
/// local sway into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFrame {
    pub neutral_pitch_roll: UnitQuaternion<f64>,
    pub neutral_yaw_deg: f64,
}

impl CalibrationFrame {
    fn capture(oriented: &UnitQuaternion<f64>) -> Self {
        let (yaw_deg, pitch_deg, roll_deg) = euler_yxz_deg(oriented);

        CalibrationFrame {
            neutral_pitch_roll: quat_from_yxz_deg(0.0, pitch_deg, roll_deg),
            neutral_yaw_deg: yaw_deg,
        }
    }
}

/// One-shot calibration state: the first observed sample locks in the
/// neutral pose, which then stays fixed until an explicit [`reset`].
///
/// [`reset`]: Calibration::reset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Calibration {
    #[default]
    Uninitialized,
    Calibrated(CalibrationFrame),
}

impl Calibration {
    /// Returns the calibration frame, capturing it from `oriented` if this
    /// is the first sample since start or reset.
    pub fn observe(&mut self, oriented: &UnitQuaternion<f64>) -> CalibrationFrame {
        match self {
            Calibration::Calibrated(frame) => *frame,
            Calibration::Uninitialized => {
                let frame = CalibrationFrame::capture(oriented);
                *self = Calibration::Calibrated(frame);
                frame
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Calibration::Uninitialized;
    }

    pub fn frame(&self) -> Option<&CalibrationFrame> {
        match self {
            Calibration::Calibrated(frame) => Some(frame),
            Calibration::Uninitialized => None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Calibration::Calibrated(_))
    }
}
