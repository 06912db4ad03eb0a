use nalgebra::{UnitQuaternion, Vector3};
use thiserror::Error;

use crate::math::frame::AxisMap;

/// One orientation/acceleration sample, already converted to the target
/// frame. The quaternion is trusted to be unit norm as received from the
/// sensor and is not re-normalized. Free acceleration is carried for
/// external consumers; the position model does not use it.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub quat: UnitQuaternion<f64>,
    pub free_acc_m_s2: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("Datagram is not valid ASCII text")]
    NotText,

    #[error("Expected at least 8 comma-separated fields, got {0}")]
    TooFewFields(usize),

    #[error("Field {0} is not a number")]
    BadNumber(usize),
}

/// Decodes one ASCII datagram: `index, qW, qX, qY, qZ, faX, faY, faZ, ...`.
///
/// The leading index and any trailing fields are ignored. The quaternion is
/// mapped from the sensor frame into the target frame with `map`.
pub fn parse_datagram(data: &[u8], map: &AxisMap) -> Result<SensorSample, WireError> {
    let text = std::str::from_utf8(data).map_err(|_| WireError::NotText)?;

    let mut fields = [0.0f64; 7];
    let mut count = 0usize;

    for (i, token) in text.split(',').enumerate() {
        if i == 0 {
            // Packet index, unused.
            count += 1;
            continue;
        }
        if i >= 8 {
            break;
        }

        fields[i - 1] = token
            .trim()
            .parse::<f64>()
            .map_err(|_| WireError::BadNumber(i))?;
        count += 1;
    }

    if count < 8 {
        return Err(WireError::TooFewFields(count));
    }

    let [w, x, y, z, fa_x, fa_y, fa_z] = fields;

    Ok(SensorSample {
        quat: map.convert_quat(w, x, y, z),
        free_acc_m_s2: Vector3::new(fa_x, fa_y, fa_z),
    })
}
