use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Invalid axis token '{0}' (expected one of +x, -x, +y, -y, +z, -z)")]
    BadAxisToken(String),

    #[error("Axis mapping must use each sensor axis exactly once")]
    DuplicateAxis,

    #[error("Axis mapping is not a proper rotation (determinant -1)")]
    ImproperRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// One entry of the mapping table: a sensor axis and the sign it carries
/// into the target frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAxis {
    pub axis: Axis,
    pub negate: bool,
}

impl SignedAxis {
    fn parse(token: &str) -> Result<Self, FrameError> {
        let bad = || FrameError::BadAxisToken(token.to_string());

        let mut chars = token.chars();
        let sign = chars.next().ok_or_else(bad)?;
        let axis = chars.next().ok_or_else(bad)?;
        if chars.next().is_some() {
            return Err(bad());
        }

        let negate = match sign {
            '+' => false,
            '-' => true,
            _ => return Err(bad()),
        };
        let axis = match axis.to_ascii_lowercase() {
            'x' => Axis::X,
            'y' => Axis::Y,
            'z' => Axis::Z,
            _ => return Err(bad()),
        };

        Ok(SignedAxis { axis, negate })
    }

    fn pick(&self, v: &Vector3<f64>) -> f64 {
        let c = v[self.axis as usize];
        if self.negate { -c } else { c }
    }
}

/// Signed 3-axis permutation taking sensor-frame components into the target
/// frame. Validated to be a proper rotation (determinant +1), so applying it
/// to a quaternion's vector part preserves the norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "[String; 3]")]
pub struct AxisMap {
    // targets[i]: which (signed) sensor axis becomes target axis i
    targets: [SignedAxis; 3],
}

impl AxisMap {
    pub fn new(targets: [SignedAxis; 3]) -> Result<Self, FrameError> {
        let mut used = [false; 3];
        for t in &targets {
            if used[t.axis as usize] {
                return Err(FrameError::DuplicateAxis);
            }
            used[t.axis as usize] = true;
        }

        let map = AxisMap { targets };
        if map.determinant() != 1 {
            return Err(FrameError::ImproperRotation);
        }

        Ok(map)
    }

    pub fn from_tokens(tokens: &[&str; 3]) -> Result<Self, FrameError> {
        Self::new([
            SignedAxis::parse(tokens[0])?,
            SignedAxis::parse(tokens[1])?,
            SignedAxis::parse(tokens[2])?,
        ])
    }

    /// Movella DOT NED (X north, Y east, Z down) into the target frame
    /// (X right, Y up, Z forward): `x = +y, y = -z, z = -x`. This exact
    /// table is a wire-compatibility requirement.
    pub fn movella_ned() -> Self {
        AxisMap {
            targets: [
                SignedAxis { axis: Axis::Y, negate: false },
                SignedAxis { axis: Axis::Z, negate: true },
                SignedAxis { axis: Axis::X, negate: true },
            ],
        }
    }

    fn determinant(&self) -> i32 {
        // Sign product times permutation parity.
        let perm = [
            self.targets[0].axis as usize,
            self.targets[1].axis as usize,
            self.targets[2].axis as usize,
        ];
        let mut parity = 1i32;
        for i in 0..3 {
            for j in (i + 1)..3 {
                if perm[i] > perm[j] {
                    parity = -parity;
                }
            }
        }

        let signs: i32 = self.targets.iter().map(|t| if t.negate { -1 } else { 1 }).product();
        parity * signs
    }

    pub fn convert_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.targets[0].pick(v),
            self.targets[1].pick(v),
            self.targets[2].pick(v),
        )
    }

    /// Maps a sensor-frame quaternion into the target frame by permuting its
    /// vector part. The scalar part is untouched and the input is trusted to
    /// be unit norm, so no re-normalization happens.
    pub fn convert_quat(&self, w: f64, x: f64, y: f64, z: f64) -> UnitQuaternion<f64> {
        let v = self.convert_vector(&Vector3::new(x, y, z));
        UnitQuaternion::new_unchecked(Quaternion::new(w, v.x, v.y, v.z))
    }

    /// The exact inverse mapping: `inverse().convert_vector(convert_vector(v))`
    /// reproduces `v` bit-for-bit.
    pub fn inverse(&self) -> AxisMap {
        let mut targets = self.targets;
        for (i, t) in self.targets.iter().enumerate() {
            targets[t.axis as usize] = SignedAxis {
                axis: match i {
                    0 => Axis::X,
                    1 => Axis::Y,
                    _ => Axis::Z,
                },
                negate: t.negate,
            };
        }
        AxisMap { targets }
    }
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::movella_ned()
    }
}

impl TryFrom<[String; 3]> for AxisMap {
    type Error = FrameError;

    fn try_from(tokens: [String; 3]) -> Result<Self, Self::Error> {
        Self::from_tokens(&[tokens[0].as_str(), tokens[1].as_str(), tokens[2].as_str()])
    }
}
