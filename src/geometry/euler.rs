//! Euler angles in the intrinsic Z-Y'-X'' (Tait-Bryan) convention.

use std::fmt;

use super::quaternion::Quaternion;
use super::to_radians;

/// Yaw-pitch-roll in degrees: `x` rolls about X, `y` pitches about Y,
/// `z` yaws about Z, composed intrinsically Z first. This is the KUKA
/// A/B/C orientation convention (A=z, B=y, C=x).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerZyx {
    /// Roll, degrees.
    pub x: f64,
    /// Pitch, degrees. `+-90` is the gimbal-lock singularity.
    pub y: f64,
    /// Yaw, degrees.
    pub z: f64,
}

impl EulerZyx {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x: roll,
            y: pitch,
            z: yaw,
        }
    }

    /// Compose `qz(yaw) * qy(pitch) * qx(roll)`.
    pub fn to_quaternion(&self) -> Quaternion {
        let (sr, cr) = (to_radians(self.x) * 0.5).sin_cos();
        let (sp, cp) = (to_radians(self.y) * 0.5).sin_cos();
        let (sy, cy) = (to_radians(self.z) * 0.5).sin_cos();
        Quaternion::from_components_raw(
            cy * cp * cr + sy * sp * sr,
            cy * cp * sr - sy * sp * cr,
            cy * sp * cr + sy * cp * sr,
            sy * cp * cr - cy * sp * sr,
        )
    }
}

impl fmt::Display for EulerZyx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ZYX [{:.3}, {:.3}, {:.3}] deg",
            self.z, self.y, self.x
        )
    }
}
