//! Rotation vector: a unit axis scaled by the rotation angle in degrees.

use std::fmt;

use super::axis_angle::AxisAngle;
use super::quaternion::Quaternion;
use super::vector::Vector;
use super::EPSILON_SQRT;

/// Compact axis-angle form where the vector's direction is the rotation
/// axis and its magnitude is the angle in degrees. The UR pose format is
/// this representation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// The rotation angle in degrees.
    pub fn angle(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn to_axis_angle(&self) -> AxisAngle {
        let angle = self.angle();
        if angle < EPSILON_SQRT {
            return AxisAngle::zero();
        }
        AxisAngle::from_axis(
            Vector::new(self.x / angle, self.y / angle, self.z / angle),
            angle,
        )
    }

    pub fn to_quaternion(&self) -> Quaternion {
        self.to_axis_angle().to_quaternion()
    }

    /// Components in radians, as UR wire and script formats expect.
    pub fn to_radians(&self) -> [f64; 3] {
        [
            self.x.to_radians(),
            self.y.to_radians(),
            self.z.to_radians(),
        ]
    }
}

impl fmt::Display for RotationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}, {:.4}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_axis_angle() {
        let rv = RotationVector::new(0.0, 0.0, 90.0);
        let aa = rv.to_axis_angle();
        assert!((aa.angle - 90.0).abs() < 1e-9);
        let back = aa.to_rotation_vector();
        assert!((back.z - 90.0).abs() < 1e-9);
    }

    #[test]
    fn zero_magnitude_is_sentinel() {
        assert!(RotationVector::zero().to_axis_angle().is_zero());
    }

    #[test]
    fn quaternion_round_trip() {
        let rv = RotationVector::new(30.0, -60.0, 45.0);
        let back = rv.to_quaternion().to_rotation_vector();
        assert!(rv.to_quaternion().is_equivalent(back.to_quaternion()));
    }
}
