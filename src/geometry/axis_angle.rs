//! Axis-angle rotation: a unit axis plus an angle in degrees.

use std::fmt;

use super::quaternion::Quaternion;
use super::rotation_vector::RotationVector;
use super::vector::{DirectionComparison, Vector};
use super::{to_radians, EPSILON_SQRT};

/// A rotation of `angle` degrees around a unit `(x, y, z)` axis.
///
/// The axis is unit length unless the value represents zero rotation, in
/// which case it is the `(0,0,0)` sentinel. The angle is not wrapped:
/// 315 deg and 675 deg are distinct values that represent equivalent
/// rotations (see [`AxisAngle::is_equivalent`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Degrees.
    pub angle: f64,
}

impl AxisAngle {
    /// Build from raw axis components, unitizing the axis. A degenerate
    /// axis yields the zero-rotation sentinel.
    pub fn new(x: f64, y: f64, z: f64, angle: f64) -> Self {
        Self::from_axis(Vector::new(x, y, z), angle)
    }

    pub fn from_axis(axis: Vector, angle: f64) -> Self {
        let unit = axis.normalized();
        if unit.is_zero() {
            return Self::zero();
        }
        Self {
            x: unit.x,
            y: unit.y,
            z: unit.z,
            angle,
        }
    }

    /// The zero-rotation sentinel.
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            angle: 0.0,
        }
    }

    pub fn axis(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }

    /// True when this value encodes no net rotation: a degenerate axis
    /// or an angle that is a multiple of a full turn.
    pub fn is_zero(&self) -> bool {
        if self.axis().is_zero() {
            return true;
        }
        let wrapped = self.angle.rem_euclid(360.0);
        wrapped < EPSILON_SQRT || 360.0 - wrapped < EPSILON_SQRT
    }

    pub fn to_quaternion(&self) -> Quaternion {
        if self.axis().is_zero() {
            return Quaternion::identity();
        }
        let half = to_radians(self.angle) * 0.5;
        let s = half.sin();
        Quaternion::from_components_raw(half.cos(), self.x * s, self.y * s, self.z * s)
    }

    pub fn to_rotation_vector(&self) -> RotationVector {
        RotationVector::new(
            self.x * self.angle,
            self.y * self.angle,
            self.z * self.angle,
        )
    }

    /// Whether two axis-angle values represent the same rotation.
    ///
    /// Covers the full equivalence surface: both zero rotations are
    /// equivalent regardless of axis; same-direction axes require equal
    /// angles modulo 360; opposite-direction axes require angles summing
    /// to a full turn modulo 360. Non-parallel axes are never equivalent.
    pub fn is_equivalent(&self, other: &AxisAngle) -> bool {
        let zero_a = self.is_zero();
        let zero_b = other.is_zero();
        if zero_a || zero_b {
            return zero_a && zero_b;
        }

        match Vector::compare_directions(self.axis(), other.axis()) {
            DirectionComparison::Parallel => {
                let diff = (self.angle - other.angle).rem_euclid(360.0);
                diff < EPSILON_SQRT || 360.0 - diff < EPSILON_SQRT
            }
            DirectionComparison::Opposite => {
                let sum = (self.angle + other.angle).rem_euclid(360.0);
                sum < EPSILON_SQRT || 360.0 - sum < EPSILON_SQRT
            }
            _ => false,
        }
    }
}

impl fmt::Display for AxisAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}, {:.4}] {:.3} deg",
            self.x, self.y, self.z, self.angle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_is_unitized() {
        let aa = AxisAngle::new(0.0, 0.0, 10.0, 45.0);
        assert!((aa.axis().length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn extra_full_turn_is_equivalent() {
        let a = AxisAngle::new(0.0, 0.0, 1.0, 315.0);
        let b = AxisAngle::new(0.0, 0.0, 1.0, 675.0);
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn flipped_axis_complement_is_equivalent() {
        let a = AxisAngle::new(0.0, 0.0, 1.0, 315.0);
        let b = AxisAngle::new(0.0, 0.0, -1.0, 45.0);
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn null_rotations_are_equivalent() {
        let a = AxisAngle::new(0.0, 0.0, 0.0, 0.0);
        let b = AxisAngle::new(0.0, 0.0, 1.0, 720.0);
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn zero_and_nonzero_are_not_equivalent() {
        let a = AxisAngle::zero();
        let b = AxisAngle::new(0.0, 0.0, 1.0, 90.0);
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn non_parallel_axes_are_not_equivalent() {
        let a = AxisAngle::new(1.0, 0.0, 0.0, 90.0);
        let b = AxisAngle::new(0.0, 1.0, 0.0, 90.0);
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn quaternion_conversion_matches_half_angle() {
        let aa = AxisAngle::new(0.0, 0.0, 1.0, 90.0);
        let q = aa.to_quaternion();
        assert!((q.w - (45f64).to_radians().cos()).abs() < 1e-9);
        assert!((q.z - (45f64).to_radians().sin()).abs() < 1e-9);
    }
}
