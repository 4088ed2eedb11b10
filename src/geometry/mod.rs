//! Spatial rotation algebra
//!
//! A closed conversion graph between five equivalent representations of
//! SO(3) orientation (quaternion, axis-angle, rotation vector, rotation
//! matrix, Euler ZYX) plus a cartesian vector type. All types are small
//! `Copy` values and every conversion is pure and total: degenerate inputs
//! produce identity/zero sentinels instead of errors.
//!
//! Angles on the public API are in degrees (robot vendors speak degrees);
//! trigonometry is done in radians internally.

pub mod axis_angle;
pub mod euler;
pub mod matrix;
pub mod quaternion;
pub mod rotation_vector;
pub mod vector;

pub use axis_angle::AxisAngle;
pub use euler::EulerZyx;
pub use matrix::RotationMatrix;
pub use quaternion::Quaternion;
pub use rotation_vector::RotationVector;
pub use vector::{DirectionComparison, Vector};

/// General-purpose numeric tolerance.
pub const EPSILON: f64 = 1e-10;

/// Tolerance used around square roots and unitization, where input noise
/// is amplified by the math.
pub const EPSILON_SQRT: f64 = 1e-6;

/// Gimbal-lock detection band for Euler decomposition. Looser than the
/// other tiers: a tight band is more accurate away from the pole but
/// numerically unstable exactly at it, so the singular closed forms take
/// over within one milliradian-class of the pole.
pub const EPSILON_GIMBAL: f64 = 1e-3;

/// Degrees to radians.
#[inline]
pub(crate) fn to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Radians to degrees.
#[inline]
pub(crate) fn to_degrees(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}
