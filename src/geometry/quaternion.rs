//! Unit quaternions, the canonical internal rotation representation.
//!
//! Convention: `w` is the scalar part, `(x, y, z)` the vector part.
//! Constructors normalize unless the raw path is used, so a `Quaternion`
//! in circulation is a versor. `q` and `-q` encode the same rotation;
//! [`Quaternion::is_equivalent`] is tolerant of the sign flip.

use std::fmt;
use std::ops::Mul;

use super::axis_angle::AxisAngle;
use super::euler::EulerZyx;
use super::matrix::RotationMatrix;
use super::rotation_vector::RotationVector;
use super::vector::Vector;
use super::{to_degrees, EPSILON, EPSILON_GIMBAL, EPSILON_SQRT};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Build a quaternion and normalize it to unit length.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }.normalized()
    }

    /// Build a quaternion without normalizing. For sources that are
    /// already unit length.
    pub fn from_components_raw(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn length_sq(&self) -> f64 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn is_unit(&self) -> bool {
        (self.length_sq() - 1.0).abs() < EPSILON_SQRT
    }

    /// Represents no rotation (within tolerance).
    pub fn is_identity(&self) -> bool {
        self.w.abs() > 1.0 - EPSILON
    }

    /// Full normalization. A degenerate (near-zero) quaternion collapses
    /// to identity.
    pub fn normalized(&self) -> Quaternion {
        let len = self.length();
        if len < EPSILON {
            return Quaternion::identity();
        }
        Quaternion::from_components_raw(self.w / len, self.x / len, self.y / len, self.z / len)
    }

    /// Normalize only the vector part, preserving `w`.
    ///
    /// Used when rebuilding from a non-unit source vector that should
    /// keep its existing rotation magnitude: the axis components are
    /// rescaled so the whole quaternion becomes unit length while `w`
    /// stays untouched. Solves from the largest-magnitude axis component
    /// to avoid dividing by a vanishing one, and propagates its sign.
    /// Falls back to full normalization when `|w| >= 1` or the vector
    /// part is zero.
    pub fn vector_normalized(&self) -> Quaternion {
        if self.w.abs() >= 1.0 {
            return self.normalized();
        }

        let (ax, ay, az) = (self.x.abs(), self.y.abs(), self.z.abs());
        if ax < EPSILON && ay < EPSILON && az < EPSILON {
            return self.normalized();
        }

        let target_sq = 1.0 - self.w * self.w;
        let (main, a, b) = if ax >= ay && ax >= az {
            (self.x, self.y, self.z)
        } else if ay >= az {
            (self.y, self.x, self.z)
        } else {
            (self.z, self.x, self.y)
        };

        let ra = a / main;
        let rb = b / main;
        let corrected = (target_sq / (1.0 + ra * ra + rb * rb)).sqrt() * main.signum();
        let ca = ra * corrected;
        let cb = rb * corrected;

        let (x, y, z) = if ax >= ay && ax >= az {
            (corrected, ca, cb)
        } else if ay >= az {
            (ca, corrected, cb)
        } else {
            (ca, cb, corrected)
        };

        Quaternion::from_components_raw(self.w, x, y, z)
    }

    /// Conjugate; for a versor this is the inverse rotation.
    pub fn conjugate(&self) -> Quaternion {
        Quaternion::from_components_raw(self.w, -self.x, -self.y, -self.z)
    }

    /// Inverse rotation. Assumes unit length.
    pub fn inverse(&self) -> Quaternion {
        self.conjugate()
    }

    pub fn dot(&self, other: Quaternion) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Same rotation, tolerant of the `q`/`-q` sign ambiguity.
    pub fn is_equivalent(&self, other: Quaternion) -> bool {
        self.dot(other).abs() > 1.0 - EPSILON_SQRT
    }

    /// Apply `rotation` in the world frame: `rotation * self`.
    pub fn pre_multiplied(&self, rotation: Quaternion) -> Quaternion {
        rotation * *self
    }

    /// Apply `rotation` in the local (TCP) frame: `self * rotation`.
    pub fn post_multiplied(&self, rotation: Quaternion) -> Quaternion {
        *self * rotation
    }

    /// Rotate a vector: `q v q*`.
    pub fn rotate_vector(&self, v: Vector) -> Vector {
        let u = Vector::new(self.x, self.y, self.z);
        let uv = u.cross(v);
        let uuv = u.cross(uv);
        v + uv.scaled(2.0 * self.w) + uuv.scaled(2.0)
    }

    /// Axis-angle form. Near-zero rotations collapse to the zero
    /// sentinel (axis `(0,0,0)`, angle 0).
    pub fn to_axis_angle(&self) -> AxisAngle {
        let w = self.w.clamp(-1.0, 1.0);
        let half = w.acos();
        let s = (1.0 - w * w).sqrt();
        if s < EPSILON_SQRT {
            return AxisAngle::zero();
        }
        AxisAngle::from_axis(
            Vector::new(self.x / s, self.y / s, self.z / s),
            to_degrees(2.0 * half),
        )
    }

    /// Rotation-vector form (axis scaled by angle in degrees).
    pub fn to_rotation_vector(&self) -> RotationVector {
        self.to_axis_angle().to_rotation_vector()
    }

    /// Row-major 3x3 rotation matrix.
    pub fn to_matrix(&self) -> RotationMatrix {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        RotationMatrix::from_rows([
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (xx + yy),
        ])
    }

    /// Intrinsic Z-Y'-X'' (Tait-Bryan) decomposition in degrees.
    ///
    /// Gimbal lock is detected via `test = w*y - x*z` against the
    /// `0.5 - EPSILON_GIMBAL` band; on the singular branches roll
    /// collapses to 0 and yaw absorbs the remaining degree of freedom,
    /// with a +-2pi wrap applied only there.
    pub fn to_euler_zyx(&self) -> EulerZyx {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        let test = w * y - x * z;

        if test > 0.5 - EPSILON_GIMBAL {
            // Pitch at +90 deg: only yaw - roll is determined.
            let yaw = wrap_pi(2.0 * (-x).atan2(w));
            return EulerZyx::new(0.0, 90.0, to_degrees(yaw));
        }
        if test < -(0.5 - EPSILON_GIMBAL) {
            // Pitch at -90 deg: only yaw + roll is determined.
            let yaw = wrap_pi(2.0 * x.atan2(w));
            return EulerZyx::new(0.0, -90.0, to_degrees(yaw));
        }

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let pitch = (2.0 * test).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
        EulerZyx::new(to_degrees(roll), to_degrees(pitch), to_degrees(yaw))
    }
}

/// Wrap an angle in radians into `(-pi, pi]`.
fn wrap_pi(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product. Not commutative; the order encodes whether a
    /// rotation is applied in the world or the local frame.
    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::from_components_raw(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}, {:.6}, {:.6}]",
            self.w, self.x, self.y, self.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn quat_z(degrees: f64) -> Quaternion {
        AxisAngle::new(0.0, 0.0, 1.0, degrees).to_quaternion()
    }

    #[test]
    fn constructor_normalizes() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert!((q.length() - 1.0).abs() < TOL);
    }

    #[test]
    fn normalize_is_idempotent() {
        let q = Quaternion::new(0.3, -0.2, 0.8, 0.1);
        let once = q.normalized();
        let twice = once.normalized();
        assert!((once.w - twice.w).abs() < TOL);
        assert!((once.x - twice.x).abs() < TOL);
        assert!((once.y - twice.y).abs() < TOL);
        assert!((once.z - twice.z).abs() < TOL);
    }

    #[test]
    fn vector_normalized_preserves_w() {
        let raw = Quaternion::from_components_raw(0.5, 3.0, 0.4, -0.2);
        let vn = raw.vector_normalized();
        assert!((vn.w - 0.5).abs() < TOL);
        assert!((vn.length() - 1.0).abs() < TOL);
        // Sign and ratios of the vector part are preserved.
        assert!(vn.x > 0.0);
        assert!((vn.y / vn.x - 0.4 / 3.0).abs() < 1e-6);
        assert!((vn.z / vn.x - -0.2 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn vector_normalized_saturated_scalar_falls_back() {
        let raw = Quaternion::from_components_raw(2.0, 1.0, 0.0, 0.0);
        let vn = raw.vector_normalized();
        assert!((vn.length() - 1.0).abs() < TOL);
    }

    #[test]
    fn rotate_vector_quarter_turn() {
        let q = quat_z(90.0);
        let v = q.rotate_vector(Vector::x_axis());
        assert!((v - Vector::y_axis()).length() < 1e-9);
    }

    #[test]
    fn axis_angle_round_trip() {
        let q = AxisAngle::new(1.0, 2.0, -1.0, 75.0).to_quaternion();
        let back = q.to_axis_angle().to_quaternion();
        assert!(q.is_equivalent(back));
    }

    #[test]
    fn zero_rotation_yields_axis_angle_sentinel() {
        let aa = Quaternion::identity().to_axis_angle();
        assert!(aa.is_zero());
    }

    #[test]
    fn matrix_round_trip() {
        let q = Quaternion::new(0.3, -0.6, 0.2, 0.7);
        let back = q.to_matrix().to_quaternion();
        assert!(q.is_equivalent(back));
    }

    #[test]
    fn euler_round_trip_off_pole() {
        let e = EulerZyx::new(10.0, 35.0, -120.0);
        let back = e.to_quaternion().to_euler_zyx();
        assert!((back.x - 10.0).abs() < 1e-6);
        assert!((back.y - 35.0).abs() < 1e-6);
        assert!((back.z - -120.0).abs() < 1e-6);
    }

    #[test]
    fn euler_gimbal_lock_positive_pole() {
        // yaw 30, pitch 90, roll 0: on the pole only yaw - roll is
        // recoverable, and the branch puts it all in yaw.
        let q = EulerZyx::new(0.0, 90.0, 30.0).to_quaternion();
        let e = q.to_euler_zyx();
        assert!((e.x - 0.0).abs() < 1e-6);
        assert!((e.y - 90.0).abs() < 1e-6);
        assert!((e.z - 30.0).abs() < 1e-6);
    }

    #[test]
    fn euler_gimbal_lock_negative_pole() {
        let q = EulerZyx::new(0.0, -90.0, -45.0).to_quaternion();
        let e = q.to_euler_zyx();
        assert!((e.x - 0.0).abs() < 1e-6);
        assert!((e.y - -90.0).abs() < 1e-6);
        assert!((e.z - -45.0).abs() < 1e-6);
    }

    #[test]
    fn equivalence_tolerates_sign_flip() {
        let q = quat_z(130.0);
        let flipped = Quaternion::from_components_raw(-q.w, -q.x, -q.y, -q.z);
        assert!(q.is_equivalent(flipped));
        assert!(!q.is_equivalent(quat_z(10.0)));
    }

    #[test]
    fn world_vs_local_composition_differ() {
        let base = quat_z(90.0);
        let step = AxisAngle::new(1.0, 0.0, 0.0, 90.0).to_quaternion();
        let world = base.pre_multiplied(step);
        let local = base.post_multiplied(step);
        assert!(!world.is_equivalent(local));
        // World-frame X rotation moves the local Z axis toward -Y.
        let v = world.rotate_vector(Vector::z_axis());
        assert!((v - Vector::new(0.0, -1.0, 0.0)).length() < 1e-9);
    }
}
