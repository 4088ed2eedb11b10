//! 3x3 rotation matrices, row-major.

use std::fmt;
use std::ops::{Index, Mul};

use super::quaternion::Quaternion;
use super::vector::Vector;
use super::{EPSILON, EPSILON_SQRT};

/// Row-major 3x3 matrix. Only orthogonal matrices are valid rotations;
/// [`RotationMatrix::orthogonalized`] forces the property onto
/// near-orthogonal input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    m: [f64; 9],
}

impl RotationMatrix {
    /// Build from nine row-major components `m00..m22`.
    pub fn from_rows(m: [f64; 9]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::from_rows([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// Build an orthonormal frame from an X direction and a roughly-Y
    /// direction (Gram-Schmidt). Degenerate input yields identity. Used
    /// when defining tool frames from two measured directions.
    pub fn from_xy_vectors(x: Vector, y: Vector) -> Self {
        let xu = x.normalized();
        if xu.is_zero() {
            return Self::identity();
        }
        let zu = xu.cross(y).normalized();
        if zu.is_zero() {
            return Self::identity();
        }
        let yu = zu.cross(xu);
        Self::from_rows([xu.x, yu.x, zu.x, xu.y, yu.y, zu.y, xu.z, yu.z, zu.z])
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row * 3 + col]
    }

    pub fn row(&self, row: usize) -> Vector {
        Vector::new(self.at(row, 0), self.at(row, 1), self.at(row, 2))
    }

    pub fn column(&self, col: usize) -> Vector {
        Vector::new(self.at(0, col), self.at(1, col), self.at(2, col))
    }

    pub fn transposed(&self) -> RotationMatrix {
        let m = &self.m;
        RotationMatrix::from_rows([m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]])
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// `R * R_t == I` within tolerance.
    pub fn is_orthogonal(&self) -> bool {
        let t = *self * self.transposed();
        for row in 0..3 {
            for col in 0..3 {
                let expected = if row == col { 1.0 } else { 0.0 };
                if (t.at(row, col) - expected).abs() > EPSILON_SQRT {
                    return false;
                }
            }
        }
        true
    }

    /// Force orthogonality: unitize the X column, derive Z from X x Y,
    /// then rebuild Y from Z x X. Degenerate input yields identity.
    pub fn orthogonalized(&self) -> RotationMatrix {
        let xu = self.column(0).normalized();
        if xu.is_zero() {
            return Self::identity();
        }
        let zu = xu.cross(self.column(1)).normalized();
        if zu.is_zero() {
            return Self::identity();
        }
        let yu = zu.cross(xu);
        Self::from_rows([xu.x, yu.x, zu.x, xu.y, yu.y, zu.y, xu.z, yu.z, zu.z])
    }

    /// Matrix inverse. Orthogonal matrices take the transpose fast path;
    /// otherwise the adjugate is used, and `None` is returned when the
    /// matrix is singular.
    pub fn inverted(&self) -> Option<RotationMatrix> {
        if self.is_orthogonal() {
            return Some(self.transposed());
        }
        let det = self.determinant();
        if det.abs() < EPSILON {
            return None;
        }
        let m = &self.m;
        let inv_det = 1.0 / det;
        Some(RotationMatrix::from_rows([
            (m[4] * m[8] - m[5] * m[7]) * inv_det,
            (m[2] * m[7] - m[1] * m[8]) * inv_det,
            (m[1] * m[5] - m[2] * m[4]) * inv_det,
            (m[5] * m[6] - m[3] * m[8]) * inv_det,
            (m[0] * m[8] - m[2] * m[6]) * inv_det,
            (m[2] * m[3] - m[0] * m[5]) * inv_det,
            (m[3] * m[7] - m[4] * m[6]) * inv_det,
            (m[1] * m[6] - m[0] * m[7]) * inv_det,
            (m[0] * m[4] - m[1] * m[3]) * inv_det,
        ]))
    }

    /// Shepperd's method: branch on the trace, then on the largest
    /// diagonal element to avoid precision loss near 180-degree
    /// rotations.
    pub fn to_quaternion(&self) -> Quaternion {
        let m = &self.m;
        let trace = m[0] + m[4] + m[8];

        let q = if trace > EPSILON {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quaternion::from_components_raw(
                0.25 * s,
                (m[7] - m[5]) / s,
                (m[2] - m[6]) / s,
                (m[3] - m[1]) / s,
            )
        } else if m[0] > m[4] && m[0] > m[8] {
            let s = (1.0 + m[0] - m[4] - m[8]).sqrt() * 2.0;
            Quaternion::from_components_raw(
                (m[7] - m[5]) / s,
                0.25 * s,
                (m[1] + m[3]) / s,
                (m[2] + m[6]) / s,
            )
        } else if m[4] > m[8] {
            let s = (1.0 + m[4] - m[0] - m[8]).sqrt() * 2.0;
            Quaternion::from_components_raw(
                (m[2] - m[6]) / s,
                (m[1] + m[3]) / s,
                0.25 * s,
                (m[5] + m[7]) / s,
            )
        } else {
            let s = (1.0 + m[8] - m[0] - m[4]).sqrt() * 2.0;
            Quaternion::from_components_raw(
                (m[3] - m[1]) / s,
                (m[2] + m[6]) / s,
                (m[5] + m[7]) / s,
                0.25 * s,
            )
        };
        q.normalized()
    }
}

impl Index<(usize, usize)> for RotationMatrix {
    type Output = f64;
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.m[row * 3 + col]
    }
}

impl Mul for RotationMatrix {
    type Output = RotationMatrix;
    fn mul(self, rhs: RotationMatrix) -> RotationMatrix {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3).map(|k| self.at(row, k) * rhs.at(k, col)).sum();
            }
        }
        RotationMatrix::from_rows(out)
    }
}

impl Mul<Vector> for RotationMatrix {
    type Output = Vector;
    fn mul(self, v: Vector) -> Vector {
        Vector::new(
            self.row(0).dot(v),
            self.row(1).dot(v),
            self.row(2).dot(v),
        )
    }
}

impl fmt::Display for RotationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{:.4}, {:.4}, {:.4}], [{:.4}, {:.4}, {:.4}], [{:.4}, {:.4}, {:.4}]]",
            self.m[0],
            self.m[1],
            self.m[2],
            self.m[3],
            self.m[4],
            self.m[5],
            self.m[6],
            self.m[7],
            self.m[8]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AxisAngle;

    #[test]
    fn identity_is_orthogonal() {
        assert!(RotationMatrix::identity().is_orthogonal());
    }

    #[test]
    fn quaternion_round_trip() {
        let q = AxisAngle::new(1.0, -1.0, 0.5, 140.0).to_quaternion();
        let m = q.to_matrix();
        assert!(m.is_orthogonal());
        assert!(q.is_equivalent(m.to_quaternion()));
    }

    #[test]
    fn near_half_turn_uses_diagonal_branch() {
        // Trace approaches -1 at 180 degrees; the diagonal branches must
        // still recover the rotation.
        for axis in [
            Vector::x_axis(),
            Vector::y_axis(),
            Vector::z_axis(),
            Vector::new(1.0, 1.0, 1.0),
        ] {
            let q = AxisAngle::from_axis(axis, 179.999).to_quaternion();
            let back = q.to_matrix().to_quaternion();
            assert!(q.is_equivalent(back));
        }
    }

    #[test]
    fn orthogonalized_repairs_drift() {
        let q = AxisAngle::new(0.2, 0.9, -0.4, 63.0).to_quaternion();
        let mut drifted = q.to_matrix();
        // Inject scale drift.
        drifted = RotationMatrix::from_rows([
            drifted.at(0, 0) * 1.01,
            drifted.at(0, 1),
            drifted.at(0, 2),
            drifted.at(1, 0) * 1.01,
            drifted.at(1, 1),
            drifted.at(1, 2),
            drifted.at(2, 0) * 1.01,
            drifted.at(2, 1),
            drifted.at(2, 2),
        ]);
        assert!(!drifted.is_orthogonal());
        let repaired = drifted.orthogonalized();
        assert!(repaired.is_orthogonal());
        assert!(repaired.to_quaternion().is_equivalent(q));
    }

    #[test]
    fn inverse_of_rotation_is_transpose() {
        let m = AxisAngle::new(0.0, 0.0, 1.0, 30.0).to_quaternion().to_matrix();
        let inv = m.inverted().unwrap();
        assert_eq!(inv, m.transposed());
        let product = m * inv;
        for row in 0..3 {
            for col in 0..3 {
                let expected = if row == col { 1.0 } else { 0.0 };
                assert!((product.at(row, col) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn from_xy_builds_orthonormal_frame() {
        let m = RotationMatrix::from_xy_vectors(
            Vector::new(2.0, 0.0, 0.0),
            Vector::new(0.3, 1.0, 0.0),
        );
        assert!(m.is_orthogonal());
        assert!((m.column(0) - Vector::x_axis()).length() < 1e-9);
    }
}
