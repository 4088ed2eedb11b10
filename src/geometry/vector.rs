//! Cartesian 3-vector used for positions, translations and rotation axes.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::quaternion::Quaternion;
use super::{EPSILON_SQRT, to_degrees};

/// How two directions relate to each other, as classified by
/// [`Vector::compare_directions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionComparison {
    /// Not parallel and not orthogonal.
    None,
    /// Parallel, pointing the same way.
    Parallel,
    /// Perpendicular.
    Orthogonal,
    /// Parallel, pointing opposite ways.
    Opposite,
}

/// A 3D cartesian vector (mm for positions, unitless for directions).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn length_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.length_sq() < EPSILON_SQRT * EPSILON_SQRT
    }

    /// Unit vector in the same direction, or the zero vector if this
    /// vector is degenerate.
    pub fn normalized(&self) -> Vector {
        let len = self.length();
        if len < EPSILON_SQRT {
            return Vector::zero();
        }
        Vector::new(self.x / len, self.y / len, self.z / len)
    }

    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn scaled(&self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance_to(&self, other: Vector) -> f64 {
        (*self - other).length()
    }

    /// Rotate this vector by a unit quaternion.
    pub fn rotated_by(&self, rotation: Quaternion) -> Vector {
        rotation.rotate_vector(*self)
    }

    /// Angle between two vectors in degrees, in `[0, 180]`. Zero vectors
    /// yield 0.
    pub fn angle_to(&self, other: Vector) -> f64 {
        let denom = self.length() * other.length();
        if denom < EPSILON_SQRT {
            return 0.0;
        }
        let cos = (self.dot(other) / denom).clamp(-1.0, 1.0);
        to_degrees(cos.acos())
    }

    /// Classify the relation between two directions. Magnitude is
    /// ignored; callers are expected to rule out zero vectors first.
    pub fn compare_directions(a: Vector, b: Vector) -> DirectionComparison {
        let angle = a.angle_to(b);
        if angle < EPSILON_SQRT {
            DirectionComparison::Parallel
        } else if (angle - 90.0).abs() < EPSILON_SQRT {
            DirectionComparison::Orthogonal
        } else if (angle - 180.0).abs() < EPSILON_SQRT {
            DirectionComparison::Opposite
        } else {
            DirectionComparison::None
        }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        self.scaled(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}, {:.3}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn cross_follows_right_hand_rule() {
        let c = Vector::x_axis().cross(Vector::y_axis());
        assert!((c - Vector::z_axis()).length() < TOL);
    }

    #[test]
    fn normalized_degenerate_is_zero() {
        assert_eq!(Vector::zero().normalized(), Vector::zero());
    }

    #[test]
    fn angle_between_axes() {
        assert!((Vector::x_axis().angle_to(Vector::y_axis()) - 90.0).abs() < TOL);
        assert!((Vector::x_axis().angle_to(-Vector::x_axis()) - 180.0).abs() < TOL);
    }

    #[test]
    fn direction_comparison_cases() {
        let x = Vector::x_axis();
        assert_eq!(
            Vector::compare_directions(x, x.scaled(3.0)),
            DirectionComparison::Parallel
        );
        assert_eq!(
            Vector::compare_directions(x, -x),
            DirectionComparison::Opposite
        );
        assert_eq!(
            Vector::compare_directions(x, Vector::z_axis()),
            DirectionComparison::Orthogonal
        );
        assert_eq!(
            Vector::compare_directions(x, Vector::new(1.0, 1.0, 0.0)),
            DirectionComparison::None
        );
    }
}
