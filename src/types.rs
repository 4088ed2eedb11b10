//! Shared robot-model value types: motion modes, joint sets, tools.

use std::fmt;
use std::ops::{Add, AddAssign};

use crate::geometry::{Quaternion, Vector};

/// Interpolation mode for motion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionType {
    /// Straight-line cartesian interpolation.
    #[default]
    Linear,
    /// Per-axis angular interpolation.
    Joint,
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionType::Linear => write!(f, "linear"),
            MotionType::Joint => write!(f, "joint"),
        }
    }
}

/// Reference frame for relative motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceCs {
    /// Fixed base frame.
    #[default]
    World,
    /// Current TCP frame.
    Local,
}

impl fmt::Display for ReferenceCs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceCs::World => write!(f, "world"),
            ReferenceCs::Local => write!(f, "local"),
        }
    }
}

/// Six joint angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Joints(pub [f64; 6]);

impl Joints {
    pub fn new(j1: f64, j2: f64, j3: f64, j4: f64, j5: f64, j6: f64) -> Self {
        Self([j1, j2, j3, j4, j5, j6])
    }
}

impl Add for Joints {
    type Output = Joints;
    fn add(self, rhs: Joints) -> Joints {
        let mut out = [0.0; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] + rhs.0[i];
        }
        Joints(out)
    }
}

impl AddAssign for Joints {
    fn add_assign(&mut self, rhs: Joints) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Joints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let j = &self.0;
        write!(
            f,
            "[{:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}]",
            j[0], j[1], j[2], j[3], j[4], j[5]
        )
    }
}

/// Auxiliary axes beyond the six primary joints (rails, rotary tables).
/// Unset slots have never been driven.
pub type ExternalAxes = [Option<f64>; 6];

/// Heated zones on additive-manufacturing devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempChannel {
    Extruder,
    Bed,
    Chamber,
}

impl fmt::Display for TempChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempChannel::Extruder => write!(f, "extruder"),
            TempChannel::Bed => write!(f, "bed"),
            TempChannel::Chamber => write!(f, "chamber"),
        }
    }
}

/// An end-effector definition: TCP transform plus physical properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    /// TCP offset from the flange, mm.
    pub tcp_position: Vector,
    /// TCP orientation relative to the flange.
    pub tcp_orientation: Quaternion,
    /// Kilograms.
    pub weight: f64,
    /// Center of gravity relative to the flange, mm.
    pub center_of_gravity: Vector,
}

impl Tool {
    pub fn new(name: &str, tcp_position: Vector, tcp_orientation: Quaternion) -> Self {
        Self {
            name: name.to_string(),
            tcp_position,
            tcp_orientation,
            weight: 1.0,
            center_of_gravity: tcp_position.scaled(0.5),
        }
    }

    pub fn with_mass(mut self, weight: f64, center_of_gravity: Vector) -> Self {
        self.weight = weight;
        self.center_of_gravity = center_of_gravity;
        self
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" tcp {} {:.2} kg",
            self.name, self.tcp_position, self.weight
        )
    }
}
