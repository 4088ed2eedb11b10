//! Actions: immutable descriptions of one discrete robot operation.
//!
//! Every action carries a globally monotonic id assigned at construction;
//! apply order equals id order within a cursor. Relative-vs-absolute is a
//! per-kind flag rather than separate kinds.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::{Quaternion, Vector};
use crate::types::{Joints, MotionType, ReferenceCs, TempChannel, Tool};

static ACTION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_action_id() -> u64 {
    ACTION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The payload of an [`Action`]: one of the ~26 operation kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Translation {
        translation: Vector,
        relative: bool,
    },
    Rotation {
        rotation: Quaternion,
        relative: bool,
    },
    Transformation {
        translation: Vector,
        rotation: Quaternion,
        relative: bool,
        /// Whether the translation is applied before the rotation; in the
        /// local frame the two orders produce different poses.
        translation_first: bool,
    },
    Axes {
        joints: Joints,
        relative: bool,
    },
    ExternalAxis {
        /// 1-based axis number, 1..=6.
        axis: usize,
        value: f64,
        relative: bool,
    },
    Speed {
        /// mm/s (linear) or deg/s (joint), canonical cursor units.
        value: f64,
        relative: bool,
    },
    Acceleration {
        /// mm/s^2; 0 means vendor default.
        value: f64,
        relative: bool,
    },
    RotationSpeed {
        /// deg/s for TCP reorientation.
        value: f64,
        relative: bool,
    },
    JointSpeed {
        /// deg/s.
        value: f64,
        relative: bool,
    },
    JointAcceleration {
        /// deg/s^2.
        value: f64,
        relative: bool,
    },
    Precision {
        /// Blending radius, mm. 0 is a fine point.
        value: f64,
        relative: bool,
    },
    MotionMode {
        motion: MotionType,
    },
    Coordinates {
        reference: ReferenceCs,
    },
    PushSettings,
    PopSettings,
    Wait {
        millis: u64,
    },
    Message {
        text: String,
    },
    Comment {
        text: String,
    },
    CustomCode {
        statement: String,
        is_declaration: bool,
    },
    DefineTool {
        tool: Tool,
    },
    AttachTool {
        name: String,
    },
    DetachTool,
    IoDigital {
        pin: String,
        on: bool,
    },
    IoAnalog {
        pin: String,
        value: f64,
    },
    Temperature {
        channel: TempChannel,
        /// Celsius.
        degrees: f64,
        wait: bool,
    },
    Extrusion {
        on: bool,
    },
    ExtrusionRate {
        /// mm of filament per mm of travel.
        rate: f64,
        relative: bool,
    },
}

/// One issued robot operation: a monotonic id plus its [`ActionKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: u64,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            id: next_action_id(),
            kind,
        }
    }

    /// Whether this kind moves the TCP or joints when applied.
    pub fn is_motion(&self) -> bool {
        matches!(
            self.kind,
            ActionKind::Translation { .. }
                | ActionKind::Rotation { .. }
                | ActionKind::Transformation { .. }
                | ActionKind::Axes { .. }
                | ActionKind::ExternalAxis { .. }
        )
    }
}

fn rel(relative: bool) -> &'static str {
    if relative {
        "relative"
    } else {
        "absolute"
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Translation {
                translation,
                relative,
            } => write!(f, "move {} {}", rel(*relative), translation),
            ActionKind::Rotation { rotation, relative } => {
                write!(f, "rotate {} {}", rel(*relative), rotation.to_axis_angle())
            }
            ActionKind::Transformation {
                translation,
                rotation,
                relative,
                translation_first,
            } => write!(
                f,
                "transform {} {} {} ({} first)",
                rel(*relative),
                translation,
                rotation.to_axis_angle(),
                if *translation_first { "move" } else { "rotate" }
            ),
            ActionKind::Axes { joints, relative } => {
                write!(f, "axes {} {}", rel(*relative), joints)
            }
            ActionKind::ExternalAxis {
                axis,
                value,
                relative,
            } => write!(f, "external axis {} {} {:.3}", axis, rel(*relative), value),
            ActionKind::Speed { value, relative } => {
                write!(f, "speed {} {:.3} mm/s", rel(*relative), value)
            }
            ActionKind::Acceleration { value, relative } => {
                write!(f, "acceleration {} {:.3} mm/s^2", rel(*relative), value)
            }
            ActionKind::RotationSpeed { value, relative } => {
                write!(f, "rotation speed {} {:.3} deg/s", rel(*relative), value)
            }
            ActionKind::JointSpeed { value, relative } => {
                write!(f, "joint speed {} {:.3} deg/s", rel(*relative), value)
            }
            ActionKind::JointAcceleration { value, relative } => {
                write!(f, "joint acceleration {} {:.3} deg/s^2", rel(*relative), value)
            }
            ActionKind::Precision { value, relative } => {
                write!(f, "precision {} {:.3} mm", rel(*relative), value)
            }
            ActionKind::MotionMode { motion } => write!(f, "motion mode {}", motion),
            ActionKind::Coordinates { reference } => write!(f, "coordinates {}", reference),
            ActionKind::PushSettings => write!(f, "push settings"),
            ActionKind::PopSettings => write!(f, "pop settings"),
            ActionKind::Wait { millis } => write!(f, "wait {} ms", millis),
            ActionKind::Message { text } => write!(f, "message \"{}\"", text),
            ActionKind::Comment { text } => write!(f, "comment \"{}\"", text),
            ActionKind::CustomCode {
                statement,
                is_declaration,
            } => write!(
                f,
                "custom {} \"{}\"",
                if *is_declaration {
                    "declaration"
                } else {
                    "statement"
                },
                statement
            ),
            ActionKind::DefineTool { tool } => write!(f, "define tool {}", tool),
            ActionKind::AttachTool { name } => write!(f, "attach tool \"{}\"", name),
            ActionKind::DetachTool => write!(f, "detach tool"),
            ActionKind::IoDigital { pin, on } => {
                write!(f, "digital out \"{}\" {}", pin, if *on { "on" } else { "off" })
            }
            ActionKind::IoAnalog { pin, value } => {
                write!(f, "analog out \"{}\" {:.3}", pin, value)
            }
            ActionKind::Temperature {
                channel,
                degrees,
                wait,
            } => write!(
                f,
                "temperature {} {:.1} C{}",
                channel,
                degrees,
                if *wait { " (wait)" } else { "" }
            ),
            ActionKind::Extrusion { on } => {
                write!(f, "extrusion {}", if *on { "on" } else { "off" })
            }
            ActionKind::ExtrusionRate { rate, relative } => {
                write!(f, "extrusion rate {} {:.4} mm/mm", rel(*relative), rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let a = Action::new(ActionKind::PushSettings);
        let b = Action::new(ActionKind::PopSettings);
        let c = Action::new(ActionKind::Wait { millis: 10 });
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn motion_classification() {
        let m = Action::new(ActionKind::Translation {
            translation: Vector::new(1.0, 0.0, 0.0),
            relative: true,
        });
        let s = Action::new(ActionKind::Speed {
            value: 100.0,
            relative: false,
        });
        assert!(m.is_motion());
        assert!(!s.is_motion());
    }

    #[test]
    fn display_is_human_readable() {
        let a = Action::new(ActionKind::Translation {
            translation: Vector::new(10.0, 0.0, 0.0),
            relative: true,
        });
        assert!(format!("{}", a).starts_with("move relative"));
    }
}
