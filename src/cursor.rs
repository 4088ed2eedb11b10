//! The RobotCursor: a stateful interpreter of actions.
//!
//! A cursor tracks accumulated robot state by applying issued actions in
//! FIFO order. The geometric state is Cartesian-valid (position+rotation
//! set, joints unset) or Joint-valid (the reverse), never both: with no
//! kinematic solver on board, a cartesian move invalidates joints and a
//! joint move invalidates the cartesian pose.
//!
//! Cursors chain: a **write** cursor applies actions the moment they are
//! issued (live API state) and cascades each successfully applied action
//! into a child cursor. In a streaming session the chain is
//! write -> stream (advanced at send time) -> motion (advanced on device
//! acknowledgment, the believed real-world state).
//!
//! Expected failures (missing prerequisite state, unknown tool) reject
//! with an info log and `false`; they never panic and never poison the
//! chain. A failed action is still consumed from the buffer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::action::{Action, ActionKind};
use crate::buffer::ActionBuffer;
use crate::geometry::{Quaternion, Vector};
use crate::settings::{Settings, SettingsBuffer};
use crate::types::{ExternalAxes, Joints, ReferenceCs, TempChannel, Tool};

pub struct RobotCursor {
    name: String,
    pub position: Option<Vector>,
    pub rotation: Option<Quaternion>,
    pub joints: Option<Joints>,
    pub external_axes: ExternalAxes,
    pub settings: Settings,
    /// Currently attached tool, already folded into position/rotation.
    pub tool: Option<Tool>,
    tools: HashMap<String, Tool>,
    pub digital_outputs: HashMap<String, bool>,
    pub analog_outputs: HashMap<String, f64>,
    pub is_extruding: bool,
    /// Cumulative filament length, mm, accrued while extruding.
    pub extruded_length: f64,
    pub target_temperatures: HashMap<TempChannel, f64>,
    stack: SettingsBuffer,
    /// Settings in effect just before the most recent pop; compilers use
    /// this to elide revert instructions that would change nothing.
    pub last_pop: Option<Settings>,
    buffer: ActionBuffer,
    child: Option<Arc<Mutex<RobotCursor>>>,
    apply_immediately: bool,
}

impl RobotCursor {
    /// `apply_immediately` makes `issue` apply synchronously (write
    /// cursor); otherwise actions accumulate until `apply_next` is
    /// driven externally (stream/motion cursors).
    pub fn new(name: &str, apply_immediately: bool) -> Self {
        Self {
            name: name.to_string(),
            position: None,
            rotation: None,
            joints: None,
            external_axes: [None; 6],
            settings: Settings::default(),
            tool: None,
            tools: HashMap::new(),
            digital_outputs: HashMap::new(),
            analog_outputs: HashMap::new(),
            is_extruding: false,
            extruded_length: 0.0,
            target_temperatures: HashMap::new(),
            stack: SettingsBuffer::new(),
            last_pop: None,
            buffer: ActionBuffer::new(),
            child: None,
            apply_immediately,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_child(&mut self, child: Arc<Mutex<RobotCursor>>) {
        self.child = Some(child);
    }

    /// Seed position, rotation and joints from a device state broadcast.
    /// The only path that may make both representations valid at once,
    /// since the values come from the same physical pose.
    pub fn prime(&mut self, position: Vector, rotation: Quaternion, joints: Joints) {
        self.position = Some(position);
        self.rotation = Some(rotation);
        self.joints = Some(joints);
    }

    /// Queue an action; apply it synchronously if this cursor is
    /// configured for immediate application. Returns the apply result,
    /// or true when deferred.
    pub fn issue(&mut self, action: Action) -> bool {
        self.buffer.append(action);
        if self.apply_immediately {
            self.apply_next().map(|(_, ok)| ok).unwrap_or(false)
        } else {
            true
        }
    }

    /// Pop the oldest pending action, apply it, and cascade it to the
    /// child cursor only when application succeeded. The action is
    /// consumed either way.
    pub fn apply_next(&mut self) -> Option<(Action, bool)> {
        let action = self.buffer.pop_next()?;
        let ok = self.apply(&action);
        if ok {
            if let Some(child) = &self.child {
                match child.lock() {
                    Ok(mut child) => {
                        child.issue(action.clone());
                    }
                    Err(_) => warn!("[{}] child cursor lock poisoned, cascade lost", self.name),
                }
            }
        }
        Some((action, ok))
    }

    /// Apply every pending action with id up to and including `id`.
    /// Acknowledgments cover batched and wire-less actions, so catching
    /// up must consume the whole prefix, not just the acked id. Returns
    /// the number of actions consumed.
    pub fn apply_until_id(&mut self, id: u64) -> usize {
        let mut consumed = 0;
        while self.buffer.peek_next().map(|a| a.id <= id).unwrap_or(false) {
            self.apply_next();
            consumed += 1;
        }
        consumed
    }

    pub fn pending_count(&self) -> usize {
        self.buffer.pending_count()
    }

    pub fn pending_block_count(&self) -> usize {
        self.buffer.pending_block().len()
    }

    pub fn are_pending(&self) -> bool {
        self.buffer.are_pending()
    }

    pub fn peek_next_id(&self) -> Option<u64> {
        self.buffer.peek_next().map(|a| a.id)
    }

    /// Close the current compile block at the end of the issued actions.
    pub fn mark_block(&mut self) {
        self.buffer.mark_block();
    }

    /// Mutate cursor state according to one action. Expected failures
    /// reject with an info log and false rather than panicking.
    pub fn apply(&mut self, action: &Action) -> bool {
        match &action.kind {
            ActionKind::Translation {
                translation,
                relative,
            } => self.apply_translation(*translation, *relative),
            ActionKind::Rotation { rotation, relative } => {
                self.apply_rotation(*rotation, *relative)
            }
            ActionKind::Transformation {
                translation,
                rotation,
                relative,
                translation_first,
            } => self.apply_transformation(*translation, *rotation, *relative, *translation_first),
            ActionKind::Axes { joints, relative } => self.apply_axes(*joints, *relative),
            ActionKind::ExternalAxis {
                axis,
                value,
                relative,
            } => self.apply_external_axis(*axis, *value, *relative),
            ActionKind::Speed { value, relative } => {
                self.settings.speed = non_negative(
                    &self.name,
                    "speed",
                    scalar(self.settings.speed, *value, *relative),
                );
                true
            }
            ActionKind::Acceleration { value, relative } => {
                self.settings.acceleration = non_negative(
                    &self.name,
                    "acceleration",
                    scalar(self.settings.acceleration, *value, *relative),
                );
                true
            }
            ActionKind::RotationSpeed { value, relative } => {
                self.settings.rotation_speed = non_negative(
                    &self.name,
                    "rotation speed",
                    scalar(self.settings.rotation_speed, *value, *relative),
                );
                true
            }
            ActionKind::JointSpeed { value, relative } => {
                self.settings.joint_speed = non_negative(
                    &self.name,
                    "joint speed",
                    scalar(self.settings.joint_speed, *value, *relative),
                );
                true
            }
            ActionKind::JointAcceleration { value, relative } => {
                self.settings.joint_acceleration = non_negative(
                    &self.name,
                    "joint acceleration",
                    scalar(self.settings.joint_acceleration, *value, *relative),
                );
                true
            }
            ActionKind::Precision { value, relative } => {
                self.settings.precision = non_negative(
                    &self.name,
                    "precision",
                    scalar(self.settings.precision, *value, *relative),
                );
                true
            }
            ActionKind::MotionMode { motion } => {
                self.settings.motion_type = *motion;
                true
            }
            ActionKind::Coordinates { reference } => {
                self.settings.reference_cs = *reference;
                true
            }
            ActionKind::PushSettings => self.stack.push(self.settings),
            ActionKind::PopSettings => match self.stack.pop() {
                Some(restored) => {
                    self.last_pop = Some(self.settings);
                    self.settings = restored;
                    true
                }
                None => {
                    info!("[{}] settings stack empty, pop ignored", self.name);
                    false
                }
            },
            ActionKind::Wait { .. }
            | ActionKind::Message { .. }
            | ActionKind::Comment { .. }
            | ActionKind::CustomCode { .. } => true,
            ActionKind::DefineTool { tool } => {
                self.tools.insert(tool.name.clone(), tool.clone());
                true
            }
            ActionKind::AttachTool { name } => self.apply_attach_tool(name),
            ActionKind::DetachTool => self.apply_detach_tool(),
            ActionKind::IoDigital { pin, on } => {
                self.digital_outputs.insert(pin.clone(), *on);
                true
            }
            ActionKind::IoAnalog { pin, value } => {
                self.analog_outputs.insert(pin.clone(), *value);
                true
            }
            ActionKind::Temperature {
                channel, degrees, ..
            } => {
                self.target_temperatures.insert(*channel, *degrees);
                true
            }
            ActionKind::Extrusion { on } => {
                self.is_extruding = *on;
                true
            }
            ActionKind::ExtrusionRate { rate, relative } => {
                self.settings.extrusion_rate =
                    scalar(self.settings.extrusion_rate, *rate, *relative);
                true
            }
        }
    }

    fn apply_translation(&mut self, translation: Vector, relative: bool) -> bool {
        let next = if relative {
            let (Some(position), Some(rotation)) = (self.position, self.rotation) else {
                info!(
                    "[{}] relative move requires an absolute pose first, skipped",
                    self.name
                );
                return false;
            };
            let delta = match self.settings.reference_cs {
                ReferenceCs::World => translation,
                ReferenceCs::Local => rotation.rotate_vector(translation),
            };
            position + delta
        } else {
            if self.rotation.is_none() {
                self.rotation = Some(Quaternion::identity());
            }
            translation
        };

        self.track_extrusion(self.position, next);
        self.position = Some(next);
        self.joints = None;
        true
    }

    fn apply_rotation(&mut self, rotation: Quaternion, relative: bool) -> bool {
        if relative {
            let (Some(_), Some(current)) = (self.position, self.rotation) else {
                info!(
                    "[{}] relative rotation requires an absolute pose first, skipped",
                    self.name
                );
                return false;
            };
            self.rotation = Some(match self.settings.reference_cs {
                ReferenceCs::World => current.pre_multiplied(rotation),
                ReferenceCs::Local => current.post_multiplied(rotation),
            });
        } else {
            if self.position.is_none() {
                info!(
                    "[{}] absolute rotation requires a position first, skipped",
                    self.name
                );
                return false;
            }
            self.rotation = Some(rotation);
        }
        self.joints = None;
        true
    }

    fn apply_transformation(
        &mut self,
        translation: Vector,
        rotation: Quaternion,
        relative: bool,
        translation_first: bool,
    ) -> bool {
        if !relative {
            self.track_extrusion(self.position, translation);
            self.position = Some(translation);
            self.rotation = Some(rotation);
            self.joints = None;
            return true;
        }

        let (Some(position), Some(current)) = (self.position, self.rotation) else {
            info!(
                "[{}] relative transform requires an absolute pose first, skipped",
                self.name
            );
            return false;
        };

        // In the local frame the translation is expressed in TCP
        // coordinates, so it rotates into world space by whichever
        // orientation is current when it is applied: the old one if the
        // move comes first, the new one if the rotation comes first.
        let world = matches!(self.settings.reference_cs, ReferenceCs::World);
        let (next_position, next_rotation) = if translation_first {
            let delta = if world {
                translation
            } else {
                current.rotate_vector(translation)
            };
            let next_rotation = if world {
                current.pre_multiplied(rotation)
            } else {
                current.post_multiplied(rotation)
            };
            (position + delta, next_rotation)
        } else {
            let next_rotation = if world {
                current.pre_multiplied(rotation)
            } else {
                current.post_multiplied(rotation)
            };
            let delta = if world {
                translation
            } else {
                next_rotation.rotate_vector(translation)
            };
            (position + delta, next_rotation)
        };

        self.track_extrusion(self.position, next_position);
        self.position = Some(next_position);
        self.rotation = Some(next_rotation);
        self.joints = None;
        true
    }

    fn apply_axes(&mut self, joints: Joints, relative: bool) -> bool {
        if relative {
            let Some(current) = self.joints else {
                info!(
                    "[{}] relative axes require absolute axes first, skipped",
                    self.name
                );
                return false;
            };
            self.joints = Some(current + joints);
        } else {
            self.joints = Some(joints);
        }
        self.position = None;
        self.rotation = None;
        true
    }

    fn apply_external_axis(&mut self, axis: usize, value: f64, relative: bool) -> bool {
        if !(1..=6).contains(&axis) {
            info!(
                "[{}] external axis number {} out of range 1..=6, skipped",
                self.name, axis
            );
            return false;
        }
        let slot = &mut self.external_axes[axis - 1];
        if relative {
            let Some(current) = *slot else {
                info!(
                    "[{}] relative external axis {} requires an absolute value first, skipped",
                    self.name, axis
                );
                return false;
            };
            *slot = Some(current + value);
        } else {
            *slot = Some(value);
        }
        true
    }

    fn apply_attach_tool(&mut self, name: &str) -> bool {
        let Some(tool) = self.tools.get(name).cloned() else {
            info!("[{}] unknown tool \"{}\", attach skipped", self.name, name);
            return false;
        };

        // Attaching over an attached tool implicitly detaches it first,
        // otherwise the TCP transform would compound.
        if self.tool.is_some() {
            debug!(
                "[{}] tool already attached, detaching before \"{}\"",
                self.name, name
            );
            self.apply_detach_tool();
        }

        if let (Some(position), Some(rotation)) = (self.position, self.rotation) {
            self.position = Some(position + rotation.rotate_vector(tool.tcp_position));
            self.rotation = Some(rotation.post_multiplied(tool.tcp_orientation));
        }
        self.tool = Some(tool);
        true
    }

    fn apply_detach_tool(&mut self) -> bool {
        let Some(tool) = self.tool.take() else {
            info!("[{}] no tool attached, detach skipped", self.name);
            return false;
        };

        // Exact algebraic inverse of attach: undo the orientation first,
        // then remove the offset as seen by the restored orientation.
        if let (Some(position), Some(rotation)) = (self.position, self.rotation) {
            let restored = rotation.post_multiplied(tool.tcp_orientation.inverse());
            self.position = Some(position - restored.rotate_vector(tool.tcp_position));
            self.rotation = Some(restored);
        }
        true
    }

    /// Accrue extruded filament over a position change while extruding.
    fn track_extrusion(&mut self, from: Option<Vector>, to: Vector) {
        if !self.is_extruding {
            return;
        }
        if let Some(from) = from {
            self.extruded_length += self.settings.extrusion_rate * from.distance_to(to);
        }
    }
}

/// Combine a setting with an action value according to the relative flag.
fn scalar(current: f64, value: f64, relative: bool) -> f64 {
    if relative {
        current + value
    } else {
        value
    }
}

/// Clamp a computed setting at zero, logging when it underflowed.
fn non_negative(name: &str, what: &str, value: f64) -> f64 {
    if value < 0.0 {
        warn!("[{}] negative {} clamped to 0", name, what);
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AxisAngle;

    fn cursor() -> RobotCursor {
        RobotCursor::new("test", true)
    }

    fn issue(cursor: &mut RobotCursor, kind: ActionKind) -> bool {
        cursor.issue(Action::new(kind))
    }

    fn move_abs(c: &mut RobotCursor, x: f64, y: f64, z: f64) -> bool {
        issue(
            c,
            ActionKind::Translation {
                translation: Vector::new(x, y, z),
                relative: false,
            },
        )
    }

    fn move_rel(c: &mut RobotCursor, x: f64, y: f64, z: f64) -> bool {
        issue(
            c,
            ActionKind::Translation {
                translation: Vector::new(x, y, z),
                relative: true,
            },
        )
    }

    #[test]
    fn relative_translation_frame_dependence() {
        let mut c = cursor();
        move_abs(&mut c, 0.0, 0.0, 0.0);
        issue(
            &mut c,
            ActionKind::Rotation {
                rotation: AxisAngle::new(0.0, 0.0, 1.0, 90.0).to_quaternion(),
                relative: false,
            },
        );

        issue(
            &mut c,
            ActionKind::Coordinates {
                reference: ReferenceCs::Local,
            },
        );
        move_rel(&mut c, 10.0, 0.0, 0.0);
        let local = c.position.unwrap();
        assert!((local - Vector::new(0.0, 10.0, 0.0)).length() < 1e-9);

        issue(
            &mut c,
            ActionKind::Coordinates {
                reference: ReferenceCs::World,
            },
        );
        move_rel(&mut c, 10.0, 0.0, 0.0);
        let world = c.position.unwrap();
        assert!((world - Vector::new(10.0, 10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn relative_move_without_pose_is_rejected() {
        let mut c = cursor();
        assert!(!move_rel(&mut c, 10.0, 0.0, 0.0));
        assert!(c.position.is_none());
    }

    #[test]
    fn absolute_rotation_without_position_is_rejected() {
        let mut c = cursor();
        assert!(!issue(
            &mut c,
            ActionKind::Rotation {
                rotation: AxisAngle::new(1.0, 0.0, 0.0, 45.0).to_quaternion(),
                relative: false,
            },
        ));
    }

    #[test]
    fn cartesian_and_joint_validity_are_exclusive() {
        let mut c = cursor();
        move_abs(&mut c, 100.0, 0.0, 0.0);
        assert!(c.position.is_some());
        assert!(c.joints.is_none());

        issue(
            &mut c,
            ActionKind::Axes {
                joints: Joints::new(0.0, 90.0, 0.0, 0.0, 0.0, 0.0),
                relative: false,
            },
        );
        assert!(c.position.is_none());
        assert!(c.rotation.is_none());
        assert!(c.joints.is_some());

        // Relative axes accumulate.
        issue(
            &mut c,
            ActionKind::Axes {
                joints: Joints::new(0.0, -30.0, 0.0, 0.0, 0.0, 0.0),
                relative: true,
            },
        );
        assert!((c.joints.unwrap().0[1] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn transform_orders_differ_in_local_frame() {
        let q = AxisAngle::new(0.0, 0.0, 1.0, 90.0).to_quaternion();
        let t = Vector::new(10.0, 0.0, 0.0);

        let mut first = cursor();
        move_abs(&mut first, 0.0, 0.0, 0.0);
        issue(
            &mut first,
            ActionKind::Coordinates {
                reference: ReferenceCs::Local,
            },
        );
        issue(
            &mut first,
            ActionKind::Transformation {
                translation: t,
                rotation: q,
                relative: true,
                translation_first: true,
            },
        );
        // Identity orientation at apply time: translation lands on +X.
        assert!((first.position.unwrap() - Vector::new(10.0, 0.0, 0.0)).length() < 1e-9);

        let mut second = cursor();
        move_abs(&mut second, 0.0, 0.0, 0.0);
        issue(
            &mut second,
            ActionKind::Coordinates {
                reference: ReferenceCs::Local,
            },
        );
        issue(
            &mut second,
            ActionKind::Transformation {
                translation: t,
                rotation: q,
                relative: true,
                translation_first: false,
            },
        );
        // Rotation applied first: the same local translation lands on +Y.
        assert!((second.position.unwrap() - Vector::new(0.0, 10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn push_pop_restores_settings() {
        let mut c = cursor();
        let before = c.settings.speed;
        issue(&mut c, ActionKind::PushSettings);
        issue(
            &mut c,
            ActionKind::Speed {
                value: 999.0,
                relative: false,
            },
        );
        assert_eq!(c.settings.speed, 999.0);
        issue(&mut c, ActionKind::PopSettings);
        assert_eq!(c.settings.speed, before);
        assert_eq!(c.last_pop.unwrap().speed, 999.0);
    }

    #[test]
    fn pop_on_empty_stack_is_rejected() {
        let mut c = cursor();
        assert!(!issue(&mut c, ActionKind::PopSettings));
    }

    #[test]
    fn tool_attach_detach_is_exact_inverse() {
        let mut c = cursor();
        move_abs(&mut c, 100.0, 0.0, 0.0);
        issue(
            &mut c,
            ActionKind::DefineTool {
                tool: Tool::new(
                    "probe",
                    Vector::new(0.0, 0.0, 50.0),
                    Quaternion::identity(),
                ),
            },
        );

        issue(
            &mut c,
            ActionKind::AttachTool {
                name: "probe".to_string(),
            },
        );
        assert!((c.position.unwrap() - Vector::new(100.0, 0.0, 50.0)).length() < 1e-9);

        issue(&mut c, ActionKind::DetachTool);
        assert!((c.position.unwrap() - Vector::new(100.0, 0.0, 0.0)).length() < 1e-9);
        assert!(c.tool.is_none());
    }

    #[test]
    fn tool_attach_detach_inverse_with_orientation() {
        let mut c = cursor();
        move_abs(&mut c, 50.0, -20.0, 30.0);
        issue(
            &mut c,
            ActionKind::Rotation {
                rotation: AxisAngle::new(1.0, 1.0, 0.0, 60.0).to_quaternion(),
                relative: false,
            },
        );
        let pose_before = (c.position.unwrap(), c.rotation.unwrap());

        issue(
            &mut c,
            ActionKind::DefineTool {
                tool: Tool::new(
                    "gripper",
                    Vector::new(5.0, -3.0, 80.0),
                    AxisAngle::new(0.0, 1.0, 0.0, 30.0).to_quaternion(),
                ),
            },
        );
        issue(
            &mut c,
            ActionKind::AttachTool {
                name: "gripper".to_string(),
            },
        );
        issue(&mut c, ActionKind::DetachTool);

        assert!((c.position.unwrap() - pose_before.0).length() < 1e-6);
        assert!(c.rotation.unwrap().is_equivalent(pose_before.1));
    }

    #[test]
    fn reattach_implicitly_detaches() {
        let mut c = cursor();
        move_abs(&mut c, 0.0, 0.0, 0.0);
        for (name, z) in [("a", 10.0), ("b", 25.0)] {
            issue(
                &mut c,
                ActionKind::DefineTool {
                    tool: Tool::new(name, Vector::new(0.0, 0.0, z), Quaternion::identity()),
                },
            );
        }
        issue(&mut c, ActionKind::AttachTool { name: "a".into() });
        issue(&mut c, ActionKind::AttachTool { name: "b".into() });
        // Only tool b's offset is in effect.
        assert!((c.position.unwrap() - Vector::new(0.0, 0.0, 25.0)).length() < 1e-9);
        issue(&mut c, ActionKind::DetachTool);
        assert!((c.position.unwrap() - Vector::zero()).length() < 1e-9);
    }

    #[test]
    fn attach_unknown_tool_is_rejected() {
        let mut c = cursor();
        assert!(!issue(&mut c, ActionKind::AttachTool { name: "nope".into() }));
    }

    #[test]
    fn extrusion_length_accrues_with_travel() {
        let mut c = cursor();
        move_abs(&mut c, 0.0, 0.0, 0.0);
        issue(
            &mut c,
            ActionKind::ExtrusionRate {
                rate: 0.05,
                relative: false,
            },
        );
        issue(&mut c, ActionKind::Extrusion { on: true });
        move_rel(&mut c, 30.0, 40.0, 0.0); // 50 mm of travel
        assert!((c.extruded_length - 2.5).abs() < 1e-9);

        issue(&mut c, ActionKind::Extrusion { on: false });
        move_rel(&mut c, 30.0, 40.0, 0.0);
        assert!((c.extruded_length - 2.5).abs() < 1e-9);
    }

    #[test]
    fn cascade_reaches_child_only_on_success() {
        let child = Arc::new(Mutex::new(RobotCursor::new("child", false)));
        let mut parent = RobotCursor::new("parent", true);
        parent.set_child(child.clone());

        // Fails: relative move with no pose. Must not cascade.
        parent.issue(Action::new(ActionKind::Translation {
            translation: Vector::new(1.0, 0.0, 0.0),
            relative: true,
        }));
        assert_eq!(child.lock().unwrap().pending_count(), 0);

        parent.issue(Action::new(ActionKind::Translation {
            translation: Vector::new(1.0, 0.0, 0.0),
            relative: false,
        }));
        assert_eq!(child.lock().unwrap().pending_count(), 1);
    }

    #[test]
    fn apply_until_id_consumes_prefix() {
        let mut c = RobotCursor::new("deferred", false);
        let a = Action::new(ActionKind::Wait { millis: 1 });
        let b = Action::new(ActionKind::Wait { millis: 2 });
        let d = Action::new(ActionKind::Wait { millis: 3 });
        let target = b.id;
        c.issue(a);
        c.issue(b);
        c.issue(d);

        assert_eq!(c.apply_until_id(target), 2);
        assert_eq!(c.pending_count(), 1);
    }

    #[test]
    fn negative_speed_clamps_to_zero() {
        let mut c = cursor();
        issue(
            &mut c,
            ActionKind::Speed {
                value: -500.0,
                relative: true,
            },
        );
        assert_eq!(c.settings.speed, 0.0);
    }
}
