//! ASCII streaming codec shared by the ABB and UR drivers.
//!
//! Outbound: `#<id> <code> <args…>;`. Inbound: `>##<code> <args…>;`.
//! The two vendors speak the same grammar but different units: the ABB
//! driver works in the cursor's native mm/deg, the UR driver wants
//! meters and radians. Conversion happens symmetrically at the codec
//! boundary so cursor state stays canonical.

use regex::Regex;
use tracing::warn;

use crate::action::{Action, ActionKind};
use crate::cursor::RobotCursor;
use crate::geometry::{Quaternion, Vector};
use crate::protocol::{DeviceEvent, WireProtocol};
use crate::types::{Joints, MotionType};

// Outbound instruction codes.
const INST_MOVE_LINEAR: u8 = 1;
const INST_MOVE_JOINT: u8 = 2;
const INST_AXES: u8 = 3;
const INST_SPEED: u8 = 4;
const INST_PRECISION: u8 = 5;
const INST_WAIT: u8 = 6;
const INST_MESSAGE: u8 = 7;
const INST_TOOL: u8 = 8;
const INST_NO_TOOL: u8 = 9;
const INST_SET_DO: u8 = 10;
const INST_SET_AO: u8 = 11;

// Inbound response codes.
const RESP_ACK: u8 = 1;
const RESP_POSE: u8 = 2;
const RESP_JOINTS: u8 = 3;

#[derive(Clone, Copy, PartialEq)]
enum Units {
    /// mm and degrees, as the cursor stores them.
    Native,
    /// meters and radians on the wire.
    Si,
}

pub struct AsciiCodec {
    units: Units,
    inbound: String,
    response_re: Regex,
}

impl AsciiCodec {
    pub fn abb() -> Self {
        Self::with_units(Units::Native)
    }

    pub fn ur() -> Self {
        Self::with_units(Units::Si)
    }

    fn with_units(units: Units) -> Self {
        Self {
            units,
            inbound: String::new(),
            response_re: Regex::new(r"^>##(\d+)((?:\s+-?[\d.eE+-]+)*)\s*$").unwrap(),
        }
    }

    fn length(&self, mm: f64) -> f64 {
        match self.units {
            Units::Native => mm,
            Units::Si => mm / 1000.0,
        }
    }

    fn angle(&self, degrees: f64) -> f64 {
        match self.units {
            Units::Native => degrees,
            Units::Si => degrees.to_radians(),
        }
    }

    fn length_in(&self, wire: f64) -> f64 {
        match self.units {
            Units::Native => wire,
            Units::Si => wire * 1000.0,
        }
    }

    fn angle_in(&self, wire: f64) -> f64 {
        match self.units {
            Units::Native => wire,
            Units::Si => wire.to_degrees(),
        }
    }

    fn pose_args(&self, position: Vector, rotation: Quaternion) -> String {
        format!(
            "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            self.length(position.x),
            self.length(position.y),
            self.length(position.z),
            rotation.w,
            rotation.x,
            rotation.y,
            rotation.z,
        )
    }

    fn parse_response(&self, chunk: &str) -> Option<DeviceEvent> {
        let caps = self.response_re.captures(chunk)?;
        let code: u8 = caps[1].parse().ok()?;
        let args: Vec<f64> = caps[2]
            .split_whitespace()
            .map(|a| a.parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        match (code, args.len()) {
            (RESP_ACK, 1) => Some(DeviceEvent::Ack { id: args[0] as u64 }),
            (RESP_POSE, 7) => Some(DeviceEvent::Pose {
                position: Vector::new(
                    self.length_in(args[0]),
                    self.length_in(args[1]),
                    self.length_in(args[2]),
                ),
                rotation: Quaternion::new(args[3], args[4], args[5], args[6]),
            }),
            (RESP_JOINTS, 6) => Some(DeviceEvent::Joints {
                joints: Joints::new(
                    self.angle_in(args[0]),
                    self.angle_in(args[1]),
                    self.angle_in(args[2]),
                    self.angle_in(args[3]),
                    self.angle_in(args[4]),
                    self.angle_in(args[5]),
                ),
            }),
            _ => None,
        }
    }
}

impl WireProtocol for AsciiCodec {
    fn encode(&self, action: &Action, cursor: &RobotCursor) -> Option<String> {
        let body = match &action.kind {
            ActionKind::Translation { .. }
            | ActionKind::Rotation { .. }
            | ActionKind::Transformation { .. } => {
                let (position, rotation) = (cursor.position?, cursor.rotation?);
                let code = match cursor.settings.motion_type {
                    MotionType::Linear => INST_MOVE_LINEAR,
                    MotionType::Joint => INST_MOVE_JOINT,
                };
                format!("{} {}", code, self.pose_args(position, rotation))
            }
            ActionKind::Axes { .. } => {
                let j = cursor.joints?.0;
                format!(
                    "{} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                    INST_AXES,
                    self.angle(j[0]),
                    self.angle(j[1]),
                    self.angle(j[2]),
                    self.angle(j[3]),
                    self.angle(j[4]),
                    self.angle(j[5]),
                )
            }
            ActionKind::Speed { .. } => {
                format!("{} {:.6}", INST_SPEED, self.length(cursor.settings.speed))
            }
            ActionKind::Precision { .. } => {
                format!(
                    "{} {:.6}",
                    INST_PRECISION,
                    self.length(cursor.settings.precision)
                )
            }
            ActionKind::Wait { millis } => format!("{} {}", INST_WAIT, millis),
            ActionKind::Message { text } => {
                format!("{} \"{}\"", INST_MESSAGE, text.replace('"', "'"))
            }
            ActionKind::AttachTool { .. } => {
                let tool = cursor.tool.as_ref()?;
                format!(
                    "{} {}",
                    INST_TOOL,
                    self.pose_args(tool.tcp_position, tool.tcp_orientation)
                )
            }
            ActionKind::DetachTool => format!("{}", INST_NO_TOOL),
            ActionKind::IoDigital { pin, on } => {
                format!("{} {} {}", INST_SET_DO, pin, if *on { 1 } else { 0 })
            }
            ActionKind::IoAnalog { pin, value } => {
                format!("{} {} {:.6}", INST_SET_AO, pin, value)
            }
            // Everything else only mutates cursor state.
            _ => return None,
        };
        Some(format!("#{} {};", action.id, body))
    }

    fn frame(&self, batch: &[String]) -> Vec<u8> {
        batch.concat().into_bytes()
    }

    fn feed(&mut self, bytes: &[u8]) -> Vec<DeviceEvent> {
        self.inbound.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();
        // Only complete ';'-terminated statements are consumed; a
        // partial tail stays buffered for the next read.
        while let Some(end) = self.inbound.find(';') {
            let chunk: String = self.inbound.drain(..=end).collect();
            let chunk = chunk[..chunk.len() - 1].trim();
            if chunk.is_empty() {
                continue;
            }
            match self.parse_response(chunk) {
                Some(event) => events.push(event),
                None => warn!("dropping malformed response frame: {:?}", chunk),
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at(x: f64, y: f64, z: f64) -> RobotCursor {
        let mut c = RobotCursor::new("wire", true);
        c.issue(Action::new(ActionKind::Translation {
            translation: Vector::new(x, y, z),
            relative: false,
        }));
        c
    }

    #[test]
    fn abb_encodes_native_units() {
        let codec = AsciiCodec::abb();
        let c = cursor_at(500.0, 0.0, 250.0);
        let action = Action::new(ActionKind::Translation {
            translation: Vector::new(500.0, 0.0, 250.0),
            relative: false,
        });
        let msg = codec.encode(&action, &c).unwrap();
        assert_eq!(
            msg,
            format!(
                "#{} 1 500.000000 0.000000 250.000000 1.000000 0.000000 0.000000 0.000000;",
                action.id
            )
        );
    }

    #[test]
    fn ur_encodes_meters() {
        let codec = AsciiCodec::ur();
        let c = cursor_at(500.0, 0.0, 250.0);
        let action = Action::new(ActionKind::Translation {
            translation: Vector::new(500.0, 0.0, 250.0),
            relative: false,
        });
        let msg = codec.encode(&action, &c).unwrap();
        assert!(msg.contains(" 1 0.500000 0.000000 0.250000 "));
    }

    #[test]
    fn settings_only_actions_have_no_wire_form() {
        let codec = AsciiCodec::abb();
        let mut c = RobotCursor::new("wire", true);
        let push = Action::new(ActionKind::PushSettings);
        c.issue(push.clone());
        assert!(codec.encode(&push, &c).is_none());
    }

    #[test]
    fn feed_handles_partial_and_concatenated_frames() {
        let mut codec = AsciiCodec::abb();
        assert!(codec.feed(b">##1 4").is_empty());
        let events = codec.feed(b"2;>##1 43;");
        assert_eq!(
            events,
            vec![DeviceEvent::Ack { id: 42 }, DeviceEvent::Ack { id: 43 }]
        );
    }

    #[test]
    fn ur_pose_response_converts_to_millimeters() {
        let mut codec = AsciiCodec::ur();
        let events = codec.feed(b">##2 0.5 0 0.25 1 0 0 0;");
        match &events[0] {
            DeviceEvent::Pose { position, .. } => {
                assert!((position.x - 500.0).abs() < 1e-9);
                assert!((position.z - 250.0).abs() < 1e-9);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let mut codec = AsciiCodec::abb();
        let events = codec.feed(b">##garbage here;>##1 7;");
        assert_eq!(events, vec![DeviceEvent::Ack { id: 7 }]);
    }
}
