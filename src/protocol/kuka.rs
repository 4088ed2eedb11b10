//! KUKA XML streaming codec.
//!
//! Outbound messages are `<DR/>` elements batched inside a `<DT>`
//! envelope with a count and a continue flag. Orientation goes out as
//! ZYX Euler angles in degrees, positions in mm, matching the
//! controller-side interpreter. Inbound traffic is `<R/>` acks and
//! `<S/>` state broadcasts, which may arrive concatenated or spliced
//! across reads at any byte boundary.

use regex::Regex;
use tracing::warn;

use crate::action::{Action, ActionKind};
use crate::cursor::RobotCursor;
use crate::geometry::EulerZyx;
use crate::protocol::{DeviceEvent, WireProtocol};
use crate::types::{Joints, MotionType};

pub struct KukaCodec {
    inbound: String,
    ack_re: Regex,
    state_re: Regex,
    attr_re: Regex,
}

impl KukaCodec {
    pub fn new() -> Self {
        Self {
            inbound: String::new(),
            ack_re: Regex::new(r#"^<R\s+ID="(\d+)""#).unwrap(),
            state_re: Regex::new(r"^<S[\s/]").unwrap(),
            attr_re: Regex::new(r#"([A-Z]\d?)="([-+\d.eE]+)""#).unwrap(),
        }
    }

    fn parse_element(&self, element: &str) -> Option<DeviceEvent> {
        if let Some(caps) = self.ack_re.captures(element) {
            return Some(DeviceEvent::Ack {
                id: caps[1].parse().ok()?,
            });
        }
        if self.state_re.is_match(element) {
            return self.parse_state(element);
        }
        None
    }

    fn parse_state(&self, element: &str) -> Option<DeviceEvent> {
        let mut axes = [None::<f64>; 6];
        let mut pose = [None::<f64>; 6]; // X Y Z A B C
        for caps in self.attr_re.captures_iter(element) {
            let value: f64 = caps[2].parse().ok()?;
            match &caps[1] {
                "A1" => axes[0] = Some(value),
                "A2" => axes[1] = Some(value),
                "A3" => axes[2] = Some(value),
                "A4" => axes[3] = Some(value),
                "A5" => axes[4] = Some(value),
                "A6" => axes[5] = Some(value),
                "X" => pose[0] = Some(value),
                "Y" => pose[1] = Some(value),
                "Z" => pose[2] = Some(value),
                "A" => pose[3] = Some(value),
                "B" => pose[4] = Some(value),
                "C" => pose[5] = Some(value),
                _ => {}
            }
        }
        let joints = Joints([
            axes[0]?, axes[1]?, axes[2]?, axes[3]?, axes[4]?, axes[5]?,
        ]);
        let position = crate::geometry::Vector::new(pose[0]?, pose[1]?, pose[2]?);
        let rotation = EulerZyx::new(pose[5]?, pose[4]?, pose[3]?).to_quaternion();
        Some(DeviceEvent::State {
            position,
            rotation,
            joints,
        })
    }
}

impl Default for KukaCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl WireProtocol for KukaCodec {
    fn encode(&self, action: &Action, cursor: &RobotCursor) -> Option<String> {
        let (kind, values) = match &action.kind {
            ActionKind::Translation { .. }
            | ActionKind::Rotation { .. }
            | ActionKind::Transformation { .. } => {
                let (position, rotation) = (cursor.position?, cursor.rotation?);
                let e = rotation.to_euler_zyx();
                let kind = match cursor.settings.motion_type {
                    MotionType::Linear => "LIN",
                    MotionType::Joint => "PTP",
                };
                (
                    kind,
                    format!(
                        "{:.3} {:.3} {:.3} {:.4} {:.4} {:.4}",
                        position.x, position.y, position.z, e.z, e.y, e.x
                    ),
                )
            }
            ActionKind::Axes { .. } => {
                let j = cursor.joints?.0;
                (
                    "AXES",
                    format!(
                        "{:.4} {:.4} {:.4} {:.4} {:.4} {:.4}",
                        j[0], j[1], j[2], j[3], j[4], j[5]
                    ),
                )
            }
            ActionKind::Speed { .. } => ("VEL", format!("{:.6}", cursor.settings.speed / 1000.0)),
            ActionKind::Precision { .. } => {
                ("ZON", format!("{:.3}", cursor.settings.precision))
            }
            ActionKind::Wait { millis } => ("WAI", format!("{:.3}", *millis as f64 / 1000.0)),
            ActionKind::IoDigital { pin, on } => {
                ("OUT", format!("{} {}", pin, if *on { 1 } else { 0 }))
            }
            ActionKind::IoAnalog { pin, value } => ("AOUT", format!("{} {:.4}", pin, value)),
            _ => return None,
        };
        Some(format!(
            r#"<DR ID="{}" T="{}" V="{}"/>"#,
            action.id, kind, values
        ))
    }

    fn frame(&self, batch: &[String]) -> Vec<u8> {
        let mut envelope = String::from("<DT>");
        envelope.push_str(&format!("<DC>{}</DC>", batch.len()));
        for message in batch {
            envelope.push_str(message);
        }
        envelope.push_str("<Con>1</Con></DT>");
        envelope.into_bytes()
    }

    fn feed(&mut self, bytes: &[u8]) -> Vec<DeviceEvent> {
        self.inbound.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();
        loop {
            let Some(start) = self.inbound.find('<') else {
                self.inbound.clear();
                break;
            };
            // Noise before the element start is discarded.
            if start > 0 {
                self.inbound.drain(..start);
            }
            let Some(end) = self.inbound.find("/>") else {
                break; // incomplete element, wait for more bytes
            };
            let element: String = self.inbound.drain(..end + 2).collect();
            match self.parse_element(&element) {
                Some(event) => events.push(event),
                None => warn!("dropping malformed XML frame: {:?}", element),
            }
        }
        events
    }
}
