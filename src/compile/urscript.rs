//! URScript program generation.
//!
//! Emits a single `.script` file wrapping the actions in a function
//! definition. URScript wants SI units: poses in meters with a rotation
//! vector in radians, speeds in m/s or rad/s depending on the motion
//! verb. The cursor state stays canonical (mm, degrees); conversion
//! happens only here, at emission.

use crate::action::{Action, ActionKind};
use crate::compile::{banner, compile_count, fmt_f64, CompileOptions, Compiler, ProgramFile};
use crate::cursor::RobotCursor;
use crate::error::{Error, Result};
use crate::geometry::Quaternion;
use crate::settings::Settings;
use crate::types::MotionType;

const COMMENT: &str = "#";

/// Controller defaults used when the cursor has no explicit acceleration.
const DEFAULT_LINEAR_ACCEL: f64 = 1.2; // m/s^2
const DEFAULT_JOINT_ACCEL: f64 = 1.4; // rad/s^2

pub struct UrScriptCompiler;

impl Compiler for UrScriptCompiler {
    fn compile(
        &self,
        cursor: &mut RobotCursor,
        options: &CompileOptions,
    ) -> Result<Vec<ProgramFile>> {
        let mut instructions = Vec::new();
        let count = compile_count(cursor, options);

        for _ in 0..count {
            let Some((action, ok)) = cursor.apply_next() else {
                break;
            };
            if !ok {
                if let ActionKind::AttachTool { name } = &action.kind {
                    return Err(Error::ToolMissing(name.clone()));
                }
                instructions.push(format!("{} skipped: {}", COMMENT, action));
                continue;
            }
            emit(&mut instructions, cursor, &action);
        }

        let mut lines = banner(COMMENT, &options.program_name);
        lines.push(format!("def {}():", options.program_name));
        for instr in &instructions {
            lines.push(format!("  {}", instr));
        }
        lines.push("end".to_string());
        lines.push(format!("{}()", options.program_name));

        Ok(vec![ProgramFile::new(&options.program_name, "script", lines)])
    }
}

fn emit(out: &mut Vec<String>, cursor: &RobotCursor, action: &Action) {
    match &action.kind {
        ActionKind::Translation { .. }
        | ActionKind::Rotation { .. }
        | ActionKind::Transformation { .. } => {
            let (Some(position), Some(rotation)) = (cursor.position, cursor.rotation) else {
                return;
            };
            let pose = pose_literal(position.x, position.y, position.z, rotation);
            // One canonical speed value drives both verbs: movel reads
            // it as mm/s (to m/s), movej as deg/s (to rad/s).
            match cursor.settings.motion_type {
                MotionType::Linear => out.push(format!(
                    "movel({}, a={}, v={}, r={})",
                    pose,
                    fmt_f64(linear_accel(&cursor.settings), 4),
                    fmt_f64(cursor.settings.speed / 1000.0, 4),
                    fmt_f64(cursor.settings.precision / 1000.0, 4),
                )),
                MotionType::Joint => out.push(format!(
                    "movej({}, a={}, v={}, r={})",
                    pose,
                    fmt_f64(joint_accel(&cursor.settings), 4),
                    fmt_f64(cursor.settings.speed.to_radians(), 4),
                    fmt_f64(cursor.settings.precision / 1000.0, 4),
                )),
            }
        }
        ActionKind::Axes { .. } => {
            let Some(joints) = cursor.joints else {
                return;
            };
            let j: Vec<String> = joints
                .0
                .iter()
                .map(|d| fmt_f64(d.to_radians(), 6))
                .collect();
            out.push(format!(
                "movej([{}], a={}, v={}, r={})",
                j.join(", "),
                fmt_f64(joint_accel(&cursor.settings), 4),
                fmt_f64(cursor.settings.speed.to_radians(), 4),
                fmt_f64(cursor.settings.precision / 1000.0, 4),
            ));
        }
        ActionKind::ExternalAxis { .. } => {
            out.push(format!("{} unsupported: {}", COMMENT, action));
        }
        ActionKind::Speed { .. }
        | ActionKind::Acceleration { .. }
        | ActionKind::RotationSpeed { .. }
        | ActionKind::JointSpeed { .. }
        | ActionKind::JointAcceleration { .. }
        | ActionKind::Precision { .. }
        | ActionKind::MotionMode { .. }
        | ActionKind::Coordinates { .. }
        | ActionKind::PushSettings
        | ActionKind::PopSettings => {
            // Motion parameters travel on each move call.
        }
        ActionKind::Wait { millis } => {
            out.push(format!("sleep({})", fmt_f64(*millis as f64 / 1000.0, 3)));
        }
        ActionKind::Message { text } => {
            out.push(format!("popup(\"{}\")", text));
        }
        ActionKind::Comment { text } => {
            out.push(format!("{} {}", COMMENT, text));
        }
        ActionKind::CustomCode { statement, .. } => {
            out.push(statement.clone());
        }
        ActionKind::DefineTool { .. } => {}
        ActionKind::AttachTool { .. } => {
            if let Some(tool) = &cursor.tool {
                out.push(format!(
                    "set_tcp({})",
                    pose_literal(
                        tool.tcp_position.x,
                        tool.tcp_position.y,
                        tool.tcp_position.z,
                        tool.tcp_orientation,
                    )
                ));
            }
        }
        ActionKind::DetachTool => {
            out.push("set_tcp(p[0, 0, 0, 0, 0, 0])".to_string());
        }
        ActionKind::IoDigital { pin, on } => {
            out.push(format!(
                "set_digital_out({}, {})",
                pin,
                if *on { "True" } else { "False" }
            ));
        }
        ActionKind::IoAnalog { pin, value } => {
            out.push(format!("set_analog_out({}, {})", pin, fmt_f64(*value, 4)));
        }
        ActionKind::Temperature { .. }
        | ActionKind::Extrusion { .. }
        | ActionKind::ExtrusionRate { .. } => {
            out.push(format!("{} unsupported: {}", COMMENT, action));
        }
    }
}

/// `p[x, y, z, rx, ry, rz]` in meters and radians.
fn pose_literal(x: f64, y: f64, z: f64, rotation: Quaternion) -> String {
    let rv = rotation.to_rotation_vector().to_radians();
    format!(
        "p[{}, {}, {}, {}, {}, {}]",
        fmt_f64(x / 1000.0, 6),
        fmt_f64(y / 1000.0, 6),
        fmt_f64(z / 1000.0, 6),
        fmt_f64(rv[0], 6),
        fmt_f64(rv[1], 6),
        fmt_f64(rv[2], 6),
    )
}

fn linear_accel(settings: &Settings) -> f64 {
    if settings.acceleration > 0.0 {
        settings.acceleration / 1000.0
    } else {
        DEFAULT_LINEAR_ACCEL
    }
}

fn joint_accel(settings: &Settings) -> f64 {
    if settings.joint_acceleration > 0.0 {
        settings.joint_acceleration.to_radians()
    } else {
        DEFAULT_JOINT_ACCEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::types::{Joints, Tool};

    fn issue(cursor: &mut RobotCursor, kind: ActionKind) {
        cursor.issue(Action::new(kind));
    }

    fn compile(cursor: &mut RobotCursor) -> String {
        let files = UrScriptCompiler
            .compile(cursor, &CompileOptions::default())
            .unwrap();
        assert_eq!(files[0].extension, "script");
        files[0].to_source()
    }

    #[test]
    fn movel_converts_mm_to_meters() {
        let mut c = RobotCursor::new("ur", false);
        issue(
            &mut c,
            ActionKind::Speed {
                value: 250.0,
                relative: false,
            },
        );
        issue(
            &mut c,
            ActionKind::Translation {
                translation: Vector::new(500.0, 0.0, 250.0),
                relative: false,
            },
        );
        let source = compile(&mut c);
        assert!(source.contains("movel(p[0.5, 0, 0.25, 0, 0, 0], a=1.2, v=0.25, r=0.005)"));
    }

    #[test]
    fn movej_uses_radians() {
        let mut c = RobotCursor::new("ur", false);
        issue(
            &mut c,
            ActionKind::Axes {
                joints: Joints::new(0.0, -90.0, 0.0, 0.0, 0.0, 0.0),
                relative: false,
            },
        );
        let source = compile(&mut c);
        assert!(source.contains("movej([0, -1.570796, 0, 0, 0, 0]"));
    }

    #[test]
    fn joint_mode_speed_follows_the_canonical_speed_value() {
        let mut c = RobotCursor::new("ur", false);
        issue(
            &mut c,
            ActionKind::Speed {
                value: 200.0,
                relative: false,
            },
        );
        issue(
            &mut c,
            ActionKind::MotionMode {
                motion: MotionType::Joint,
            },
        );
        issue(
            &mut c,
            ActionKind::Translation {
                translation: Vector::new(100.0, 0.0, 300.0),
                relative: false,
            },
        );
        let source = compile(&mut c);
        // 200 deg/s reinterpreted as rad/s for the joint verb.
        assert!(source.contains("movej(p[0.1, 0, 0.3, 0, 0, 0], a=1.4, v=3.4907, r=0.005)"));
    }

    #[test]
    fn attach_emits_set_tcp() {
        let mut c = RobotCursor::new("ur", false);
        issue(
            &mut c,
            ActionKind::DefineTool {
                tool: Tool::new(
                    "pen",
                    Vector::new(0.0, 0.0, 120.0),
                    Quaternion::identity(),
                ),
            },
        );
        issue(&mut c, ActionKind::AttachTool { name: "pen".into() });
        issue(&mut c, ActionKind::DetachTool);
        let source = compile(&mut c);
        assert!(source.contains("set_tcp(p[0, 0, 0.12, 0, 0, 0])"));
        assert!(source.contains("set_tcp(p[0, 0, 0, 0, 0, 0])"));
    }
}
