//! ABB RAPID program generation.
//!
//! Emits a single `.mod` module. Speed and zone values are interned into
//! named `speeddata`/`zonedata` declarations the first time they appear,
//! so repeated moves at the same settings share one declaration. Units
//! are RAPID-native: mm, degrees, mm/s.

use std::collections::BTreeMap;

use crate::action::{Action, ActionKind};
use crate::compile::{banner, compile_count, fmt_f64, safe_double, CompileOptions, Compiler,
    ProgramFile};
use crate::cursor::RobotCursor;
use crate::error::{Error, Result};
use crate::geometry::Quaternion;
use crate::settings::Settings;
use crate::types::{ExternalAxes, Joints, MotionType, Tool};

const COMMENT: &str = "!";

pub struct RapidCompiler;

impl Compiler for RapidCompiler {
    fn compile(
        &self,
        cursor: &mut RobotCursor,
        options: &CompileOptions,
    ) -> Result<Vec<ProgramFile>> {
        let mut state = RapidState::default();
        let count = compile_count(cursor, options);

        for _ in 0..count {
            let Some((action, ok)) = cursor.apply_next() else {
                break;
            };
            if !ok {
                if let ActionKind::AttachTool { name } = &action.kind {
                    return Err(Error::ToolMissing(name.clone()));
                }
                state
                    .instructions
                    .push(format!("{} skipped: {}", COMMENT, action));
                continue;
            }
            state.emit(cursor, &action, options);
        }

        let mut lines = banner(COMMENT, &options.program_name);
        lines.push(format!("MODULE {}", options.program_name));
        for decl in state.declarations.values() {
            lines.push(format!("  {}", decl));
        }
        if !state.declarations.is_empty() {
            lines.push(String::new());
        }
        lines.push("  PROC main()".to_string());
        lines.push("    ConfJ \\Off;".to_string());
        lines.push("    ConfL \\Off;".to_string());
        for instr in &state.instructions {
            lines.push(format!("    {}", instr));
        }
        lines.push("  ENDPROC".to_string());
        lines.push("ENDMODULE".to_string());

        Ok(vec![ProgramFile::new(&options.program_name, "mod", lines)])
    }
}

#[derive(Default)]
struct RapidState {
    /// Interned declarations keyed by identifier, ordered for stable output.
    declarations: BTreeMap<String, String>,
    instructions: Vec<String>,
    target_count: usize,
}

impl RapidState {
    fn emit(&mut self, cursor: &RobotCursor, action: &Action, options: &CompileOptions) {
        match &action.kind {
            ActionKind::Translation { .. }
            | ActionKind::Rotation { .. }
            | ActionKind::Transformation { .. } => self.emit_cartesian_move(cursor, options),
            ActionKind::Axes { .. } => self.emit_joint_move(cursor, options),
            ActionKind::ExternalAxis { .. } => {
                // Folded into the extax component of subsequent targets.
            }
            ActionKind::Speed { .. }
            | ActionKind::RotationSpeed { .. }
            | ActionKind::JointSpeed { .. }
            | ActionKind::JointAcceleration { .. }
            | ActionKind::Precision { .. }
            | ActionKind::MotionMode { .. }
            | ActionKind::Coordinates { .. }
            | ActionKind::PushSettings => {
                // No instruction; the new values ride on the next move.
            }
            ActionKind::Acceleration { .. } => self.emit_acc_set(&cursor.settings),
            ActionKind::PopSettings => {
                // AccSet is sticky in RAPID, so a pop only needs a revert
                // when the acceleration actually changed.
                if let Some(before) = cursor.last_pop {
                    if before.acceleration != cursor.settings.acceleration {
                        self.emit_acc_set(&cursor.settings);
                    }
                }
            }
            ActionKind::Wait { millis } => {
                self.instructions
                    .push(format!("WaitTime {};", fmt_f64(*millis as f64 / 1000.0, 3)));
            }
            ActionKind::Message { text } => {
                self.instructions.push(format!("TPWrite \"{}\";", text));
            }
            ActionKind::Comment { text } => {
                self.instructions.push(format!("{} {}", COMMENT, text));
            }
            ActionKind::CustomCode {
                statement,
                is_declaration,
            } => {
                if *is_declaration {
                    let key = format!("zz_custom{}", self.declarations.len());
                    self.declarations.insert(key, statement.clone());
                } else {
                    self.instructions.push(statement.clone());
                }
            }
            ActionKind::DefineTool { tool } => self.declare_tool(tool),
            ActionKind::AttachTool { .. } | ActionKind::DetachTool => {
                // Tool frames are baked into targets; the active tooldata
                // name changes on the next move.
            }
            ActionKind::IoDigital { pin, on } => {
                self.instructions
                    .push(format!("SetDO {}, {};", pin, if *on { 1 } else { 0 }));
            }
            ActionKind::IoAnalog { pin, value } => {
                self.instructions
                    .push(format!("SetAO {}, {};", pin, fmt_f64(*value, 3)));
            }
            ActionKind::Temperature { .. }
            | ActionKind::Extrusion { .. }
            | ActionKind::ExtrusionRate { .. } => {
                self.instructions
                    .push(format!("{} unsupported: {}", COMMENT, action));
            }
        }
    }

    fn emit_cartesian_move(&mut self, cursor: &RobotCursor, options: &CompileOptions) {
        let (Some(position), Some(rotation)) = (cursor.position, cursor.rotation) else {
            return;
        };
        let target = robtarget(position.x, position.y, position.z, rotation, &cursor.external_axes);
        let vel = self.speeddata(&cursor.settings);
        let zone = self.zonedata(&cursor.settings);
        let tool = self.tool_name(cursor);
        let verb = match cursor.settings.motion_type {
            MotionType::Linear => "MoveL",
            MotionType::Joint => "MoveJ",
        };
        let target = self.target_operand(&target, "robtarget", options);
        self.instructions
            .push(format!("{} {}, {}, {}, {}\\WObj:=WObj0;", verb, target, vel, zone, tool));
    }

    fn emit_joint_move(&mut self, cursor: &RobotCursor, options: &CompileOptions) {
        let Some(joints) = cursor.joints else {
            return;
        };
        let target = jointtarget(&joints, &cursor.external_axes);
        let vel = self.speeddata(&cursor.settings);
        let zone = self.zonedata(&cursor.settings);
        let tool = self.tool_name(cursor);
        let target = self.target_operand(&target, "jointtarget", options);
        self.instructions
            .push(format!("MoveAbsJ {}, {}, {}, {}\\WObj:=WObj0;", target, vel, zone, tool));
    }

    fn target_operand(&mut self, literal: &str, rapid_type: &str, options: &CompileOptions) -> String {
        if options.inline_targets {
            return literal.to_string();
        }
        self.target_count += 1;
        let name = format!("target{}", self.target_count);
        self.declarations.insert(
            format!("t{:06}", self.target_count),
            format!("CONST {} {} := {};", rapid_type, name, literal),
        );
        name
    }

    fn speeddata(&mut self, settings: &Settings) -> String {
        let name = format!("vel{}", safe_double(settings.speed));
        self.declarations
            .entry(format!("s_{}", name))
            .or_insert_with(|| {
                format!(
                    "CONST speeddata {} := [{}, {}, 5000, 1000];",
                    name,
                    fmt_f64(settings.speed, 3),
                    fmt_f64(settings.rotation_speed, 3),
                )
            });
        name
    }

    fn zonedata(&mut self, settings: &Settings) -> String {
        if settings.precision <= 0.0 {
            return "fine".to_string();
        }
        let name = format!("zone{}", safe_double(settings.precision));
        let r = settings.precision;
        self.declarations
            .entry(format!("z_{}", name))
            .or_insert_with(|| {
                format!(
                    "CONST zonedata {0} := [FALSE, {1}, {2}, {2}, {3}, {2}, {3}];",
                    name,
                    fmt_f64(r, 3),
                    fmt_f64(r * 1.5, 3),
                    fmt_f64(r * 0.15, 3),
                )
            });
        name
    }

    fn declare_tool(&mut self, tool: &Tool) {
        let t = &tool.tcp_position;
        let q = &tool.tcp_orientation;
        let cog = &tool.center_of_gravity;
        self.declarations.insert(
            format!("tool_{}", tool.name),
            format!(
                "PERS tooldata {} := [TRUE, [[{}, {}, {}], [{}, {}, {}, {}]], \
                 [{}, [{}, {}, {}], [1, 0, 0, 0], 0, 0, 0]];",
                tool.name,
                fmt_f64(t.x, 3),
                fmt_f64(t.y, 3),
                fmt_f64(t.z, 3),
                fmt_f64(q.w, 6),
                fmt_f64(q.x, 6),
                fmt_f64(q.y, 6),
                fmt_f64(q.z, 6),
                fmt_f64(tool.weight, 3),
                fmt_f64(cog.x, 3),
                fmt_f64(cog.y, 3),
                fmt_f64(cog.z, 3),
            ),
        );
    }

    fn tool_name(&self, cursor: &RobotCursor) -> String {
        match &cursor.tool {
            Some(tool) => tool.name.clone(),
            None => "Tool0".to_string(),
        }
    }
}

fn robtarget(x: f64, y: f64, z: f64, q: Quaternion, extax: &ExternalAxes) -> String {
    format!(
        "[[{}, {}, {}], [{}, {}, {}, {}], [0, 0, 0, 0], {}]",
        fmt_f64(x, 3),
        fmt_f64(y, 3),
        fmt_f64(z, 3),
        fmt_f64(q.w, 6),
        fmt_f64(q.x, 6),
        fmt_f64(q.y, 6),
        fmt_f64(q.z, 6),
        extax_literal(extax),
    )
}

fn jointtarget(joints: &Joints, extax: &ExternalAxes) -> String {
    let j = &joints.0;
    format!(
        "[[{}, {}, {}, {}, {}, {}], {}]",
        fmt_f64(j[0], 3),
        fmt_f64(j[1], 3),
        fmt_f64(j[2], 3),
        fmt_f64(j[3], 3),
        fmt_f64(j[4], 3),
        fmt_f64(j[5], 3),
        extax_literal(extax),
    )
}

/// Unset external axes render as 9E9, RAPID's "don't care" marker.
fn extax_literal(extax: &ExternalAxes) -> String {
    let axes: Vec<String> = extax
        .iter()
        .map(|a| match a {
            Some(v) => fmt_f64(*v, 3),
            None => "9E9".to_string(),
        })
        .collect();
    format!("[{}]", axes.join(", "))
}

impl RapidState {
    fn emit_acc_set(&mut self, settings: &Settings) {
        // AccSet 100, 100 is the controller default.
        if settings.acceleration <= 0.0 {
            self.instructions.push("AccSet 100, 100;".to_string());
        } else {
            self.instructions
                .push(format!("AccSet {}, 100;", fmt_f64(settings.acceleration, 3)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;

    fn issue(cursor: &mut RobotCursor, kind: ActionKind) {
        cursor.issue(Action::new(kind));
    }

    fn compile(cursor: &mut RobotCursor) -> String {
        let files = RapidCompiler
            .compile(cursor, &CompileOptions::default())
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].extension, "mod");
        files[0].to_source()
    }

    #[test]
    fn interns_speed_and_zone_once() {
        let mut c = RobotCursor::new("rapid", false);
        issue(
            &mut c,
            ActionKind::Speed {
                value: 50.0,
                relative: false,
            },
        );
        for x in [100.0, 200.0, 300.0] {
            issue(
                &mut c,
                ActionKind::Translation {
                    translation: Vector::new(x, 0.0, 300.0),
                    relative: false,
                },
            );
        }
        let source = compile(&mut c);
        assert_eq!(source.matches("CONST speeddata vel50").count(), 1);
        assert_eq!(source.matches("CONST zonedata zone5").count(), 1);
        assert_eq!(source.matches("MoveL").count(), 3);
    }

    #[test]
    fn fine_zone_for_zero_precision() {
        let mut c = RobotCursor::new("rapid", false);
        issue(
            &mut c,
            ActionKind::Precision {
                value: 0.0,
                relative: false,
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
        assert!(source.contains(", fine, Tool0"));
        assert!(!source.contains("zonedata"));
    }

    #[test]
    fn joint_moves_use_move_abs_j() {
        let mut c = RobotCursor::new("rapid", false);
        issue(
            &mut c,
            ActionKind::Axes {
                joints: Joints::new(0.0, 0.0, 0.0, 0.0, 90.0, 0.0),
                relative: false,
            },
        );
        let source = compile(&mut c);
        assert!(source.contains("MoveAbsJ [[0, 0, 0, 0, 90, 0], [9E9, 9E9, 9E9, 9E9, 9E9, 9E9]]"));
    }

    #[test]
    fn attach_of_unknown_tool_is_a_hard_error() {
        let mut c = RobotCursor::new("rapid", false);
        issue(&mut c, ActionKind::AttachTool { name: "ghost".into() });
        let err = RapidCompiler
            .compile(&mut c, &CompileOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::ToolMissing(name) if name == "ghost"));
    }

    #[test]
    fn unsupported_kinds_become_comments() {
        let mut c = RobotCursor::new("rapid", false);
        issue(&mut c, ActionKind::Extrusion { on: true });
        let source = compile(&mut c);
        assert!(source.contains("! unsupported: "));
    }
}
