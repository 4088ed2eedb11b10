//! G-code generation for ZMORPH-style 3D printers.
//!
//! Travel moves emit G0; extruding moves emit G1 with an absolute E
//! value taken from the cursor's accumulated filament length. Feed rate
//! converts from the cursor's mm/s to G-code's mm/min.

use crate::action::{Action, ActionKind};
use crate::compile::{banner, compile_count, fmt_f64, CompileOptions, Compiler, ProgramFile};
use crate::cursor::RobotCursor;
use crate::error::Result;
use crate::types::TempChannel;

const COMMENT: &str = ";";

pub struct GCodeCompiler;

impl Compiler for GCodeCompiler {
    fn compile(
        &self,
        cursor: &mut RobotCursor,
        options: &CompileOptions,
    ) -> Result<Vec<ProgramFile>> {
        let mut lines = banner(COMMENT, &options.program_name);
        lines.push("G21".to_string()); // millimeters
        lines.push("G90".to_string()); // absolute positioning
        lines.push("M82".to_string()); // absolute extrusion
        let count = compile_count(cursor, options);

        for _ in 0..count {
            let Some((action, ok)) = cursor.apply_next() else {
                break;
            };
            if !ok {
                lines.push(format!("{} skipped: {}", COMMENT, action));
                continue;
            }
            emit(&mut lines, cursor, &action);
        }

        Ok(vec![ProgramFile::new(&options.program_name, "gcode", lines)])
    }
}

fn emit(out: &mut Vec<String>, cursor: &RobotCursor, action: &Action) {
    match &action.kind {
        ActionKind::Translation { .. } | ActionKind::Transformation { .. } => {
            let Some(position) = cursor.position else {
                return;
            };
            let mut line = if cursor.is_extruding {
                "G1".to_string()
            } else {
                "G0".to_string()
            };
            line.push_str(&format!(
                " X{} Y{} Z{} F{}",
                fmt_f64(position.x, 3),
                fmt_f64(position.y, 3),
                fmt_f64(position.z, 3),
                fmt_f64(cursor.settings.speed * 60.0, 1),
            ));
            if cursor.is_extruding {
                line.push_str(&format!(" E{}", fmt_f64(cursor.extruded_length, 5)));
            }
            out.push(line);
        }
        ActionKind::Wait { millis } => {
            out.push(format!("G4 P{}", millis));
        }
        ActionKind::Message { text } => {
            out.push(format!("M117 {}", text));
        }
        ActionKind::Comment { text } => {
            out.push(format!("{} {}", COMMENT, text));
        }
        ActionKind::CustomCode { statement, .. } => {
            out.push(statement.clone());
        }
        ActionKind::Temperature {
            channel,
            degrees,
            wait,
        } => {
            let code = match (channel, wait) {
                (TempChannel::Extruder, false) => "M104",
                (TempChannel::Extruder, true) => "M109",
                (TempChannel::Bed, false) => "M140",
                (TempChannel::Bed, true) => "M190",
                (TempChannel::Chamber, false) => "M141",
                (TempChannel::Chamber, true) => "M191",
            };
            out.push(format!("{} S{}", code, fmt_f64(*degrees, 1)));
        }
        ActionKind::Extrusion { .. }
        | ActionKind::ExtrusionRate { .. }
        | ActionKind::Speed { .. }
        | ActionKind::Acceleration { .. }
        | ActionKind::RotationSpeed { .. }
        | ActionKind::JointSpeed { .. }
        | ActionKind::JointAcceleration { .. }
        | ActionKind::Precision { .. }
        | ActionKind::MotionMode { .. }
        | ActionKind::Coordinates { .. }
        | ActionKind::PushSettings
        | ActionKind::PopSettings => {
            // Folded into subsequent G0/G1 words.
        }
        _ => {
            out.push(format!("{} unsupported: {}", COMMENT, action));
        }
    }
}
