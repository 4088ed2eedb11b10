//! KUKA KRL program generation.
//!
//! Emits a paired `.dat` data list and `.src` source file. Orientation is
//! expressed as intrinsic ZYX Euler angles (A around Z, B around Y, C
//! around X, degrees). The cursor works in mm and mm/s; only `$VEL.CP`
//! wants m/s, so that one value converts at emission.

use crate::action::{Action, ActionKind};
use crate::compile::{banner, compile_count, fmt_f64, CompileOptions, Compiler, ProgramFile};
use crate::cursor::RobotCursor;
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::types::MotionType;

const COMMENT: &str = ";";

pub struct KrlCompiler;

impl Compiler for KrlCompiler {
    fn compile(
        &self,
        cursor: &mut RobotCursor,
        options: &CompileOptions,
    ) -> Result<Vec<ProgramFile>> {
        let mut state = KrlState::default();
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

        let mut src = banner(COMMENT, &options.program_name);
        src.push(format!("DEF {}()", options.program_name));
        src.push("  BAS(#INITMOV, 0)".to_string());
        for instr in &state.instructions {
            src.push(format!("  {}", instr));
        }
        src.push("END".to_string());

        let mut dat = banner(COMMENT, &options.program_name);
        dat.push(format!("DEFDAT {}", options.program_name));
        for decl in &state.declarations {
            dat.push(format!("  {}", decl));
        }
        dat.push("ENDDAT".to_string());

        Ok(vec![
            ProgramFile::new(&options.program_name, "dat", dat),
            ProgramFile::new(&options.program_name, "src", src),
        ])
    }
}

#[derive(Default)]
struct KrlState {
    declarations: Vec<String>,
    instructions: Vec<String>,
    target_count: usize,
    /// Values last written to the controller variables, so settings
    /// assignments only appear when they change.
    emitted_vel: Option<f64>,
    emitted_apo: Option<f64>,
}

impl KrlState {
    fn emit(&mut self, cursor: &RobotCursor, action: &Action, options: &CompileOptions) {
        match &action.kind {
            ActionKind::Translation { .. }
            | ActionKind::Rotation { .. }
            | ActionKind::Transformation { .. } => self.emit_cartesian_move(cursor, options),
            ActionKind::Axes { .. } => self.emit_joint_move(cursor, options),
            ActionKind::ExternalAxis { .. } => {}
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
                // Controller variables update lazily before the next move.
            }
            ActionKind::Wait { millis } => {
                self.instructions
                    .push(format!("WAIT SEC {}", fmt_f64(*millis as f64 / 1000.0, 3)));
            }
            ActionKind::Message { text } => {
                self.instructions.push(format!("{} MSG: {}", COMMENT, text));
            }
            ActionKind::Comment { text } => {
                self.instructions.push(format!("{} {}", COMMENT, text));
            }
            ActionKind::CustomCode {
                statement,
                is_declaration,
            } => {
                if *is_declaration {
                    self.declarations.push(statement.clone());
                } else {
                    self.instructions.push(statement.clone());
                }
            }
            ActionKind::DefineTool { .. }
            | ActionKind::AttachTool { .. }
            | ActionKind::DetachTool => {
                // Tool frames are already folded into the cursor pose.
            }
            ActionKind::IoDigital { pin, on } => {
                self.instructions
                    .push(format!("$OUT[{}] = {}", pin, if *on { "TRUE" } else { "FALSE" }));
            }
            ActionKind::IoAnalog { pin, value } => {
                self.instructions
                    .push(format!("$ANOUT[{}] = {}", pin, fmt_f64(*value, 3)));
            }
            ActionKind::Temperature { .. }
            | ActionKind::Extrusion { .. }
            | ActionKind::ExtrusionRate { .. } => {
                self.instructions
                    .push(format!("{} unsupported: {}", COMMENT, action));
            }
        }
    }

    /// Write `$VEL.CP`/`$APO.CDIS` assignments if the pending settings
    /// differ from what the generated program last set.
    fn sync_settings(&mut self, settings: &Settings) {
        let vel = settings.speed / 1000.0; // mm/s -> m/s
        if self.emitted_vel != Some(vel) {
            self.instructions
                .push(format!("$VEL.CP = {}", fmt_f64(vel, 6)));
            self.emitted_vel = Some(vel);
        }
        if self.emitted_apo != Some(settings.precision) {
            self.instructions
                .push(format!("$APO.CDIS = {}", fmt_f64(settings.precision, 3)));
            self.emitted_apo = Some(settings.precision);
        }
    }

    fn emit_cartesian_move(&mut self, cursor: &RobotCursor, options: &CompileOptions) {
        let (Some(position), Some(rotation)) = (cursor.position, cursor.rotation) else {
            return;
        };
        self.sync_settings(&cursor.settings);
        let euler = rotation.to_euler_zyx();
        let mut fields = format!(
            "X {}, Y {}, Z {}, A {}, B {}, C {}",
            fmt_f64(position.x, 3),
            fmt_f64(position.y, 3),
            fmt_f64(position.z, 3),
            fmt_f64(euler.z, 4),
            fmt_f64(euler.y, 4),
            fmt_f64(euler.x, 4),
        );
        for (i, axis) in cursor.external_axes.iter().enumerate() {
            if let Some(v) = axis {
                fields.push_str(&format!(", E{} {}", i + 1, fmt_f64(*v, 3)));
            }
        }
        let verb = match cursor.settings.motion_type {
            MotionType::Linear => "LIN",
            MotionType::Joint => "PTP",
        };
        let approx = if cursor.settings.precision > 0.0 {
            " C_DIS"
        } else {
            ""
        };
        if options.inline_targets {
            self.instructions
                .push(format!("{} {{E6POS: {}}}{}", verb, fields, approx));
        } else {
            self.target_count += 1;
            let name = format!("Xtarget{}", self.target_count);
            self.declarations
                .push(format!("DECL E6POS {} = {{{}}}", name, fields));
            self.instructions.push(format!("{} {}{}", verb, name, approx));
        }
    }

    fn emit_joint_move(&mut self, cursor: &RobotCursor, options: &CompileOptions) {
        let Some(joints) = cursor.joints else {
            return;
        };
        self.sync_settings(&cursor.settings);
        let j = &joints.0;
        let fields = format!(
            "A1 {}, A2 {}, A3 {}, A4 {}, A5 {}, A6 {}",
            fmt_f64(j[0], 4),
            fmt_f64(j[1], 4),
            fmt_f64(j[2], 4),
            fmt_f64(j[3], 4),
            fmt_f64(j[4], 4),
            fmt_f64(j[5], 4),
        );
        if options.inline_targets {
            self.instructions.push(format!("PTP {{AXIS: {}}}", fields));
        } else {
            self.target_count += 1;
            let name = format!("Xaxes{}", self.target_count);
            self.declarations
                .push(format!("DECL E6AXIS {} = {{{}}}", name, fields));
            self.instructions.push(format!("PTP {}", name));
        }
    }
}
