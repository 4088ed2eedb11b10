//! Per-vendor program generation.
//!
//! A compiler drains a cursor's pending actions through `apply_next` and
//! renders one instruction per action from the post-apply cursor state,
//! so every motion line carries a fully resolved absolute target. Action
//! kinds the dialect cannot express become comments in the output rather
//! than errors.

mod gcode;
mod krl;
mod native;
mod rapid;
mod urscript;

pub use gcode::GCodeCompiler;
pub use krl::KrlCompiler;
pub use native::NativeCompiler;
pub use rapid::RapidCompiler;
pub use urscript::UrScriptCompiler;

use crate::cursor::RobotCursor;
use crate::error::Result;

pub trait Compiler {
    fn compile(&self, cursor: &mut RobotCursor, options: &CompileOptions)
        -> Result<Vec<ProgramFile>>;
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub program_name: String,
    /// Write motion targets inline instead of declaring named variables.
    pub inline_targets: bool,
    /// Compile only up to the current block marker instead of everything
    /// pending.
    pub block_only: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            program_name: "ArmatureProgram".to_string(),
            inline_targets: true,
            block_only: false,
        }
    }
}

/// One generated source file; a program is one or more of these.
#[derive(Debug, Clone)]
pub struct ProgramFile {
    pub name: String,
    pub extension: String,
    pub lines: Vec<String>,
}

impl ProgramFile {
    pub fn new(name: &str, extension: &str, lines: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            extension: extension.to_string(),
            lines,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    pub fn to_source(&self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }
}

/// How many pending actions this compile pass consumes.
pub(crate) fn compile_count(cursor: &RobotCursor, options: &CompileOptions) -> usize {
    if options.block_only {
        cursor.pending_block_count()
    } else {
        cursor.pending_count()
    }
}

/// Header comment block prepended to every generated file.
pub(crate) fn banner(comment: &str, program_name: &str) -> Vec<String> {
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    vec![
        format!("{} Program \"{}\"", comment, program_name),
        format!(
            "{} Generated by armature v{} on {}",
            comment,
            env!("CARGO_PKG_VERSION"),
            stamp
        ),
        String::new(),
    ]
}

/// Turn a numeric value into an identifier-safe fragment: `50` -> "50",
/// `0.5` -> "0_5", `-2.5` -> "n2_5".
pub(crate) fn safe_double(value: f64) -> String {
    format!("{}", value).replace('-', "n").replace('.', "_")
}

/// Trim a formatted float to at most `digits` decimals without trailing
/// zeros, keeping generated programs readable and diff-stable.
pub(crate) fn fmt_f64(value: f64, digits: usize) -> String {
    let mut s = format!("{:.*}", digits, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    // normalize negative zero
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_double_sanitizes() {
        assert_eq!(safe_double(50.0), "50");
        assert_eq!(safe_double(0.5), "0_5");
        assert_eq!(safe_double(-2.5), "n2_5");
    }

    #[test]
    fn fmt_f64_trims() {
        assert_eq!(fmt_f64(12.5, 3), "12.5");
        assert_eq!(fmt_f64(12.0, 3), "12");
        assert_eq!(fmt_f64(-0.0001, 3), "0");
        assert_eq!(fmt_f64(0.123456, 4), "0.1235");
    }
}
