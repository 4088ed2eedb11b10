//! Action-stream dump in the crate's own notation.
//!
//! Useful for inspecting or replaying what a cursor was asked to do,
//! one human-readable line per action.

use crate::action::ActionKind;
use crate::compile::{banner, compile_count, CompileOptions, Compiler, ProgramFile};
use crate::cursor::RobotCursor;
use crate::error::Result;

const COMMENT: &str = "//";

pub struct NativeCompiler;

impl Compiler for NativeCompiler {
    fn compile(
        &self,
        cursor: &mut RobotCursor,
        options: &CompileOptions,
    ) -> Result<Vec<ProgramFile>> {
        let mut lines = banner(COMMENT, &options.program_name);
        let count = compile_count(cursor, options);

        for _ in 0..count {
            let Some((action, ok)) = cursor.apply_next() else {
                break;
            };
            match &action.kind {
                ActionKind::Comment { text } => lines.push(format!("{} {}", COMMENT, text)),
                _ if ok => lines.push(action.to_string()),
                _ => lines.push(format!("{} skipped: {}", COMMENT, action)),
            }
        }

        Ok(vec![ProgramFile::new(&options.program_name, "txt", lines)])
    }
}
