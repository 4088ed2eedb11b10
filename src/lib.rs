//! Armature - vendor-agnostic robot motion control library
//!
//! This library lets an application describe robot motion as a stream of
//! high-level actions and either compile them to a vendor program (ABB
//! RAPID, KUKA KRL, URScript, G-code) or stream them live over TCP to a
//! driver running on the controller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use armature::{Action, ActionKind, RobotConfig, StreamSession, Vendor, Vector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RobotConfig::new("192.168.0.10", 7000, Vendor::Abb);
//!     let session = StreamSession::connect(&config)?;
//!
//!     session.issue(Action::new(ActionKind::Translation {
//!         translation: Vector::new(300.0, 0.0, 400.0),
//!         relative: false,
//!     }));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Action**: immutable value object describing one instruction
//! - **RobotCursor**: state machine that interprets actions in order
//! - **Compiler**: per-vendor offline program generation
//! - **WireProtocol**: per-vendor streaming codecs
//! - **StreamSession**: live TCP session with credit-based flow control

pub mod action;
pub mod buffer;
pub mod compile;
pub mod config;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod types;

// High-level exports for easy usage
pub use action::{Action, ActionKind};
pub use config::{BufferConfig, ConnectionConfig, RobotConfig, Vendor};
pub use cursor::RobotCursor;
pub use error::{Error, Result};
pub use geometry::{
    AxisAngle, EulerZyx, Quaternion, RotationMatrix, RotationVector, Vector,
};
pub use session::StreamSession;
pub use settings::{Settings, SettingsBuffer};
pub use types::{ExternalAxes, Joints, MotionType, ReferenceCs, TempChannel, Tool};

// Core component exports for advanced usage
pub use buffer::ActionBuffer;
pub use compile::{
    CompileOptions, Compiler, GCodeCompiler, KrlCompiler, NativeCompiler, ProgramFile,
    RapidCompiler, UrScriptCompiler,
};
pub use protocol::{codec_for, AsciiCodec, DeviceEvent, KukaCodec, WireProtocol};
