//! Vendor wire codecs for live streaming.
//!
//! A codec is used from two sides of a session: the sender encodes each
//! action against the post-apply stream cursor (so messages carry fully
//! resolved absolute targets) and frames batches for the wire; the
//! receiver feeds raw socket bytes into the codec and gets back parsed
//! device events. `feed` is stateful: partial frames are buffered across
//! reads and concatenated frames all come out.

mod ascii;
mod kuka;

pub use ascii::AsciiCodec;
pub use kuka::KukaCodec;

use crate::action::Action;
use crate::config::Vendor;
use crate::cursor::RobotCursor;
use crate::geometry::{Quaternion, Vector};
use crate::types::Joints;

/// Parsed inbound message from the device driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The device finished executing the action with this id.
    Ack { id: u64 },
    Pose {
        position: Vector,
        rotation: Quaternion,
    },
    Joints { joints: Joints },
    /// Combined broadcast; KUKA drivers report pose and axes together.
    State {
        position: Vector,
        rotation: Quaternion,
        joints: Joints,
    },
}

pub trait WireProtocol: Send {
    /// Render one action as an outbound message, using the cursor state
    /// after the action was applied. None means the action has no wire
    /// representation (comments, settings pushes and the like).
    fn encode(&self, action: &Action, cursor: &RobotCursor) -> Option<String>;

    /// Wrap a batch of encoded messages for transmission.
    fn frame(&self, batch: &[String]) -> Vec<u8>;

    /// Consume raw inbound bytes, yielding every complete event.
    fn feed(&mut self, bytes: &[u8]) -> Vec<DeviceEvent>;
}

pub fn codec_for(vendor: Vendor) -> Box<dyn WireProtocol> {
    match vendor {
        Vendor::Abb => Box::new(AsciiCodec::abb()),
        Vendor::Ur => Box::new(AsciiCodec::ur()),
        Vendor::Kuka => Box::new(KukaCodec::new()),
    }
}
