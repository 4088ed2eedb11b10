//! Cursor settings snapshots and the bounded push/pop stack.

use tracing::info;

use crate::types::{MotionType, ReferenceCs};

/// Maximum push depth. A runaway push loop in user scripting hits this
/// before exhausting memory.
pub const SETTINGS_STACK_LIMIT: usize = 32;

/// The scalar state a cursor carries between motion targets: speeds,
/// accelerations, blending precision, extrusion rate, plus motion type
/// and reference frame. Captured wholesale on push, restored on pop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// TCP speed, mm/s.
    pub speed: f64,
    /// TCP acceleration, mm/s^2; 0 means vendor default.
    pub acceleration: f64,
    /// Reorientation speed, deg/s.
    pub rotation_speed: f64,
    /// Joint speed, deg/s.
    pub joint_speed: f64,
    /// Joint acceleration, deg/s^2; 0 means vendor default.
    pub joint_acceleration: f64,
    /// Blending radius, mm; 0 is a fine point.
    pub precision: f64,
    /// mm of filament per mm of travel.
    pub extrusion_rate: f64,
    pub motion_type: MotionType,
    pub reference_cs: ReferenceCs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: 100.0,
            acceleration: 0.0,
            rotation_speed: 90.0,
            joint_speed: 45.0,
            joint_acceleration: 0.0,
            precision: 5.0,
            extrusion_rate: 0.0,
            motion_type: MotionType::Linear,
            reference_cs: ReferenceCs::World,
        }
    }
}

/// Bounded LIFO stack of settings snapshots.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuffer {
    stack: Vec<Settings>,
}

impl SettingsBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Push a snapshot. Returns false (and logs) when the stack is full.
    pub fn push(&mut self, settings: Settings) -> bool {
        if self.stack.len() >= SETTINGS_STACK_LIMIT {
            info!(
                "settings stack full ({} snapshots), push ignored",
                SETTINGS_STACK_LIMIT
            );
            return false;
        }
        self.stack.push(settings);
        true
    }

    pub fn pop(&mut self) -> Option<Settings> {
        self.stack.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trip() {
        let mut buffer = SettingsBuffer::new();
        let mut settings = Settings::default();
        assert!(buffer.push(settings));

        settings.speed = 999.0;
        let restored = buffer.pop().expect("snapshot");
        assert_eq!(restored.speed, Settings::default().speed);
    }

    #[test]
    fn stack_is_bounded() {
        let mut buffer = SettingsBuffer::new();
        for _ in 0..SETTINGS_STACK_LIMIT {
            assert!(buffer.push(Settings::default()));
        }
        assert!(!buffer.push(Settings::default()));
        assert_eq!(buffer.len(), SETTINGS_STACK_LIMIT);
    }

    #[test]
    fn pop_empty_is_none() {
        assert!(SettingsBuffer::new().pop().is_none());
    }
}
