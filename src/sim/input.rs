//! Per-step input snapshot
//!
//! The host samples devices once per step and hands the simulation an
//! already edge-detected snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stick magnitude below which input is ignored
pub const STICK_DEADZONE: f32 = 0.25;

/// Edge-detected state of a digital action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionState {
    #[default]
    Up,
    Pressed,
    Down,
    Released,
}

impl ActionState {
    /// Next state given whether the button is held this step
    pub fn next(self, held: bool) -> Self {
        match (self.is_down(), held) {
            (false, true) => ActionState::Pressed,
            (true, true) => ActionState::Down,
            (true, false) => ActionState::Released,
            (false, false) => ActionState::Up,
        }
    }

    /// Held this step (including the step it was pressed)
    pub fn is_down(self) -> bool {
        matches!(self, ActionState::Pressed | ActionState::Down)
    }

    pub fn is_pressed(self) -> bool {
        self == ActionState::Pressed
    }

    pub fn is_released(self) -> bool {
        self == ActionState::Released
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement stick, x right and y down, length at most 1
    pub stick: Vec2,
    pub jump: ActionState,
    pub attack: ActionState,
}

impl TickInput {
    /// Set the stick from a raw device reading, applying the deadzone
    pub fn with_stick(mut self, raw: Vec2) -> Self {
        let len = raw.length();
        self.stick = if len < STICK_DEADZONE {
            Vec2::ZERO
        } else if len > 1.0 {
            raw / len
        } else {
            raw
        };
        self
    }

    /// Stick held downward (used for dropping through bridges)
    pub fn down_held(&self) -> bool {
        self.stick.y > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_edges() {
        let mut s = ActionState::Up;
        s = s.next(true);
        assert_eq!(s, ActionState::Pressed);
        s = s.next(true);
        assert_eq!(s, ActionState::Down);
        s = s.next(false);
        assert_eq!(s, ActionState::Released);
        s = s.next(false);
        assert_eq!(s, ActionState::Up);
    }

    #[test]
    fn test_stick_deadzone() {
        let input = TickInput::default().with_stick(Vec2::new(0.1, 0.1));
        assert_eq!(input.stick, Vec2::ZERO);

        let input = TickInput::default().with_stick(Vec2::new(3.0, 4.0));
        assert!((input.stick.length() - 1.0).abs() < 1e-6);

        let input = TickInput::default().with_stick(Vec2::new(-0.6, 0.0));
        assert_eq!(input.stick.x, -0.6);
    }
}
