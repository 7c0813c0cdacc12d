//! Joystick and console switch state.
//!
//! Every line is active-low, as the chips see it:
//!
//! | Source        | Bits                                                |
//! |---------------|-----------------------------------------------------|
//! | SWCHA         | D7 P0 right, D6 P0 left, D5 P0 down, D4 P0 up,      |
//! |               | D3 P1 right, D2 P1 left, D1 P1 down, D0 P1 up       |
//! | SWCHB         | D7 P1 difficulty, D6 P0 difficulty, D3 colour/B&W,  |
//! |               | D1 select, D0 reset                                 |
//! | INPT4 / INPT5 | P0 / P1 fire button                                 |

use serde::{Deserialize, Serialize};

/// Port A with nothing pressed.
pub const MOVEMENT_RELEASED: u8 = 0xFF;
/// Port B with colour selected, select and reset released.
pub const SWITCHES_DEFAULT: u8 = 0x0B;

/// Bit masks within SWCHA.
pub mod movement {
    pub const P0_RIGHT: u8 = 0x80;
    pub const P0_LEFT: u8 = 0x40;
    pub const P0_DOWN: u8 = 0x20;
    pub const P0_UP: u8 = 0x10;
    pub const P1_RIGHT: u8 = 0x08;
    pub const P1_LEFT: u8 = 0x04;
    pub const P1_DOWN: u8 = 0x02;
    pub const P1_UP: u8 = 0x01;
}

/// Bit masks within SWCHB.
pub mod switches {
    pub const RESET: u8 = 0x01;
    pub const SELECT: u8 = 0x02;
    pub const COLOR: u8 = 0x08;
    pub const P0_DIFFICULTY: u8 = 0x40;
    pub const P1_DIFFICULTY: u8 = 0x80;
}

/// One frame's worth of input lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// SWCHA external lines.
    pub movement: u8,
    /// SWCHB external lines.
    pub switches: u8,
    /// P0 fire line, `true` = released.
    pub button_p0: bool,
    /// P1 fire line, `true` = released.
    pub button_p1: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            movement: MOVEMENT_RELEASED,
            switches: SWITCHES_DEFAULT,
            button_p0: true,
            button_p1: true,
        }
    }
}

/// Host-facing control names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    P0Up,
    P0Down,
    P0Left,
    P0Right,
    P0Fire,
    P1Up,
    P1Down,
    P1Left,
    P1Right,
    P1Fire,
    Reset,
    Select,
    /// Flips colour/B&W on press.
    ColorToggle,
    /// Flips P0 difficulty A/B on press.
    P0Difficulty,
    /// Flips P1 difficulty A/B on press.
    P1Difficulty,
}

impl InputState {
    /// Apply a control press.
    pub fn press(&mut self, control: Control) {
        match control {
            Control::P0Fire => self.button_p0 = false,
            Control::P1Fire => self.button_p1 = false,
            Control::ColorToggle => self.switches ^= switches::COLOR,
            Control::P0Difficulty => self.switches ^= switches::P0_DIFFICULTY,
            Control::P1Difficulty => self.switches ^= switches::P1_DIFFICULTY,
            Control::Reset => self.switches &= !switches::RESET,
            Control::Select => self.switches &= !switches::SELECT,
            _ => self.movement &= !movement_bit(control),
        }
    }

    /// Apply a control release. Toggles ignore releases.
    pub fn release(&mut self, control: Control) {
        match control {
            Control::P0Fire => self.button_p0 = true,
            Control::P1Fire => self.button_p1 = true,
            Control::ColorToggle | Control::P0Difficulty | Control::P1Difficulty => {}
            Control::Reset => self.switches |= switches::RESET,
            Control::Select => self.switches |= switches::SELECT,
            _ => self.movement |= movement_bit(control),
        }
    }

    /// Whether a control is currently held (or, for toggles, set low).
    #[must_use]
    pub fn is_pressed(&self, control: Control) -> bool {
        match control {
            Control::P0Fire => !self.button_p0,
            Control::P1Fire => !self.button_p1,
            Control::ColorToggle => self.switches & switches::COLOR == 0,
            Control::P0Difficulty => self.switches & switches::P0_DIFFICULTY == 0,
            Control::P1Difficulty => self.switches & switches::P1_DIFFICULTY == 0,
            Control::Reset => self.switches & switches::RESET == 0,
            Control::Select => self.switches & switches::SELECT == 0,
            _ => self.movement & movement_bit(control) == 0,
        }
    }
}

fn movement_bit(control: Control) -> u8 {
    match control {
        Control::P0Up => movement::P0_UP,
        Control::P0Down => movement::P0_DOWN,
        Control::P0Left => movement::P0_LEFT,
        Control::P0Right => movement::P0_RIGHT,
        Control::P1Up => movement::P1_UP,
        Control::P1Down => movement::P1_DOWN,
        Control::P1Left => movement::P1_LEFT,
        Control::P1Right => movement::P1_RIGHT,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_released() {
        let input = InputState::default();
        assert_eq!(input.movement, 0xFF);
        assert_eq!(input.switches, 0x0B);
        assert!(input.button_p0 && input.button_p1);
    }

    #[test]
    fn directions_clear_their_bit() {
        let mut input = InputState::default();
        input.press(Control::P0Right);
        input.press(Control::P1Up);
        assert_eq!(input.movement, 0x7E);
        assert!(input.is_pressed(Control::P0Right));
        input.release(Control::P0Right);
        assert_eq!(input.movement, 0xFE);
    }

    #[test]
    fn toggles_flip_on_press_only() {
        let mut input = InputState::default();
        input.press(Control::ColorToggle);
        input.release(Control::ColorToggle);
        assert_eq!(input.switches, 0x03);
        input.press(Control::P1Difficulty);
        assert_eq!(input.switches, 0x83);
        input.press(Control::ColorToggle);
        assert_eq!(input.switches, 0x8B);
    }

    #[test]
    fn console_buttons_and_fire() {
        let mut input = InputState::default();
        input.press(Control::Reset);
        input.press(Control::Select);
        input.press(Control::P1Fire);
        assert_eq!(input.switches, 0x08);
        assert!(input.button_p0);
        assert!(!input.button_p1);
        input.release(Control::Reset);
        assert_eq!(input.switches, 0x09);
    }
}
