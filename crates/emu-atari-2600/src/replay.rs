//! Recorded input playback.
//!
//! A replay file holds one line per frame:
//!
//! ```text
//! p0u,p0d,p0l,p0r,p0b,p1u,p1d,p1l,p1r,p1b,s,r
//! ```
//!
//! Each field is a single character and `1` means pressed. A line is used
//! when it starts with twelve comma-separated characters; anything after
//! the twelfth is ignored. Other lines are skipped. Difficulty and colour
//! switches are not recorded and stay at their defaults.

use std::path::Path;

use crate::error::ReplayError;
use crate::input::{InputState, movement, switches};

/// Replay capacity in frames. A replay must hold fewer than this.
pub const MAX_FRAMES: usize = 81_920;

const FIELDS: usize = 12;

/// Movement bits in field order.
const MOVEMENT_FIELDS: [(usize, u8); 8] = [
    (0, movement::P0_UP),
    (1, movement::P0_DOWN),
    (2, movement::P0_LEFT),
    (3, movement::P0_RIGHT),
    (5, movement::P1_UP),
    (6, movement::P1_DOWN),
    (7, movement::P1_LEFT),
    (8, movement::P1_RIGHT),
];

#[derive(Debug, Clone)]
pub struct Replay {
    frames: Vec<InputState>,
    index: usize,
    active: bool,
}

impl Replay {
    /// Parse replay text.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Overflow`] if the text holds [`MAX_FRAMES`]
    /// or more usable lines.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let mut frames = Vec::new();
        for line in text.lines() {
            let Some(frame) = parse_line(line) else {
                log::debug!("Replay: skipping malformed line {line:?}");
                continue;
            };
            frames.push(frame);
            if frames.len() >= MAX_FRAMES {
                return Err(ReplayError::Overflow { max: MAX_FRAMES });
            }
        }
        log::info!("Replay: {} frames", frames.len());
        let active = !frames.is_empty();
        Ok(Self {
            frames,
            index: 0,
            active,
        })
    }

    /// Read and parse a replay file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is too long.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Whether the replay still drives input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Input for the current frame, or `None` once exhausted.
    #[must_use]
    pub fn current(&self) -> Option<InputState> {
        if self.active {
            self.frames.get(self.index).copied()
        } else {
            None
        }
    }

    /// Move to the next frame. Deactivates after the last one.
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        self.index += 1;
        if self.index >= self.frames.len() {
            self.active = false;
            log::info!("Replay finished after {} frames", self.frames.len());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the current frame.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index
    }
}

fn parse_line(line: &str) -> Option<InputState> {
    let mut pressed = [false; FIELDS];
    let mut chars = line.chars();
    for (field, slot) in pressed.iter_mut().enumerate() {
        if field > 0 && chars.next()? != ',' {
            return None;
        }
        *slot = chars.next()? == '1';
    }

    let mut input = InputState::default();
    for (field, bit) in MOVEMENT_FIELDS {
        if pressed[field] {
            input.movement &= !bit;
        }
    }
    input.button_p0 = !pressed[4];
    input.button_p1 = !pressed[9];
    if pressed[10] {
        input.switches &= !switches::SELECT;
    }
    if pressed[11] {
        input.switches &= !switches::RESET;
    }
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: &str = "0,0,0,0,0,0,0,0,0,0,0,0";

    #[test]
    fn decodes_every_field() {
        let replay = Replay::parse("1,0,0,1,1,0,1,1,0,0,1,0\n").expect("parse");
        let input = replay.current().expect("frame");
        assert_eq!(input.movement, 0xFF & !0x10 & !0x80 & !0x02 & !0x04);
        assert!(!input.button_p0);
        assert!(input.button_p1);
        assert_eq!(input.switches, 0x09);
    }

    #[test]
    fn reset_field_clears_bit_zero() {
        let replay = Replay::parse("0,0,0,0,0,0,0,0,0,1,0,1").expect("parse");
        let input = replay.current().expect("frame");
        assert_eq!(input.switches, 0x0A);
        assert!(!input.button_p1);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = format!("{IDLE}\n\n0,0,0\n00,0,0,0,0,0,0,0,0,0,0,0\n,{IDLE}\n{IDLE}\r\n");
        let replay = Replay::parse(&text).expect("parse");
        assert_eq!(replay.len(), 2);
    }

    #[test]
    fn text_after_twelfth_field_is_ignored() {
        let replay = Replay::parse("1,0,0,0,0,0,0,0,0,0,0,0,1,1 # start\n").expect("parse");
        assert_eq!(replay.len(), 1);
        let input = replay.current().expect("frame");
        assert_eq!(input.movement, !movement::P0_UP);
        assert_eq!(input.switches, 0x0B);
    }

    #[test]
    fn deactivates_after_last_frame() {
        let mut replay = Replay::parse(&format!("{IDLE}\n{IDLE}\n")).expect("parse");
        assert!(replay.is_active());
        replay.advance();
        assert!(replay.current().is_some());
        replay.advance();
        assert!(!replay.is_active());
        assert_eq!(replay.current(), None);
        replay.advance();
        assert_eq!(replay.position(), 2);
    }

    #[test]
    fn empty_replay_is_inactive() {
        let replay = Replay::parse("").expect("parse");
        assert!(replay.is_empty());
        assert!(!replay.is_active());
    }

    #[test]
    fn frame_limit() {
        let longest = format!("{IDLE}\n").repeat(MAX_FRAMES - 1);
        assert_eq!(Replay::parse(&longest).expect("parse").len(), MAX_FRAMES - 1);

        let full = format!("{longest}{IDLE}\n");
        assert!(matches!(
            Replay::parse(&full),
            Err(ReplayError::Overflow { max: MAX_FRAMES })
        ));
    }
}
