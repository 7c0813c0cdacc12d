//! The 20-bit playfield.
//!
//! PF0 (4 bits), PF1 (8 bits) and PF2 (8 bits) describe the left half of
//! the screen, one bit per 4-dot cell. The right half either repeats the
//! same bits or mirrors them (CTRLPF D0).
//!
//! | Cells   | Source (left half / repeat) | Bit order          |
//! |---------|-----------------------------|--------------------|
//! | 0-3     | PF0 D4-D7                   | low bit leftmost   |
//! | 4-11    | PF1 D7-D0                   | high bit leftmost  |
//! | 12-19   | PF2 D0-D7                   | low bit leftmost   |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playfield {
    /// PF0 stored shifted down, so only the low nibble is used.
    pub(crate) pf0: u8,
    pub(crate) pf1: u8,
    pub(crate) pf2: u8,
    pub(crate) reflect: bool,
    pub(crate) score_mode: bool,
    pub(crate) priority: bool,
    pub(crate) color: u8,
}

impl Playfield {
    #[must_use]
    pub fn bytes(&self) -> [u8; 3] {
        [self.pf0, self.pf1, self.pf2]
    }

    #[must_use]
    pub fn reflect(&self) -> bool {
        self.reflect
    }

    #[must_use]
    pub fn score_mode(&self) -> bool {
        self.score_mode
    }

    #[must_use]
    pub fn priority(&self) -> bool {
        self.priority
    }

    #[must_use]
    pub fn color(&self) -> u8 {
        self.color
    }

    /// Whether the playfield is set at visible dot `x` (0-159).
    #[must_use]
    pub fn active(&self, x: u8) -> bool {
        let cell = x / 4;
        let bit = match cell {
            0..=3 => self.pf0 >> cell,
            4..=11 => self.pf1 >> (7 - (cell - 4)),
            12..=19 => self.pf2 >> (cell - 12),
            20..=27 if self.reflect => self.pf2 >> (7 - (cell - 20)),
            28..=35 if self.reflect => self.pf1 >> (cell - 28),
            36..=39 if self.reflect => self.pf0 >> (3 - (cell - 36)),
            20..=23 => self.pf0 >> (cell - 20),
            24..=31 => self.pf1 >> (7 - (cell - 24)),
            32..=39 => self.pf2 >> (cell - 32),
            _ => 0,
        };
        bit & 1 != 0
    }

    /// Colour used where the playfield is drawn at dot `x`.
    ///
    /// In score mode (without priority) each half takes its player's colour.
    #[must_use]
    pub fn color_at(&self, x: u8, p0_color: u8, p1_color: u8) -> u8 {
        if self.score_mode && !self.priority {
            if x < 80 { p0_color } else { p1_color }
        } else {
            self.color
        }
    }

    pub(crate) fn set_control(&mut self, value: u8) {
        self.reflect = value & 0x01 != 0;
        self.score_mode = value & 0x02 != 0;
        self.priority = value & 0x04 != 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pf: &Playfield) -> Vec<bool> {
        (0..40u8).map(|cell| pf.active(cell * 4)).collect()
    }

    #[test]
    fn pf0_low_bit_is_leftmost_cell() {
        let pf = Playfield {
            pf0: 0x01,
            ..Playfield::default()
        };
        let c = cells(&pf);
        assert!(c[0]);
        assert!(c[20]);
        assert_eq!(c.iter().filter(|&&b| b).count(), 2);
    }

    #[test]
    fn repeat_copies_left_half() {
        let pf = Playfield {
            pf0: 0x0A,
            pf1: 0x81,
            pf2: 0x3C,
            ..Playfield::default()
        };
        let c = cells(&pf);
        assert_eq!(c[..20], c[20..]);
    }

    #[test]
    fn reflect_mirrors_left_half() {
        let pf = Playfield {
            pf0: 0x0A,
            pf1: 0x81,
            pf2: 0x3C,
            reflect: true,
            ..Playfield::default()
        };
        let c = cells(&pf);
        let mut mirrored = c[..20].to_vec();
        mirrored.reverse();
        assert_eq!(c[20..], mirrored[..]);
        // PF2 D7 sits in the middle of the screen when reflected.
        let edge = Playfield {
            pf2: 0x80,
            reflect: true,
            ..Playfield::default()
        };
        assert!(edge.active(76) && edge.active(80));
        assert!(!edge.active(84));
    }

    #[test]
    fn cell_is_four_dots_wide() {
        let pf = Playfield {
            pf1: 0x80,
            ..Playfield::default()
        };
        assert!(!pf.active(15));
        assert!((16..20).all(|x| pf.active(x)));
        assert!(!pf.active(20));
    }

    #[test]
    fn score_mode_colors_halves_by_player() {
        let mut pf = Playfield {
            color: 0x11,
            ..Playfield::default()
        };
        pf.set_control(0x02);
        assert_eq!(pf.color_at(79, 0x22, 0x33), 0x22);
        assert_eq!(pf.color_at(80, 0x22, 0x33), 0x33);
        pf.set_control(0x06);
        assert_eq!(pf.color_at(10, 0x22, 0x33), 0x11);
    }
}
