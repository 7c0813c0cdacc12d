//! Movable objects: two players, two missiles and the ball.
//!
//! Each object has a horizontal position on the 160-dot visible line and
//! an 8-bit shape. Players take their shape from GRPx; missiles and the
//! ball are solid bars whose width (1, 2, 4 or 8 dots) is encoded in the
//! shape as a run of high bits.

use serde::{Deserialize, Serialize};

use crate::SCANLINE_WIDTH;

/// Identifies a movable object. Also the drawing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectId {
    P0 = 0,
    P1 = 1,
    M0 = 2,
    M1 = 3,
    Bl = 4,
}

impl ObjectId {
    /// All objects in drawing order.
    pub const ALL: [ObjectId; 5] = [
        ObjectId::P0,
        ObjectId::P1,
        ObjectId::M0,
        ObjectId::M1,
        ObjectId::Bl,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, ObjectId::P0 | ObjectId::P1)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ObjectId::P0 => "p0",
            ObjectId::P1 => "p1",
            ObjectId::M0 => "m0",
            ObjectId::M1 => "m1",
            ObjectId::Bl => "bl",
        }
    }

    /// Delay between a reset strobe and the object's first drawn dot.
    const fn reset_delay(self) -> u16 {
        if self.is_player() { 4 } else { 3 }
    }
}

/// What was drawn at one output pixel.
///
/// `VBlank` and `HMove` are not colours: the former marks a blanked pixel,
/// the latter one of the eight dots blacked out after an HMOVE strobe.
/// Neither takes part in collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pixel {
    P0,
    P1,
    M0,
    M1,
    Bl,
    Playfield,
    #[default]
    Background,
    VBlank,
    HMove,
}

impl From<ObjectId> for Pixel {
    fn from(id: ObjectId) -> Self {
        match id {
            ObjectId::P0 => Pixel::P0,
            ObjectId::P1 => Pixel::P1,
            ObjectId::M0 => Pixel::M0,
            ObjectId::M1 => Pixel::M1,
            ObjectId::Bl => Pixel::Bl,
        }
    }
}

/// Copy offsets and horizontal scale selected by a 3-bit NUSIZ code.
///
/// Scaling only applies to players; missiles and the ball ignore it and
/// draw one unscaled copy for codes 5 and 7.
fn layout(size: u8, is_player: bool) -> (&'static [i32], i32) {
    match size & 0b111 {
        1 => (&[0, 16], 1),
        2 => (&[0, 32], 1),
        3 => (&[0, 16, 32], 1),
        4 => (&[0, 64], 1),
        5 if is_player => (&[0], 2),
        6 => (&[0, 32, 64], 1),
        7 if is_player => (&[0], 4),
        _ => (&[0], 1),
    }
}

/// Width bits of a missile or ball (D5-D4 of NUSIZx / CTRLPF).
pub(crate) fn bar_shape(value: u8) -> u8 {
    match (value >> 4) & 0b11 {
        0 => 0x80,
        1 => 0xC0,
        2 => 0xF0,
        _ => 0xFF,
    }
}

/// State of one movable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableObject {
    pub(crate) enabled: bool,
    /// Horizontal position, always < 160.
    pub(crate) pos: u8,
    pub(crate) shape: u8,
    /// Pending motion in dots (-8..=7), applied on HMOVE.
    pub(crate) motion: i8,
    pub(crate) reflect: bool,
    /// Missile locked to its player (RESMPx). Locked missiles are hidden.
    pub(crate) locked: bool,
    pub(crate) color: u8,
    /// NUSIZ number/size code.
    pub(crate) size: u8,
    pub(crate) vdelay: bool,
    /// Graphics held back by vertical delay.
    pub(crate) vdata: u8,
}

impl MovableObject {
    pub(crate) fn new() -> Self {
        Self {
            enabled: false,
            pos: 0,
            shape: 0,
            motion: 0,
            reflect: false,
            locked: false,
            color: 0x7F,
            size: 0,
            vdelay: false,
            vdata: 0,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn pos(&self) -> u8 {
        self.pos
    }

    #[must_use]
    pub fn shape(&self) -> u8 {
        self.shape
    }

    #[must_use]
    pub fn motion(&self) -> i8 {
        self.motion
    }

    #[must_use]
    pub fn reflect(&self) -> bool {
        self.reflect
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn color(&self) -> u8 {
        self.color
    }

    #[must_use]
    pub fn size(&self) -> u8 {
        self.size
    }

    #[must_use]
    pub fn vdelay(&self) -> bool {
        self.vdelay
    }

    #[must_use]
    pub fn vdata(&self) -> u8 {
        self.vdata
    }

    /// Whether any copy of this object covers visible dot `x`.
    #[must_use]
    pub fn covers(&self, id: ObjectId, x: u8) -> bool {
        let (offsets, scale) = layout(self.size, id.is_player());
        offsets
            .iter()
            .any(|&offset| self.copy_covers(i32::from(x), offset, scale))
    }

    fn copy_covers(&self, x: i32, offset: i32, scale: i32) -> bool {
        let pos = i32::from(self.pos);
        let width = SCANLINE_WIDTH as i32;

        for bit in 0..8 {
            if (self.shape >> bit) & 1 == 0 {
                continue;
            }

            let mut dot = if self.reflect {
                pos + bit * scale + 1
            } else {
                pos - bit * scale + 8 * scale
            };
            dot += offset;
            // Scaled players start one dot later.
            if scale > 1 {
                dot += 1;
            }

            for j in 0..scale {
                let covered = if self.reflect { dot + j } else { dot - j };
                if covered.rem_euclid(width) == x {
                    return true;
                }
            }
        }

        false
    }

    /// Position reset strobe issued at horizontal clock `dot`.
    pub(crate) fn reset_position(&mut self, id: ObjectId, dot: u8) {
        let dot = u16::from(dot) + id.reset_delay();
        let pos = dot.saturating_sub(u16::from(crate::HBLANK_DOTS));
        self.pos = (pos % SCANLINE_WIDTH as u16) as u8;
    }

    /// Apply the pending motion (HMOVE). Positive motion moves left.
    pub(crate) fn apply_motion(&mut self) {
        let pos = i16::from(self.pos) - i16::from(self.motion);
        self.pos = pos.rem_euclid(SCANLINE_WIDTH as i16) as u8;
    }

    /// Centre a locked missile on `player`.
    pub(crate) fn lock_to(&mut self, player: &MovableObject) {
        let offset = match player.size & 0b111 {
            5 => 6,
            7 => 10,
            _ => 3,
        };
        self.pos = ((u16::from(player.pos) + offset) % SCANLINE_WIDTH as u16) as u8;
    }
}
