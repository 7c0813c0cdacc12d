//! Collision latches.
//!
//! Fifteen latches, one per unordered pair of {P0, P1, M0, M1, BL, PF}.
//! A latch is set whenever both members of its pair are drawn on the same
//! dot and stays set until CXCLR.

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collision {
    M0P1 = 0,
    M0P0 = 1,
    M1P0 = 2,
    M1P1 = 3,
    P0Pf = 4,
    P0Bl = 5,
    P1Pf = 6,
    P1Bl = 7,
    M0Pf = 8,
    M0Bl = 9,
    M1Pf = 10,
    M1Bl = 11,
    BlPf = 12,
    P0P1 = 13,
    M0M1 = 14,
}

impl Collision {
    pub const COUNT: usize = 15;

    pub const ALL: [Collision; Self::COUNT] = [
        Collision::M0P1,
        Collision::M0P0,
        Collision::M1P0,
        Collision::M1P1,
        Collision::P0Pf,
        Collision::P0Bl,
        Collision::P1Pf,
        Collision::P1Bl,
        Collision::M0Pf,
        Collision::M0Bl,
        Collision::M1Pf,
        Collision::M1Bl,
        Collision::BlPf,
        Collision::P0P1,
        Collision::M0M1,
    ];

    /// The latch for two distinct objects. Order does not matter.
    #[must_use]
    pub fn between(a: ObjectId, b: ObjectId) -> Option<Collision> {
        use ObjectId::{Bl, M0, M1, P0, P1};

        let pair = if a.index() <= b.index() { (a, b) } else { (b, a) };
        match pair {
            (P0, P1) => Some(Collision::P0P1),
            (P0, M0) => Some(Collision::M0P0),
            (P0, M1) => Some(Collision::M1P0),
            (P0, Bl) => Some(Collision::P0Bl),
            (P1, M0) => Some(Collision::M0P1),
            (P1, M1) => Some(Collision::M1P1),
            (P1, Bl) => Some(Collision::P1Bl),
            (M0, M1) => Some(Collision::M0M1),
            (M0, Bl) => Some(Collision::M0Bl),
            (M1, Bl) => Some(Collision::M1Bl),
            _ => None,
        }
    }

    /// The latch for an object overlapping the playfield.
    #[must_use]
    pub const fn with_playfield(id: ObjectId) -> Collision {
        match id {
            ObjectId::P0 => Collision::P0Pf,
            ObjectId::P1 => Collision::P1Pf,
            ObjectId::M0 => Collision::M0Pf,
            ObjectId::M1 => Collision::M1Pf,
            ObjectId::Bl => Collision::BlPf,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Collision::M0P1 => "m0_p1",
            Collision::M0P0 => "m0_p0",
            Collision::M1P0 => "m1_p0",
            Collision::M1P1 => "m1_p1",
            Collision::P0Pf => "p0_pf",
            Collision::P0Bl => "p0_bl",
            Collision::P1Pf => "p1_pf",
            Collision::P1Bl => "p1_bl",
            Collision::M0Pf => "m0_pf",
            Collision::M0Bl => "m0_bl",
            Collision::M1Pf => "m1_pf",
            Collision::M1Bl => "m1_bl",
            Collision::BlPf => "bl_pf",
            Collision::P0P1 => "p0_p1",
            Collision::M0M1 => "m0_m1",
        }
    }
}

/// The fifteen collision latches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMatrix {
    latches: [bool; Collision::COUNT],
}

impl CollisionMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collision: Collision) {
        self.latches[collision as usize] = true;
    }

    #[must_use]
    pub fn get(&self, collision: Collision) -> bool {
        self.latches[collision as usize]
    }

    pub fn clear(&mut self) {
        self.latches = [false; Collision::COUNT];
    }

    /// Value of collision read register `register` (0-7).
    ///
    /// D7 and D6 carry the latch pair; the low bits echo the register
    /// number, which some programs rely on when they mistakenly read a
    /// collision register instead of loading an immediate.
    #[must_use]
    pub fn read(&self, register: u16) -> u8 {
        let (d7, d6) = match register {
            0 => (Collision::M0P1, Some(Collision::M0P0)),
            1 => (Collision::M1P0, Some(Collision::M1P1)),
            2 => (Collision::P0Pf, Some(Collision::P0Bl)),
            3 => (Collision::P1Pf, Some(Collision::P1Bl)),
            4 => (Collision::M0Pf, Some(Collision::M0Bl)),
            5 => (Collision::M1Pf, Some(Collision::M1Bl)),
            6 => (Collision::BlPf, None),
            7 => (Collision::P0P1, Some(Collision::M0M1)),
            _ => return 0,
        };

        let mut value = register as u8;
        if self.get(d7) {
            value |= 0x80;
        }
        if d6.is_some_and(|c| self.get(c)) {
            value |= 0x40;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_lookup_is_symmetric() {
        for a in ObjectId::ALL {
            for b in ObjectId::ALL {
                assert_eq!(Collision::between(a, b), Collision::between(b, a));
                assert_eq!(Collision::between(a, b).is_none(), a == b);
            }
        }
    }

    #[test]
    fn every_latch_has_exactly_one_pair() {
        let mut seen = [0u8; Collision::COUNT];
        for (i, a) in ObjectId::ALL.iter().enumerate() {
            for b in &ObjectId::ALL[i + 1..] {
                if let Some(c) = Collision::between(*a, *b) {
                    seen[c as usize] += 1;
                }
            }
            seen[Collision::with_playfield(*a) as usize] += 1;
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn set_is_idempotent_and_clear_resets_all() {
        let mut m = CollisionMatrix::new();
        m.set(Collision::P0P1);
        m.set(Collision::P0P1);
        assert!(m.get(Collision::P0P1));
        assert_eq!(Collision::ALL.iter().filter(|&&c| m.get(c)).count(), 1);
        m.clear();
        assert!(Collision::ALL.iter().all(|&c| !m.get(c)));
    }

    #[test]
    fn read_registers_pack_latches_and_echo_index() {
        let mut m = CollisionMatrix::new();
        assert_eq!(m.read(3), 0x03);
        m.set(Collision::P1Pf);
        assert_eq!(m.read(3), 0x83);
        m.set(Collision::P1Bl);
        assert_eq!(m.read(3), 0xC3);
        m.set(Collision::BlPf);
        assert_eq!(m.read(6), 0x86);
        m.set(Collision::M0M1);
        assert_eq!(m.read(7), 0x47);
    }
}
