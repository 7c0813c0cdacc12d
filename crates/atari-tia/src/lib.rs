//! Atari TIA (Television Interface Adapter) emulator.
//!
//! The TIA generates the VCS video signal one colour clock ("dot") at a
//! time and paces the processor through its RDY line. It also holds the
//! collision latches, the joystick button inputs and the audio registers.
//!
//! # Timing
//!
//! | Quantity                | Value           |
//! |-------------------------|-----------------|
//! | Dots per scanline       | 228             |
//! | Horizontal blank        | dots 0-67       |
//! | Visible dots            | 68-227 (160)    |
//! | Scanlines per frame     | 262             |
//! | Visible scanlines       | 27-254 (228)    |
//! | Dots per processor cycle| 3               |
//!
//! A completed visible scanline is reported by [`Tia::tick`]; the caller
//! forwards [`Tia::scanline_colors`] and [`Tia::scanline_pixels`] to its
//! video sinks. Audio register stores are returned from [`Tia::write`] as
//! [`AudioWrite`]s so the synthesizer can live on another thread.
//!
//! # Register writes (address & 0x3F)
//!
//! | Addr | Name   | Effect                                         |
//! |------|--------|------------------------------------------------|
//! | $00  | VSYNC  | D1 rising: restart frame at scanline 0, dot 0  |
//! | $01  | VBLANK | D1 blank, D6 latch INPT4/5, D7 dump INPT0-3    |
//! | $02  | WSYNC  | Halt processor until end of scanline           |
//! | $04  | NUSIZ0 | Player/missile 0 copies, size, missile width   |
//! | $0A  | CTRLPF | Reflect, score, priority, ball width           |
//! | $10  | RESP0  | Reset player 0 to current beam position        |
//! | $1B  | GRP0   | Player 0 graphics (flushes delayed P1)         |
//! | $1C  | GRP1   | Player 1 graphics (flushes delayed P0, BL)     |
//! | $2A  | HMOVE  | Apply horizontal motion to all objects         |
//! | $2C  | CXCLR  | Clear collision latches                        |
//!
//! See [`registers`] for the full map.

pub mod audio;
mod collision;
mod object;
mod playfield;
pub mod registers;

pub use audio::{AudioChannel, AudioRegister, AudioWrite, Synth, Topology};
pub use collision::{Collision, CollisionMatrix};
pub use object::{MovableObject, ObjectId, Pixel};
pub use playfield::Playfield;

use emu_core::{Observable, Value};
use serde::{Deserialize, Serialize};

use registers as reg;

/// Visible dots per scanline.
pub const SCANLINE_WIDTH: usize = 160;
/// Colour clocks per scanline.
pub const DOTS_PER_LINE: u8 = 228;
/// Colour clocks of horizontal blank at the start of each scanline.
pub const HBLANK_DOTS: u8 = 68;
/// Scanlines per NTSC frame.
pub const LINES_PER_FRAME: u16 = 262;
pub const FIRST_VISIBLE_LINE: u16 = 27;
pub const LAST_VISIBLE_LINE: u16 = 254;
/// Scanlines delivered to video sinks per frame.
pub const VISIBLE_LINES: usize = (LAST_VISIBLE_LINE - FIRST_VISIBLE_LINE + 1) as usize;

/// Convert a COLUxx value to an index into the 128-entry palette.
///
/// D7-D4 select hue, D3-D1 luminance.
#[must_use]
pub fn color_index(value: u8) -> u8 {
    let luminance = (value >> 1) & 0x07;
    let hue = value >> 4;
    ((luminance << 4) + hue) % 128
}

/// One of the six input ports (INPT0-INPT5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Line level; `true` reads as D7 set.
    pub state: bool,
    /// Latch (INPT4/5) or dump (INPT0-3) control from VBLANK.
    pub control: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tia {
    dot: u8,
    scanline: u16,
    rdy: bool,
    vsync: bool,
    vsync_done: bool,
    vblank: bool,
    hmove_latched: bool,
    wait_count: u16,
    inputs: [Input; 6],
    /// External fire button lines for INPT4/INPT5. `true` = released.
    buttons: [bool; 2],
    objects: [MovableObject; 5],
    playfield: Playfield,
    background: u8,
    collisions: CollisionMatrix,
    #[serde(with = "emu_core::serde_array")]
    colors: [u8; SCANLINE_WIDTH],
    #[serde(with = "emu_core::serde_array")]
    pixels: [Pixel; SCANLINE_WIDTH],
}

impl Tia {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dot: 0,
            scanline: 0,
            rdy: true,
            vsync: false,
            vsync_done: false,
            vblank: false,
            hmove_latched: false,
            wait_count: 0,
            inputs: [Input::default(); 6],
            buttons: [true; 2],
            objects: [
                MovableObject::new(),
                MovableObject::new(),
                MovableObject::new(),
                MovableObject::new(),
                MovableObject::new(),
            ],
            playfield: Playfield::default(),
            background: 0,
            collisions: CollisionMatrix::new(),
            colors: [0; SCANLINE_WIDTH],
            pixels: [Pixel::Background; SCANLINE_WIDTH],
        }
    }

    /// Power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    /// Advance one colour clock.
    ///
    /// Returns the index (0-227) of the visible scanline that just ended,
    /// if any. Its pixels are in [`Tia::scanline_colors`] until the next
    /// visible dot is drawn.
    pub fn tick(&mut self) -> Option<u16> {
        let visible = (FIRST_VISIBLE_LINE..=LAST_VISIBLE_LINE).contains(&self.scanline);
        let mut completed = None;

        self.follow_players();

        self.dot += 1;
        if self.dot >= DOTS_PER_LINE {
            self.dot = 0;
            self.rdy = true;
            if visible {
                completed = Some(self.scanline - FIRST_VISIBLE_LINE);
            }
            self.hmove_latched = false;
            self.scanline += 1;
            if self.scanline >= LINES_PER_FRAME {
                self.scanline = 0;
            }
        } else if self.dot >= HBLANK_DOTS && visible {
            self.draw_pixel(self.dot - HBLANK_DOTS);
        }

        self.latch_buttons();
        completed
    }

    fn draw_pixel(&mut self, x: u8) {
        let i = usize::from(x);

        if self.vblank {
            self.colors[i] = 0;
            self.pixels[i] = Pixel::VBlank;
            return;
        }

        // HMOVE blanks the first eight dots of the line.
        if self.hmove_latched && x < 8 {
            self.colors[i] = 0;
            self.pixels[i] = Pixel::HMove;
            return;
        }

        let pf_drawn = self.playfield.active(x);
        let pf_color = self.playfield.color_at(
            x,
            self.objects[ObjectId::P0.index()].color,
            self.objects[ObjectId::P1.index()].color,
        );
        if pf_drawn {
            self.colors[i] = pf_color;
            self.pixels[i] = Pixel::Playfield;
        } else {
            self.colors[i] = self.background;
            self.pixels[i] = Pixel::Background;
        }

        let mut drawn = [false; 5];
        for id in ObjectId::ALL {
            let obj = &self.objects[id.index()];
            if !obj.enabled || obj.locked || !obj.covers(id, x) {
                continue;
            }

            self.colors[i] = obj.color;
            self.pixels[i] = id.into();

            if pf_drawn {
                self.collisions.set(Collision::with_playfield(id));
            }
            for other in ObjectId::ALL {
                if !drawn[other.index()] {
                    continue;
                }
                if let Some(c) = Collision::between(id, other) {
                    self.collisions.set(c);
                }
            }
            drawn[id.index()] = true;
        }

        if self.playfield.priority && pf_drawn {
            self.colors[i] = pf_color;
            self.pixels[i] = Pixel::Playfield;
        }
    }

    fn latch_buttons(&mut self) {
        for (input, &line) in self.inputs[4..].iter_mut().zip(&self.buttons) {
            input.state = if input.control {
                input.state && line
            } else {
                line
            };
        }
    }

    /// Locked missiles track their player's position.
    fn follow_players(&mut self) {
        for (missile, player) in [(ObjectId::M0, ObjectId::P0), (ObjectId::M1, ObjectId::P1)] {
            if self.objects[missile.index()].locked {
                let p = self.objects[player.index()].clone();
                self.objects[missile.index()].lock_to(&p);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Register access
    // -----------------------------------------------------------------------

    /// Read a register. Collision reads echo the register number in the
    /// low bits.
    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        let address = address & reg::READ_MASK;
        match address {
            reg::CXM0P..=reg::CXPPMM => self.collisions.read(address),
            reg::INPT0..=reg::INPT5 => {
                if self.inputs[usize::from(address - reg::INPT0)].state {
                    0x80
                } else {
                    0x00
                }
            }
            _ => 0,
        }
    }

    /// Write a register. Audio register stores are handed back to the
    /// caller for the synthesizer.
    pub fn write(&mut self, address: u16, value: u8) -> Option<AudioWrite> {
        let address = address & reg::WRITE_MASK;
        match address {
            reg::VSYNC => self.write_vsync(value),
            reg::VBLANK => self.write_vblank(value),
            reg::WSYNC => {
                self.wait_count = self.wait_count.wrapping_add(1);
                // A strobe landing exactly on the line wrap does not halt.
                if self.dot != 0 {
                    self.rdy = false;
                    log::trace!("WSYNC halt at scanline {} dot {}", self.scanline, self.dot);
                }
            }
            reg::RSYNC => {}
            reg::NUSIZ0 | reg::NUSIZ1 => {
                let (player, missile) = pair(address == reg::NUSIZ1);
                self.objects[missile.index()].shape = object::bar_shape(value);
                self.objects[player.index()].size = value & 0b111;
                self.objects[missile.index()].size = value & 0b111;
            }
            reg::COLUP0 | reg::COLUP1 => {
                let (player, missile) = pair(address == reg::COLUP1);
                self.objects[player.index()].color = color_index(value);
                self.objects[missile.index()].color = color_index(value);
            }
            reg::COLUPF => {
                self.playfield.color = color_index(value);
                self.objects[ObjectId::Bl.index()].color = color_index(value);
            }
            reg::COLUBK => self.background = color_index(value),
            reg::CTRLPF => {
                self.playfield.set_control(value);
                self.objects[ObjectId::Bl.index()].shape = object::bar_shape(value);
            }
            reg::REFP0 => self.objects[ObjectId::P0.index()].reflect = value & 0x08 != 0,
            reg::REFP1 => self.objects[ObjectId::P1.index()].reflect = value & 0x08 != 0,
            reg::PF0 => self.playfield.pf0 = value >> 4,
            reg::PF1 => self.playfield.pf1 = value,
            reg::PF2 => self.playfield.pf2 = value,
            reg::RESP0..=reg::RESBL => {
                let id = ObjectId::ALL[usize::from(address - reg::RESP0)];
                let dot = self.dot;
                self.objects[id.index()].reset_position(id, dot);
            }
            reg::AUDC0..=reg::AUDV1 => return Some(audio_write(address, value)),
            reg::GRP0 => {
                self.load_graphics(ObjectId::P0, value);
                self.flush_delayed(ObjectId::P1);
            }
            reg::GRP1 => {
                self.load_graphics(ObjectId::P1, value);
                self.flush_delayed(ObjectId::P0);
                self.flush_delayed(ObjectId::Bl);
            }
            reg::ENAM0 => self.objects[ObjectId::M0.index()].enabled = value & 0x02 != 0,
            reg::ENAM1 => self.objects[ObjectId::M1.index()].enabled = value & 0x02 != 0,
            reg::ENABL => {
                let ball = &mut self.objects[ObjectId::Bl.index()];
                if ball.vdelay {
                    ball.vdata = value;
                } else {
                    ball.enabled = value & 0x02 != 0;
                }
            }
            reg::HMP0..=reg::HMBL => {
                let id = ObjectId::ALL[usize::from(address - reg::HMP0)];
                // Signed high nibble.
                self.objects[id.index()].motion = (value as i8) >> 4;
            }
            reg::VDELP0 => self.objects[ObjectId::P0.index()].vdelay = value & 0x01 != 0,
            reg::VDELP1 => self.objects[ObjectId::P1.index()].vdelay = value & 0x01 != 0,
            reg::VDELBL => self.objects[ObjectId::Bl.index()].vdelay = value & 0x01 != 0,
            reg::RESMP0 | reg::RESMP1 => {
                let (player, missile) = pair(address == reg::RESMP1);
                self.objects[missile.index()].locked = value & 0x02 != 0;
                if self.objects[missile.index()].locked {
                    let p = self.objects[player.index()].clone();
                    self.objects[missile.index()].lock_to(&p);
                }
            }
            reg::HMOVE => {
                for obj in &mut self.objects {
                    obj.apply_motion();
                }
                self.hmove_latched = true;
            }
            reg::HMCLR => {
                for obj in &mut self.objects {
                    obj.motion = 0;
                }
            }
            reg::CXCLR => self.collisions.clear(),
            _ => {}
        }
        None
    }

    fn write_vsync(&mut self, value: u8) {
        self.vsync = value & 0x02 != 0;
        if self.vsync {
            if !self.vsync_done {
                self.dot = 0;
                self.scanline = 0;
                self.vsync_done = true;
                self.wait_count = 0;
            }
        } else {
            self.vsync_done = false;
        }
    }

    fn write_vblank(&mut self, value: u8) {
        self.vblank = value & 0x02 != 0;
        let dump = value & 0x80 != 0;
        let latch = value & 0x40 != 0;
        for input in &mut self.inputs[..4] {
            input.control = dump;
        }
        for input in &mut self.inputs[4..] {
            // Enabling the latch resets it high.
            if latch && !input.control {
                input.state = true;
            }
            input.control = latch;
        }
    }

    fn load_graphics(&mut self, id: ObjectId, value: u8) {
        let obj = &mut self.objects[id.index()];
        if obj.vdelay {
            obj.vdata = value;
        } else {
            obj.enabled = value > 0;
            obj.shape = value;
        }
    }

    /// Move vertically-delayed graphics into the live register.
    fn flush_delayed(&mut self, id: ObjectId) {
        let obj = &mut self.objects[id.index()];
        if !obj.vdelay {
            return;
        }
        if id == ObjectId::Bl {
            obj.enabled = obj.vdata & 0x02 != 0;
        } else {
            obj.enabled = obj.vdata > 0;
            obj.shape = obj.vdata;
        }
    }

    /// Set the external fire button lines (`true` = released).
    pub fn set_buttons(&mut self, p0: bool, p1: bool) {
        self.buttons = [p0, p1];
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn dot(&self) -> u8 {
        self.dot
    }

    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Processor run line. Deasserted by WSYNC until the end of the line.
    #[must_use]
    pub fn rdy(&self) -> bool {
        self.rdy
    }

    #[must_use]
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    #[must_use]
    pub fn vblank(&self) -> bool {
        self.vblank
    }

    /// WSYNC strobes since the last VSYNC.
    #[must_use]
    pub fn wait_count(&self) -> u16 {
        self.wait_count
    }

    #[must_use]
    pub fn scanline_colors(&self) -> &[u8; SCANLINE_WIDTH] {
        &self.colors
    }

    #[must_use]
    pub fn scanline_pixels(&self) -> &[Pixel; SCANLINE_WIDTH] {
        &self.pixels
    }

    #[must_use]
    pub fn collision(&self, collision: Collision) -> bool {
        self.collisions.get(collision)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> &MovableObject {
        &self.objects[id.index()]
    }

    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[must_use]
    pub fn background(&self) -> u8 {
        self.background
    }

    /// INPT`index` latch, `None` past INPT5.
    #[must_use]
    pub fn input(&self, index: usize) -> Option<Input> {
        self.inputs.get(index).copied()
    }
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

/// Player and missile sharing a register pair.
fn pair(second: bool) -> (ObjectId, ObjectId) {
    if second {
        (ObjectId::P1, ObjectId::M1)
    } else {
        (ObjectId::P0, ObjectId::M0)
    }
}

fn audio_write(address: u16, value: u8) -> AudioWrite {
    let (register, channel, value) = match address {
        reg::AUDC0 => (AudioRegister::Control, 0, value & 0x0F),
        reg::AUDC1 => (AudioRegister::Control, 1, value & 0x0F),
        reg::AUDF0 => (AudioRegister::Frequency, 0, value & 0x1F),
        reg::AUDF1 => (AudioRegister::Frequency, 1, value & 0x1F),
        reg::AUDV0 => (AudioRegister::Volume, 0, value & 0x0F),
        _ => (AudioRegister::Volume, 1, value & 0x0F),
    };
    AudioWrite {
        channel,
        register,
        value,
    }
}

const QUERY_PATHS: &[&str] = &[
    "dot",
    "scanline",
    "rdy",
    "vsync",
    "vsync_done",
    "vblank",
    "hmove",
    "wait_count",
    "p0.enabled",
    "p0.pos",
    "p0.shape",
    "p0.motion",
    "p0.reflect",
    "p0.color",
    "p0.size",
    "p0.vdelay",
    "p0.vdata",
    "p1.enabled",
    "p1.pos",
    "p1.shape",
    "p1.motion",
    "p1.reflect",
    "p1.color",
    "p1.size",
    "p1.vdelay",
    "p1.vdata",
    "m0.enabled",
    "m0.pos",
    "m0.shape",
    "m0.motion",
    "m0.locked",
    "m0.color",
    "m0.size",
    "m1.enabled",
    "m1.pos",
    "m1.shape",
    "m1.motion",
    "m1.locked",
    "m1.color",
    "m1.size",
    "bl.enabled",
    "bl.pos",
    "bl.shape",
    "bl.motion",
    "bl.color",
    "bl.vdelay",
    "bl.vdata",
    "pf.bytes",
    "pf.reflect",
    "pf.score",
    "pf.priority",
    "pf.color",
    "background",
    "collision.m0_p1",
    "collision.m0_p0",
    "collision.m1_p0",
    "collision.m1_p1",
    "collision.p0_pf",
    "collision.p0_bl",
    "collision.p1_pf",
    "collision.p1_bl",
    "collision.m0_pf",
    "collision.m0_bl",
    "collision.m1_pf",
    "collision.m1_bl",
    "collision.bl_pf",
    "collision.p0_p1",
    "collision.m0_m1",
    "input0",
    "input1",
    "input2",
    "input3",
    "input4",
    "input4.latch",
    "input5",
    "input5.latch",
];

impl Observable for Tia {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("collision.") {
            return Collision::ALL
                .iter()
                .find(|c| c.name() == rest)
                .map(|&c| self.collisions.get(c).into());
        }

        if let Some(rest) = path.strip_prefix("pf.") {
            return match rest {
                "bytes" => Some(Value::Array(
                    self.playfield.bytes().iter().map(|&b| b.into()).collect(),
                )),
                "reflect" => Some(self.playfield.reflect.into()),
                "score" => Some(self.playfield.score_mode.into()),
                "priority" => Some(self.playfield.priority.into()),
                "color" => Some(self.playfield.color.into()),
                _ => None,
            };
        }

        if let Some(rest) = path.strip_prefix("input") {
            let (index, field) = rest.split_once('.').unwrap_or((rest, ""));
            let input = self.inputs.get(index.parse::<usize>().ok()?)?;
            return match field {
                "" => Some(input.state.into()),
                "latch" | "control" => Some(input.control.into()),
                _ => None,
            };
        }

        if let Some((name, field)) = path.split_once('.') {
            let id = ObjectId::ALL.into_iter().find(|id| id.name() == name)?;
            let obj = &self.objects[id.index()];
            return match field {
                "enabled" => Some(obj.enabled.into()),
                "pos" => Some(obj.pos.into()),
                "shape" => Some(obj.shape.into()),
                "motion" => Some(obj.motion.into()),
                "reflect" => Some(obj.reflect.into()),
                "locked" => Some(obj.locked.into()),
                "color" => Some(obj.color.into()),
                "size" => Some(obj.size.into()),
                "vdelay" => Some(obj.vdelay.into()),
                "vdata" => Some(obj.vdata.into()),
                _ => None,
            };
        }

        match path {
            "dot" => Some(self.dot.into()),
            "scanline" => Some(self.scanline.into()),
            "rdy" => Some(self.rdy.into()),
            "vsync" => Some(self.vsync.into()),
            "vsync_done" => Some(self.vsync_done.into()),
            "vblank" => Some(self.vblank.into()),
            "hmove" => Some(self.hmove_latched.into()),
            "wait_count" => Some(self.wait_count.into()),
            "background" => Some(self.background.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
