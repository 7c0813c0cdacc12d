//! TIA audio: two noise/tone channels.
//!
//! Each channel is a feedback shift register clocked by a frequency
//! divider. AUDCx selects the register topology, AUDFx the divider and
//! AUDVx the volume. The output sample is the mean of both channels'
//! current bit scaled by volume.
//!
//! | AUDC         | Topology  | Seed      | Skip |
//! |--------------|-----------|-----------|------|
//! | 0, B         | constant  | `1`       | -    |
//! | 1, 2         | poly4     | `0xF`     | 2: 15 |
//! | 4, 5, C, D   | pure tone | `1`       | C, D: 2 |
//! | 6, A, E      | div 31    | `0x3FFFF` | E: 2 |
//! | 8            | poly9     | `0x1FF`   | -    |
//! | 3, 7, 9, F   | poly5     | `0x1F`    | F: 2 |
//!
//! The divider is derived from the output sample rate, so the chip does
//! not need to be clocked at its native ~31.4 kHz.

use serde::{Deserialize, Serialize};

/// Native audio clock (NTSC colour clock / 114).
pub const BASE_FREQUENCY: f64 = 31_399.5;

/// Output rate used when the host does not ask for another.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Div-31 reloads after this many shifts.
const DIV31_PERIOD: u8 = 31;

/// Shift register arrangement selected by a 4-bit AUDC value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Output held at 1.
    Constant,
    Poly4,
    /// Square wave: each clock inverts the output.
    PureTone,
    /// Long run of ones, then zeros, restarting every 31 clocks.
    Div31,
    Poly9,
    Poly5,
}

impl Topology {
    #[must_use]
    pub fn from_control(control: u8) -> Self {
        match control & 0x0F {
            0x0 | 0xB => Topology::Constant,
            0x1 | 0x2 => Topology::Poly4,
            0x4 | 0x5 | 0xC | 0xD => Topology::PureTone,
            0x6 | 0xA | 0xE => Topology::Div31,
            0x8 => Topology::Poly9,
            _ => Topology::Poly5,
        }
    }

    /// Register contents after AUDC selects this topology.
    #[must_use]
    pub const fn seed(self) -> u32 {
        match self {
            Topology::Constant | Topology::PureTone => 0x1,
            Topology::Poly4 => 0xF,
            Topology::Div31 => 0x3_FFFF,
            Topology::Poly9 => 0x1FF,
            Topology::Poly5 => 0x1F,
        }
    }
}

/// Number of clocks held between shifts for an AUDC value.
fn skip_period(control: u8) -> u8 {
    match control & 0x0F {
        0x2 => 15,
        0xC..=0xF => 2,
        _ => 0,
    }
}

/// Which of a channel's three registers an [`AudioWrite`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRegister {
    Control,
    Frequency,
    Volume,
}

/// An AUDCx/AUDFx/AUDVx store, forwarded from the TIA to the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioWrite {
    /// 0 or 1.
    pub channel: usize,
    pub register: AudioRegister,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioChannel {
    /// AUDV × 16.
    volume: u8,
    divider: u8,
    control: u8,
    topology: Topology,
    shift: u32,
    shift_count: u8,
    skip: u8,
    skip_countdown: u8,
}

impl AudioChannel {
    fn new(sample_rate: u32) -> Self {
        let mut channel = Self {
            volume: 0,
            divider: 1,
            control: 0,
            topology: Topology::Constant,
            shift: 0,
            shift_count: 0,
            skip: 0,
            skip_countdown: 0,
        };
        channel.set_control(0);
        channel.set_frequency(0, sample_rate);
        channel
    }

    /// AUDV (4 bits).
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = (volume & 0x0F) * 16;
    }

    /// AUDF (5 bits), converted to a divider at `sample_rate`.
    pub fn set_frequency(&mut self, frequency: u8, sample_rate: u32) {
        let scale = f64::from(sample_rate) / BASE_FREQUENCY;
        let divider = (f64::from(frequency & 0x1F) * scale) as u32 + 1;
        self.divider = divider.min(u32::from(u8::MAX)) as u8;
    }

    /// AUDC (4 bits). Reseeds the register and restarts the skip counter.
    pub fn set_control(&mut self, control: u8) {
        self.control = control & 0x0F;
        self.topology = Topology::from_control(self.control);
        self.shift = self.topology.seed();
        if self.topology == Topology::Div31 {
            self.shift_count = 0;
        }
        self.skip = skip_period(self.control);
        if self.skip > 0 {
            self.skip_countdown = self.skip;
        }
    }

    #[must_use]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    #[must_use]
    pub fn divider(&self) -> u8 {
        self.divider
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn register(&self) -> u32 {
        self.shift
    }

    /// Clock the register once and return the output bit.
    ///
    /// The returned bit is the register's low bit before the clock. While
    /// the skip counter is running the register holds.
    pub fn shift(&mut self) -> bool {
        let bit = self.shift & 1 != 0;

        if self.skip > 0 {
            if self.skip_countdown > 0 {
                self.skip_countdown -= 1;
                return bit;
            }
            self.skip_countdown = self.skip;
        }

        match self.topology {
            Topology::Constant => return true,
            Topology::Poly4 => self.feedback(1, 4),
            Topology::PureTone => self.shift = u32::from(!bit),
            Topology::Div31 => {
                self.shift >>= 1;
                self.shift_count += 1;
                if self.shift_count == DIV31_PERIOD {
                    self.shift = Topology::Div31.seed();
                    self.shift_count = 0;
                }
            }
            Topology::Poly9 => self.feedback(4, 9),
            Topology::Poly5 => self.feedback(2, 5),
        }

        bit
    }

    /// Feed bit0 ^ bit`tap` into bit `width`, then shift right.
    fn feedback(&mut self, tap: u32, width: u32) {
        let fed = (self.shift ^ (self.shift >> tap)) & 1;
        self.shift = (self.shift | (fed << width)) >> 1;
    }
}

/// Both audio channels plus the output clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synth {
    channels: [AudioChannel; 2],
    sample_no: u32,
    bits: [bool; 2],
    sample_rate: u32,
}

impl Synth {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            channels: [AudioChannel::new(sample_rate), AudioChannel::new(sample_rate)],
            sample_no: 0,
            bits: [false; 2],
            sample_rate,
        }
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channel(&self, channel: usize) -> &AudioChannel {
        &self.channels[channel & 1]
    }

    pub fn set_control(&mut self, channel: usize, value: u8) {
        self.channels[channel & 1].set_control(value);
    }

    pub fn set_frequency(&mut self, channel: usize, value: u8) {
        let rate = self.sample_rate;
        self.channels[channel & 1].set_frequency(value, rate);
    }

    pub fn set_volume(&mut self, channel: usize, value: u8) {
        self.channels[channel & 1].set_volume(value);
    }

    /// Apply a register store forwarded by the TIA.
    pub fn apply(&mut self, write: AudioWrite) {
        match write.register {
            AudioRegister::Control => self.set_control(write.channel, write.value),
            AudioRegister::Frequency => self.set_frequency(write.channel, write.value),
            AudioRegister::Volume => self.set_volume(write.channel, write.value),
        }
    }

    /// Produce the next output sample in the range [-1, 1].
    pub fn next_sample(&mut self) -> f32 {
        let mut sample = 0.0f32;
        for (channel, bit) in self.channels.iter_mut().zip(self.bits.iter_mut()) {
            if self.sample_no % u32::from(channel.divider) == 0 {
                *bit = channel.shift();
            }
            let level = if *bit { 1.0 } else { -1.0 };
            sample += level / 256.0 * f32::from(channel.volume);
        }
        self.sample_no = self.sample_no.wrapping_add(1);
        sample / 2.0
    }

    /// Fill an unsigned 8-bit mono buffer centred on 127.
    pub fn fill_u8(&mut self, out: &mut [u8]) {
        for slot in out {
            let sample = self.next_sample();
            *slot = (127.0 + sample * 64.0) as u8;
        }
    }

    /// Fill a float mono buffer at half scale.
    pub fn fill_f32(&mut self, out: &mut [f32]) {
        for slot in out {
            *slot = self.next_sample() * 0.5;
        }
    }

    /// Query channel state by path, e.g. `ch0.control`.
    #[must_use]
    pub fn query(&self, path: &str) -> Option<emu_core::Value> {
        let (channel, field) = match path.split_once('.') {
            Some(("ch0", field)) => (&self.channels[0], field),
            Some(("ch1", field)) => (&self.channels[1], field),
            _ => {
                return match path {
                    "sample_rate" => Some(emu_core::Value::U64(u64::from(self.sample_rate))),
                    _ => None,
                };
            }
        };
        match field {
            "control" => Some(channel.control.into()),
            "divider" => Some(channel.divider.into()),
            "volume" => Some(channel.volume.into()),
            "register" => Some(emu_core::Value::U64(u64::from(channel.shift))),
            _ => None,
        }
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}
