//! VCS bus: processor address routing and chip catch-up.
//!
//! Only A0-A12 are wired, so every address is reduced to 13 bits:
//!
//! | A12 | A9 | A7 | Region                               |
//! |-----|----|----|--------------------------------------|
//! |  1  | x  | x  | Cartridge ($1000-$1FFF)              |
//! |  0  | 0  | 1  | RIOT RAM ($80-$FF, mirrored)         |
//! |  0  | 1  | 1  | RIOT ports and timer ($280-$29F)     |
//! |  0  | x  | 0  | TIA                                  |
//!
//! Processor cycles reported through [`Bus::elapse`] accumulate as
//! pending time. Before any TIA or RIOT access, and whenever the machine
//! asks, the pending cycles are run: one RIOT tick and three TIA dots per
//! cycle. Cartridge accesses observe nothing and never sync.
//!
//! Each chip keeps its own pending count. A chip that is not installed
//! keeps its cycles until it is back, so removing a responder never
//! skews the chips against each other.

use std::sync::Arc;

use atari_tia::{Synth, Tia};
use emu_core::{Access, Bus, BusError, Tickable, Ticks};
use mos_riot_6532::Riot;
use parking_lot::Mutex;

use crate::cartridge::Cartridge;
use crate::input::InputState;
use crate::video::{FrameBuffer, VideoSink};

/// Audio synthesizer shared between the bus and an audio callback.
pub type SharedSynth = Arc<Mutex<Synth>>;

/// Significant address lines.
pub const ADDRESS_MASK: u16 = 0x1FFF;

/// Colour clocks per processor cycle.
pub const DOTS_PER_CYCLE: u32 = 3;

/// Decoded destination of a bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Tia,
    Riot,
    Cartridge,
}

impl Region {
    /// Decode an address (any high bits are ignored).
    #[must_use]
    pub const fn decode(address: u16) -> Self {
        let address = address & ADDRESS_MASK;
        if address & 0x1000 != 0 {
            Self::Cartridge
        } else if address & 0x0080 != 0 {
            Self::Riot
        } else {
            Self::Tia
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tia => "TIA",
            Self::Riot => "RIOT",
            Self::Cartridge => "cartridge",
        }
    }
}

/// The VCS bus, implementing `emu_core::Bus`.
pub struct AtariBus {
    tia: Option<Tia>,
    riot: Option<Riot>,
    cartridge: Option<Cartridge>,
    synth: SharedSynth,
    input: InputState,
    frame: FrameBuffer,
    sinks: Vec<Box<dyn VideoSink + Send>>,
    /// Processor cycles not yet run on the TIA.
    tia_pending: u32,
    /// Processor cycles not yet run on the RIOT.
    riot_pending: u32,
    /// Cycles reported through `elapse` since the last `take_reported`.
    reported: u32,
}

impl AtariBus {
    /// A bus with no responders installed.
    #[must_use]
    pub fn new(synth: SharedSynth) -> Self {
        Self {
            tia: None,
            riot: None,
            cartridge: None,
            synth,
            input: InputState::default(),
            frame: FrameBuffer::new(),
            sinks: Vec::new(),
            tia_pending: 0,
            riot_pending: 0,
            reported: 0,
        }
    }

    /// A fully populated bus.
    #[must_use]
    pub fn with_cartridge(cartridge: Cartridge, synth: SharedSynth) -> Self {
        let mut bus = Self::new(synth);
        bus.install_tia(Tia::new());
        bus.install_riot(Riot::new());
        bus.install_cartridge(cartridge);
        bus
    }

    // -----------------------------------------------------------------------
    // Responders
    // -----------------------------------------------------------------------

    pub fn install_tia(&mut self, mut tia: Tia) {
        tia.set_buttons(self.input.button_p0, self.input.button_p1);
        self.tia = Some(tia);
    }

    pub fn install_riot(&mut self, mut riot: Riot) {
        riot.external_a = self.input.movement;
        riot.external_b = self.input.switches;
        self.riot = Some(riot);
    }

    pub fn install_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn remove_tia(&mut self) -> Option<Tia> {
        self.tia.take()
    }

    pub fn remove_riot(&mut self) -> Option<Riot> {
        self.riot.take()
    }

    pub fn remove_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    #[must_use]
    pub fn tia(&self) -> Option<&Tia> {
        self.tia.as_ref()
    }

    pub fn tia_mut(&mut self) -> Option<&mut Tia> {
        self.tia.as_mut()
    }

    #[must_use]
    pub fn riot(&self) -> Option<&Riot> {
        self.riot.as_ref()
    }

    pub fn riot_mut(&mut self) -> Option<&mut Riot> {
        self.riot.as_mut()
    }

    #[must_use]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    #[must_use]
    pub fn synth(&self) -> &SharedSynth {
        &self.synth
    }

    // -----------------------------------------------------------------------
    // Video
    // -----------------------------------------------------------------------

    /// The built-in ARGB frame.
    #[must_use]
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Also deliver every completed scanline to `sink`.
    pub fn add_sink(&mut self, sink: Box<dyn VideoSink + Send>) {
        self.sinks.push(sink);
    }

    /// Detach all extra sinks.
    pub fn take_sinks(&mut self) -> Vec<Box<dyn VideoSink + Send>> {
        std::mem::take(&mut self.sinks)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    /// Drive the joystick and switch lines.
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
        if let Some(riot) = &mut self.riot {
            riot.external_a = input.movement;
            riot.external_b = input.switches;
        }
        if let Some(tia) = &mut self.tia {
            tia.set_buttons(input.button_p0, input.button_p1);
        }
    }

    // -----------------------------------------------------------------------
    // Timing
    // -----------------------------------------------------------------------

    /// Processor cycles waiting to be run on the chip furthest behind.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.tia_pending.max(self.riot_pending)
    }

    /// Pending cycles per chip, TIA first.
    pub(crate) fn pending_by_chip(&self) -> (u32, u32) {
        (self.tia_pending, self.riot_pending)
    }

    /// Cycles reported since the previous call, resetting the count.
    pub fn take_reported(&mut self) -> u32 {
        std::mem::take(&mut self.reported)
    }

    /// Run all pending cycles on the installed chips.
    pub fn sync(&mut self) {
        if let Some(riot) = &mut self.riot {
            let cycles = std::mem::take(&mut self.riot_pending);
            riot.tick_n(Ticks::new(u64::from(cycles)));
        }
        let Some(tia) = &mut self.tia else {
            return;
        };
        let dots = std::mem::take(&mut self.tia_pending) * DOTS_PER_CYCLE;
        for _ in 0..dots {
            if let Some(line) = tia.tick() {
                let colors = tia.scanline_colors();
                let pixels = tia.scanline_pixels();
                self.frame.draw_scanline(line, colors, pixels);
                for sink in &mut self.sinks {
                    sink.draw_scanline(line, colors, pixels);
                }
            }
        }
    }

    /// Take back up to `cycles` cycles that no chip has run yet. Returns
    /// how many were taken back.
    pub(crate) fn rewind(&mut self, cycles: u32) -> u32 {
        let cycles = cycles.min(self.tia_pending).min(self.riot_pending);
        self.tia_pending -= cycles;
        self.riot_pending -= cycles;
        cycles
    }

    /// Restore pending time from a snapshot.
    pub(crate) fn set_pending(&mut self, (tia, riot): (u32, u32)) {
        self.tia_pending = tia;
        self.riot_pending = riot;
        self.reported = 0;
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Read without side effects or sync. `None` if the region is empty.
    #[must_use]
    pub fn peek(&self, address: u16) -> Option<u8> {
        let address = address & ADDRESS_MASK;
        match Region::decode(address) {
            Region::Cartridge => self.cartridge.as_ref().map(|c| c.peek(address)),
            Region::Riot => self.riot.as_ref().map(|r| r.peek(address)),
            Region::Tia => self.tia.as_ref().map(|t| t.read(address)),
        }
    }

    /// Peek a byte of RIOT RAM.
    #[must_use]
    pub fn peek_ram(&self, address: u16) -> u8 {
        self.riot
            .as_ref()
            .map_or(0, |r| r.ram()[usize::from(address & 0x7F)])
    }

    fn unmapped(address: u16, region: Region, access: Access) -> BusError {
        log::error!(
            "{access} of ${address:04X}: no {} installed",
            region.name()
        );
        BusError::Unmapped {
            address,
            region: region.name(),
            access,
        }
    }

    fn check(&self, address: u16, access: Access) -> Result<Region, BusError> {
        let region = Region::decode(address);
        let present = match region {
            Region::Tia => self.tia.is_some(),
            Region::Riot => self.riot.is_some(),
            Region::Cartridge => self.cartridge.is_some(),
        };
        if present {
            Ok(region)
        } else {
            Err(Self::unmapped(address, region, access))
        }
    }
}

impl Bus for AtariBus {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        let address = address & ADDRESS_MASK;
        let region = self.check(address, Access::Read)?;
        if region != Region::Cartridge {
            self.sync();
        }
        let value = match region {
            Region::Cartridge => self.cartridge.as_mut().map(|c| c.read(address)),
            Region::Riot => self.riot.as_mut().map(|r| r.read(address)),
            Region::Tia => self.tia.as_ref().map(|t| t.read(address)),
        };
        value.ok_or_else(|| Self::unmapped(address, region, Access::Read))
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        let address = address & ADDRESS_MASK;
        let region = self.check(address, Access::Write)?;
        if region != Region::Cartridge {
            self.sync();
        }
        match region {
            Region::Cartridge => {
                if let Some(cartridge) = &mut self.cartridge {
                    cartridge.write(address, value);
                }
            }
            Region::Riot => {
                if let Some(riot) = &mut self.riot {
                    riot.write(address, value);
                }
            }
            Region::Tia => {
                let audio = self.tia.as_mut().and_then(|t| t.write(address, value));
                if let Some(audio) = audio {
                    self.synth.lock().apply(audio);
                }
            }
        }
        Ok(())
    }

    fn elapse(&mut self, cycles: u32) {
        self.tia_pending = self.tia_pending.saturating_add(cycles);
        self.riot_pending = self.riot_pending.saturating_add(cycles);
        self.reported = self.reported.saturating_add(cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atari_tia::registers as reg;

    fn make_bus() -> AtariBus {
        let mut rom = vec![0xEA; 4096];
        rom[0x0FFC] = 0x00;
        rom[0x0FFD] = 0xF0;
        let cartridge = Cartridge::from_bytes(&rom).expect("4K");
        AtariBus::with_cartridge(cartridge, Arc::new(Mutex::new(Synth::default())))
    }

    #[test]
    fn decode_regions() {
        assert_eq!(Region::decode(0x0000), Region::Tia);
        assert_eq!(Region::decode(0x003F), Region::Tia);
        assert_eq!(Region::decode(0x0080), Region::Riot);
        assert_eq!(Region::decode(0x0280), Region::Riot);
        assert_eq!(Region::decode(0x0200), Region::Tia);
        assert_eq!(Region::decode(0x1000), Region::Cartridge);
        assert_eq!(Region::decode(0xF080), Region::Cartridge);
        assert_eq!(Region::decode(0xE080), Region::Riot);
    }

    #[test]
    fn ram_is_mirrored() {
        let mut bus = make_bus();
        bus.write(0x0080, 0x42).expect("write");
        assert_eq!(bus.read(0x0180).expect("read"), 0x42);
        assert_eq!(bus.read(0x2080).expect("read"), 0x42);
        assert_eq!(bus.peek_ram(0x80), 0x42);
    }

    #[test]
    fn cartridge_reads_do_not_sync() {
        let mut bus = make_bus();
        bus.elapse(10);
        assert_eq!(bus.read(0xFFFD).expect("read"), 0xF0);
        assert_eq!(bus.pending(), 10);
        assert_eq!(bus.tia().map(Tia::dot), Some(0));
    }

    #[test]
    fn chip_access_syncs_first() {
        let mut bus = make_bus();
        bus.elapse(10);
        bus.read(0x0284).expect("read");
        assert_eq!(bus.pending(), 0);
        assert_eq!(bus.tia().map(Tia::dot), Some(30));
        assert_eq!(bus.take_reported(), 10);
        assert_eq!(bus.take_reported(), 0);
    }

    #[test]
    fn wsync_clears_rdy_after_sync() {
        let mut bus = make_bus();
        bus.elapse(2);
        bus.write(reg::WSYNC, 0).expect("write");
        assert_eq!(bus.tia().map(Tia::rdy), Some(false));
    }

    #[test]
    fn audio_writes_reach_synth() {
        let mut bus = make_bus();
        bus.write(reg::AUDV0, 0x0F).expect("write");
        bus.write(reg::AUDC1, 0x04).expect("write");
        let synth = bus.synth().lock();
        assert_eq!(synth.channel(0).volume(), 0x0F * 16);
        assert_eq!(synth.channel(1).control(), 0x04);
    }

    #[test]
    fn unmapped_region_is_an_error() {
        let mut bus = make_bus();
        let tia = bus.remove_tia().expect("tia");
        bus.elapse(5);
        let err = bus.write(0x0002, 0).expect_err("no TIA");
        assert_eq!(
            err,
            BusError::Unmapped {
                address: 0x0002,
                region: "TIA",
                access: Access::Write,
            }
        );
        assert_eq!(bus.pending(), 5);

        bus.install_tia(tia);
        bus.write(0x0002, 0).expect("write");
    }

    #[test]
    fn absent_chip_keeps_its_cycles() {
        let mut bus = make_bus();
        let tia = bus.remove_tia().expect("tia");
        bus.elapse(3);
        bus.read(0x0284).expect("RIOT read");
        assert_eq!(bus.pending_by_chip(), (3, 0));

        bus.install_tia(tia);
        bus.sync();
        assert_eq!(bus.pending(), 0);
        assert_eq!(bus.tia().map(Tia::dot), Some(9));
    }

    #[test]
    fn rewind_only_takes_unrun_cycles() {
        let mut bus = make_bus();
        bus.elapse(4);
        assert_eq!(bus.rewind(1), 1);
        bus.sync();
        bus.elapse(2);
        assert_eq!(bus.rewind(5), 2);
        assert_eq!(bus.pending(), 0);
        assert_eq!(bus.tia().map(Tia::dot), Some(9));
    }

    #[test]
    fn input_reaches_ports() {
        let mut bus = make_bus();
        let mut input = InputState::default();
        input.movement = 0x7F;
        input.button_p0 = false;
        bus.set_input(input);
        // Both chips sample their lines on the next clock.
        bus.elapse(1);
        assert_eq!(bus.read(0x0280).expect("read"), 0x7F);
        assert_eq!(bus.read(0x000C).expect("read") & 0x80, 0);
        assert_eq!(bus.read(0x000D).expect("read") & 0x80, 0x80);
    }
}
