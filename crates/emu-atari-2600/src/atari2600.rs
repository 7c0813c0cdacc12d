//! Top-level VCS system.
//!
//! The master clock is the NTSC colour clock, 3,579,545 Hz. The TIA runs
//! at that rate; the processor and RIOT at a third of it.
//!
//! One frame = 228 dots x 262 scanlines = 59,736 dots = 19,912 processor
//! cycles, but the VCS has no fixed frame: a frame ends whenever the
//! program raises VSYNC. The driver loop is:
//!
//! 1. If RDY is asserted, step the processor. Otherwise let one idle
//!    cycle pass.
//! 2. Run the chips up to the current cycle.
//! 3. On the first step that sees VSYNC high, end the frame: advance the
//!    replay and apply the frame's input.

use std::sync::Arc;

use atari_tia::{Synth, Tia};
use emu_core::{Bus, Observable, Processor, Ticks, Value};
use parking_lot::Mutex;

use crate::bus::{AtariBus, SharedSynth};
use crate::cartridge::Cartridge;
use crate::config::Atari2600Config;
use crate::error::{MachineError, SnapshotError};
use crate::input::{Control, InputState};
use crate::replay::Replay;
use crate::snapshot::Snapshot;
use crate::video::{FrameBuffer, VideoSink};

/// Colour clocks per processor cycle.
pub const CPU_DIVISOR: u64 = 3;
/// Processor cycles in a standard 262-line frame.
pub const CYCLES_PER_FRAME: u64 = 228 * 262 / CPU_DIVISOR;

/// Where [`Atari2600::run_until`] stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// The frame boundary (VSYNC rising edge as seen by the driver).
    Vsync,
    /// RDY asserted again after a WSYNC halt.
    RdyReleased,
}

/// VCS system.
pub struct Atari2600<P: Processor> {
    cpu: P,
    bus: AtariBus,
    /// Host-side input, used whenever no replay is active.
    live: InputState,
    replay: Option<Replay>,
    /// Completed frame counter.
    frame_count: u64,
    /// Processor cycles, idle cycles included.
    cycles: Ticks,
    /// VSYNC already handled for the current pulse.
    vsync_seen: bool,
}

impl<P: Processor> Atari2600<P> {
    /// Create a VCS from the given configuration and reset the processor.
    ///
    /// # Errors
    ///
    /// Returns an error if the cartridge image is unsupported, the replay
    /// file cannot be read, or the reset vector fetch fails.
    pub fn new(config: &Atari2600Config, cpu: P) -> Result<Self, MachineError> {
        let cartridge = Cartridge::from_bytes(&config.rom_data)?;
        let replay = config
            .replay_path
            .as_deref()
            .map(Replay::load)
            .transpose()?;
        let synth = Arc::new(Mutex::new(Synth::new(config.sample_rate)));
        let bus = AtariBus::with_cartridge(cartridge, synth);
        Self::from_bus(bus, cpu, replay)
    }

    /// Assemble a VCS from an already populated bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset vector fetch fails.
    pub fn from_bus(bus: AtariBus, cpu: P, replay: Option<Replay>) -> Result<Self, MachineError> {
        let mut vcs = Self {
            cpu,
            bus,
            live: InputState::default(),
            replay,
            frame_count: 0,
            cycles: Ticks::ZERO,
            vsync_seen: false,
        };
        vcs.apply_input();
        vcs.cpu.reset(&mut vcs.bus)?;
        Ok(vcs)
    }

    /// Power-cycle the chips and reset the processor. Input sources and
    /// counters are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset vector fetch fails.
    pub fn reset(&mut self) -> Result<(), MachineError> {
        if let Some(tia) = self.bus.tia_mut() {
            tia.reset();
        }
        if let Some(riot) = self.bus.riot_mut() {
            riot.reset();
        }
        self.bus.sync();
        self.vsync_seen = false;
        self.apply_input();
        self.cpu.reset(&mut self.bus)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// One driver iteration: a processor instruction, or one idle cycle
    /// while RDY is deasserted. Returns the cycles consumed.
    ///
    /// # Errors
    ///
    /// Returns the bus error raised by the processor. The machine stays
    /// consistent and can be stepped again once the bus is repaired.
    pub fn step(&mut self) -> Result<u32, MachineError> {
        let cycles = if self.rdy() {
            self.bus.take_reported();
            let cycles = match self.cpu.step(&mut self.bus) {
                Ok(cycles) => cycles,
                Err(err) => {
                    self.abandon_step();
                    return Err(err.into());
                }
            };
            let reported = self.bus.take_reported();
            if cycles > reported {
                self.bus.elapse(cycles - reported);
                self.bus.take_reported();
            }
            cycles
        } else {
            self.bus.elapse(1);
            self.bus.take_reported();
            1
        };
        self.bus.sync();
        self.cycles += u64::from(cycles);
        self.check_frame();
        Ok(cycles)
    }

    /// Run to the end of the current frame. Gives up after ten standard
    /// frames without VSYNC. Returns the processor cycles executed.
    ///
    /// # Errors
    ///
    /// Returns the first bus error raised by the processor.
    pub fn run_frame(&mut self) -> Result<u64, MachineError> {
        let start = self.cycles;
        self.run_until(StopCondition::Vsync, CYCLES_PER_FRAME * 10)?;
        Ok((self.cycles - start).get())
    }

    /// Step until `stop` occurs or `limit` processor cycles have passed.
    /// Returns whether the condition was reached.
    ///
    /// # Errors
    ///
    /// Returns the first bus error raised by the processor.
    pub fn run_until(&mut self, stop: StopCondition, limit: u64) -> Result<bool, MachineError> {
        let start = self.cycles;
        while (self.cycles - start).get() < limit {
            let frame = self.frame_count;
            let halted = !self.rdy();
            self.step()?;
            let reached = match stop {
                StopCondition::Vsync => self.frame_count != frame,
                StopCondition::RdyReleased => halted && self.rdy(),
            };
            if reached {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Undo the time of an instruction that faulted. The processor will
    /// report it again when the instruction is retried. Cycles a chip has
    /// already run cannot be taken back and are counted as executed.
    fn abandon_step(&mut self) {
        let reported = self.bus.take_reported();
        let rewound = self.bus.rewind(reported);
        let executed = reported - rewound;
        if executed > 0 {
            log::warn!("{executed} cycles of a faulted instruction already ran");
            self.bus.sync();
            self.cycles += u64::from(executed);
        }
    }

    fn rdy(&self) -> bool {
        self.bus.tia().is_none_or(Tia::rdy)
    }

    fn check_frame(&mut self) {
        let vsync = self.bus.tia().is_some_and(Tia::vsync);
        if !vsync {
            self.vsync_seen = false;
            return;
        }
        if self.vsync_seen {
            return;
        }
        self.vsync_seen = true;
        self.frame_count += 1;
        if let Some(replay) = &mut self.replay {
            replay.advance();
        }
        self.apply_input();
    }

    /// Drive the chips from the authoritative input source.
    fn apply_input(&mut self) {
        let input = self
            .replay
            .as_ref()
            .and_then(Replay::current)
            .unwrap_or(self.live);
        self.bus.set_input(input);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Press a control. Takes effect at the next frame boundary.
    pub fn press(&mut self, control: Control) {
        self.live.press(control);
    }

    /// Release a control. Takes effect at the next frame boundary.
    pub fn release(&mut self, control: Control) {
        self.live.release(control);
    }

    /// Host-side input state.
    #[must_use]
    pub fn live_input(&self) -> &InputState {
        &self.live
    }

    pub fn live_input_mut(&mut self) -> &mut InputState {
        &mut self.live
    }

    /// Input currently driving the chips.
    #[must_use]
    pub fn input(&self) -> InputState {
        self.bus.input()
    }

    #[must_use]
    pub fn replay(&self) -> Option<&Replay> {
        self.replay.as_ref()
    }

    /// Whether a replay currently overrides live input.
    #[must_use]
    pub fn replay_active(&self) -> bool {
        self.replay.as_ref().is_some_and(Replay::is_active)
    }

    /// Start (or replace) a replay. Its first frame applies immediately.
    pub fn set_replay(&mut self, replay: Replay) {
        self.replay = Some(replay);
        self.apply_input();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn cpu(&self) -> &P {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut P {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &AtariBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut AtariBus {
        &mut self.bus
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Processor cycles since power-on, idle cycles included.
    #[must_use]
    pub fn cycles(&self) -> Ticks {
        self.cycles
    }

    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        self.bus.frame_buffer()
    }

    /// Also deliver every completed scanline to `sink`.
    pub fn add_video_sink(&mut self, sink: Box<dyn VideoSink + Send>) {
        self.bus.add_sink(sink);
    }

    /// Handle for a host audio callback.
    #[must_use]
    pub fn synth(&self) -> SharedSynth {
        Arc::clone(self.bus.synth())
    }

    /// Fill a host buffer with unsigned 8-bit samples.
    pub fn fill_audio_u8(&self, out: &mut [u8]) {
        self.bus.synth().lock().fill_u8(out);
    }

    /// Fill a host buffer with `f32` samples.
    pub fn fill_audio_f32(&self, out: &mut [f32]) {
        self.bus.synth().lock().fill_f32(out);
    }
}

impl<P: Processor + Clone> Atari2600<P> {
    /// Capture the whole machine.
    ///
    /// # Errors
    ///
    /// Returns an error if a chip is missing or cannot be encoded.
    pub fn snapshot(&self) -> Result<Snapshot<P>, SnapshotError> {
        Snapshot::capture(&self.cpu, &self.bus, self.frame_count, self.cycles)
    }

    /// Replace the whole machine with a snapshot. Input sources are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if a block cannot be decoded. The machine is left
    /// untouched in that case.
    pub fn restore(&mut self, snapshot: &Snapshot<P>) -> Result<(), SnapshotError> {
        self.cpu = snapshot.restore_into(&mut self.bus)?;
        self.frame_count = snapshot.frame_count();
        self.cycles = snapshot.cycles();
        self.vsync_seen = self.bus.tia().is_some_and(Tia::vsync);
        Ok(())
    }
}

impl<P: Processor> Observable for Atari2600<P> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("tia.") {
            self.bus.tia()?.query(rest)
        } else if let Some(rest) = path.strip_prefix("riot.") {
            self.bus.riot()?.query(rest)
        } else if let Some(rest) = path.strip_prefix("cart.") {
            self.bus.cartridge()?.query(rest)
        } else if let Some(rest) = path.strip_prefix("audio.") {
            self.bus.synth().lock().query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr =
                if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
                    u16::from_str_radix(hex, 16).ok()
                } else if let Some(hex) = rest.strip_prefix('$') {
                    u16::from_str_radix(hex, 16).ok()
                } else {
                    rest.parse().ok()
                };
            addr.and_then(|a| self.bus.peek(a)).map(Value::U8)
        } else {
            match path {
                "cpu.pc" => Some(self.cpu.pc().into()),
                "frame_count" => Some(self.frame_count.into()),
                "cycles" => Some(self.cycles.get().into()),
                "replay.active" => Some(self.replay_active().into()),
                "replay.position" => self
                    .replay
                    .as_ref()
                    .map(|r| Value::U64(r.position() as u64)),
                "input.movement" => Some(self.bus.input().movement.into()),
                "input.switches" => Some(self.bus.input().switches.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "tia.<tia_paths>",
            "riot.<riot_paths>",
            "cart.kind",
            "cart.bank",
            "audio.sample_rate",
            "audio.ch0.control",
            "audio.ch0.divider",
            "audio.ch0.volume",
            "audio.ch1.control",
            "memory.<address>",
            "cpu.pc",
            "frame_count",
            "cycles",
            "replay.active",
            "replay.position",
            "input.movement",
            "input.switches",
        ]
    }
}
