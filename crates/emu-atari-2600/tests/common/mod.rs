//! Shared fixtures: a scripted processor and a minimal cartridge.
//!
//! The scripted processor has no instruction set. Each step reports three
//! cycles and performs one bus access from a looping program, which is
//! enough to drive a VCS kernel made of register strobes.

#![allow(dead_code)]

use std::sync::Arc;

use atari_tia::registers as reg;
use atari_tia::{Pixel, SCANLINE_WIDTH};
use emu_atari_2600::{Atari2600, Atari2600Config, TextFrame, VideoSink};
use emu_core::{Bus, BusError, Processor};
use parking_lot::Mutex;

/// Cycles reported by every scripted step.
pub const OP_CYCLES: u32 = 3;

/// Processor cycles from one VSYNC strobe of [`frame_program`] to the next.
pub const FRAME_CYCLES: u64 = 262 * 76 + OP_CYCLES as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u16),
    Write(u16, u8),
}

#[derive(Debug, Clone)]
pub struct ScriptedProcessor {
    program: Vec<Op>,
    next: usize,
    pc: u16,
    /// Leave cycle reporting to the machine.
    pub quiet: bool,
    pub steps: u64,
    pub last_read: Option<u8>,
}

impl ScriptedProcessor {
    pub fn new(program: Vec<Op>) -> Self {
        Self {
            program,
            next: 0,
            pc: 0,
            quiet: false,
            steps: 0,
            last_read: None,
        }
    }
}

impl Processor for ScriptedProcessor {
    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), BusError> {
        let lo = bus.read(0xFFFC)?;
        let hi = bus.read(0xFFFD)?;
        self.pc = u16::from_le_bytes([lo, hi]);
        self.next = 0;
        Ok(())
    }

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, BusError> {
        let op = self.program[self.next % self.program.len()];
        if !self.quiet {
            bus.elapse(OP_CYCLES);
        }
        match op {
            Op::Read(address) => self.last_read = Some(bus.read(address)?),
            Op::Write(address, value) => bus.write(address, value)?,
        }
        self.next += 1;
        self.steps += 1;
        self.pc = self.pc.wrapping_add(2);
        Ok(OP_CYCLES)
    }

    fn pc(&self) -> u16 {
        self.pc
    }
}

/// A 262-line kernel: VSYNC for three lines, then 259 WSYNC lines.
/// `extra` runs at the start of line 3 and must fit well inside it.
pub fn frame_program(extra: &[Op]) -> Vec<Op> {
    let mut program = vec![
        Op::Write(reg::VSYNC, 0x02),
        Op::Write(reg::WSYNC, 0),
        Op::Write(reg::WSYNC, 0),
        Op::Write(reg::WSYNC, 0),
        Op::Write(reg::VSYNC, 0x00),
    ];
    program.extend_from_slice(extra);
    program.extend(std::iter::repeat_n(Op::Write(reg::WSYNC, 0), 259));
    program
}

/// 4K image with the reset vector at $F000.
pub fn rom() -> Vec<u8> {
    let mut rom = vec![0xEA; 4096];
    rom[0x0FFC] = 0x00;
    rom[0x0FFD] = 0xF0;
    rom
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn machine_with(config: &Atari2600Config, program: Vec<Op>) -> Atari2600<ScriptedProcessor> {
    init_logging();
    Atari2600::new(config, ScriptedProcessor::new(program)).expect("machine")
}

pub fn machine(program: Vec<Op>) -> Atari2600<ScriptedProcessor> {
    machine_with(&Atari2600Config::new(rom()), program)
}

/// A text sink the test can still read after handing it to the bus.
pub struct SharedText(pub Arc<Mutex<TextFrame>>);

impl VideoSink for SharedText {
    fn draw_scanline(
        &mut self,
        line: u16,
        colors: &[u8; SCANLINE_WIDTH],
        pixels: &[Pixel; SCANLINE_WIDTH],
    ) {
        self.0.lock().draw_scanline(line, colors, pixels);
    }
}

/// Counts delivered scanlines.
pub struct LineCounter(pub Arc<Mutex<Vec<u16>>>);

impl VideoSink for LineCounter {
    fn draw_scanline(
        &mut self,
        line: u16,
        _colors: &[u8; SCANLINE_WIDTH],
        _pixels: &[Pixel; SCANLINE_WIDTH],
    ) {
        self.0.lock().push(line);
    }
}
