//! MOS 6532 RIOT (RAM, I/O, Timer).
//!
//! The VCS uses one 6532 for its 128 bytes of RAM, the joystick port
//! (port A), the console switches (port B) and the interval timer.
//!
//! # Address decoding
//!
//! A9 selects I/O and timer registers, otherwise RAM (`address & 0x7F`).
//!
//! | Addr  | Read   | Write  | Description                     |
//! |-------|--------|--------|---------------------------------|
//! | $280  | SWCHA  | SWCHA  | Port A data                     |
//! | $281  | SWACNT | SWACNT | Port A direction (1 = output)   |
//! | $282  | SWCHB  | SWCHB  | Port B data                     |
//! | $283  | SWBCNT | SWBCNT | Port B direction (1 = output)   |
//! | $284  | INTIM  | TIM1T  | Timer value / load, 1 clock     |
//! | $285  | INSTAT | TIM8T  | Timer status / load, 8 clocks   |
//! | $286  | INTIM  | TIM64T | Timer value / load, 64 clocks   |
//! | $287  | INSTAT | T1024T | Timer status / load, 1024 clocks|
//!
//! I/O registers are mirrored through `address & 0x287`.
//!
//! # Timer
//!
//! Loading value V with prescale P decrements the timer P+1 clocks after
//! the load and every P clocks thereafter. The decrement that wraps 0 to
//! $FF sets the underflow latch, P × (V + 1) + 1 clocks after the load;
//! from then on the timer decrements every clock. Reading INTIM clears the
//! latch and returns to prescaled counting.

use emu_core::{Observable, Tickable, Value};
use serde::{Deserialize, Serialize};

/// Bytes of RAM.
pub const RAM_SIZE: usize = 128;

/// MOS 6532 RAM-I/O-Timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Riot {
    #[serde(with = "emu_core::serde_array")]
    ram: [u8; RAM_SIZE],

    /// Port A data as seen by the processor.
    port_a: u8,
    /// Port B data as seen by the processor.
    port_b: u8,
    /// Port A direction register (1 = output).
    ddr_a: u8,
    /// Port B direction register (1 = output).
    ddr_b: u8,
    /// External input lines for port A (joystick directions, active-low).
    pub external_a: u8,
    /// External input lines for port B (console switches, active-low).
    pub external_b: u8,

    timer: u8,
    /// Prescale interval: 1, 8, 64 or 1024 clocks.
    interval: u16,
    /// Clocks counted within the current interval.
    cycle: u16,
    underflow: bool,
}

impl Riot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0xFF; RAM_SIZE],
            port_a: 0xFF,
            port_b: 0x0B,
            ddr_a: 0,
            ddr_b: 0,
            external_a: 0xFF,
            external_b: 0x0B,
            timer: 0,
            interval: 1024,
            cycle: 0,
            underflow: false,
        }
    }

    /// Restore power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a register or RAM byte.
    ///
    /// Reading INTIM clears the underflow latch; nothing else does.
    pub fn read(&mut self, address: u16) -> u8 {
        if address & 0x200 == 0 {
            return self.ram[usize::from(address & 0x7F)];
        }

        match address & 0x07 {
            0 => self.port_a,
            1 => self.ddr_a,
            2 => self.port_b,
            3 => self.ddr_b,
            4 | 6 => {
                self.underflow = false;
                self.timer
            }
            _ => self.status(),
        }
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        if address & 0x200 == 0 {
            return self.ram[usize::from(address & 0x7F)];
        }

        match address & 0x07 {
            0 => self.port_a,
            1 => self.ddr_a,
            2 => self.port_b,
            3 => self.ddr_b,
            4 | 6 => self.timer,
            _ => self.status(),
        }
    }

    /// Write a register or RAM byte.
    pub fn write(&mut self, address: u16, value: u8) {
        if address & 0x200 == 0 {
            self.ram[usize::from(address & 0x7F)] = value;
            return;
        }

        match address & 0x07 {
            // Only output bits are driven by a data write.
            0 => self.port_a = (self.port_a & !self.ddr_a) | (value & self.ddr_a),
            1 => self.ddr_a = value,
            2 => self.port_b = (self.port_b & !self.ddr_b) | (value & self.ddr_b),
            3 => self.ddr_b = value,
            reg => {
                let interval = match reg {
                    4 => 1,
                    5 => 8,
                    6 => 64,
                    _ => 1024,
                };
                self.load_timer(value, interval);
            }
        }
    }

    fn load_timer(&mut self, value: u8, interval: u16) {
        self.timer = value;
        self.interval = interval;
        self.cycle = 0;
        self.underflow = false;
        log::trace!("RIOT timer loaded: {value} x {interval}");
    }

    /// INSTAT: D7 = timer underflow. Does not clear the latch.
    #[must_use]
    pub fn status(&self) -> u8 {
        if self.underflow { 0x80 } else { 0x00 }
    }

    /// Current timer value.
    #[must_use]
    pub fn timer(&self) -> u8 {
        self.timer
    }

    #[must_use]
    pub fn interval(&self) -> u16 {
        self.interval
    }

    #[must_use]
    pub fn underflow(&self) -> bool {
        self.underflow
    }

    #[must_use]
    pub fn port_a(&self) -> u8 {
        self.port_a
    }

    #[must_use]
    pub fn port_b(&self) -> u8 {
        self.port_b
    }

    /// RAM contents, indexed by `address & 0x7F`.
    #[must_use]
    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    fn refresh_ports(&mut self) {
        self.port_a = (self.external_a & !self.ddr_a) | (self.port_a & self.ddr_a);
        self.port_b = (self.external_b & !self.ddr_b) | (self.port_b & self.ddr_b);
    }
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Tickable for Riot {
    /// One processor cycle.
    fn tick(&mut self) {
        self.cycle += 1;
        if self.cycle > self.interval || self.underflow {
            self.cycle = 1;
            self.timer = self.timer.wrapping_sub(1);
            if self.timer == 0xFF {
                self.underflow = true;
            }
        }

        self.refresh_ports();
    }
}

impl Observable for Riot {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("ram.") {
            let addr = if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix("0x") {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            return addr.map(|a| Value::U8(self.ram[usize::from(a & 0x7F)]));
        }

        match path {
            "port_a" => Some(self.port_a.into()),
            "port_b" => Some(self.port_b.into()),
            "ddr_a" => Some(self.ddr_a.into()),
            "ddr_b" => Some(self.ddr_b.into()),
            "timer" => Some(self.timer.into()),
            "timer.interval" => Some(self.interval.into()),
            "timer.cycle" => Some(self.cycle.into()),
            "timer.underflow" => Some(self.underflow.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "port_a",
            "port_b",
            "ddr_a",
            "ddr_b",
            "timer",
            "timer.interval",
            "timer.cycle",
            "timer.underflow",
            "ram.<address>",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWCHA: u16 = 0x280;
    const SWACNT: u16 = 0x281;
    const SWCHB: u16 = 0x282;
    const SWBCNT: u16 = 0x283;
    const INTIM: u16 = 0x284;
    const INSTAT: u16 = 0x285;
    const TIM1T: u16 = 0x294;
    const TIM8T: u16 = 0x295;
    const TIM64T: u16 = 0x296;
    const T1024T: u16 = 0x297;

    fn run(riot: &mut Riot, clocks: u32) {
        for _ in 0..clocks {
            riot.tick();
        }
    }

    #[test]
    fn power_on_defaults() {
        let mut riot = Riot::new();
        assert!(riot.ram().iter().all(|&b| b == 0xFF));
        assert_eq!(riot.read(SWCHA), 0xFF);
        assert_eq!(riot.read(SWCHB), 0x0B);
        assert_eq!(riot.interval(), 1024);
    }

    #[test]
    fn ram_round_trip_with_mirroring() {
        let mut riot = Riot::new();
        for addr in 0x80..0x100u16 {
            riot.write(addr, addr as u8 ^ 0x5A);
        }
        for addr in 0x80..0x100u16 {
            assert_eq!(riot.read(addr), addr as u8 ^ 0x5A);
            // $00-$7F, $180-$1FF alias the same bytes.
            assert_eq!(riot.read(addr & 0x7F), addr as u8 ^ 0x5A);
            assert_eq!(riot.read(addr | 0x100), addr as u8 ^ 0x5A);
        }
    }

    #[test]
    fn underflow_after_prescale_times_value_plus_one() {
        for (reg, p) in [(TIM1T, 1u32), (TIM8T, 8), (TIM64T, 64), (T1024T, 1024)] {
            for v in [0u8, 1, 5, 100] {
                let mut riot = Riot::new();
                riot.write(reg, v);
                run(&mut riot, p * (u32::from(v) + 1));
                assert!(!riot.underflow(), "early underflow: P={p} V={v}");
                riot.tick();
                assert!(riot.underflow(), "missed underflow: P={p} V={v}");
                assert_eq!(riot.timer(), 0xFF);
            }
        }
    }

    #[test]
    fn timer_counts_down_at_prescale_rate() {
        let mut riot = Riot::new();
        riot.write(TIM64T, 10);
        run(&mut riot, 65);
        assert_eq!(riot.timer(), 9);
        run(&mut riot, 63);
        assert_eq!(riot.timer(), 9);
        riot.tick();
        assert_eq!(riot.timer(), 8);
    }

    #[test]
    fn free_runs_after_underflow_until_read() {
        let mut riot = Riot::new();
        riot.write(TIM8T, 0);
        run(&mut riot, 9);
        assert_eq!(riot.timer(), 0xFF);
        riot.tick();
        riot.tick();
        assert_eq!(riot.timer(), 0xFD);

        assert_eq!(riot.read(INSTAT), 0x80);
        assert!(riot.underflow(), "INSTAT must not clear the latch");
        assert_eq!(riot.read(INTIM), 0xFD);
        assert!(!riot.underflow());

        // Back to prescaled counting, eight clocks after the last decrement.
        run(&mut riot, 7);
        assert_eq!(riot.timer(), 0xFD);
        riot.tick();
        assert_eq!(riot.timer(), 0xFC);
    }

    #[test]
    fn port_mixes_external_and_output_bits() {
        let mut riot = Riot::new();
        riot.write(SWACNT, 0xF0);
        riot.write(SWCHA, 0x3C);
        riot.external_a = 0xA5;
        riot.tick();
        assert_eq!(riot.read(SWCHA), 0x35);
        assert_eq!(riot.read(SWACNT), 0xF0);
    }

    #[test]
    fn writes_to_input_bits_have_no_effect() {
        let mut riot = Riot::new();
        riot.write(SWCHB, 0x00);
        assert_eq!(riot.read(SWCHB), 0x0B);
        riot.external_b = 0x08;
        riot.tick();
        assert_eq!(riot.read(SWCHB), 0x08);
        riot.write(SWBCNT, 0x01);
        riot.write(SWCHB, 0x01);
        riot.tick();
        assert_eq!(riot.read(SWCHB), 0x09);
    }

    #[test]
    fn peek_does_not_clear_underflow() {
        let mut riot = Riot::new();
        riot.write(TIM1T, 0);
        run(&mut riot, 2);
        assert_eq!(riot.peek(INTIM), 0xFF);
        assert!(riot.underflow());
    }

    #[test]
    fn observable_ram_and_timer() {
        let mut riot = Riot::new();
        riot.write(0x80, 0x42);
        riot.write(T1024T, 3);
        assert_eq!(riot.query("ram.$80"), Some(Value::U8(0x42)));
        assert_eq!(riot.query("ram.0"), Some(Value::U8(0x42)));
        assert_eq!(riot.query("timer"), Some(Value::U8(3)));
        assert_eq!(riot.query("timer.interval"), Some(Value::U16(1024)));
        assert_eq!(riot.query("bogus"), None);
    }

    #[test]
    fn state_survives_bincode() {
        let mut riot = Riot::new();
        riot.write(0x81, 0x12);
        riot.write(TIM8T, 7);
        run(&mut riot, 20);
        let bytes = bincode::serialize(&riot).expect("encode");
        let back: Riot = bincode::deserialize(&bytes).expect("decode");
        assert_eq!(back.ram(), riot.ram());
        assert_eq!(back.timer(), riot.timer());
        assert_eq!(back.query("timer.cycle"), riot.query("timer.cycle"));
    }
}
