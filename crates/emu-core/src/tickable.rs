//! Trait for components advanced by clock ticks.

use crate::Ticks;

/// A component advanced one clock at a time.
///
/// Each implementor defines which clock a tick refers to. The RIOT ticks
/// once per processor cycle. The TIA reports completed scanlines from its
/// own `tick` and is driven directly.
pub trait Tickable {
    /// Advance the component by one of its clocks.
    fn tick(&mut self);

    /// Advance the component by several clocks.
    ///
    /// Must produce the same state as calling `tick()` `count` times.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
