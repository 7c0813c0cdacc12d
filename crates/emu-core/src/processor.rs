//! Processor boundary.

use crate::{Bus, BusError};

/// A processor core driven one instruction at a time.
///
/// Processors report the cycles they consume through [`Bus::elapse`]
/// before the accesses those cycles precede, so that chips on the bus can
/// catch up to the correct clock position. Cycles returned from `step` but
/// never reported are elapsed by the machine after the instruction, so a
/// core that does not report at all still keeps time, only coarsely.
///
/// Chips never call back into the processor. The only coupling in the
/// other direction is the RDY line, which the machine checks before
/// calling [`Processor::step`].
pub trait Processor {
    /// Reset the processor, fetching the reset vector through the bus.
    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), BusError>;

    /// Execute one instruction. Returns the number of cycles it took.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, BusError>;

    /// Current program counter.
    fn pc(&self) -> u16;
}
