//! Core traits and types shared by the Atari VCS chip crates.
//!
//! The colour clock is the master clock. The TIA advances once per colour
//! clock, the processor and the RIOT once every three. Chips whose clock
//! produces no output implement [`Tickable`].

mod bus;
mod observable;
mod processor;
pub mod serde_array;
mod tickable;
mod ticks;

pub use bus::{Access, Bus, BusError};
pub use observable::{Observable, Value};
pub use processor::Processor;
pub use tickable::Tickable;
pub use ticks::Ticks;
