//! Atari 2600 (VCS) chip timing and synthesis engine.
//!
//! The master clock is the NTSC colour clock, 3,579,545 Hz. The TIA ticks
//! once per colour clock; the processor and the RIOT tick at a third of
//! that (1,193,182 Hz), giving a 3:1 TIA:CPU ratio.
//!
//! No processor core is included. A host supplies one through
//! [`emu_core::Processor`]; the machine steps it while the TIA's RDY line
//! is asserted and lets idle cycles pass while it is not.
//!
//! One standard frame = 228 dots x 262 scanlines = 19,912 processor cycles.

pub mod atari2600;
#[cfg(feature = "native")]
pub mod audio;
mod bus;
#[cfg(feature = "native")]
pub mod capture;
mod cartridge;
mod config;
mod error;
pub mod input;
pub mod palette;
pub mod replay;
mod snapshot;
pub mod video;

pub use atari2600::{Atari2600, StopCondition};
pub use bus::{AtariBus, Region, SharedSynth};
pub use cartridge::{Cartridge, CartridgeKind};
pub use config::Atari2600Config;
pub use error::{CartridgeError, MachineError, ReplayError, SnapshotError};
pub use input::{Control, InputState};
pub use replay::Replay;
pub use snapshot::Snapshot;
pub use video::{FrameBuffer, TextFrame, VideoSink};
