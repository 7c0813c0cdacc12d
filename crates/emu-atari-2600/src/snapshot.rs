//! Whole-machine snapshots.
//!
//! Each engine is stored as its own opaque bincode block so a host can
//! persist them however it likes. Blocks carry no version; they are only
//! meant to be restored into the same build.

use atari_tia::{Synth, Tia};
use emu_core::Ticks;
use mos_riot_6532::Riot;

use crate::bus::AtariBus;
use crate::cartridge::Cartridge;
use crate::error::SnapshotError;
use crate::input::InputState;

/// Processor, chips, synthesizer and cartridge captured together.
#[derive(Debug, Clone)]
pub struct Snapshot<P> {
    processor: P,
    tia: Vec<u8>,
    riot: Vec<u8>,
    synth: Vec<u8>,
    cartridge: Vec<u8>,
    input: InputState,
    /// Unrun cycles, TIA then RIOT.
    pending: (u32, u32),
    frame_count: u64,
    cycles: Ticks,
}

impl<P: Clone> Snapshot<P> {
    pub(crate) fn capture(
        processor: &P,
        bus: &AtariBus,
        frame_count: u64,
        cycles: Ticks,
    ) -> Result<Self, SnapshotError> {
        let tia = bus.tia().ok_or(SnapshotError::MissingResponder("TIA"))?;
        let riot = bus.riot().ok_or(SnapshotError::MissingResponder("RIOT"))?;
        let cartridge = bus
            .cartridge()
            .ok_or(SnapshotError::MissingResponder("cartridge"))?;
        let synth = bincode::serialize(&*bus.synth().lock())?;

        let snapshot = Self {
            processor: processor.clone(),
            tia: bincode::serialize(tia)?,
            riot: bincode::serialize(riot)?,
            synth,
            cartridge: bincode::serialize(cartridge)?,
            input: bus.input(),
            pending: bus.pending_by_chip(),
            frame_count,
            cycles,
        };
        log::info!("Snapshot taken at frame {frame_count}");
        Ok(snapshot)
    }

    /// Decode every block, then replace bus state. Nothing is touched if
    /// any block fails to decode.
    pub(crate) fn restore_into(&self, bus: &mut AtariBus) -> Result<P, SnapshotError> {
        let tia: Tia = bincode::deserialize(&self.tia)?;
        let riot: Riot = bincode::deserialize(&self.riot)?;
        let synth: Synth = bincode::deserialize(&self.synth)?;
        let cartridge: Cartridge = bincode::deserialize(&self.cartridge)?;

        bus.install_tia(tia);
        bus.install_riot(riot);
        bus.install_cartridge(cartridge);
        *bus.synth().lock() = synth;
        bus.set_input(self.input);
        bus.set_pending(self.pending);
        log::info!("Snapshot restored to frame {}", self.frame_count);
        Ok(self.processor.clone())
    }
}

impl<P> Snapshot<P> {
    /// Engine blocks by name: `tia`, `riot`, `synth`, `cartridge`.
    #[must_use]
    pub fn blocks(&self) -> [(&'static str, &[u8]); 4] {
        [
            ("tia", &self.tia),
            ("riot", &self.riot),
            ("synth", &self.synth),
            ("cartridge", &self.cartridge),
        ]
    }

    #[must_use]
    pub fn processor(&self) -> &P {
        &self.processor
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn cycles(&self) -> Ticks {
        self.cycles
    }
}
