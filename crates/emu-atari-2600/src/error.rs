//! Error types.

use std::path::PathBuf;

use emu_core::BusError;
use thiserror::Error;

/// A cartridge image that cannot be mapped.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("unsupported cartridge size: {0} bytes (expected 2048, 4096 or 8192)")]
    UnsupportedSize(usize),

    #[error("cannot read cartridge image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A replay script that cannot be used.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read replay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay reaches the {max}-frame limit")]
    Overflow { max: usize },
}

/// A snapshot that cannot be taken or restored.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("no {0} installed")]
    MissingResponder(&'static str),
}

/// Any error surfaced by the machine.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
