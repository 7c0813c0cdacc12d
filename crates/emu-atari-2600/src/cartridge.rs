//! Cartridge ROM mapping.
//!
//! The cartridge sees A0-A11 only, so it occupies a 4K window mirrored
//! through every address with A12 set.
//!
//! | Size | Scheme                                              |
//! |------|-----------------------------------------------------|
//! | 2K   | Mirrored into both halves of the window             |
//! | 4K   | Flat                                                |
//! | 8K   | F8: any access to $xFF8 selects bank 0, $xFF9 bank 1|

use std::path::Path;

use emu_core::{Observable, Value};
use serde::{Deserialize, Serialize};

use crate::error::CartridgeError;

/// Size of the cartridge window.
pub const BANK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartridgeKind {
    /// 2K, mirrored.
    Rom2k,
    /// 4K, no banking.
    Rom4k,
    /// 8K, two 4K banks switched by F8 hotspots.
    F8,
}

impl CartridgeKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rom2k => "2K",
            Self::Rom4k => "4K",
            Self::F8 => "8K",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    kind: CartridgeKind,
    /// Whole 4K banks. A 2K image is stored doubled.
    rom: Vec<u8>,
    bank: usize,
}

impl Cartridge {
    /// Map a raw ROM image.
    ///
    /// # Errors
    ///
    /// Returns [`CartridgeError::UnsupportedSize`] unless the image is
    /// exactly 2K, 4K or 8K.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let (kind, rom) = match data.len() {
            2048 => (CartridgeKind::Rom2k, [data, data].concat()),
            4096 => (CartridgeKind::Rom4k, data.to_vec()),
            8192 => (CartridgeKind::F8, data.to_vec()),
            len => return Err(CartridgeError::UnsupportedSize(len)),
        };
        log::info!("Cartridge: {} ROM", kind.name());
        Ok(Self { kind, rom, bank: 0 })
    }

    /// Read and map a ROM image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has an unsupported
    /// size.
    pub fn load(path: &Path) -> Result<Self, CartridgeError> {
        let data = std::fs::read(path).map_err(|source| CartridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    #[must_use]
    pub fn kind(&self) -> CartridgeKind {
        self.kind
    }

    /// Currently selected 4K bank.
    #[must_use]
    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn read(&mut self, address: u16) -> u8 {
        let offset = usize::from(address) & (BANK_SIZE - 1);
        self.hotspot(offset);
        self.rom[self.bank * BANK_SIZE + offset]
    }

    /// ROM is read-only; writes only reach the bank hotspots.
    pub fn write(&mut self, address: u16, _value: u8) {
        self.hotspot(usize::from(address) & (BANK_SIZE - 1));
    }

    /// Read without bank switching.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        let offset = usize::from(address) & (BANK_SIZE - 1);
        self.rom[self.bank * BANK_SIZE + offset]
    }

    fn hotspot(&mut self, offset: usize) {
        if self.kind != CartridgeKind::F8 {
            return;
        }
        let bank = match offset {
            0xFF8 => 0,
            0xFF9 => 1,
            _ => return,
        };
        if bank != self.bank {
            log::debug!("F8 bank switch: {} -> {bank}", self.bank);
            self.bank = bank;
        }
    }
}

impl Observable for Cartridge {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "kind" => Some(self.kind.name().into()),
            "bank" => Some(Value::U8(self.bank as u8)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["kind", "bank"]
    }
}
