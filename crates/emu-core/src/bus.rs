//! Memory bus interface seen by the processor.

use std::fmt;

/// Direction of a bus access, carried in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}

/// A bus access that could not be routed.
///
/// These are configuration errors: the machine was assembled without a
/// responder for the decoded region. They are reported rather than
/// answered with a default value, and no chip state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("{access} of ${address:04X}: no {region} responder installed")]
    Unmapped {
        address: u16,
        region: &'static str,
        access: Access,
    },
}

impl BusError {
    /// The offending (masked) address.
    #[must_use]
    pub fn address(&self) -> u16 {
        match self {
            BusError::Unmapped { address, .. } => *address,
        }
    }
}

/// Memory bus interface.
///
/// The processor drives all traffic through this trait. Implementations
/// decode the address and route to the appropriate responder.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> Result<u8, BusError>;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError>;

    /// Report processor cycles consumed since the last report.
    ///
    /// Chips attached to the bus are not advanced here. They catch up
    /// lazily, before the next access that could observe them.
    fn elapse(&mut self, cycles: u32);
}
