//! PCI configuration-space addressing and byte-level access.
//!
//! Firmware services that program chipset registers (interrupt routers, decode windows, ...)
//! only need two things from the platform: a way to name a register in some function's
//! configuration space, and a way to read/write a byte there. This crate provides:
//!
//! - [`PciBdf`] / [`PciConfigAddress`]: bus/device/function plus register offset
//! - [`PciConfigAccess`]: the byte-sized read/write primitive
//! - [`MemConfigSpace`]: an in-memory backend (device models, tests)
//! - [`PciConfigMechanism1`]: the legacy `0xCF8`/`0xCFC` port pair over any [`PortIo`]

mod access;
mod address;
mod mechanism1;
mod mem;

pub use access::PciConfigAccess;
pub use address::PciConfigAddress;
pub use mechanism1::{PciConfigMechanism1, PortIo, PCI_CFG_ADDR_PORT, PCI_CFG_DATA_PORT};
pub use mem::{MemConfigSpace, PCI_CONFIG_SPACE_SIZE};

/// PCI bus/device/function identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PciBdf {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciBdf {
    /// Creates a new BDF.
    ///
    /// The caller is responsible for ensuring the values are within the PCI ranges:
    /// bus < 256, device < 32, function < 8.
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }

    /// Returns `true` if `device` and `function` fit their PCI bit fields.
    pub const fn is_valid(self) -> bool {
        self.device < 32 && self.function < 8
    }

    /// The `device << 3 | function` byte used by BIOS tables and INT 1Ah PCI services.
    pub const fn devfn(self) -> u8 {
        (self.device << 3) | (self.function & 0x7)
    }

    /// Routing ID: `bus << 8 | device << 3 | function`, the same 16 bits that occupy bits 23:8
    /// of `CONFIG_ADDRESS`. Out-of-range device and function bits are masked off.
    pub const fn routing_id(self) -> u16 {
        ((self.bus as u16) << 8) | ((self.device as u16 & 0x1f) << 3) | (self.function as u16 & 0x7)
    }

    pub const fn from_routing_id(id: u16) -> Self {
        Self::new((id >> 8) as u8, ((id >> 3) & 0x1f) as u8, (id & 0x7) as u8)
    }
}

impl core::cmp::Ord for PciBdf {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.bus, self.device, self.function).cmp(&(other.bus, other.device, other.function))
    }
}

impl core::cmp::PartialOrd for PciBdf {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Display for PciBdf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// PCI INTx interrupt pin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PciInterruptPin {
    IntA,
    IntB,
    IntC,
    IntD,
}

impl PciInterruptPin {
    pub const ALL: [Self; 4] = [Self::IntA, Self::IntB, Self::IntC, Self::IntD];

    pub const fn index(self) -> usize {
        match self {
            Self::IntA => 0,
            Self::IntB => 1,
            Self::IntC => 2,
            Self::IntD => 3,
        }
    }
}
