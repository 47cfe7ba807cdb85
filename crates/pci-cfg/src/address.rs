use crate::{PciBdf, PCI_CFG_DATA_PORT};

/// A byte register inside one PCI function's configuration space.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PciConfigAddress {
    pub bdf: PciBdf,
    /// Offset into configuration space (0..=0xFFF; only 0..=0xFF is reachable via mechanism #1).
    pub register: u16,
}

impl PciConfigAddress {
    pub const fn new(bdf: PciBdf, register: u16) -> Self {
        Self { bdf, register }
    }

    /// Encodes the `0xCF8` CONFIG_ADDRESS dword for this register.
    ///
    /// The two low register bits are dropped; the byte lane is selected by the data port offset.
    pub const fn mechanism1(self) -> u32 {
        0x8000_0000 | ((self.bdf.routing_id() as u32) << 8) | ((self.register & 0xfc) as u32)
    }

    /// Host-bridge side of [`mechanism1`](Self::mechanism1): the register a byte access to
    /// `data_port` reaches while `config_address` is latched in `0xCF8`.
    ///
    /// Returns `None` if the enable bit is clear or `data_port` is not one of `0xCFC..=0xCFF`.
    pub fn from_mechanism1(config_address: u32, data_port: u16) -> Option<Self> {
        if config_address & 0x8000_0000 == 0 {
            return None;
        }
        let lane = data_port.checked_sub(PCI_CFG_DATA_PORT).filter(|&lane| lane < 4)?;
        Some(Self {
            bdf: PciBdf::from_routing_id((config_address >> 8) as u16),
            register: (config_address & 0xfc) as u16 | lane,
        })
    }

    /// Returns the address of the register `delta` bytes further in, if it stays inside 4 KiB.
    pub fn offset(self, delta: u16) -> Option<Self> {
        let register = self.register.checked_add(delta)?;
        (register <= 0xfff).then_some(Self { register, ..self })
    }
}

impl core::fmt::Display for PciConfigAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}+{:#05x}", self.bdf, self.register)
    }
}
