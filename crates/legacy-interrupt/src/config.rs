use pci_cfg::{PciBdf, PciConfigAccess, PciConfigAddress};
use tracing::debug;

use crate::error::ConfigError;

/// Number of PIRQ route control registers (PIRQA#..PIRQH#).
pub const PIRQ_COUNT: u8 = 8;

/// Route control registers in the ISA/LPC bridge: PIRQA-D at 0x60-0x63, PIRQE-H at 0x68-0x6B.
pub const DEFAULT_PIRQ_REGISTERS: [u8; PIRQ_COUNT as usize] =
    [0x60, 0x61, 0x62, 0x63, 0x68, 0x69, 0x6a, 0x6b];

/// PIIX3/PIIX4 PCI-to-ISA bridge on i440FX machines.
pub const PIIX4_ISA_BRIDGE: PciBdf = PciBdf::new(0, 0x01, 0);
/// ICH9 LPC bridge on Q35 machines.
pub const Q35_LPC_BRIDGE: PciBdf = PciBdf::new(0, 0x1f, 0);

const HOST_BRIDGE: PciBdf = PciBdf::new(0, 0, 0);
const INTEL_VENDOR_ID: u16 = 0x8086;
const I440FX_HOST_BRIDGE_DEVICE_ID: u16 = 0x1237;
const Q35_MCH_DEVICE_ID: u16 = 0x29c0;

/// The first byte after the type 0/1 configuration header.
const DEVICE_SPECIFIC_START: u8 = 0x40;

/// Returns the conventional letter for a PIRQ index (0 = A, 1 = B, ...).
pub fn pirq_letter(pirq: u8) -> char {
    char::from(b'A'.wrapping_add(pirq))
}

/// Where the PIRQ route control registers live.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegacyInterruptConfig {
    /// The PCI function that owns the registers (reported to `$PIR` builders).
    pub location: PciBdf,

    /// Config-space offset of each PIRQ register, indexed by PIRQ number.
    pub pirq_registers: [u8; PIRQ_COUNT as usize],
}

impl LegacyInterruptConfig {
    pub const fn piix4() -> Self {
        Self {
            location: PIIX4_ISA_BRIDGE,
            pirq_registers: DEFAULT_PIRQ_REGISTERS,
        }
    }

    pub const fn q35() -> Self {
        Self {
            location: Q35_LPC_BRIDGE,
            pirq_registers: DEFAULT_PIRQ_REGISTERS,
        }
    }

    /// Picks the preset matching the host bridge at 00:00.0.
    pub fn detect<C: PciConfigAccess + ?Sized>(cfg: &mut C) -> Result<Self, ConfigError> {
        let vendor_id = cfg.read_u16(PciConfigAddress::new(HOST_BRIDGE, 0x00));
        let device_id = cfg.read_u16(PciConfigAddress::new(HOST_BRIDGE, 0x02));
        debug!(vendor_id, device_id, "host bridge");

        match (vendor_id, device_id) {
            (INTEL_VENDOR_ID, I440FX_HOST_BRIDGE_DEVICE_ID) => Ok(Self::piix4()),
            (INTEL_VENDOR_ID, Q35_MCH_DEVICE_ID) => Ok(Self::q35()),
            _ => Err(ConfigError::UnknownHostBridge {
                vendor_id,
                device_id,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.location.is_valid() {
            return Err(ConfigError::InvalidLocation(self.location));
        }

        for (i, &register) in self.pirq_registers.iter().enumerate() {
            let pirq = i as u8;
            if register < DEVICE_SPECIFIC_START {
                return Err(ConfigError::RegisterInHeader {
                    pirq: pirq_letter(pirq),
                    register,
                });
            }
            if let Some(first) = self.pirq_registers[..i].iter().position(|&r| r == register) {
                return Err(ConfigError::DuplicateRegister {
                    first: pirq_letter(first as u8),
                    second: pirq_letter(pirq),
                    register,
                });
            }
        }

        Ok(())
    }
}

impl Default for LegacyInterruptConfig {
    fn default() -> Self {
        Self::piix4()
    }
}
