//! Legacy PCI interrupt routing service.
//!
//! PC chipsets steer the PCI INTx# wires through eight PIRQ links (PIRQA#..PIRQH#). Each link has
//! a route control byte in the configuration space of the ISA/LPC bridge that selects the ISA IRQ
//! it drives. Compatibility firmware needs to read and program these bytes when it builds a
//! `$PIR` table or boots an option ROM that predates ACPI.
//!
//! - [`LegacyInterrupt`]: the service interface (count, location, read, write)
//! - [`PirqRouter`]: the implementation over any [`pci_cfg::PciConfigAccess`] backend
//! - [`registry`]: publishing the service under its GUID
//! - [`pir`]: `$PIR` table generation from the router configuration
//!
//! ```
//! use legacy_interrupt::{LegacyInterrupt, LegacyInterruptConfig, PirqRouter};
//! use pci_cfg::{MemConfigSpace, PciBdf};
//!
//! let mut cfg = MemConfigSpace::new();
//! cfg.add_function(PciBdf::new(0, 1, 0), 0x8086, 0x7000);
//!
//! let mut router = PirqRouter::new(LegacyInterruptConfig::piix4(), cfg).unwrap();
//! router.write_pirq(0, 0x8b).unwrap();
//! assert_eq!(router.read_pirq(0), Ok(0x0b));
//! ```

mod config;
mod error;
pub mod pir;
pub mod registry;
mod router;

use pci_cfg::PciBdf;

pub use config::{
    pirq_letter, LegacyInterruptConfig, DEFAULT_PIRQ_REGISTERS, PIIX4_ISA_BRIDGE, PIRQ_COUNT,
    Q35_LPC_BRIDGE,
};
pub use error::{ConfigError, LegacyInterruptError, PirTableError, RegistryError, Result};
pub use registry::{install, ServiceRegistry, ServiceTable, LEGACY_INTERRUPT_PROTOCOL_GUID};
pub use router::PirqRouter;

/// Access to the chipset PIRQ route control registers.
///
/// `pirq` is the link index: 0 = PIRQA#, 1 = PIRQB#, ...
pub trait LegacyInterrupt {
    /// Number of PIRQ links the router implements.
    fn pirq_count(&self) -> u8;

    /// The PCI function holding the route control registers.
    fn location(&self) -> PciBdf;

    /// Reads a link's route. Bit 7 is always returned clear.
    fn read_pirq(&mut self, pirq: u8) -> Result<u8>;

    /// Writes a link's route byte unmodified.
    fn write_pirq(&mut self, pirq: u8, value: u8) -> Result<()>;
}
