use pci_cfg::{PciBdf, PciConfigAccess, PciConfigAddress};
use tracing::{debug, trace};

use crate::config::{pirq_letter, LegacyInterruptConfig, PIRQ_COUNT};
use crate::error::{ConfigError, LegacyInterruptError, Result};
use crate::LegacyInterrupt;

/// Bit 7 of a route control register is not part of the routing value handed to callers.
const PIRQ_ROUTE_MASK: u8 = 0x7f;

/// PIRQ route control registers of a chipset ISA/LPC bridge.
pub struct PirqRouter<C> {
    config: LegacyInterruptConfig,
    cfg: C,
}

impl<C: PciConfigAccess> PirqRouter<C> {
    pub fn new(config: LegacyInterruptConfig, cfg: C) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, cfg })
    }

    pub fn config(&self) -> &LegacyInterruptConfig {
        &self.config
    }

    pub fn config_access(&mut self) -> &mut C {
        &mut self.cfg
    }

    pub fn into_inner(self) -> C {
        self.cfg
    }

    /// Config-space address of a PIRQ register. Read and write paths both go through here.
    pub(crate) fn register_address(&self, pirq: u8) -> Result<PciConfigAddress> {
        let register = self.register(pirq)?;
        Ok(PciConfigAddress::new(self.config.location, u16::from(register)))
    }

    /// The `$PIR` link value for a PIRQ, which on these chipsets is the register offset.
    pub fn link_value(&self, pirq: u8) -> Result<u8> {
        self.register(pirq)
    }

    fn register(&self, pirq: u8) -> Result<u8> {
        if pirq >= PIRQ_COUNT {
            debug!(pirq, count = PIRQ_COUNT, "rejecting PIRQ index");
            return Err(LegacyInterruptError::InvalidPirq {
                pirq,
                count: PIRQ_COUNT,
            });
        }
        Ok(self.config.pirq_registers[usize::from(pirq)])
    }
}

impl<C: PciConfigAccess> LegacyInterrupt for PirqRouter<C> {
    fn pirq_count(&self) -> u8 {
        PIRQ_COUNT
    }

    fn location(&self) -> PciBdf {
        self.config.location
    }

    fn read_pirq(&mut self, pirq: u8) -> Result<u8> {
        let addr = self.register_address(pirq)?;
        let raw = self.cfg.read_u8(addr);
        trace!(pirq = %pirq_letter(pirq), %addr, raw, "PIRQ read");
        Ok(raw & PIRQ_ROUTE_MASK)
    }

    fn write_pirq(&mut self, pirq: u8, value: u8) -> Result<()> {
        let addr = self.register_address(pirq)?;
        trace!(pirq = %pirq_letter(pirq), %addr, value, "PIRQ write");
        self.cfg.write_u8(addr, value);
        Ok(())
    }
}
