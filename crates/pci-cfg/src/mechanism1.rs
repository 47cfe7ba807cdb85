use tracing::{trace, warn};

use crate::{PciConfigAccess, PciConfigAddress};

pub const PCI_CFG_ADDR_PORT: u16 = 0xCF8;
pub const PCI_CFG_DATA_PORT: u16 = 0xCFC;

/// x86 port I/O. `size` is the access width in bytes (1, 2 or 4).
pub trait PortIo {
    fn read(&mut self, port: u16, size: u8) -> u32;
    fn write(&mut self, port: u16, size: u8, value: u32);
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        (**self).read(port, size)
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        (**self).write(port, size, value)
    }
}

/// PCI configuration mechanism #1: select a dword with `CONFIG_ADDRESS` (`0xCF8`), then access
/// one byte lane of `CONFIG_DATA` (`0xCFC..=0xCFF`).
///
/// Only the first 256 bytes of each function are reachable this way.
pub struct PciConfigMechanism1<P> {
    io: P,
}

impl<P: PortIo> PciConfigMechanism1<P> {
    pub fn new(io: P) -> Self {
        Self { io }
    }

    pub fn into_inner(self) -> P {
        self.io
    }

    fn select(&mut self, addr: PciConfigAddress) -> Option<u16> {
        if addr.register > 0xff {
            warn!(%addr, "register not reachable through CONFIG_ADDRESS");
            return None;
        }
        self.io.write(PCI_CFG_ADDR_PORT, 4, addr.mechanism1());
        Some(PCI_CFG_DATA_PORT + (addr.register & 0x3))
    }
}

impl<P: PortIo> PciConfigAccess for PciConfigMechanism1<P> {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        let Some(port) = self.select(addr) else {
            return 0xff;
        };
        let value = self.io.read(port, 1) as u8;
        trace!(%addr, value, "cf8 read");
        value
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        let Some(port) = self.select(addr) else {
            return;
        };
        trace!(%addr, value, "cf8 write");
        self.io.write(port, 1, u32::from(value));
    }
}
