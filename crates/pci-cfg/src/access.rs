use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::PciConfigAddress;

/// Byte-granular access to PCI configuration space.
///
/// Accesses are synchronous and infallible at this layer: a function that does not exist floats
/// the bus high on read and ignores writes, which is what real hardware does.
pub trait PciConfigAccess {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8;
    fn write_u8(&mut self, addr: PciConfigAddress, value: u8);

    /// Reads a little-endian 16-bit register as two byte accesses.
    fn read_u16(&mut self, addr: PciConfigAddress) -> u16 {
        let lo = self.read_u8(addr);
        let hi = match addr.offset(1) {
            Some(next) => self.read_u8(next),
            None => 0xff,
        };
        u16::from_le_bytes([lo, hi])
    }
}

impl<T: PciConfigAccess + ?Sized> PciConfigAccess for &mut T {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        (**self).write_u8(addr, value)
    }
}

impl<T: PciConfigAccess + ?Sized> PciConfigAccess for Box<T> {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        (**self).write_u8(addr, value)
    }
}

/// Shared single-threaded backend, e.g. a config space that is also reachable through the
/// `0xCF8`/`0xCFC` ports of the same platform.
impl<T: PciConfigAccess + ?Sized> PciConfigAccess for Rc<RefCell<T>> {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        self.borrow_mut().read_u8(addr)
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        self.borrow_mut().write_u8(addr, value)
    }
}

/// Serializes accesses from multiple threads. Each byte access holds the lock for its duration
/// only; read-modify-write sequences still need a caller-side lock around the whole sequence.
impl<T: PciConfigAccess + ?Sized> PciConfigAccess for Arc<Mutex<T>> {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_u8(addr)
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_u8(addr, value)
    }
}
