use std::collections::BTreeMap;

use tracing::trace;

use crate::{PciBdf, PciConfigAccess, PciConfigAddress};

/// Size of the conventional (non-extended) configuration space of one function.
pub const PCI_CONFIG_SPACE_SIZE: usize = 256;

/// In-memory configuration space for a fixed set of PCI functions.
///
/// Registers have no side effects: every byte reads back what was last written. This is enough
/// to host chipset scratch registers such as the PIRQ route control bytes, and it doubles as the
/// backing store for tests.
#[derive(Default)]
pub struct MemConfigSpace {
    functions: BTreeMap<PciBdf, Box<[u8; PCI_CONFIG_SPACE_SIZE]>>,
    reads: u64,
    writes: u64,
}

impl MemConfigSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function whose header carries the given vendor/device IDs; all other bytes are 0.
    ///
    /// # Panics
    ///
    /// Panics if `bdf` is already present.
    pub fn add_function(&mut self, bdf: PciBdf, vendor_id: u16, device_id: u16) {
        let mut space = Box::new([0u8; PCI_CONFIG_SPACE_SIZE]);
        space[0x00..0x02].copy_from_slice(&vendor_id.to_le_bytes());
        space[0x02..0x04].copy_from_slice(&device_id.to_le_bytes());
        let prev = self.functions.insert(bdf, space);
        assert!(prev.is_none(), "duplicate PCI BDF {bdf:?}");
    }

    pub fn has_function(&self, bdf: PciBdf) -> bool {
        self.functions.contains_key(&bdf)
    }

    /// Returns a function's raw configuration bytes without counting an access.
    pub fn function_bytes(&self, bdf: PciBdf) -> Option<&[u8; PCI_CONFIG_SPACE_SIZE]> {
        self.functions.get(&bdf).map(|space| &**space)
    }

    /// Number of byte reads serviced so far, including reads that floated high.
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    /// Number of byte writes accepted so far, including writes that were dropped.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    fn slot(&self, addr: PciConfigAddress) -> Option<&u8> {
        let space = self.functions.get(&addr.bdf)?;
        space.get(usize::from(addr.register))
    }

    fn slot_mut(&mut self, addr: PciConfigAddress) -> Option<&mut u8> {
        let space = self.functions.get_mut(&addr.bdf)?;
        space.get_mut(usize::from(addr.register))
    }
}

impl PciConfigAccess for MemConfigSpace {
    fn read_u8(&mut self, addr: PciConfigAddress) -> u8 {
        self.reads += 1;
        // 0xFF for a non-existent function or register (common convention).
        let value = self.slot(addr).copied().unwrap_or(0xff);
        trace!(%addr, value, "config read");
        value
    }

    fn write_u8(&mut self, addr: PciConfigAddress, value: u8) {
        self.writes += 1;
        trace!(%addr, value, "config write");
        if let Some(slot) = self.slot_mut(addr) {
            *slot = value;
        }
    }
}
