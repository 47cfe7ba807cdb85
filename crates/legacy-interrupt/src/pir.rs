//! PCI IRQ Routing Table (`$PIR`) generation.
//!
//! Operating systems that predate ACPI find PCI interrupt routing by scanning the BIOS area
//! (0xF0000-0xFFFFF) on 16-byte boundaries for a `$PIR` header. The table names the interrupt
//! router (the function that owns the PIRQ registers) and, for every slot, which router link
//! each INTx# pin is wired to. On PIIX/ICH chipsets the link value is simply the PIRQ register
//! offset, so the OS can program routes itself.
//!
//! Layout (version 1.0):
//!
//! ```text
//! 0x00  "$PIR"
//! 0x04  version (u16, 0x0100)
//! 0x06  table size (u16, 32 + 16 * slots)
//! 0x08  router bus, router devfn
//! 0x0A  exclusive PCI IRQ bitmap (u16)
//! 0x0C  compatible router vendor (u16), device (u16)
//! 0x10  miniport data (u32)
//! 0x14  reserved (11 bytes)
//! 0x1F  checksum
//! 0x20  slot entries, 16 bytes each:
//!       bus, devfn, 4 x (link u8, IRQ bitmap u16), slot number, reserved
//! ```

use bitflags::bitflags;
use pci_cfg::{PciBdf, PciInterruptPin};

use crate::config::LegacyInterruptConfig;
use crate::error::PirTableError;

pub const PIR_SIGNATURE: [u8; 4] = *b"$PIR";
pub const PIR_VERSION: u16 = 0x0100;
pub const PIR_HEADER_SIZE: usize = 32;
pub const PIR_SLOT_SIZE: usize = 16;

bitflags! {
    /// ISA IRQ bitmap as used by `$PIR` (bit N = IRQ N).
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct IsaIrqMask: u16 {
        const IRQ0 = 1 << 0;
        const IRQ1 = 1 << 1;
        const IRQ2 = 1 << 2;
        const IRQ3 = 1 << 3;
        const IRQ4 = 1 << 4;
        const IRQ5 = 1 << 5;
        const IRQ6 = 1 << 6;
        const IRQ7 = 1 << 7;
        const IRQ8 = 1 << 8;
        const IRQ9 = 1 << 9;
        const IRQ10 = 1 << 10;
        const IRQ11 = 1 << 11;
        const IRQ12 = 1 << 12;
        const IRQ13 = 1 << 13;
        const IRQ14 = 1 << 14;
        const IRQ15 = 1 << 15;
    }
}

impl IsaIrqMask {
    /// IRQs a PIRQ link may be steered to on PC-compatible chipsets.
    pub const ROUTABLE: Self = Self::IRQ3
        .union(Self::IRQ4)
        .union(Self::IRQ5)
        .union(Self::IRQ6)
        .union(Self::IRQ7)
        .union(Self::IRQ9)
        .union(Self::IRQ10)
        .union(Self::IRQ11)
        .union(Self::IRQ12)
        .union(Self::IRQ14)
        .union(Self::IRQ15);

    /// Returns the mask for a single IRQ, or `None` if `irq > 15`.
    pub fn from_irq(irq: u8) -> Option<Self> {
        (irq < 16).then(|| Self::from_bits_retain(1 << irq))
    }
}

/// Router-wide `$PIR` header fields.
#[derive(Clone, Debug)]
pub struct PirTableConfig {
    /// IRQs reserved exclusively for PCI.
    pub exclusive_irqs: IsaIrqMask,
    /// IRQs each wired link may be routed to.
    pub link_irqs: IsaIrqMask,
    pub compatible_router_vendor: u16,
    pub compatible_router_device: u16,
    pub miniport_data: u32,
}

impl Default for PirTableConfig {
    fn default() -> Self {
        // PIIX3 ISA bridge; most $PIR consumers know how to drive it.
        Self {
            exclusive_irqs: IsaIrqMask::empty(),
            link_irqs: IsaIrqMask::IRQ5
                | IsaIrqMask::IRQ9
                | IsaIrqMask::IRQ10
                | IsaIrqMask::IRQ11,
            compatible_router_vendor: 0x8086,
            compatible_router_device: 0x7000,
            miniport_data: 0,
        }
    }
}

/// One device/slot entry.
#[derive(Clone, Debug)]
pub struct PirSlot {
    pub bus: u8,
    pub device: u8,
    /// Physical slot number; 0 for devices embedded on the board.
    pub slot: u8,
    pub pins: Vec<PciInterruptPin>,
}

impl PirSlot {
    /// An on-board device that uses INTA# only.
    pub fn embedded(bus: u8, device: u8) -> Self {
        Self {
            bus,
            device,
            slot: 0,
            pins: vec![PciInterruptPin::IntA],
        }
    }
}

/// PIRQ (0 = A) that `pin` of `device` is wired to: the standard `(device + pin) mod 4` swizzle
/// over PIRQA-D.
pub fn pirq_for_pin(device: u8, pin: PciInterruptPin) -> u8 {
    device.wrapping_add(pin.index() as u8) & 0x3
}

/// Builds a complete `$PIR` table, checksum included.
///
/// `router` must pass [`LegacyInterruptConfig::validate`]; the header and every link value are
/// taken from it.
pub fn build_pir_table(
    router: &LegacyInterruptConfig,
    config: &PirTableConfig,
    slots: &[PirSlot],
) -> Result<Vec<u8>, PirTableError> {
    router.validate()?;

    let total_len = PIR_HEADER_SIZE + slots.len() * PIR_SLOT_SIZE;
    let size = u16::try_from(total_len).map_err(|_| PirTableError::TooManySlots(slots.len()))?;

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&PIR_SIGNATURE);
    out.extend_from_slice(&PIR_VERSION.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.push(router.location.bus);
    out.push(router.location.devfn());
    out.extend_from_slice(&config.exclusive_irqs.bits().to_le_bytes());
    out.extend_from_slice(&config.compatible_router_vendor.to_le_bytes());
    out.extend_from_slice(&config.compatible_router_device.to_le_bytes());
    out.extend_from_slice(&config.miniport_data.to_le_bytes());
    out.extend_from_slice(&[0u8; 11]); // reserved
    out.push(0); // checksum placeholder
    debug_assert_eq!(out.len(), PIR_HEADER_SIZE);

    for slot in slots {
        let bdf = PciBdf::new(slot.bus, slot.device, 0);
        if !bdf.is_valid() {
            return Err(PirTableError::InvalidSlotDevice {
                bus: slot.bus,
                device: slot.device,
            });
        }
        out.push(bdf.bus);
        out.push(bdf.devfn());
        for pin in PciInterruptPin::ALL {
            let (link, bitmap) = if slot.pins.contains(&pin) {
                let pirq = pirq_for_pin(slot.device, pin);
                (
                    router.pirq_registers[usize::from(pirq)],
                    config.link_irqs,
                )
            } else {
                (0, IsaIrqMask::empty())
            };
            out.push(link);
            out.extend_from_slice(&bitmap.bits().to_le_bytes());
        }
        out.push(slot.slot);
        out.push(0); // reserved
    }

    out[PIR_HEADER_SIZE - 1] = checksum(&out);
    Ok(out)
}

/// Returns `true` if `table` carries a `$PIR` header whose size fits and whose bytes sum to 0.
pub fn validate_pir_checksum(table: &[u8]) -> bool {
    match declared_size(table) {
        Some(size) => table[..size].iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) == 0,
        None => false,
    }
}

/// Scans `region` on 16-byte boundaries for a valid `$PIR` table, returning its offset.
pub fn find_pir_table(region: &[u8]) -> Option<usize> {
    (0..region.len())
        .step_by(16)
        .find(|&off| validate_pir_checksum(&region[off..]))
}

fn declared_size(table: &[u8]) -> Option<usize> {
    if table.len() < PIR_HEADER_SIZE || table[0..4] != PIR_SIGNATURE {
        return None;
    }
    let size = usize::from(u16::from_le_bytes([table[6], table[7]]));
    if size < PIR_HEADER_SIZE || size > table.len() || (size - PIR_HEADER_SIZE) % PIR_SLOT_SIZE != 0
    {
        return None;
    }
    Some(size)
}

fn checksum(data: &[u8]) -> u8 {
    let sum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (0u8).wrapping_sub(sum)
}
