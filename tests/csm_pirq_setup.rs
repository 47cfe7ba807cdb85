use std::cell::RefCell;
use std::rc::Rc;

use pirq_service::legacy_interrupt::pir::{
    build_pir_table, find_pir_table, validate_pir_checksum, PirSlot, PirTableConfig,
};
use pirq_service::legacy_interrupt::{
    LegacyInterrupt, LegacyInterruptConfig, LegacyInterruptError, ServiceTable,
    LEGACY_INTERRUPT_PROTOCOL_GUID,
};
use pirq_service::pci_cfg::{
    MemConfigSpace, PciBdf, PciConfigAccess, PciConfigAddress, PciConfigMechanism1,
    PciInterruptPin, PortIo, PCI_CFG_ADDR_PORT,
};
use pirq_service::{install_detected, SetupError};

const HOST_BRIDGE: PciBdf = PciBdf::new(0, 0, 0);
const LPC_BRIDGE: PciBdf = PciBdf::new(0, 0x1f, 0);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Host bridge port decode in front of a shared config space.
struct HostBridgePorts {
    cf8: u32,
    mem: Rc<RefCell<MemConfigSpace>>,
}

impl HostBridgePorts {
    fn target(&self, port: u16) -> Option<PciConfigAddress> {
        PciConfigAddress::from_mechanism1(self.cf8, port)
    }
}

impl PortIo for HostBridgePorts {
    fn read(&mut self, port: u16, size: u8) -> u32 {
        assert_eq!(size, 1, "byte accesses only");
        match self.target(port) {
            Some(addr) => u32::from(self.mem.borrow_mut().read_u8(addr)),
            None => 0xff,
        }
    }

    fn write(&mut self, port: u16, size: u8, value: u32) {
        if port == PCI_CFG_ADDR_PORT {
            assert_eq!(size, 4);
            self.cf8 = value;
        } else if let Some(addr) = self.target(port) {
            self.mem.borrow_mut().write_u8(addr, value as u8);
        }
    }
}

fn q35_platform() -> Rc<RefCell<MemConfigSpace>> {
    let mut mem = MemConfigSpace::new();
    mem.add_function(HOST_BRIDGE, 0x8086, 0x29c0);
    mem.add_function(LPC_BRIDGE, 0x8086, 0x2918);
    Rc::new(RefCell::new(mem))
}

#[test]
fn q35_service_programs_lpc_bridge_through_cf8() {
    init_tracing();
    let mem = q35_platform();
    let ports = HostBridgePorts {
        cf8: 0,
        mem: mem.clone(),
    };

    let mut services = ServiceTable::<dyn LegacyInterrupt>::new();
    let config = install_detected(&mut services, PciConfigMechanism1::new(ports)).unwrap();
    assert_eq!(config, LegacyInterruptConfig::q35());

    let svc = services.get_mut(LEGACY_INTERRUPT_PROTOCOL_GUID).unwrap();
    assert_eq!(svc.location(), LPC_BRIDGE);
    assert_eq!(svc.pirq_count(), 8);

    for pirq in 0..svc.pirq_count() {
        svc.write_pirq(pirq, 0x80 | (pirq + 3)).unwrap();
    }
    for pirq in 0..svc.pirq_count() {
        assert_eq!(svc.read_pirq(pirq), Ok(pirq + 3));
    }
    assert_eq!(
        svc.write_pirq(8, 0x0b),
        Err(LegacyInterruptError::InvalidPirq { pirq: 8, count: 8 })
    );

    let mem = mem.borrow();
    let lpc = mem.function_bytes(LPC_BRIDGE).unwrap();
    assert_eq!(&lpc[0x60..0x64], &[0x83, 0x84, 0x85, 0x86]);
    assert_eq!(&lpc[0x68..0x6c], &[0x87, 0x88, 0x89, 0x8a]);
    assert_eq!(&lpc[0x64..0x68], &[0, 0, 0, 0]);
}

#[test]
fn unknown_chipset_installs_nothing() {
    init_tracing();
    let mut mem = MemConfigSpace::new();
    mem.add_function(HOST_BRIDGE, 0x1022, 0x1480);

    let mut services = ServiceTable::<dyn LegacyInterrupt>::new();
    let err = install_detected(&mut services, mem).unwrap_err();
    assert!(matches!(err, SetupError::Config(_)));
    assert_eq!(err.to_string(), "unknown host bridge 1022:1480");
    assert!(services.is_empty());
}

#[test]
#[should_panic(expected = "already registered")]
fn second_platform_setup_is_fatal() {
    let mut services = ServiceTable::<dyn LegacyInterrupt>::new();
    let _ = install_detected(&mut services, q35_platform());
    let _ = install_detected(&mut services, q35_platform());
}

#[test]
fn pir_table_placed_in_bios_area_is_discoverable() {
    init_tracing();
    let mut services = ServiceTable::<dyn LegacyInterrupt>::new();
    let config = install_detected(&mut services, q35_platform()).unwrap();

    let slots = [
        PirSlot::embedded(0, 0x1f),
        PirSlot::embedded(0, 0x02),
        PirSlot {
            bus: 0,
            device: 0x05,
            slot: 1,
            pins: vec![PciInterruptPin::IntA, PciInterruptPin::IntB],
        },
    ];
    let table = build_pir_table(&config, &PirTableConfig::default(), &slots).unwrap();
    assert!(validate_pir_checksum(&table));

    // 0xF0000-0xFFFFF, with the table at 0xFFDF0.
    let mut bios = vec![0u8; 0x10000];
    let placed = 0xFDF0;
    bios[placed..placed + table.len()].copy_from_slice(&table);
    assert_eq!(find_pir_table(&bios), Some(placed));

    // The router named in the table is the function the service reports.
    let svc = services.get(LEGACY_INTERRUPT_PROTOCOL_GUID).unwrap();
    assert_eq!(table[8], svc.location().bus);
    assert_eq!(table[9], svc.location().devfn());
}
