use legacy_interrupt::{
    LegacyInterrupt, LegacyInterruptConfig, LegacyInterruptError, PirqRouter, PIRQ_COUNT,
};
use pci_cfg::{MemConfigSpace, PciBdf};

const ISA_BRIDGE: PciBdf = PciBdf::new(0, 1, 0);

fn piix4_service() -> Box<dyn LegacyInterrupt> {
    let mut cfg = MemConfigSpace::new();
    cfg.add_function(ISA_BRIDGE, 0x8086, 0x7000);
    Box::new(PirqRouter::new(LegacyInterruptConfig::piix4(), cfg).unwrap())
}

#[test]
fn route_bytes_land_in_isa_bridge_registers() {
    let mut cfg = MemConfigSpace::new();
    cfg.add_function(ISA_BRIDGE, 0x8086, 0x7000);
    let mut router = PirqRouter::new(LegacyInterruptConfig::piix4(), cfg).unwrap();

    for (pirq, irq) in [(0u8, 0x0bu8), (1, 0x0a), (4, 0x85), (7, 0x05)] {
        router.write_pirq(pirq, irq).unwrap();
    }

    let cfg = router.into_inner();
    let bytes = cfg.function_bytes(ISA_BRIDGE).unwrap();
    assert_eq!(bytes[0x60], 0x0b);
    assert_eq!(bytes[0x61], 0x0a);
    assert_eq!(bytes[0x68], 0x85);
    assert_eq!(bytes[0x6b], 0x05);
    assert_eq!(cfg.write_count(), 4);
    assert_eq!(cfg.read_count(), 0);
}

#[test]
fn concrete_pirq_d_scenario() {
    let mut svc = piix4_service();
    assert_eq!(svc.pirq_count(), PIRQ_COUNT);

    svc.write_pirq(3, 0xff).unwrap();
    assert_eq!(svc.read_pirq(3), Ok(0x7f));

    svc.write_pirq(3, 0x55).unwrap();
    assert_eq!(svc.read_pirq(3), Ok(0x55));

    assert_eq!(
        svc.read_pirq(8),
        Err(LegacyInterruptError::InvalidPirq { pirq: 8, count: 8 })
    );
}

#[test]
fn full_byte_sweep_on_every_line() {
    let mut svc = piix4_service();
    for pirq in 0..svc.pirq_count() {
        for value in 0..=u8::MAX {
            svc.write_pirq(pirq, value).unwrap();
            assert_eq!(svc.read_pirq(pirq), Ok(value & 0x7f), "PIRQ{pirq} value {value:#04x}");
        }
    }
    assert_eq!(svc.location(), ISA_BRIDGE);
}

#[test]
fn missing_bridge_reads_float_high_without_bit7() {
    let mut router =
        PirqRouter::new(LegacyInterruptConfig::q35(), MemConfigSpace::new()).unwrap();
    assert_eq!(router.read_pirq(0), Ok(0x7f));
}
