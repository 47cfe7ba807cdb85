use pci_cfg::PciBdf;
use thiserror::Error;
use uguid::Guid;

pub type Result<T> = std::result::Result<T, LegacyInterruptError>;

/// Errors reported by the PIRQ accessor operations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LegacyInterruptError {
    /// The PIRQ index is outside `0..count`. No configuration-space access was made.
    #[error("invalid PIRQ index {pirq} (router supports {count})")]
    InvalidPirq { pirq: u8, count: u8 },
}

/// Rejected router configurations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid router location {0}")]
    InvalidLocation(PciBdf),

    #[error("PIRQ{pirq} register {register:#04x} overlaps the standard config header")]
    RegisterInHeader { pirq: char, register: u8 },

    #[error("PIRQ{first} and PIRQ{second} share register {register:#04x}")]
    DuplicateRegister {
        first: char,
        second: char,
        register: u8,
    },

    #[error("unknown host bridge {vendor_id:04x}:{device_id:04x}")]
    UnknownHostBridge { vendor_id: u16, device_id: u16 },
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("service {0} already registered")]
    AlreadyRegistered(Guid),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PirTableError {
    #[error("invalid $PIR router: {0}")]
    InvalidRouter(#[from] ConfigError),

    #[error("too many $PIR slot entries: {0}")]
    TooManySlots(usize),

    #[error("invalid $PIR slot device {device} on bus {bus}")]
    InvalidSlotDevice { bus: u8, device: u8 },
}
