//! Legacy PCI interrupt routing for BIOS-compatibility firmware.
//!
//! This crate ties the workspace together: [`pci_cfg`] supplies configuration-space access and
//! [`legacy_interrupt`] the PIRQ service built on it. [`install_detected`] is the startup step a
//! platform runs once: identify the chipset, build the router, publish it.

pub use legacy_interrupt;
pub use pci_cfg;

use legacy_interrupt::{
    install, ConfigError, LegacyInterrupt, LegacyInterruptConfig, PirqRouter, RegistryError,
    ServiceRegistry,
};
use pci_cfg::PciConfigAccess;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Detects the chipset behind `cfg`, then installs a [`PirqRouter`] for it into `registry`.
///
/// Returns the configuration that was installed.
///
/// # Panics
///
/// Panics if a legacy interrupt service is already registered (see [`install`]).
pub fn install_detected<R, C>(
    registry: &mut R,
    mut cfg: C,
) -> Result<LegacyInterruptConfig, SetupError>
where
    R: ServiceRegistry<dyn LegacyInterrupt> + ?Sized,
    C: PciConfigAccess + 'static,
{
    let config = LegacyInterruptConfig::detect(&mut cfg)?;
    let router = PirqRouter::new(config.clone(), cfg)?;
    install(registry, Box::new(router))?;
    Ok(config)
}
