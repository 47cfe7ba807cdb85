//! Service registration.
//!
//! The router is an ordinary value owned by whoever builds the platform. At startup it is moved
//! into a [`ServiceRegistry`] under [`LEGACY_INTERRUPT_PROTOCOL_GUID`], which is where legacy BIOS
//! compatibility code looks it up.

use std::collections::HashMap;

use tracing::info;
use uguid::{guid, Guid};

use crate::error::RegistryError;
use crate::LegacyInterrupt;

pub const LEGACY_INTERRUPT_PROTOCOL_GUID: Guid = guid!("31ce593d-108a-485d-adb2-78f21f2966be");

/// A registry of service instances keyed by GUID.
pub trait ServiceRegistry<S: ?Sized> {
    fn is_registered(&self, id: Guid) -> bool;

    /// Registers `service` under `id`. At most one instance may exist per GUID.
    fn register(&mut self, id: Guid, service: Box<S>) -> Result<(), RegistryError>;
}

/// In-memory [`ServiceRegistry`].
pub struct ServiceTable<S: ?Sized> {
    services: HashMap<Guid, Box<S>>,
}

impl<S: ?Sized> ServiceTable<S> {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    pub fn get(&self, id: Guid) -> Option<&S> {
        self.services.get(&id).map(|s| &**s)
    }

    pub fn get_mut(&mut self, id: Guid) -> Option<&mut S> {
        self.services.get_mut(&id).map(|s| &mut **s)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl<S: ?Sized> Default for ServiceTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> ServiceRegistry<S> for ServiceTable<S> {
    fn is_registered(&self, id: Guid) -> bool {
        self.services.contains_key(&id)
    }

    fn register(&mut self, id: Guid, service: Box<S>) -> Result<(), RegistryError> {
        if self.services.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.services.insert(id, service);
        Ok(())
    }
}

/// Publishes the legacy interrupt service.
///
/// # Panics
///
/// Panics if a legacy interrupt service is already registered: two routers driving the same
/// registers means the platform was assembled incorrectly. Errors returned by the registry
/// itself are passed to the caller.
pub fn install<R>(registry: &mut R, service: Box<dyn LegacyInterrupt>) -> Result<(), RegistryError>
where
    R: ServiceRegistry<dyn LegacyInterrupt> + ?Sized,
{
    assert!(
        !registry.is_registered(LEGACY_INTERRUPT_PROTOCOL_GUID),
        "legacy interrupt service {LEGACY_INTERRUPT_PROTOCOL_GUID} already registered"
    );

    let location = service.location();
    let pirqs = service.pirq_count();
    registry.register(LEGACY_INTERRUPT_PROTOCOL_GUID, service)?;
    info!(%location, pirqs, "legacy interrupt service installed");
    Ok(())
}
