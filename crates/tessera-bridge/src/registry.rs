// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Module registry: which platform module currently serves each module kind.
//
// All state lives in one immutable snapshot behind an `ArcSwap`. Registration
// builds the complete `Registration` first (name, probed hooks, handle) and
// then publishes a new snapshot in a single pointer swap, so a reader on the
// render thread sees either the previous registration or the new one in full.
// Readers never lock.
//
// Each module kind is its own namespace: registering a logging module leaves
// the font module untouched, and a second font module replaces the first.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tessera_core::error::{Result, TesseraError};
use tessera_core::types::{CapabilityId, ModuleKind, RegistrationId};
use tracing::{debug, info};

use crate::adapter::{Hook, HookTable, ModuleAdapter};
use crate::capability::CapabilityCatalog;

/// One module's participation in the boundary.
pub struct Registration {
    id: RegistrationId,
    module: ModuleKind,
    name: String,
    hooks: HookTable,
    implementation: Arc<dyn Any + Send + Sync>,
}

impl Registration {
    /// Probe `adapter` and validate its hooks against `catalog`.
    pub fn probe<A: ModuleAdapter>(adapter: &A, catalog: &CapabilityCatalog) -> Result<Self> {
        let module = adapter.module_kind();
        let invalid = |reason: String| TesseraError::InvalidRegistration { module, reason };

        let name = adapter.name().trim();
        if name.is_empty() {
            return Err(invalid("empty module name".into()));
        }

        let hooks = adapter.probe();
        for id in hooks.ids() {
            match catalog.get(id.as_str()) {
                None => return Err(invalid(format!("hook for unknown capability {id}"))),
                Some(descriptor) if descriptor.module != module => {
                    return Err(invalid(format!(
                        "capability {id} belongs to the {} module",
                        descriptor.module
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            id: RegistrationId::new(),
            module,
            name: name.to_owned(),
            hooks,
            implementation: adapter.implementation(),
        })
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn implements(&self, capability: &str) -> bool {
        self.hooks.contains(capability)
    }

    /// Implemented capability identities in order.
    pub fn capabilities(&self) -> Vec<CapabilityId> {
        self.hooks.ids().collect()
    }

    pub fn hook(&self, capability: &str) -> Option<&Hook> {
        self.hooks.get(capability)
    }

    pub fn implementation(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.implementation
    }

    /// The concrete module object, if it is a `T`.
    pub fn implementation_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.implementation).downcast::<T>().ok()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("module", &self.module)
            .field("name", &self.name)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
struct RegistrySnapshot {
    modules: BTreeMap<ModuleKind, Arc<Registration>>,
}

/// Table of active module registrations, one per module kind.
pub struct ModuleRegistry {
    snap: ArcSwap<RegistrySnapshot>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            snap: ArcSwap::from_pointee(RegistrySnapshot::default()),
        }
    }

    /// Register `adapter`, replacing any module of the same kind.
    pub fn register<A: ModuleAdapter>(
        &self,
        catalog: &CapabilityCatalog,
        adapter: A,
    ) -> Result<Arc<Registration>> {
        let registration = Arc::new(Registration::probe(&adapter, catalog)?);
        let module = registration.module();

        let previous = self.snap.rcu(|cur| {
            let mut next = RegistrySnapshot::clone(cur);
            next.modules.insert(module, Arc::clone(&registration));
            next
        });

        match previous.modules.get(&module) {
            Some(old) => info!(
                module = %module,
                name = registration.name(),
                replaced = old.name(),
                id = %registration.id(),
                capabilities = ?registration.capabilities(),
                "module registration replaced"
            ),
            None => info!(
                module = %module,
                name = registration.name(),
                id = %registration.id(),
                capabilities = ?registration.capabilities(),
                "module registered"
            ),
        }
        Ok(registration)
    }

    /// The active registration for `module`.
    pub fn lookup(&self, module: ModuleKind) -> Option<Arc<Registration>> {
        self.snap.load().modules.get(&module).cloned()
    }

    /// Remove the registration for `module`, returning it.
    pub fn unregister(&self, module: ModuleKind) -> Option<Arc<Registration>> {
        let previous = self.snap.rcu(|cur| {
            let mut next = RegistrySnapshot::clone(cur);
            next.modules.remove(&module);
            next
        });
        let removed = previous.modules.get(&module).cloned();
        if let Some(registration) = &removed {
            info!(
                module = %module,
                name = registration.name(),
                id = %registration.id(),
                "module unregistered"
            );
        }
        removed
    }

    /// Drop every registration.
    pub fn reset(&self) {
        let previous = self.snap.swap(Arc::new(RegistrySnapshot::default()));
        debug!(cleared = previous.modules.len(), "module registry reset");
    }

    /// Active registrations in module-kind order.
    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        self.snap.load().modules.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snap.load().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snap.load().modules.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.registrations()).finish()
    }
}
