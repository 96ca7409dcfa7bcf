// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adapters from typed module traits to the registry's uniform hook table.
//
// At registration an adapter probes its module's hook accessors and wraps each
// implemented hook in a closure that unpacks `TaggedValue` arguments and packs
// the result. The registry only ever stores the resulting table, so a new
// module kind needs a trait and an adapter but no registry changes.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use tessera_core::types::{CapabilityId, LogLevel, ModuleKind};

use crate::capability::{FONT_SCALE_FACTOR, FONT_SCALE_FIT, LOG_ENABLED, LOG_MESSAGE};
use crate::traits::{FontModule, LogModule};
use crate::value::TaggedValue;

/// A probed hook with the uniform boundary signature.
pub type Hook = Arc<dyn Fn(&[TaggedValue]) -> Option<TaggedValue> + Send + Sync>;

/// Hooks a module implements, keyed by capability identity.
#[derive(Clone, Default)]
pub struct HookTable {
    hooks: BTreeMap<&'static str, Hook>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, id: CapabilityId, hook: F)
    where
        F: Fn(&[TaggedValue]) -> Option<TaggedValue> + Send + Sync + 'static,
    {
        self.hooks.insert(id.as_str(), Arc::new(hook));
    }

    pub fn get(&self, id: &str) -> Option<&Hook> {
        self.hooks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hooks.contains_key(id)
    }

    /// Implemented identities in order.
    pub fn ids(&self) -> impl Iterator<Item = CapabilityId> + '_ {
        self.hooks.keys().copied().map(CapabilityId)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

/// Uniform view of one platform module, used by the registry.
pub trait ModuleAdapter: Send + Sync + 'static {
    fn module_kind(&self) -> ModuleKind;

    fn name(&self) -> &str;

    /// Discover the implemented hooks. Called once per registration.
    fn probe(&self) -> HookTable;

    /// The concrete module object, for diagnostics and tests.
    fn implementation(&self) -> Arc<dyn Any + Send + Sync>;
}

fn arg_double(args: &[TaggedValue], index: usize) -> f64 {
    args.get(index).map_or(0.0, TaggedValue::as_double)
}

fn arg_level(args: &[TaggedValue], index: usize) -> LogLevel {
    LogLevel::from_code(args.get(index).map_or(0, TaggedValue::as_integer))
}

fn arg_str(args: &[TaggedValue], index: usize) -> &str {
    args.get(index).map_or("", TaggedValue::as_str)
}

/// Registers a [`FontModule`].
pub struct FontAdapter<M: FontModule> {
    module: Arc<M>,
}

impl<M: FontModule> FontAdapter<M> {
    pub fn new(module: M) -> Self {
        Self::from_arc(Arc::new(module))
    }

    pub fn from_arc(module: Arc<M>) -> Self {
        Self { module }
    }
}

impl<M: FontModule> ModuleAdapter for FontAdapter<M> {
    fn module_kind(&self) -> ModuleKind {
        ModuleKind::Font
    }

    fn name(&self) -> &str {
        self.module.name()
    }

    fn probe(&self) -> HookTable {
        let mut table = HookTable::new();
        if let Some(fit) = self.module.font_scale_fit() {
            let module = Arc::clone(&self.module);
            table.insert(FONT_SCALE_FIT.id, move |args: &[TaggedValue]| {
                Some(TaggedValue::double(fit(&*module, arg_double(args, 0))))
            });
        }
        if let Some(factor) = self.module.font_scale_factor() {
            let module = Arc::clone(&self.module);
            table.insert(FONT_SCALE_FACTOR.id, move |_args: &[TaggedValue]| {
                Some(TaggedValue::double(factor(&*module)))
            });
        }
        table
    }

    fn implementation(&self) -> Arc<dyn Any + Send + Sync> {
        self.module.clone()
    }
}

/// Registers a [`LogModule`].
pub struct LogAdapter<M: LogModule> {
    module: Arc<M>,
}

impl<M: LogModule> LogAdapter<M> {
    pub fn new(module: M) -> Self {
        Self::from_arc(Arc::new(module))
    }

    pub fn from_arc(module: Arc<M>) -> Self {
        Self { module }
    }
}

impl<M: LogModule> ModuleAdapter for LogAdapter<M> {
    fn module_kind(&self) -> ModuleKind {
        ModuleKind::Logging
    }

    fn name(&self) -> &str {
        self.module.name()
    }

    fn probe(&self) -> HookTable {
        let mut table = HookTable::new();
        if let Some(log) = self.module.log_message() {
            let module = Arc::clone(&self.module);
            table.insert(LOG_MESSAGE.id, move |args: &[TaggedValue]| {
                log(&*module, arg_level(args, 0), arg_str(args, 1), arg_str(args, 2));
                None
            });
        }
        if let Some(enabled) = self.module.log_enabled() {
            let module = Arc::clone(&self.module);
            table.insert(LOG_ENABLED.id, move |args: &[TaggedValue]| {
                Some(TaggedValue::boolean(enabled(&*module, arg_level(args, 0))))
            });
        }
        table
    }

    fn implementation(&self) -> Arc<dyn Any + Send + Sync> {
        self.module.clone()
    }
}
