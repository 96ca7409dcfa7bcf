// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability dispatcher: the engine's single entry point for platform hooks.
//
// Resolution rule: a capability runs the registered module's hook only when a
// module of the descriptor's kind is registered AND that registration
// implements the capability. In every other case the declared default runs.
// An absent hook is the expected path and is not reported as an error; an
// identity the catalog does not know is a contract violation and is.

use std::sync::Arc;

use serde::Serialize;
use tessera_core::config::BridgeConfig;
use tessera_core::error::{Result, TesseraError};
use tessera_core::types::{CapabilityId, LogLevel, ModuleKind, RegistrationId, ValueKind};
use tracing::{error, trace, warn};

use crate::abi::ValueScope;
use crate::adapter::{FontAdapter, LogAdapter, ModuleAdapter};
use crate::capability::{
    CapabilityCatalog, CapabilityDescriptor, FONT_SCALE_FACTOR, FONT_SCALE_FIT, LOG_ENABLED,
    LOG_MESSAGE,
};
use crate::registry::{ModuleRegistry, Registration};
use crate::traits::{FontModule, LogModule};
use crate::value::TaggedValue;

/// Engine-side boundary context: catalog, registry and settings.
///
/// Constructed explicitly by the engine's startup sequence. Tests build as
/// many independent dispatchers as they need.
#[derive(Debug)]
pub struct Dispatcher {
    catalog: CapabilityCatalog,
    registry: ModuleRegistry,
    config: BridgeConfig,
}

impl Dispatcher {
    /// Dispatcher over the built-in capabilities.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_catalog(CapabilityCatalog::builtin(), config)
    }

    /// Dispatcher over an engine-specific catalog.
    pub fn with_catalog(catalog: CapabilityCatalog, config: BridgeConfig) -> Self {
        Self {
            catalog,
            registry: ModuleRegistry::new(),
            config,
        }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // -- Registration --------------------------------------------------------

    /// Register any module adapter, replacing a module of the same kind.
    pub fn register<A: ModuleAdapter>(&self, adapter: A) -> Result<Arc<Registration>> {
        self.registry.register(&self.catalog, adapter)
    }

    /// Register the platform's font module.
    pub fn register_font_module<M: FontModule>(&self, module: M) -> Result<Arc<Registration>> {
        self.register(FontAdapter::new(module))
    }

    /// Register the platform's logging module.
    pub fn register_log_module<M: LogModule>(&self, module: M) -> Result<Arc<Registration>> {
        self.register(LogAdapter::new(module))
    }

    pub fn lookup(&self, module: ModuleKind) -> Option<Arc<Registration>> {
        self.registry.lookup(module)
    }

    pub fn unregister(&self, module: ModuleKind) -> Option<Arc<Registration>> {
        self.registry.unregister(module)
    }

    pub fn reset(&self) {
        self.registry.reset();
    }

    // -- Invocation ----------------------------------------------------------

    fn descriptor(&self, capability: &str) -> Result<&'static CapabilityDescriptor> {
        match self.catalog.get(capability) {
            Some(descriptor) => Ok(descriptor),
            None => {
                error!(capability, "invoke of unknown capability");
                if self.config.strict_contracts {
                    panic!("unknown capability {capability:?}: engine and catalog disagree");
                }
                Err(TesseraError::UnknownCapability(capability.to_owned()))
            }
        }
    }

    /// Whether `capability` currently resolves to a module hook.
    pub fn is_active(&self, capability: &str) -> Result<bool> {
        let descriptor = self.descriptor(capability)?;
        Ok(self
            .registry
            .lookup(descriptor.module)
            .is_some_and(|reg| reg.implements(capability)))
    }

    /// Invoke `capability` with `args`, running the module hook when one is
    /// active and the declared default otherwise.
    pub fn invoke(&self, capability: &str, args: &[TaggedValue]) -> Result<Option<TaggedValue>> {
        let descriptor = self.descriptor(capability)?;
        descriptor.signature.check_inputs(descriptor.id, args)?;

        let registration = self.registry.lookup(descriptor.module);
        let hook = registration.as_ref().and_then(|reg| reg.hook(capability));
        match hook {
            Some(hook) => {
                let output = hook(args);
                descriptor
                    .signature
                    .check_output(descriptor.id, output.as_ref())?;
                trace!(capability, "module hook");
                Ok(output)
            }
            None => {
                trace!(capability, "default");
                Ok(descriptor.run_default(args))
            }
        }
    }

    /// Invoke a known descriptor, falling back to its default on any error.
    fn invoke_or_default(
        &self,
        descriptor: &'static CapabilityDescriptor,
        args: &[TaggedValue],
    ) -> Option<TaggedValue> {
        match self.invoke(descriptor.id.as_str(), args) {
            Ok(output) => output,
            Err(e) => {
                warn!(capability = %descriptor.id, error = %e, "capability failed, using default");
                descriptor.run_default(args)
            }
        }
    }

    // -- Typed fronts --------------------------------------------------------

    /// Rendered size for a requested font size.
    pub fn scale_font_size(&self, size: f64) -> f64 {
        self.invoke_or_default(&FONT_SCALE_FIT, &[TaggedValue::double(size)])
            .and_then(|v| v.try_double())
            .unwrap_or(size)
    }

    /// Platform text-scale multiplier.
    pub fn font_scale_factor(&self) -> f64 {
        self.invoke_or_default(&FONT_SCALE_FACTOR, &[])
            .and_then(|v| v.try_double())
            .unwrap_or(1.0)
    }

    /// Deliver an engine log record to the platform sink.
    pub fn log(&self, level: LogLevel, tag: &str, message: &str) {
        let args = [
            TaggedValue::integer(level.code()),
            TaggedValue::string(tag),
            TaggedValue::string(message),
        ];
        self.invoke_or_default(&LOG_MESSAGE, &args);
    }

    /// Whether the platform sink wants records at `level`.
    pub fn log_enabled(&self, level: LogLevel) -> bool {
        self.invoke_or_default(&LOG_ENABLED, &[TaggedValue::integer(level.code())])
            .and_then(|v| v.try_boolean())
            .unwrap_or(true)
    }

    /// A scope for lending raw value handles, poisoned per the config.
    pub fn value_scope<'v>(&self) -> ValueScope<'v> {
        ValueScope::new(self.config.poison_lent_handles)
    }

    // -- Diagnostics ---------------------------------------------------------

    /// Snapshot of registered modules and capability resolution.
    pub fn report(&self) -> BridgeReport {
        let modules: Vec<ModuleReport> = self
            .registry
            .registrations()
            .iter()
            .map(|reg| ModuleReport {
                module: reg.module(),
                name: reg.name().to_owned(),
                registration_id: reg.id(),
                capabilities: reg.capabilities(),
            })
            .collect();

        let capabilities = self
            .catalog
            .iter()
            .map(|d| {
                let provider = modules
                    .iter()
                    .find(|m| m.module == d.module && m.capabilities.contains(&d.id))
                    .map(|m| m.name.clone());
                CapabilityReport {
                    id: d.id,
                    module: d.module,
                    inputs: d.signature.inputs.to_vec(),
                    output: d.signature.output,
                    summary: d.summary,
                    provider,
                }
            })
            .collect();

        BridgeReport {
            modules,
            capabilities,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

/// Diagnostic view of the boundary, serialisable for logs and bug reports.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeReport {
    pub modules: Vec<ModuleReport>,
    pub capabilities: Vec<CapabilityReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub module: ModuleKind,
    pub name: String,
    pub registration_id: RegistrationId,
    pub capabilities: Vec<CapabilityId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub id: CapabilityId,
    pub module: ModuleKind,
    pub inputs: Vec<ValueKind>,
    pub output: Option<ValueKind>,
    pub summary: &'static str,
    /// Name of the module whose hook runs; `None` means the default runs.
    pub provider: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::adapter::HookTable;
    use crate::traits::{FontScaleFactorHook, FontScaleFitHook, LogEnabledHook};

    struct Doubler;

    impl Doubler {
        fn fit(&self, size: f64) -> f64 {
            size * 2.0
        }

        fn factor(&self) -> f64 {
            2.0
        }
    }

    impl FontModule for Doubler {
        fn name(&self) -> &str {
            "doubler"
        }

        fn font_scale_fit(&self) -> Option<FontScaleFitHook<Self>> {
            Some(Self::fit)
        }

        fn font_scale_factor(&self) -> Option<FontScaleFactorHook<Self>> {
            Some(Self::factor)
        }
    }

    struct ErrorsOnly;

    impl ErrorsOnly {
        fn enabled(&self, level: LogLevel) -> bool {
            level == LogLevel::Error
        }
    }

    impl LogModule for ErrorsOnly {
        fn name(&self) -> &str {
            "errors-only"
        }

        fn log_enabled(&self) -> Option<LogEnabledHook<Self>> {
            Some(Self::enabled)
        }
    }

    #[test]
    fn defaults_before_registration() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.scale_font_size(13.0), 13.0);
        assert_eq!(dispatcher.font_scale_factor(), 1.0);
        assert!(dispatcher.log_enabled(LogLevel::Trace));
        assert!(!dispatcher.is_active("font-scale-fit").unwrap());
    }

    #[test]
    fn registered_hooks_take_over() {
        let dispatcher = Dispatcher::default();
        dispatcher.register_font_module(Doubler).unwrap();
        dispatcher.register_log_module(ErrorsOnly).unwrap();

        assert_eq!(dispatcher.scale_font_size(10.0), 20.0);
        assert_eq!(dispatcher.font_scale_factor(), 2.0);
        assert!(dispatcher.log_enabled(LogLevel::Error));
        assert!(!dispatcher.log_enabled(LogLevel::Info));
        // ErrorsOnly leaves log-message to the default.
        assert!(!dispatcher.is_active("log-message").unwrap());
        dispatcher.log(LogLevel::Error, "test", "still delivered by default");
    }

    #[test]
    fn unknown_capability_is_an_error() {
        let dispatcher = Dispatcher::default();
        let err = dispatcher.invoke("font-rasterize", &[]).unwrap_err();
        assert!(matches!(err, TesseraError::UnknownCapability(id) if id == "font-rasterize"));
        assert!(dispatcher.is_active("font-rasterize").is_err());
    }

    #[test]
    #[should_panic(expected = "unknown capability")]
    fn strict_contracts_panic_on_unknown() {
        let config = BridgeConfig {
            strict_contracts: true,
            ..Default::default()
        };
        let _ = Dispatcher::new(config).invoke("font-rasterize", &[]);
    }

    #[test]
    fn wrong_argument_kind_is_rejected() {
        let dispatcher = Dispatcher::default();
        let err = dispatcher
            .invoke("font-scale-fit", &[TaggedValue::string("12")])
            .unwrap_err();
        assert!(matches!(err, TesseraError::SignatureMismatch { .. }));
        assert!(dispatcher.invoke("font-scale-fit", &[]).is_err());
    }

    #[test]
    fn report_names_providers() {
        let dispatcher = Dispatcher::default();
        dispatcher.register_font_module(Doubler).unwrap();
        let report = dispatcher.report();

        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].name, "doubler");
        let fit = report
            .capabilities
            .iter()
            .find(|c| c.id == FONT_SCALE_FIT.id)
            .unwrap();
        assert_eq!(fit.provider.as_deref(), Some("doubler"));
        let log = report
            .capabilities
            .iter()
            .find(|c| c.id == LOG_MESSAGE.id)
            .unwrap();
        assert_eq!(log.provider, None);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["modules"][0]["module"], "font");
        assert_eq!(json["capabilities"][0]["id"], "font-scale-factor");
    }

    /// Font adapter whose hooks answer with the wrong output kinds.
    struct Misbehaving;

    impl ModuleAdapter for Misbehaving {
        fn module_kind(&self) -> ModuleKind {
            ModuleKind::Font
        }

        fn name(&self) -> &str {
            "misbehaving"
        }

        fn probe(&self) -> HookTable {
            let mut table = HookTable::new();
            table.insert(FONT_SCALE_FIT.id, |_args: &[TaggedValue]| None);
            table.insert(FONT_SCALE_FACTOR.id, |_args: &[TaggedValue]| {
                Some(TaggedValue::boolean(true))
            });
            table
        }

        fn implementation(&self) -> Arc<dyn Any + Send + Sync> {
            Arc::new(())
        }
    }

    #[test]
    fn wrong_output_kind_is_rejected_and_fronts_use_default() {
        let dispatcher = Dispatcher::default();
        dispatcher.register(Misbehaving).unwrap();
        assert!(dispatcher.is_active("font-scale-fit").unwrap());

        let err = dispatcher
            .invoke("font-scale-fit", &[TaggedValue::double(12.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            TesseraError::SignatureMismatch { ref capability, .. } if capability == "font-scale-fit"
        ));
        assert!(matches!(
            dispatcher.invoke("font-scale-factor", &[]),
            Err(TesseraError::SignatureMismatch { .. })
        ));

        assert_eq!(dispatcher.scale_font_size(12.0), 12.0);
        assert_eq!(dispatcher.font_scale_factor(), 1.0);
    }

    #[test]
    fn value_scope_follows_config() {
        let config = BridgeConfig {
            poison_lent_handles: true,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(config);
        let value = TaggedValue::from(3_i64);
        let retained = {
            let mut scope = dispatcher.value_scope();
            scope.lend(&value)
        };
        let raw = unsafe { crate::abi::RawValue::from_ptr(retained) }.unwrap();
        assert!(raw.is_poisoned());
    }
}
