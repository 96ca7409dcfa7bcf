// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability descriptors: the optional platform hooks the engine knows about.
//
// Each descriptor is declared once as a static, independent of any platform.
// It names the hook, the module kind that may implement it, the value kinds
// it takes and returns, and a default that keeps the engine correct when no
// registered module implements the hook.

use std::collections::BTreeMap;

use tessera_core::error::{Result, TesseraError};
use tessera_core::types::{CapabilityId, LogLevel, ModuleKind, ValueKind};
use tracing::{debug, error, info, trace, warn};

use crate::value::{TaggedValue, kinds_of};

/// Behaviour used when no registered module implements a capability.
///
/// Called only with arguments that already match the descriptor's signature.
pub type DefaultFn = fn(&[TaggedValue]) -> Option<TaggedValue>;

/// Input and output kinds of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub inputs: &'static [ValueKind],
    /// `None` for hooks that return nothing.
    pub output: Option<ValueKind>,
}

impl Signature {
    pub fn check_inputs(&self, id: CapabilityId, args: &[TaggedValue]) -> Result<()> {
        let matches = args.len() == self.inputs.len()
            && args.iter().zip(self.inputs).all(|(arg, kind)| arg.is_kind(*kind));
        if matches {
            Ok(())
        } else {
            Err(TesseraError::signature(id.as_str(), self.inputs, &kinds_of(args)))
        }
    }

    pub fn check_output(&self, id: CapabilityId, output: Option<&TaggedValue>) -> Result<()> {
        let actual = output.map(TaggedValue::kind);
        if actual == self.output {
            Ok(())
        } else {
            let expected: Vec<ValueKind> = self.output.into_iter().collect();
            let actual: Vec<ValueKind> = actual.into_iter().collect();
            Err(TesseraError::signature(id.as_str(), &expected, &actual))
        }
    }
}

/// One named, optional platform hook.
#[derive(Debug)]
pub struct CapabilityDescriptor {
    pub id: CapabilityId,
    pub module: ModuleKind,
    pub signature: Signature,
    pub default: DefaultFn,
    /// One-line description for diagnostics.
    pub summary: &'static str,
}

impl CapabilityDescriptor {
    /// Run the declared default.
    pub fn run_default(&self, args: &[TaggedValue]) -> Option<TaggedValue> {
        (self.default)(args)
    }
}

// ---------------------------------------------------------------------------
// Built-in capabilities
// ---------------------------------------------------------------------------

/// Final rendered size for a requested font size. Default: unchanged.
pub static FONT_SCALE_FIT: CapabilityDescriptor = CapabilityDescriptor {
    id: CapabilityId("font-scale-fit"),
    module: ModuleKind::Font,
    signature: Signature {
        inputs: &[ValueKind::Double],
        output: Some(ValueKind::Double),
    },
    default: default_font_scale_fit,
    summary: "scale a requested font size to the rendered size",
};

/// Platform text-scale multiplier. Default: 1.0.
pub static FONT_SCALE_FACTOR: CapabilityDescriptor = CapabilityDescriptor {
    id: CapabilityId("font-scale-factor"),
    module: ModuleKind::Font,
    signature: Signature {
        inputs: &[],
        output: Some(ValueKind::Double),
    },
    default: default_font_scale_factor,
    summary: "report the platform text-scale multiplier",
};

/// Engine log record: `[level, tag, message]`. Default: emit via `tracing`.
pub static LOG_MESSAGE: CapabilityDescriptor = CapabilityDescriptor {
    id: CapabilityId("log-message"),
    module: ModuleKind::Logging,
    signature: Signature {
        inputs: &[ValueKind::Integer, ValueKind::String, ValueKind::String],
        output: None,
    },
    default: default_log_message,
    summary: "deliver an engine log record to the platform sink",
};

/// Whether records at a level are wanted. Default: always.
pub static LOG_ENABLED: CapabilityDescriptor = CapabilityDescriptor {
    id: CapabilityId("log-enabled"),
    module: ModuleKind::Logging,
    signature: Signature {
        inputs: &[ValueKind::Integer],
        output: Some(ValueKind::Boolean),
    },
    default: default_log_enabled,
    summary: "ask the platform sink whether a log level is enabled",
};

/// Every capability the engine ships with.
pub static BUILTIN: [&CapabilityDescriptor; 4] =
    [&FONT_SCALE_FIT, &FONT_SCALE_FACTOR, &LOG_MESSAGE, &LOG_ENABLED];

fn default_font_scale_fit(args: &[TaggedValue]) -> Option<TaggedValue> {
    let size = args.first().map_or(0.0, TaggedValue::as_double);
    Some(TaggedValue::double(size))
}

fn default_font_scale_factor(_args: &[TaggedValue]) -> Option<TaggedValue> {
    Some(TaggedValue::double(1.0))
}

fn default_log_message(args: &[TaggedValue]) -> Option<TaggedValue> {
    let level = LogLevel::from_code(args.first().map_or(0, TaggedValue::as_integer));
    let tag = args.get(1).map_or("", TaggedValue::as_str);
    let message = args.get(2).map_or("", TaggedValue::as_str);
    match level {
        LogLevel::Error => error!(target: "tessera::engine", tag, "{message}"),
        LogLevel::Warn => warn!(target: "tessera::engine", tag, "{message}"),
        LogLevel::Info => info!(target: "tessera::engine", tag, "{message}"),
        LogLevel::Debug => debug!(target: "tessera::engine", tag, "{message}"),
        LogLevel::Trace => trace!(target: "tessera::engine", tag, "{message}"),
    }
    None
}

fn default_log_enabled(_args: &[TaggedValue]) -> Option<TaggedValue> {
    Some(TaggedValue::boolean(true))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The set of capabilities an engine build declares, keyed by identity.
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    by_id: BTreeMap<&'static str, &'static CapabilityDescriptor>,
}

impl CapabilityCatalog {
    /// Build a catalog, rejecting duplicate identities.
    pub fn new<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'static CapabilityDescriptor>,
    {
        let mut by_id = BTreeMap::new();
        for descriptor in descriptors {
            if by_id.insert(descriptor.id.as_str(), descriptor).is_some() {
                return Err(TesseraError::DuplicateCapability(descriptor.id.to_string()));
            }
        }
        Ok(Self { by_id })
    }

    /// The built-in capabilities.
    pub fn builtin() -> Self {
        Self {
            by_id: BUILTIN.iter().map(|d| (d.id.as_str(), *d)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'static CapabilityDescriptor> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Descriptors in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &'static CapabilityDescriptor> + '_ {
        self.by_id.values().copied()
    }

    /// Descriptors a module kind may implement.
    pub fn for_module(
        &self,
        module: ModuleKind,
    ) -> impl Iterator<Item = &'static CapabilityDescriptor> + '_ {
        self.iter().filter(move |d| d.module == module)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for CapabilityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
