// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Tessera — native boundary between the shared UI engine and the host
//! platform.
//!
//! Two halves:
//!
//! * the value bridge ([`value`], [`abi`]): tagged scalars with total,
//!   sentinel-returning accessors and a `#[repr(C)]` handle lent for the
//!   duration of one call;
//! * the capability protocol ([`capability`], [`traits`], [`adapter`],
//!   [`registry`], [`dispatch`]): optional platform hooks, each with a
//!   declared default, resolved per call against the registered modules.
//!
//! Hosts create one [`Dispatcher`] during startup, register their modules and
//! hand the dispatcher to the engine.

pub mod abi;
pub mod adapter;
pub mod capability;
pub mod dispatch;
pub mod registry;
pub mod traits;
pub mod value;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod desktop;

pub use dispatch::{BridgeReport, Dispatcher};
pub use registry::{ModuleRegistry, Registration};
pub use value::TaggedValue;

use tessera_core::config::BridgeConfig;
use tessera_core::error::Result;

/// Registers the modules this target provides from Rust.
///
/// On desktop/CI that is the config-driven font policy and the `tracing` log
/// sink. On iOS and Android the host registers natively implemented modules
/// itself and nothing is registered here.
pub fn register_platform_modules(dispatcher: &Dispatcher, config: &BridgeConfig) -> Result<()> {
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        dispatcher.register_font_module(desktop::DesktopFontModule::new(&config.font))?;
        dispatcher.register_log_module(desktop::TracingLogModule::new(config.min_log_level))?;
    }
    #[cfg(any(target_os = "ios", target_os = "android"))]
    {
        let _ = (dispatcher, config);
        tracing::debug!("platform modules are registered by the native host");
    }
    Ok(())
}
