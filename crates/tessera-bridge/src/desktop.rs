// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop/CI platform modules.
//
// Mobile hosts register their own modules from native code. On desktop the
// engine still wants a real font policy and a log sink, so these two modules
// implement every built-in hook from the boundary config.

use tessera_core::config::FontConfig;
use tessera_core::types::LogLevel;
use tracing::{debug, error, info, trace, warn};

use crate::traits::{
    FontModule, FontScaleFactorHook, FontScaleFitHook, LogEnabledHook, LogMessageHook, LogModule,
};

/// Scales every requested size by a fixed factor, clamped to a size range.
#[derive(Debug, Clone)]
pub struct DesktopFontModule {
    scale: f64,
    min_size: f64,
    max_size: f64,
}

impl DesktopFontModule {
    pub fn new(config: &FontConfig) -> Self {
        Self {
            scale: config.scale,
            min_size: config.min_size,
            max_size: config.max_size,
        }
    }

    fn fit(&self, size: f64) -> f64 {
        if !size.is_finite() {
            return self.min_size;
        }
        // Not `clamp`: an unvalidated config may carry inverted bounds.
        (size * self.scale).min(self.max_size).max(self.min_size)
    }

    fn factor(&self) -> f64 {
        self.scale
    }
}

impl FontModule for DesktopFontModule {
    fn name(&self) -> &str {
        "desktop-font"
    }

    fn font_scale_fit(&self) -> Option<FontScaleFitHook<Self>> {
        Some(Self::fit)
    }

    fn font_scale_factor(&self) -> Option<FontScaleFactorHook<Self>> {
        Some(Self::factor)
    }
}

/// Forwards engine log records to `tracing` under the `tessera::platform`
/// target, dropping anything less severe than `min_level`.
#[derive(Debug, Clone)]
pub struct TracingLogModule {
    min_level: LogLevel,
}

impl TracingLogModule {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    fn emit(&self, level: LogLevel, tag: &str, message: &str) {
        if !self.enabled(level) {
            return;
        }
        match level {
            LogLevel::Error => error!(target: "tessera::platform", tag, "{message}"),
            LogLevel::Warn => warn!(target: "tessera::platform", tag, "{message}"),
            LogLevel::Info => info!(target: "tessera::platform", tag, "{message}"),
            LogLevel::Debug => debug!(target: "tessera::platform", tag, "{message}"),
            LogLevel::Trace => trace!(target: "tessera::platform", tag, "{message}"),
        }
    }
}

impl LogModule for TracingLogModule {
    fn name(&self) -> &str {
        "tracing"
    }

    fn log_message(&self) -> Option<LogMessageHook<Self>> {
        Some(Self::emit)
    }

    fn log_enabled(&self) -> Option<LogEnabledHook<Self>> {
        Some(Self::enabled)
    }
}
