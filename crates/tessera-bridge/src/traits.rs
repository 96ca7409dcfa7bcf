// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic hook surfaces, one trait per module kind.
//
// Every hook is optional. A hook accessor returns `Some(method)` when the
// module implements the capability and keeps the provided `None` otherwise.
// The accessors are probed once, when the module is registered; the engine
// never asks again per call.

use tessera_core::types::LogLevel;

/// `font-scale-fit`: requested size to rendered size.
pub type FontScaleFitHook<M> = fn(&M, f64) -> f64;

/// `font-scale-factor`: platform text-scale multiplier.
pub type FontScaleFactorHook<M> = fn(&M) -> f64;

/// `log-message`: level, tag, message.
pub type LogMessageHook<M> = fn(&M, LogLevel, &str, &str);

/// `log-enabled`: whether records at a level are wanted.
pub type LogEnabledHook<M> = fn(&M, LogLevel) -> bool;

/// Font handling supplied by the platform.
///
/// ```ignore
/// struct LargeText;
///
/// impl LargeText {
///     fn fit(&self, size: f64) -> f64 {
///         size * 1.3
///     }
/// }
///
/// impl FontModule for LargeText {
///     fn name(&self) -> &str {
///         "large-text"
///     }
///
///     fn font_scale_fit(&self) -> Option<FontScaleFitHook<Self>> {
///         Some(Self::fit)
///     }
/// }
/// ```
pub trait FontModule: Send + Sync + Sized + 'static {
    /// Human-readable module name (e.g. "UIKit fonts").
    fn name(&self) -> &str;

    fn font_scale_fit(&self) -> Option<FontScaleFitHook<Self>> {
        None
    }

    fn font_scale_factor(&self) -> Option<FontScaleFactorHook<Self>> {
        None
    }
}

/// Logging sink supplied by the platform.
pub trait LogModule: Send + Sync + Sized + 'static {
    /// Human-readable module name (e.g. "logcat").
    fn name(&self) -> &str;

    fn log_message(&self) -> Option<LogMessageHook<Self>> {
        None
    }

    fn log_enabled(&self) -> Option<LogEnabledHook<Self>> {
        None
    }
}
