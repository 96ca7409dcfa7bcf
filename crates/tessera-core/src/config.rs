// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::types::LogLevel;

/// Settings for the boundary layer and the desktop platform modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Poison raw value handles when their lending scope ends, so that a
    /// retained handle reads as `Invalid` instead of dangling memory.
    pub poison_lent_handles: bool,
    /// Panic on contract violations (unknown capability) instead of
    /// returning an error.
    pub strict_contracts: bool,
    /// `tracing` filter used by the host when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Least severe level the desktop logging module forwards.
    pub min_log_level: LogLevel,
    /// Desktop font scaling policy.
    pub font: FontConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poison_lent_handles: cfg!(debug_assertions),
            strict_contracts: false,
            log_filter: "info".into(),
            min_log_level: LogLevel::Info,
            font: FontConfig::default(),
        }
    }
}

/// Font scaling policy applied by the desktop font module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Multiplier applied to every requested size.
    pub scale: f64,
    /// Smallest size ever returned.
    pub min_size: f64,
    /// Largest size ever returned.
    pub max_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            min_size: 1.0,
            max_size: 512.0,
        }
    }
}

impl BridgeConfig {
    /// Load a config from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Reject settings the font policy cannot honour.
    pub fn validate(&self) -> Result<()> {
        let font = &self.font;
        if !font.scale.is_finite() || font.scale <= 0.0 {
            return Err(TesseraError::Config(format!(
                "font.scale must be a positive number, got {}",
                font.scale
            )));
        }
        let finite = font.min_size.is_finite() && font.max_size.is_finite();
        if !finite || font.min_size > font.max_size {
            return Err(TesseraError::Config(format!(
                "font size bounds are inverted or not finite: {}..{}",
                font.min_size, font.max_size
            )));
        }
        Ok(())
    }
}
