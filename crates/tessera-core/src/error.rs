// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Tessera.
//
// Only contract violations live here. A kind mismatch on a value accessor is
// answered with a sentinel and an absent capability hook falls back to its
// default, so neither of those ever becomes a `TesseraError`.

use thiserror::Error;

use crate::types::{ModuleKind, ValueKind};

/// Top-level error type for all Tessera operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    // -- Capability contract --
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("duplicate capability identity: {0}")]
    DuplicateCapability(String),

    #[error("capability {capability} signature mismatch: expected {expected}, got {actual}")]
    SignatureMismatch {
        capability: String,
        expected: String,
        actual: String,
    },

    // -- Registration --
    #[error("invalid {module} module registration: {reason}")]
    InvalidRegistration { module: ModuleKind, reason: String },

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TesseraError {
    /// Build a `SignatureMismatch` from expected and actual kind lists.
    pub fn signature(capability: &str, expected: &[ValueKind], actual: &[ValueKind]) -> Self {
        Self::SignatureMismatch {
            capability: capability.to_owned(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TesseraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_message_lists_kinds() {
        let err = TesseraError::signature(
            "font-scale-fit",
            &[ValueKind::Double],
            &[ValueKind::String],
        );
        assert_eq!(
            err.to_string(),
            "capability font-scale-fit signature mismatch: expected [Double], got [String]"
        );
    }

    #[test]
    fn registration_message_names_module() {
        let err = TesseraError::InvalidRegistration {
            module: ModuleKind::Logging,
            reason: "empty module name".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid logging module registration: empty module name"
        );
    }
}
