// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Tessera boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag of a scalar value crossing the boundary.
///
/// Discriminants are part of the binary contract with independently built
/// platform code and must never be renumbered. New kinds take the next free
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ValueKind {
    /// Null or poisoned raw handle. No `TaggedValue` ever carries this kind.
    Invalid = 0,
    String = 1,
    Integer = 2,
    Double = 3,
    Boolean = 4,
}

impl ValueKind {
    /// Stable numeric code used on the C ABI.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode an ABI code. Unknown codes decode to `Invalid`.
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::String,
            2 => Self::Integer,
            3 => Self::Double,
            4 => Self::Boolean,
            _ => Self::Invalid,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Identity of a platform module. Each kind is its own registry namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Font handling (size scaling policy).
    Font,
    /// Logging sink.
    Logging,
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Font => f.write_str("font"),
            Self::Logging => f.write_str("logging"),
        }
    }
}

/// Stable name of a capability, e.g. `"font-scale-fit"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CapabilityId(pub &'static str);

impl CapabilityId {
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Unique identifier of one module registration.
///
/// A re-registration of the same module kind gets a fresh id, which lets
/// diagnostics tell an old registration from its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub Uuid);

impl RegistrationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a log record passed to the logging capability.
///
/// Ordered from most to least severe, so `level <= threshold` means
/// "at least as severe as the threshold".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Integer code carried in the `log-message` capability arguments.
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Decode a level code. Unknown codes are treated as `Info`.
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Error,
            2 => Self::Warn,
            4 => Self::Debug,
            5 => Self::Trace,
            _ => Self::Info,
        }
    }
}
