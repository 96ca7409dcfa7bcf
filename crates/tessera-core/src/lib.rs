// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tessera — Core kinds, identities and error definitions shared by the
// boundary crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::BridgeConfig;
pub use error::TesseraError;
pub use types::*;
