// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tessera — desktop host
//
// Entry point. Loads the bridge config, initialises logging, registers the
// desktop platform modules and prints the resolved capability report.

mod paths;

use std::process::ExitCode;

use tessera_bridge::{Dispatcher, register_platform_modules};
use tessera_core::config::BridgeConfig;
use tessera_core::error::Result;
use tessera_core::types::LogLevel;

/// Sample sizes pushed through `font-scale-fit` at startup.
const SAMPLE_SIZES: [f64; 4] = [10.0, 14.0, 17.0, 32.0];

fn main() -> ExitCode {
    let path = paths::config_path(
        std::env::args().nth(1),
        std::env::var(paths::CONFIG_ENV).ok(),
    );

    // Logging is not up yet, so config errors go to stderr.
    let config = match BridgeConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tessera-host: {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(config = %path.display(), "Tessera host starting");

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "host failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: BridgeConfig) -> Result<()> {
    let dispatcher = Dispatcher::new(config.clone());
    register_platform_modules(&dispatcher, &config)?;

    for size in SAMPLE_SIZES {
        let fitted = dispatcher.scale_font_size(size);
        tracing::info!(size, fitted, "font-scale-fit");
    }
    tracing::info!(factor = dispatcher.font_scale_factor(), "font-scale-factor");

    dispatcher.log(LogLevel::Info, "host", "platform modules registered");
    if dispatcher.log_enabled(LogLevel::Debug) {
        dispatcher.log(LogLevel::Debug, "host", "debug records enabled");
    }

    let report = serde_json::to_string_pretty(&dispatcher.report())?;
    println!("{report}");
    Ok(())
}
