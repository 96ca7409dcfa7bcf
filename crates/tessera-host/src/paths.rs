// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config file resolution for the desktop host.

use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TESSERA_CONFIG";

const CONFIG_FILE: &str = "config.json";

/// Pick the config file: explicit argument, then `TESSERA_CONFIG`, then the
/// conventional per-user location. A blank source counts as unset.
pub fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.filter(|p| is_set(p))
        .or_else(|| env.filter(|p| is_set(p)))
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join(CONFIG_FILE))
}

fn is_set(path: &str) -> bool {
    !path.trim().is_empty()
}

/// Per-user config directory. Not created; a missing file means defaults.
fn config_dir() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("tessera");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("tessera");
    }
    // Last resort
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_beats_environment() {
        let path = config_path(Some("a.json".into()), Some("b.json".into()));
        assert_eq!(path, PathBuf::from("a.json"));
    }

    #[test]
    fn environment_used_without_argument() {
        let path = config_path(None, Some("/etc/tessera.json".into()));
        assert_eq!(path, PathBuf::from("/etc/tessera.json"));
    }

    #[test]
    fn blank_argument_defers_to_environment() {
        let path = config_path(Some(String::new()), Some("/etc/tessera.json".into()));
        assert_eq!(path, PathBuf::from("/etc/tessera.json"));

        let path = config_path(Some(" \t".into()), Some("/etc/tessera.json".into()));
        assert_eq!(path, PathBuf::from("/etc/tessera.json"));
    }

    #[test]
    fn blank_falls_back_to_user_dir() {
        let path = config_path(Some("  ".into()), None);
        assert!(path.ends_with(CONFIG_FILE));

        let path = config_path(None, Some(String::new()));
        assert!(path.ends_with(CONFIG_FILE));
    }
}
