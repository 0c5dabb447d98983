// src/infra/paths.rs — Config path resolution
//
// LUMIERE_HOME overrides everything; otherwise config lives in ~/.lumiere/.

use std::path::PathBuf;

/// Returns the LUMIERE_HOME override, if set.
fn lumiere_home() -> Option<PathBuf> {
    std::env::var_os("LUMIERE_HOME").map(PathBuf::from)
}

/// Configuration directory: $LUMIERE_HOME/ or ~/.lumiere/
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = lumiere_home() {
        return Some(home);
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".lumiere"))
}

/// Config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
