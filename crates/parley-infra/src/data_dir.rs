//! Data directory resolution.

use std::path::PathBuf;

/// Resolve the Parley data directory.
///
/// Precedence: `PARLEY_DATA_DIR` env var, then `~/.parley`, then
/// `./.parley` as a last resort.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}
