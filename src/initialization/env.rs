//! `.env` loading.

use std::path::{Path, PathBuf};

/// Loads `.env` from the working directory (or a parent), falling back to
/// the executable's directory. Returns the file that was loaded, if any.
///
/// Runs before the logger exists, so read failures go to stderr.
pub fn load_env_file() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let exe = std::env::current_exe().ok()?;
    load_env_from(exe.parent()?)
}

/// Loads `dir/.env` if it exists.
fn load_env_from(dir: &Path) -> Option<PathBuf> {
    let env_path = dir.join(".env");
    if !env_path.exists() {
        return None;
    }
    match dotenvy::from_path(&env_path) {
        Ok(()) => Some(env_path),
        Err(e) => {
            eprintln!("ip_ranges warning: failed to read {}: {e}", env_path.display());
            None
        }
    }
}
