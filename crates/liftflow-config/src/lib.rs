pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable naming the project file directly
pub const CONFIG_PATH_ENV: &str = "LIFTFLOW_CONFIG_PATH";

/// Project-local directory holding state and, optionally, the project file
pub const PROJECT_DIR: &str = ".liftflow";

const CANDIDATES: [&str; 4] = [
    "liftflow.local.kdl",
    ".liftflow.local.kdl",
    "liftflow.kdl",
    ".liftflow.kdl",
];

/// Locate the project file
///
/// Search order:
/// 1. `explicit` (from `--config`), which must exist
/// 2. `LIFTFLOW_CONFIG_PATH`
/// 3. current directory: liftflow.local.kdl, .liftflow.local.kdl, liftflow.kdl, .liftflow.kdl
/// 4. `./.liftflow/` with the same names
/// 5. `~/.config/liftflow/liftflow.kdl`
pub fn find_project_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ExplicitPathMissing(path.to_path_buf()));
    }

    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points at {}, which does not exist; searching instead",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir()
        && let Some(path) = find_in(&project_dir)
    {
        return Ok(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("liftflow").join("liftflow.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ProjectFileNotFound)
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}
