//! Filesystem helpers: search-path resolution and scoped file reads/writes.
//!
//! Every handle lives only inside a single `std::fs` call, so it is closed
//! before control returns to the caller, error or not.

use std::path::{Path, PathBuf};

use crate::error::EnvfigError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Resolve all search paths, skipping those that cannot be resolved.
/// Order is preserved (priority-ascending).
pub fn expand_search_paths(search_paths: &[SearchPath], app_name: &str) -> Vec<PathBuf> {
    search_paths
        .iter()
        .filter_map(|sp| resolve_search_path(sp, app_name))
        .collect()
}

/// Find `relative` in `dirs`, checking the highest-priority (last) directory
/// first. Returns the first existing file.
pub fn find_file(dirs: &[PathBuf], relative: &str) -> Option<PathBuf> {
    dirs.iter()
        .rev()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}

/// Read a file, treating a missing file as `None`. Other I/O errors propagate.
pub fn read_optional(path: &Path) -> Result<Option<String>, EnvfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EnvfigError::io(path, e)),
    }
}

/// Write a file, creating parent directories if needed.
pub fn write_file(path: &Path, content: &str) -> Result<(), EnvfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| EnvfigError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| EnvfigError::io(path, e))
}
