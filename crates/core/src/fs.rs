//! Filesystem utilities

use std::fs;
use std::path::Path;

use log::info;

/// Create the parent directory of a file (and all of its ancestors) if missing
///
/// Bare file names resolve to the current directory and are left alone.
pub fn create_parent_dir(file_path: &Path) -> std::io::Result<()> {
    match file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => create_dir_all(parent),
        None => Ok(()),
    }
}

/// Create a directory and all parent directories if they don't exist
///
/// This is a wrapper around `std::fs::create_dir_all` with logging.
pub fn create_dir_all(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}
