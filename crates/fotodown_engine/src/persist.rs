use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path} unusable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Resolve the output directory to an absolute path, creating it if missing.
///
/// An empty path means the current working directory.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf, PersistError> {
    let requested = if dir.as_os_str().is_empty() {
        std::env::current_dir()?
    } else {
        dir.to_path_buf()
    };
    let absolute = std::path::absolute(&requested)?;

    let unusable = |reason: String| PersistError::OutputDir {
        path: absolute.clone(),
        reason,
    };

    match fs::symlink_metadata(&absolute) {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(&absolute).map_err(|e| unusable(e.to_string()))?;
        }
        Err(err) => return Err(unusable(err.to_string())),
    }

    let meta = fs::metadata(&absolute).map_err(|e| unusable(e.to_string()))?;
    if !meta.is_dir() {
        return Err(unusable("not a directory".into()));
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(&absolute).map_err(|e| unusable(e.to_string()))?;
    Ok(absolute)
}
