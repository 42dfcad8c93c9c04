use std::fs::{self, File};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("store {path:?} has no containing directory")]
    NoParentDir { path: PathBuf },
    #[error("failed to stage rebuilt contents for {path:?}: {source}")]
    Stage { path: PathBuf, source: io::Error },
    #[error("failed to move rebuilt contents into place at {path:?}: {source}")]
    Replace {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Replace the full contents of a store file.
///
/// The rebuilt text is staged in a temp file inside the store's own
/// directory (same filesystem, so the final rename is atomic), synced to
/// disk, given `mode`, then renamed over the original. At every point the
/// store holds either its previous bytes or the complete new contents; a
/// torn file is never observable.
pub fn replace_file(path: &Path, contents: &str, mode: u32) -> Result<(), CommitError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| CommitError::NoParentDir {
            path: path.to_path_buf(),
        })?;
    if !parent.is_dir() {
        return Err(CommitError::NoParentDir {
            path: path.to_path_buf(),
        });
    }

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| CommitError::Stage {
        path: path.to_path_buf(),
        source: e,
    })?;
    staged
        .write_all(contents.as_bytes())
        .map_err(|e| CommitError::Stage {
            path: path.to_path_buf(),
            source: e,
        })?;
    staged.as_file().sync_all().map_err(|e| CommitError::Stage {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::set_permissions(staged.path(), fs::Permissions::from_mode(mode)).map_err(|e| {
        CommitError::Stage {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    debug!(store = ?path, "committing rebuilt store file");
    staged.persist(path).map_err(|e| CommitError::Replace {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Persist the directory entry too, not just the file contents.
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}
