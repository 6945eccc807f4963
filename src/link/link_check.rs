use crate::error::{Result, ToggleError};
use log::debug;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Reports whether any filesystem entry sits at `path`.
///
/// The link itself is inspected, never what it points to, so a dangling
/// symlink still counts as present.
///
/// # Arguments
///
/// * `path` - Absolute path of the entry to look for
///
/// # Returns
///
/// * `Ok(false)` - The filesystem reported "not found"
/// * `Ok(true)` - Something (file, directory, symlink) is there
/// * `Err(ToggleError::Query)` - The query failed for any other reason
pub async fn link_exists(path: &Path) -> Result<bool> {
    if path.as_os_str().is_empty() {
        return Err(ToggleError::InvalidPath("cannot query an empty path".into()));
    }

    match fs::symlink_metadata(path).await {
        Ok(metadata) => {
            debug!(
                "{} exists (symlink: {})",
                path.display(),
                metadata.file_type().is_symlink()
            );
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist", path.display());
            Ok(false)
        }
        Err(e) => Err(ToggleError::Query {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
