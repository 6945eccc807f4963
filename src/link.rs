pub mod link_check;
pub mod link_toggle;


use crate::error::{Result, ToggleError};
use crate::host::VaultAdapter;
use std::path::{Component, Path, PathBuf};

/// Resolves the vault-relative `symlink_path` to an absolute path on disk.
///
/// The path is concatenated onto the vault root as-is, with any leading `/`
/// dropped. Paths that climb out with `..` are refused, so the result always
/// lies strictly inside the vault.
///
/// # Errors
///
/// * `ToggleError::Configuration` - the vault has no filesystem root
/// * `ToggleError::InvalidPath` - the path is empty, names the root itself or
///   leaves the vault
pub fn resolve_link_path(adapter: &dyn VaultAdapter, symlink_path: &str) -> Result<PathBuf> {
    let base = adapter.base_path().ok_or_else(|| {
        ToggleError::Configuration("vault is not backed by a filesystem".into())
    })?;

    let relative = Path::new(symlink_path.trim_start_matches('/'));
    let mut named = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ToggleError::InvalidPath(format!(
                    "symlink path {symlink_path:?} leaves the vault"
                )));
            }
        }
    }

    if !named {
        return Err(ToggleError::InvalidPath(format!(
            "symlink path {symlink_path:?} resolves to the vault root"
        )));
    }

    Ok(base.join(relative))
}
