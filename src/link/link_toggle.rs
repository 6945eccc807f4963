use crate::error::{Mutation, Result, ToggleError};
use crate::host::{Notifier, VaultAdapter};
use crate::link::link_check::link_exists;
use crate::link::resolve_link_path;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// What a successful toggle did to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A symlink now sits at `link`, pointing at `target`
    Created { link: PathBuf, target: PathBuf },
    /// The entry at `link` was removed
    Removed { link: PathBuf },
}

impl ToggleOutcome {
    /// Whether the link is present after the toggle
    pub fn is_present(&self) -> bool {
        matches!(self, ToggleOutcome::Created { .. })
    }
}

impl fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleOutcome::Created { link, target } => write!(
                f,
                "Symlink created: {} -> {}",
                link.display(),
                target.display()
            ),
            ToggleOutcome::Removed { .. } => f.write_str("Symlink deleted"),
        }
    }
}

/// Creates the link if it is absent, removes whatever is at `link` otherwise.
///
/// Performs at most one existence query and at most one mutation. When the
/// query fails nothing is mutated.
///
/// # Arguments
///
/// * `target` - What the new symlink should point at
/// * `link` - Absolute path of the symlink itself
pub async fn toggle_link(target: &Path, link: &Path) -> Result<ToggleOutcome> {
    if link_exists(link).await? {
        return remove_link(link).await;
    }
    create_link(target, link).await
}

/// The remove branch of [`toggle_link`]
pub(crate) async fn remove_link(link: &Path) -> Result<ToggleOutcome> {
    debug!("removing {}", link.display());
    fs::remove_file(link)
        .await
        .map_err(|e| ToggleError::Mutation {
            action: Mutation::Remove,
            path: link.to_path_buf(),
            source: e,
        })?;

    Ok(ToggleOutcome::Removed {
        link: link.to_path_buf(),
    })
}

/// The create branch of [`toggle_link`]
///
/// Fails if anything appeared at `link` after it was last seen absent.
pub(crate) async fn create_link(target: &Path, link: &Path) -> Result<ToggleOutcome> {
    if target.as_os_str().is_empty() {
        return Err(ToggleError::InvalidPath("symlink target is empty".into()));
    }

    debug!("linking {} -> {}", link.display(), target.display());
    fs::symlink(target, link)
        .await
        .map_err(|e| ToggleError::Mutation {
            action: Mutation::Create,
            path: link.to_path_buf(),
            source: e,
        })?;

    Ok(ToggleOutcome::Created {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
    })
}

/// Sends a toggle result to `notifier`, handing back the outcome on success
pub(crate) fn report(
    result: Result<ToggleOutcome>,
    symlink_path: &str,
    notifier: &dyn Notifier,
) -> Option<ToggleOutcome> {
    match result {
        Ok(outcome) => {
            info!("{outcome}");
            notifier.notice(&outcome.to_string());
            Some(outcome)
        }
        Err(e) => {
            warn!("toggle of {symlink_path:?} failed: {e}");
            notifier.error(&format!("Symlink toggle error: {e}"));
            None
        }
    }
}

/// Runs toggles one at a time and reports every outcome to a notifier.
#[derive(Debug, Default)]
pub struct LinkToggle {
    in_flight: Mutex<()>,
}

impl LinkToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles the link at the vault-relative `symlink_path`.
    ///
    /// Success and failure both end up as a notice; the returned outcome is
    /// only there so callers can refresh cached state.
    pub async fn toggle(
        &self,
        adapter: &dyn VaultAdapter,
        target: &str,
        symlink_path: &str,
        notifier: &dyn Notifier,
    ) -> Option<ToggleOutcome> {
        let result = self.try_toggle(adapter, target, symlink_path).await;
        report(result, symlink_path, notifier)
    }

    /// Same as [`LinkToggle::toggle`] but hands the error back instead of
    /// notifying.
    ///
    /// A second call while one is still running fails with
    /// `ToggleError::Busy` instead of racing the first.
    pub async fn try_toggle(
        &self,
        adapter: &dyn VaultAdapter,
        target: &str,
        symlink_path: &str,
    ) -> Result<ToggleOutcome> {
        let _guard = self.in_flight.try_lock().map_err(|_| ToggleError::Busy)?;
        let link = resolve_link_path(adapter, symlink_path)?;

        toggle_link(Path::new(target), &link).await
    }
}
