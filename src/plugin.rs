//! Plugin lifecycle
//!
//! Ties the settings, the toggle and the status indicator to the collaborators
//! a host provides. All state lives in the [`PluginHandle`] returned by
//! [`start`] and is released by [`stop`].

use eyre::{Context, Result};
use log::{debug, info};

use crate::{
    error::{self, ToggleError},
    host::Host,
    link::{
        link_check::link_exists,
        link_toggle::{LinkToggle, ToggleOutcome},
        resolve_link_path,
    },
    settings::{SettingKey, Settings, SettingsStore},
    status::StatusIndicator,
};

/// A running plugin instance
pub struct PluginHandle {
    host: Host,
    store: SettingsStore,
    settings: Settings,
    toggle: LinkToggle,
    status: StatusIndicator,
}

/// Load the settings and render the initial presence state
///
/// A failing presence query is reported as a notice rather than aborting the
/// start; an unset symlink path just leaves the status blank.
pub async fn start(host: Host, store: SettingsStore) -> Result<PluginHandle> {
    let settings = store
        .load()
        .await
        .wrap_err("Failed to load symlink settings")?;
    debug!("loaded settings {settings:?}");

    let handle = PluginHandle {
        host,
        store,
        settings,
        toggle: LinkToggle::new(),
        status: StatusIndicator::default(),
    };

    match handle.refresh_status().await {
        Ok(present) => debug!("initial presence: {present}"),
        Err(ToggleError::InvalidPath(reason)) => debug!("status left blank: {reason}"),
        Err(e) => handle
            .host
            .notifier
            .error(&format!("Symlink status error: {e}")),
    }

    info!("symlink toggle started");
    Ok(handle)
}

/// Tear down a plugin instance
pub fn stop(handle: PluginHandle) {
    handle.status.clear(handle.host.status.as_ref());
    info!("symlink toggle stopped");
}

impl PluginHandle {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cached presence, `None` until it could be determined
    pub fn present(&self) -> Option<bool> {
        self.status.present()
    }

    /// Update one settings field and persist the result immediately
    pub async fn on_change(&mut self, key: SettingKey, value: String) -> Result<()> {
        self.settings.set(key, value);
        self.store
            .save(&self.settings)
            .await
            .wrap_err_with(|| format!("Failed to persist {key:?}"))
    }

    /// Toggle the link with the current settings
    ///
    /// The outcome is always reported through the host's notifier; on success
    /// the status indicator is refreshed as well.
    pub async fn toggle(&self) -> Option<ToggleOutcome> {
        let outcome = self
            .toggle
            .toggle(
                self.host.adapter.as_ref(),
                &self.settings.symlink_target,
                &self.settings.symlink_path,
                self.host.notifier.as_ref(),
            )
            .await?;

        self.status
            .update(outcome.is_present(), self.host.status.as_ref());
        Some(outcome)
    }

    /// Query the filesystem and re-render the status indicator
    pub async fn refresh_status(&self) -> error::Result<bool> {
        let link = resolve_link_path(self.host.adapter.as_ref(), &self.settings.symlink_path)?;
        let present = link_exists(&link).await?;

        self.status.update(present, self.host.status.as_ref());
        Ok(present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DetachedAdapter, FileSystemAdapter, NoticeLog, StatusLine};
    use tempfile::tempdir;

    fn host(adapter: impl crate::host::VaultAdapter + 'static) -> (Host, NoticeLog, StatusLine) {
        let notices = NoticeLog::default();
        let status = StatusLine::default();
        let host = Host {
            adapter: Box::new(adapter),
            notifier: Box::new(notices.clone()),
            status: Box::new(status.clone()),
        };
        (host, notices, status)
    }

    #[tokio::test]
    async fn test_start_renders_initial_status() -> Result<()> {
        let vault = tempdir()?;
        let store = SettingsStore::in_vault(vault.path());
        store
            .save(&Settings {
                symlink_target: "/data/real".into(),
                symlink_path: "link".into(),
            })
            .await?;
        std::os::unix::fs::symlink("/data/real", vault.path().join("link"))?;

        let (host, notices, status) = host(FileSystemAdapter::new(vault.path()));
        let plugin = start(host, store).await?;

        assert_eq!(plugin.present(), Some(true));
        assert_eq!(status.text(), "Symlink: present");
        assert!(notices.messages().is_empty());

        stop(plugin);
        assert_eq!(status.text(), "");
        Ok(())
    }

    #[tokio::test]
    async fn test_start_with_unset_path_is_quiet() -> Result<()> {
        let vault = tempdir()?;
        let (host, notices, status) = host(FileSystemAdapter::new(vault.path()));

        let plugin = start(host, SettingsStore::in_vault(vault.path())).await?;

        assert_eq!(plugin.present(), None);
        assert_eq!(status.text(), "");
        assert!(notices.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_edits_persist_and_drive_the_toggle() -> Result<()> {
        let vault = tempdir()?;
        let store = SettingsStore::in_vault(vault.path());
        let (host, notices, status) = host(FileSystemAdapter::new(vault.path()));
        let mut plugin = start(host, store.clone()).await?;

        plugin
            .on_change(SettingKey::SymlinkTarget, "/data/real".into())
            .await?;
        plugin.on_change(SettingKey::SymlinkPath, "link".into()).await?;
        assert_eq!(store.load().await?, *plugin.settings());

        let created = plugin.toggle().await;
        assert!(matches!(created, Some(ToggleOutcome::Created { .. })));
        assert_eq!(status.text(), "Symlink: present");

        let removed = plugin.toggle().await;
        assert!(matches!(removed, Some(ToggleOutcome::Removed { .. })));
        assert_eq!(status.text(), "Symlink: clear");

        let link = vault.path().join("link");
        assert_eq!(
            notices.messages(),
            [
                format!("Symlink created: {} -> /data/real", link.display()),
                "Symlink deleted".to_owned(),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_toggle_leaves_status_untouched() -> Result<()> {
        let vault = tempdir()?;
        let store = SettingsStore::in_vault(vault.path());
        store
            .save(&Settings {
                symlink_target: "/data/real".into(),
                symlink_path: "missing/link".into(),
            })
            .await?;
        let (host, notices, status) = host(FileSystemAdapter::new(vault.path()));
        let plugin = start(host, store).await?;
        assert_eq!(status.text(), "Symlink: clear");

        assert!(plugin.toggle().await.is_none());
        assert_eq!(status.text(), "Symlink: clear");
        assert_eq!(plugin.present(), Some(false));

        let messages = notices.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Symlink toggle error: failed to create symlink"));
        Ok(())
    }

    #[tokio::test]
    async fn test_detached_vault_reports_configuration_error() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::in_vault(dir.path());
        store
            .save(&Settings {
                symlink_target: "/data/real".into(),
                symlink_path: "link".into(),
            })
            .await?;
        let (host, notices, _status) = host(DetachedAdapter);

        let plugin = start(host, store).await?;
        assert!(plugin.toggle().await.is_none());

        let messages = notices.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Symlink status error: configuration error"));
        assert_eq!(
            messages[1],
            "Symlink toggle error: configuration error: vault is not backed by a filesystem"
        );
        Ok(())
    }
}
