//! Symlink settings
//!
//! The two user-editable fields, their description for whatever UI renders
//! them, and the JSON file they are persisted in.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use format_serde_error::SerdeError;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Settings Struct
///
/// Every key missing from the persisted data falls back to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// What the symlink points at
    pub symlink_target: String,

    /// Where the symlink lives, relative to the vault root
    pub symlink_path: String,
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::SymlinkTarget => &self.symlink_target,
            SettingKey::SymlinkPath => &self.symlink_path,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: String) {
        match key {
            SettingKey::SymlinkTarget => self.symlink_target = value,
            SettingKey::SymlinkPath => self.symlink_path = value,
        }
    }
}

/// Identifies one settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    SymlinkTarget,
    SymlinkPath,
}

/// How a settings field is presented to the user
#[derive(Debug, Clone, Copy)]
pub struct SettingField {
    pub key: SettingKey,
    pub name: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
}

/// Fields in the order they are shown
pub const SETTING_FIELDS: [SettingField; 2] = [
    SettingField {
        key: SettingKey::SymlinkTarget,
        name: "Symlink target",
        description: "The path (directory) to be symlinked",
        placeholder: "...",
    },
    SettingField {
        key: SettingKey::SymlinkPath,
        name: "Symlink path",
        description: "The location to create the symlink",
        placeholder: "...",
    },
];

/// JSON file the settings are persisted in
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location of the settings file inside a vault
    pub fn in_vault(vault: &Path) -> Self {
        Self::new(vault.join(".symtog").join("data.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted settings, merged over the defaults
    ///
    /// A missing file yields the defaults.
    pub async fn load(&self) -> Result<Settings> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| {
                    format!("Failed to read settings file {}", self.path.display())
                });
            }
        };

        serde_json::from_str(&data)
            .map_err(|err| SerdeError::new(data, err))
            .wrap_err_with(|| format!("Failed to deserialize settings file {}", self.path.display()))
    }

    /// Write the settings, creating parent directories as needed
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .wrap_err("Failed to create settings directory")?;
        }

        let data = serde_json::to_string_pretty(settings)
            .wrap_err_with(|| format!("Failed to serialize settings: {settings:?}"))?;

        fs::write(&self.path, data)
            .await
            .wrap_err_with(|| format!("Failed to write settings file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::in_vault(dir.path());

        assert_eq!(store.load().await?, Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_persisted_values_merge_over_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::new(dir.path().join("data.json"));
        std::fs::write(store.path(), r#"{ "symlinkPath": "link", "other": 1 }"#)?;

        let settings = store.load().await?;
        assert_eq!(settings.symlink_path, "link");
        assert_eq!(settings.symlink_target, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::in_vault(dir.path());
        let settings = Settings {
            symlink_target: "/data/real".into(),
            symlink_path: "link".into(),
        };

        store.save(&settings).await?;
        let raw = std::fs::read_to_string(store.path())?;
        assert!(raw.contains(r#""symlinkTarget": "/data/real""#));
        assert_eq!(store.load().await?, settings);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::new(dir.path().join("data.json"));
        std::fs::write(store.path(), "{ not json")?;

        assert!(store.load().await.is_err());
        Ok(())
    }

    #[test]
    fn test_fields_cover_every_key() {
        let mut settings = Settings::default();
        for (i, field) in SETTING_FIELDS.iter().enumerate() {
            settings.set(field.key, i.to_string());
            assert_eq!(settings.get(field.key), i.to_string());
        }
        assert_eq!(settings.symlink_target, "0");
        assert_eq!(settings.symlink_path, "1");
    }
}
