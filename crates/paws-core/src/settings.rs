//! Application settings
//!
//! Non-sensitive configuration kept in a plain JSON file next to the
//! database. Nothing secret (passphrase, key, passwords) is ever written here.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credential::{ListQuery, SortKey};
use crate::error::{PawsError, Result};
use crate::generator::GeneratorOptions;

const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_DATABASE: &str = "paws.db";

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Database file; relative paths resolve against the data directory
    pub database_path: Option<PathBuf>,
    /// Defaults for newly generated passwords
    pub generator: GeneratorOptions,
    /// How long a copied password may stay on the clipboard (0 = forever).
    /// Enforced by the front-end, not by the store.
    pub clipboard_clear_seconds: u64,
    /// Initial ordering of the credential list
    pub default_sort: SortKey,
    pub default_ascending: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            database_path: None,
            generator: GeneratorOptions::default(),
            clipboard_clear_seconds: 180,
            default_sort: SortKey::Id,
            default_ascending: true,
        }
    }
}

impl Settings {
    /// List query matching the configured default ordering
    pub fn default_query(&self) -> ListQuery {
        ListQuery::sorted(self.default_sort, self.default_ascending)
    }
}

/// Loads and saves [`Settings`] in a data directory
#[derive(Debug)]
pub struct SettingsManager {
    data_dir: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Settings for the platform data directory, creating it if needed
    pub fn new() -> Result<Self> {
        Self::with_dir(default_data_dir()?)
    }

    /// Settings stored in `data_dir`
    pub fn with_dir(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let settings = load_from_file(&data_dir.join(SETTINGS_FILE))?;

        Ok(Self { data_dir, settings })
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Replace settings and save
    pub fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save()
    }

    /// Write settings to disk
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;
        let path = self.settings_file();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &path)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Resolved database path
    pub fn database_path(&self) -> PathBuf {
        match &self.settings.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(DEFAULT_DATABASE),
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "raccon", "paws")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PawsError::StorageError("Could not determine data directory".to_string()))
}

fn load_from_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("No settings file found, using defaults");
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::with_dir(temp_dir.path().to_path_buf()).unwrap();

        let settings = manager.get();
        assert_eq!(settings.clipboard_clear_seconds, 180);
        assert_eq!(settings.generator.length, 16);
        assert_eq!(settings.default_query(), ListQuery::default());
        assert_eq!(manager.database_path(), temp_dir.path().join("paws.db"));
    }

    #[test]
    fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::with_dir(temp_dir.path().to_path_buf()).unwrap();
            manager.get_mut().generator.length = 24;
            manager.get_mut().generator.symbols = false;
            manager.get_mut().default_sort = SortKey::UpdatedAt;
            manager.get_mut().default_ascending = false;
            manager.save().unwrap();
        }

        let manager = SettingsManager::with_dir(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.get().generator.length, 24);
        assert!(!manager.get().generator.symbols);
        assert_eq!(
            manager.get().default_query(),
            ListQuery::sorted(SortKey::UpdatedAt, false)
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{ "databasePath": "vault/other.db", "generator": { "length": 32 } }"#,
        )
        .unwrap();

        let manager = SettingsManager::with_dir(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.get().generator.length, 32);
        assert!(manager.get().generator.digits);
        assert_eq!(manager.get().clipboard_clear_seconds, 180);
        assert_eq!(
            manager.database_path(),
            temp_dir.path().join("vault/other.db")
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{ not json").unwrap();

        let result = SettingsManager::with_dir(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(PawsError::SerializationError(_))));
    }
}
