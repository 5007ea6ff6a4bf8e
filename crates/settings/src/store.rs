use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use textprint_printing::{PrintSettings, SettingsStore};
use thiserror::Error;

/// Default file name of the print settings file.
/// （列印設定檔的預設檔名。）
pub const SETTINGS_FILE_NAME: &str = "print-settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read print settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse print settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize print settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write print settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Keeps print settings in a pretty-printed JSON file.
/// （以 JSON 檔保存列印設定。）
///
/// A missing file loads as the defaults; saving replaces the file atomically.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<workspace>/.textprint/print-settings.json`.
    /// （工作區內的設定檔位置。）
    pub fn in_workspace(workspace: impl AsRef<Path>) -> Self {
        Self::new(workspace.as_ref().join(".textprint").join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads, applies `op`, sanitizes and saves.
    /// （讀取、修改並寫回設定。）
    pub fn update<F>(&mut self, op: F) -> Result<PrintSettings, SettingsError>
    where
        F: FnOnce(&mut PrintSettings),
    {
        let mut settings = self.load()?;
        op(&mut settings);
        settings.sanitize();
        self.save(&settings)?;
        Ok(settings)
    }
}

impl SettingsStore for JsonSettingsStore {
    type Error = SettingsError;

    fn load(&self) -> Result<PrintSettings, SettingsError> {
        if !self.path.exists() {
            log::debug!("{} not found, using default print settings", self.path.display());
            return Ok(PrintSettings::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut settings: PrintSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;
        settings.sanitize();
        Ok(settings)
    }

    fn save(&mut self, settings: &PrintSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(settings).map_err(|source| SettingsError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        write_atomic(&self.path, payload.as_bytes()).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("saved print settings to {}", self.path.display());
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
