//! 列印設定的檔案儲存。 / File-backed storage for print settings.

mod store;

pub use store::{JsonSettingsStore, SettingsError, SETTINGS_FILE_NAME};
pub use textprint_printing::{PrintSettings, SettingsStore};
