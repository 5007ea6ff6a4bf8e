use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::font::FontDescriptor;
use crate::job::PageSetup;

pub const PRINT_SETTINGS_VERSION: u32 = 1;

/// Persisted preferences for one page band.
/// （頁首或頁尾的偏好設定。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPreferences {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub separator: bool,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub center: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

impl BandPreferences {
    pub fn default_header() -> Self {
        Self {
            enabled: true,
            separator: true,
            left: Some("%Ef".to_string()),
            center: None,
            right: Some("%x %X".to_string()),
        }
    }

    pub fn default_footer() -> Self {
        Self {
            enabled: true,
            separator: true,
            left: None,
            center: Some("Page %Ep of %EP".to_string()),
            right: None,
        }
    }

    /// True when no slot holds a template.
    /// （全部欄位皆為空時視為無內容。）
    pub fn is_blank(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none()
    }

    fn sanitize(&mut self) {
        for slot in [&mut self.left, &mut self.center, &mut self.right] {
            if slot.as_deref().is_some_and(|text| text.trim().is_empty()) {
                *slot = None;
            }
        }
    }
}

/// Print preferences together with the page setup.
/// （列印偏好與版面設定。）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "BandPreferences::default_header")]
    pub header: BandPreferences,
    #[serde(default = "BandPreferences::default_footer")]
    pub footer: BandPreferences,
    #[serde(default = "default_true")]
    pub use_styles: bool,
    #[serde(default)]
    pub use_custom_font: bool,
    #[serde(default)]
    pub font: Option<FontDescriptor>,
    #[serde(default)]
    pub line_number_font: Option<FontDescriptor>,
    #[serde(default)]
    pub header_font: Option<FontDescriptor>,
    #[serde(default = "default_true")]
    pub wrap: bool,
    #[serde(default)]
    pub ellipsize: bool,
    #[serde(default)]
    pub show_line_numbers: bool,
    #[serde(default = "default_line_number_step")]
    pub line_number_step: u32,
    #[serde(default)]
    pub page_setup: PageSetup,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    PRINT_SETTINGS_VERSION
}

fn default_line_number_step() -> u32 {
    1
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            version: PRINT_SETTINGS_VERSION,
            header: BandPreferences::default_header(),
            footer: BandPreferences::default_footer(),
            use_styles: true,
            use_custom_font: false,
            font: None,
            line_number_font: None,
            header_font: None,
            wrap: true,
            ellipsize: false,
            show_line_numbers: false,
            line_number_step: default_line_number_step(),
            page_setup: PageSetup::default(),
        }
    }
}

impl PrintSettings {
    /// Repairs values that could not have come from a valid save.
    /// （修正不合法的持久化數值。）
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PRINT_SETTINGS_VERSION;
        }
        if self.line_number_step == 0 {
            self.line_number_step = default_line_number_step();
        }
        if self.wrap && self.ellipsize {
            self.ellipsize = false;
        }
        self.header.sanitize();
        self.footer.sanitize();
        self.page_setup.sanitize();
    }

    /// Body font requested by these settings, if any.
    /// （實際使用的內文字型。）
    pub fn custom_font(&self) -> Option<&FontDescriptor> {
        if self.use_custom_font {
            self.font.as_ref()
        } else {
            None
        }
    }
}

/// Storage collaborator for print settings.
/// （列印設定的持久化介面。）
///
/// Load and save are explicit calls made by the host; the engine never
/// reaches for a process-wide settings object.
pub trait SettingsStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> Result<PrintSettings, Self::Error>;

    fn save(&mut self, settings: &PrintSettings) -> Result<(), Self::Error>;
}

/// Settings store that lives in memory only.
/// （僅存在記憶體中的設定儲存。）
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: PrintSettings,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn new(settings: PrintSettings) -> Self {
        Self { settings, saves: 0 }
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    type Error = Infallible;

    fn load(&self) -> Result<PrintSettings, Self::Error> {
        let mut settings = self.settings.clone();
        settings.sanitize();
        Ok(settings)
    }

    fn save(&mut self, settings: &PrintSettings) -> Result<(), Self::Error> {
        self.settings = settings.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_preferences() {
        let settings = PrintSettings::default();
        assert!(settings.header.enabled && settings.header.separator);
        assert_eq!(settings.header.left.as_deref(), Some("%Ef"));
        assert_eq!(settings.header.right.as_deref(), Some("%x %X"));
        assert_eq!(settings.footer.center.as_deref(), Some("Page %Ep of %EP"));
        assert!(settings.use_styles);
        assert!(settings.wrap);
        assert!(!settings.ellipsize);
        assert!(!settings.show_line_numbers);
        assert_eq!(settings.line_number_step, 1);
        assert!(settings.custom_font().is_none());
    }

    #[test]
    fn sanitize_fixes_conflicts() {
        let mut settings = PrintSettings {
            version: 0,
            line_number_step: 0,
            wrap: true,
            ellipsize: true,
            ..PrintSettings::default()
        };
        settings.header.center = Some("   ".into());
        settings.sanitize();

        assert_eq!(settings.version, PRINT_SETTINGS_VERSION);
        assert_eq!(settings.line_number_step, 1);
        assert!(settings.wrap);
        assert!(!settings.ellipsize);
        assert!(settings.header.center.is_none());
    }

    #[test]
    fn custom_font_requires_flag() {
        let mut settings = PrintSettings {
            font: Some(FontDescriptor::new("Serif", 12.0)),
            ..PrintSettings::default()
        };
        assert!(settings.custom_font().is_none());
        settings.use_custom_font = true;
        assert_eq!(settings.custom_font().map(|font| font.size_pt), Some(12.0));
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemorySettingsStore::default();
        let mut settings = store.load().unwrap();
        settings.show_line_numbers = true;
        settings.line_number_step = 5;
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.show_line_numbers);
        assert_eq!(loaded.line_number_step, 5);
        assert_eq!(store.save_count(), 1);
    }
}
