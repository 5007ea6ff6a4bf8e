use std::fs;

use tempfile::tempdir;
use textprint_printing::{FontDescriptor, Orientation, PaperId, PaperSize};
use textprint_settings::{JsonSettingsStore, PrintSettings, SettingsError, SettingsStore};

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let store = JsonSettingsStore::in_workspace(temp.path());
    assert!(!store.exists());

    let settings = store.load().expect("load defaults");
    assert_eq!(settings, PrintSettings::default());
    assert_eq!(settings.header.left.as_deref(), Some("%Ef"));
    assert_eq!(settings.footer.center.as_deref(), Some("Page %Ep of %EP"));
    assert!(settings.wrap);
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let mut store = JsonSettingsStore::in_workspace(temp.path());

    let mut settings = PrintSettings::default();
    settings.show_line_numbers = true;
    settings.line_number_step = 5;
    settings.use_custom_font = true;
    settings.font = Some(FontDescriptor::new("Courier", 9.0).bold());
    settings.page_setup.paper = PaperSize::LETTER;
    settings.page_setup.orientation = Orientation::Landscape;
    store.save(&settings).expect("save");

    assert!(store
        .path()
        .ends_with(".textprint/print-settings.json"));
    let raw = fs::read_to_string(store.path()).expect("read saved file");
    assert!(raw.contains("\"Courier Bold 9\""));
    assert!(raw.contains("\"landscape\""));

    let reloaded = JsonSettingsStore::new(store.path()).load().expect("reload");
    assert_eq!(reloaded, settings);
    assert_eq!(reloaded.page_setup.paper.id, PaperId::Letter);
    assert!(!store.path().with_extension("tmp").exists());
}

#[test]
fn update_sanitizes_before_saving() {
    let temp = tempdir().expect("tempdir");
    let mut store = JsonSettingsStore::new(temp.path().join("nested/dir/print.json"));

    let updated = store
        .update(|settings| {
            settings.line_number_step = 0;
            settings.wrap = true;
            settings.ellipsize = true;
            settings.header.right = Some("   ".to_string());
        })
        .expect("update");
    assert_eq!(updated.line_number_step, 1);
    assert!(!updated.ellipsize);
    assert_eq!(updated.header.right, None);
    assert_eq!(store.load().expect("reload"), updated);
}

#[test]
fn partial_file_fills_in_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("print.json");
    fs::write(
        &path,
        r#"{
            "version": 0,
            "wrap": false,
            "ellipsize": true,
            "footer": { "enabled": false },
            "page_setup": {
                "paper": { "id": "custom", "width_mm": -1.0, "height_mm": 100.0 }
            }
        }"#,
    )
    .expect("write partial settings");

    let settings = JsonSettingsStore::new(&path).load().expect("load partial file");
    assert_eq!(settings.version, 1);
    assert!(!settings.wrap);
    assert!(settings.ellipsize);
    assert!(!settings.footer.enabled);
    assert!(settings.footer.separator);
    assert_eq!(settings.header, PrintSettings::default().header);
    assert_eq!(settings.page_setup.paper, PaperSize::A4);
    assert_eq!(settings.line_number_step, 1);
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("print.json");
    fs::write(&path, "{ not json").expect("write broken file");

    let err = JsonSettingsStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("print.json"));
}

#[test]
fn bad_font_name_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("print.json");
    fs::write(&path, r#"{ "font": "Courier 0" }"#).expect("write settings");

    let err = JsonSettingsStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
}
