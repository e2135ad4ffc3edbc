use folio::storage::{FileStore, KeyValueStore};
use folio::theme::{PREFERENCES_KEY, ThemeManager, ThemeMode, derived_theme};
use tempfile::tempdir;

#[test]
fn preferences_survive_a_restart() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");

    let mut manager = ThemeManager::restore(FileStore::open(&path));
    manager.toggle_mode();
    manager.change_accent("greenPurple");
    drop(manager);

    let restored = ThemeManager::restore(FileStore::open(&path));
    assert_eq!(restored.mode(), ThemeMode::Dark);
    assert_eq!(restored.accent_key(), "greenPurple");
    assert_eq!(
        restored.theme(),
        &derived_theme(ThemeMode::Dark, "greenPurple")
    );
}

#[test]
fn unknown_stored_accent_keeps_default_but_applies_mode() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");
    let mut store = FileStore::open(&path);
    store
        .set(PREFERENCES_KEY, r#"{"mode":"dark","themeColor":"neonPink"}"#)
        .expect("seed store");

    let manager = ThemeManager::restore(FileStore::open(&path));
    assert_eq!(manager.mode(), ThemeMode::Dark);
    assert_eq!(manager.accent_key(), "redYellow");
}

#[test]
fn corrupt_store_file_starts_with_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{ not json").expect("write corrupt file");

    let mut manager = ThemeManager::restore(FileStore::open(&path));
    assert_eq!(manager.mode(), ThemeMode::Light);

    manager.toggle_mode();
    let raw = std::fs::read_to_string(&path).expect("store rewritten");
    assert!(raw.contains(PREFERENCES_KEY));
}

#[test]
fn unknown_accent_change_does_not_write() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("storage.json");

    let mut manager = ThemeManager::restore(FileStore::open(&path));
    manager.change_accent("notAColor");
    assert!(!path.exists());
    assert_eq!(manager.accent_key(), "redYellow");
}
