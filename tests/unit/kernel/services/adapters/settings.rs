use super::*;

#[test]
fn test_settings_path_lives_under_cache_dir() {
    if let Some(path) = get_settings_path() {
        assert!(path.ends_with(".zlive/setting.json"));
    }
}

#[test]
fn test_load_settings_from_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("setting.json");
    std::fs::write(
        &path,
        r#"{ "editor": { "tab_size": 2, "save_debounce_ms": 250 } }"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.editor.tab_size, Some(2));
    assert_eq!(settings.editor.save_debounce_ms, Some(250));
    assert_eq!(settings.editor.word_wrap, None);
    assert!(!settings.library.is_configured());
}

#[test]
fn test_load_settings_from_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("setting.json");
    std::fs::write(&path, "{ editor: ").unwrap();
    assert!(load_settings_from(&path).is_none());
}

#[test]
fn test_load_settings_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_settings_from(&dir.path().join("nope.json")).is_none());
}
