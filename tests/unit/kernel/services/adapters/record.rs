use super::*;
use serde_json::json;

fn write_records(dir: &tempfile::TempDir, doc: &Value) -> PathBuf {
    let path = dir.path().join("records.json");
    std::fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
    path
}

#[test]
fn test_memory_store_records_saves() {
    let store = MemoryRecordStore::new();
    let field = FieldRef::new("r1", "body");
    assert_eq!(store.load(&field), Err(RecordError::NotFound(field.clone())));

    store.put(field.clone(), "hello");
    assert_eq!(store.load(&field).unwrap(), "hello");
    assert!(store.saves().is_empty());

    store.save(&field, "bye").unwrap();
    assert_eq!(store.load(&field).unwrap(), "bye");
    assert_eq!(store.saves(), vec![(field, "bye".to_string())]);
}

#[test]
fn test_json_store_string_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!({ "r1": { "title": "draft" } }));
    let store = JsonFileRecordStore::new(&path);
    let field = FieldRef::new("r1", "title");

    assert_eq!(store.load(&field).unwrap(), "draft");
    store.save(&field, "final").unwrap();

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["r1"]["title"], json!("final"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_json_store_structured_field_stays_structured() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!({ "r1": { "config": { "a": 1 } } }));
    let store = JsonFileRecordStore::new(&path);
    let field = FieldRef::new("r1", "config");

    let text = store.load(&field).unwrap();
    assert!(text.contains("\"a\": 1"));

    store.save(&field, r#"{"a": 2, "b": [true]}"#).unwrap();
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["r1"]["config"], json!({ "a": 2, "b": [true] }));

}

#[test]
fn test_json_store_half_typed_json_keeps_field_structured() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!({ "r": { "cfg": { "x": 1 } } }));
    let store = JsonFileRecordStore::new(&path);
    let field = FieldRef::new("r", "cfg");

    let err = store.save(&field, r#"{"x":"#).unwrap_err();
    assert!(matches!(err, RecordError::Parse(_)));
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["r"]["cfg"], json!({ "x": 1 }));

    store.save(&field, r#"{"x":2}"#).unwrap();
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["r"]["cfg"], json!({ "x": 2 }));
}

#[test]
fn test_json_store_missing_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!({ "r1": { "title": "x" } }));
    let store = JsonFileRecordStore::new(&path);
    let field = FieldRef::new("r2", "title");

    assert_eq!(store.load(&field), Err(RecordError::NotFound(field.clone())));
    assert_eq!(store.save(&field, "y"), Err(RecordError::NotFound(field)));
}

#[test]
fn test_json_store_rejects_non_object_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!([1, 2, 3]));
    let store = JsonFileRecordStore::new(&path);
    assert!(matches!(
        store.load(&FieldRef::new("r1", "x")),
        Err(RecordError::Parse(_))
    ));
}

#[test]
fn test_json_store_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileRecordStore::new(dir.path().join("absent.json"));
    assert!(matches!(
        store.load(&FieldRef::new("r1", "x")),
        Err(RecordError::Io(_))
    ));
}

#[test]
fn test_external_change_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_records(&dir, &json!({ "r1": { "title": "a" } }));
    let store = JsonFileRecordStore::new(&path);
    let field = FieldRef::new("r1", "title");

    store.save(&field, "b").unwrap();
    assert!(!store.is_external_change());

    write_records(&dir, &json!({ "r1": { "title": "c" } }));
    assert!(store.is_external_change());
    assert_eq!(store.load(&field).unwrap(), "c");
}
