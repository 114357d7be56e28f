//! 记录存储适配器：内存实现与 JSON 文件实现

use crate::kernel::services::ports::record::{FieldRef, RecordError, RecordStore};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    values: RefCell<FxHashMap<FieldRef, String>>,
    saves: RefCell<Vec<(FieldRef, String)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes a value behind the editor's back.
    pub fn put(&self, field: FieldRef, value: impl Into<String>) {
        self.values.borrow_mut().insert(field, value.into());
    }

    pub fn saves(&self) -> Vec<(FieldRef, String)> {
        self.saves.borrow().clone()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, field: &FieldRef) -> Result<String, RecordError> {
        self.values
            .borrow()
            .get(field)
            .cloned()
            .ok_or_else(|| RecordError::NotFound(field.clone()))
    }

    fn save(&self, field: &FieldRef, value: &str) -> Result<(), RecordError> {
        self.values
            .borrow_mut()
            .insert(field.clone(), value.to_string());
        self.saves
            .borrow_mut()
            .push((field.clone(), value.to_string()));
        Ok(())
    }
}

/// Records kept in one JSON document: `{ "<record>": { "<field>": ... } }`.
///
/// String fields are edited as-is. Any other JSON value is edited as its
/// pretty-printed text. Saving text that does not parse fails with
/// [`RecordError::Parse`] and leaves the stored value untouched.
pub struct JsonFileRecordStore {
    path: PathBuf,
    last_written: RefCell<Option<String>>,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file no longer holds what this store last wrote.
    pub fn is_external_change(&self) -> bool {
        let current = std::fs::read_to_string(&self.path).ok();
        current != *self.last_written.borrow()
    }

    fn read_document(&self) -> Result<Map<String, Value>, RecordError> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| RecordError::Io(e.to_string()))?;
        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(RecordError::Parse("top level must be an object".to_string())),
            Err(e) => Err(RecordError::Parse(e.to_string())),
        }
    }

    fn write_document(&self, doc: Map<String, Value>) -> Result<(), RecordError> {
        let content = serde_json::to_string_pretty(&Value::Object(doc))
            .map_err(|e| RecordError::Parse(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &content).map_err(|e| RecordError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| RecordError::Io(e.to_string()))?;
        *self.last_written.borrow_mut() = Some(content);
        Ok(())
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

impl RecordStore for JsonFileRecordStore {
    fn load(&self, field: &FieldRef) -> Result<String, RecordError> {
        let doc = self.read_document()?;
        doc.get(field.record_id.as_str())
            .and_then(Value::as_object)
            .and_then(|record| record.get(field.field.as_str()))
            .map(field_text)
            .ok_or_else(|| RecordError::NotFound(field.clone()))
    }

    fn save(&self, field: &FieldRef, value: &str) -> Result<(), RecordError> {
        let mut doc = self.read_document()?;
        let Some(record) = doc
            .get_mut(field.record_id.as_str())
            .and_then(Value::as_object_mut)
        else {
            return Err(RecordError::NotFound(field.clone()));
        };

        let keep_structured = record
            .get(field.field.as_str())
            .is_some_and(|existing| !existing.is_string());
        let next = if keep_structured {
            // 结构化字段只接受合法 JSON，半成品文本不落盘
            serde_json::from_str::<Value>(value)
                .map_err(|e| RecordError::Parse(format!("{}: {}", field, e)))?
        } else {
            Value::String(value.to_string())
        };
        record.insert(field.field.to_string(), next);
        self.write_document(doc)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/record.rs"]
mod tests;
