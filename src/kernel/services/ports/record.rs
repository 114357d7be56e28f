use compact_str::CompactString;
use std::fmt;

/// Which value is being edited: one field of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub record_id: CompactString,
    pub field: CompactString,
}

impl FieldRef {
    pub fn new(record_id: impl Into<CompactString>, field: impl Into<CompactString>) -> Self {
        Self {
            record_id: record_id.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record_id, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    NotFound(FieldRef),
    Io(String),
    Parse(String),
    PermissionDenied(FieldRef),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotFound(field) => write!(f, "Field not found: {}", field),
            RecordError::Io(msg) => write!(f, "Record IO error: {}", msg),
            RecordError::Parse(msg) => write!(f, "Record parse error: {}", msg),
            RecordError::PermissionDenied(field) => write!(f, "Not allowed to edit {}", field),
        }
    }
}

impl std::error::Error for RecordError {}

/// The external, asynchronously mutable source of the edited value.
pub trait RecordStore {
    fn load(&self, field: &FieldRef) -> Result<String, RecordError>;
    fn save(&self, field: &FieldRef, value: &str) -> Result<(), RecordError>;
}

pub trait PermissionCheck {
    fn can_edit(&self, field: &FieldRef) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PermissionCheck for AllowAll {
    fn can_edit(&self, _field: &FieldRef) -> bool {
        true
    }
}
