pub mod field_editor;

pub use field_editor::{FieldEditor, FieldEditorDeps};
