use super::*;
use crate::kernel::services::adapters::loader::StaticResourceLoader;
use crate::kernel::services::adapters::record::MemoryRecordStore;
use crate::kernel::services::adapters::runtime::AsyncRuntime;
use crate::kernel::services::ports::record::AllowAll;
use crate::kernel::services::ports::resource::{LibraryManifest, LibrarySource};
use crate::kernel::{ManualClock, Size};
use crate::widgets::rope::{
    BUILTIN_SCRIPT, BUILTIN_SCRIPT_PATH, BUILTIN_STYLE, BUILTIN_STYLE_PATH,
};
use crate::widgets::{RopeLibraryInstaller, RopeWidgetLibrary};
use std::cell::Cell;
use std::time::Duration;

struct Toggle(Cell<bool>);

impl PermissionCheck for Toggle {
    fn can_edit(&self, _field: &FieldRef) -> bool {
        self.0.get()
    }
}

struct Harness {
    clock: Rc<ManualClock>,
    store: Rc<MemoryRecordStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            clock: Rc::new(ManualClock::new()),
            store: Rc::new(MemoryRecordStore::new()),
        }
    }

    fn deps(&self, permissions: Rc<dyn PermissionCheck>) -> FieldEditorDeps {
        let library = RopeWidgetLibrary::builtin().unwrap();
        FieldEditorDeps {
            store: self.store.clone(),
            permissions,
            scheduler: Rc::new(Scheduler::new(self.clock.clone())),
            registry: Arc::new(LibraryRegistry::preloaded(Arc::new(library))),
            load_request: None,
            config: EditorConfig::default(),
        }
    }

    fn open(&self, field: &FieldRef, language: LanguageId) -> FieldEditor {
        FieldEditor::open(
            field.clone(),
            language,
            Anchor::new("field", Size::new(60, 20)),
            self.deps(Rc::new(AllowAll)),
        )
        .unwrap()
    }

    fn advance(&self, editor: &mut FieldEditor, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        editor.tick();
    }
}

fn type_text(editor: &mut FieldEditor, text: &str) {
    editor.handle_input(&WidgetInput::InsertText(text.to_string()));
}

fn widget_value(editor: &FieldEditor) -> String {
    editor.sync().widget().map(|w| w.value()).unwrap_or_default()
}

#[test]
fn test_open_mounts_immediately_with_preloaded_library() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "hello");

    let editor = harness.open(&field, LanguageId::PlainText);
    assert!(editor.is_loaded());
    assert_eq!(editor.phase(), SyncPhase::Ready);
    assert_eq!(widget_value(&editor), "hello");
    assert!(!editor.is_read_only());
}

#[test]
fn test_open_missing_field_fails() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "nope");
    let result = FieldEditor::open(
        field.clone(),
        LanguageId::PlainText,
        Anchor::new("field", Size::new(60, 20)),
        harness.deps(Rc::new(AllowAll)),
    );
    assert_eq!(result.err(), Some(RecordError::NotFound(field)));
}

#[test]
fn test_burst_of_typing_saves_once() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    type_text(&mut editor, "a");
    harness.advance(&mut editor, 100);
    type_text(&mut editor, "b");
    assert_eq!(editor.value(), "ab");

    harness.advance(&mut editor, 499);
    assert!(harness.store.saves().is_empty());

    harness.advance(&mut editor, 1);
    assert_eq!(harness.store.saves(), vec![(field.clone(), "ab".to_string())]);

    harness.advance(&mut editor, 5_000);
    assert_eq!(harness.store.saves().len(), 1);
}

#[test]
fn test_echo_keeps_cursor() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    type_text(&mut editor, "abc");
    editor.handle_input(&WidgetInput::CursorLeft);
    type_text(&mut editor, "X");

    assert_eq!(widget_value(&editor), "abXc");
    let cursor = editor.sync().widget().map(|w| w.cursor()).unwrap_or_default();
    assert_eq!(cursor.column, 3);
}

#[test]
fn test_switching_field_drops_pending_save() {
    let harness = Harness::new();
    let first = FieldRef::new("r1", "a");
    let second = FieldRef::new("r1", "b");
    harness.store.put(first.clone(), "one");
    harness.store.put(second.clone(), "two");
    let mut editor = harness.open(&first, LanguageId::PlainText);

    type_text(&mut editor, "x");
    editor.select(second.clone()).unwrap();
    assert_eq!(widget_value(&editor), "two");

    harness.advance(&mut editor, 1_000);
    assert!(harness.store.saves().is_empty());

    type_text(&mut editor, "y");
    harness.advance(&mut editor, 500);
    assert_eq!(harness.store.saves(), vec![(second, "ytwo".to_string())]);
}

#[test]
fn test_reselecting_same_field_keeps_pending_save() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "a");
    harness.store.put(field.clone(), "");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    type_text(&mut editor, "x");
    harness.store.put(field.clone(), "x");
    editor.select(field.clone()).unwrap();

    harness.advance(&mut editor, 500);
    assert_eq!(harness.store.saves(), vec![(field, "x".to_string())]);
}

#[test]
fn test_read_only_field_never_saves() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "locked");
    harness.store.put(field.clone(), "fixed");
    let mut editor = FieldEditor::open(
        field,
        LanguageId::PlainText,
        Anchor::new("field", Size::new(60, 20)),
        harness.deps(Rc::new(Toggle(Cell::new(false)))),
    )
    .unwrap();

    assert!(editor.is_read_only());
    type_text(&mut editor, "z");
    harness.advance(&mut editor, 1_000);
    assert_eq!(widget_value(&editor), "fixed");
    assert!(harness.store.saves().is_empty());
}

#[test]
fn test_permission_revoked_before_save_fires() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "");
    let permissions = Rc::new(Toggle(Cell::new(true)));
    let mut editor = FieldEditor::open(
        field.clone(),
        LanguageId::PlainText,
        Anchor::new("field", Size::new(60, 20)),
        harness.deps(permissions.clone()),
    )
    .unwrap();

    type_text(&mut editor, "q");
    permissions.0.set(false);
    harness.advance(&mut editor, 500);

    assert!(harness.store.saves().is_empty());
    assert_eq!(
        editor.take_save_error(),
        Some(RecordError::PermissionDenied(field))
    );
    assert_eq!(editor.take_save_error(), None);
}

#[test]
fn test_error_panel_toggle_bumps_render_signal() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "config");
    harness.store.put(field.clone(), "{}");
    let mut editor = harness.open(&field, LanguageId::Json);
    assert!(editor.errors().is_empty());
    let start = editor.render_counter();

    type_text(&mut editor, "x");
    assert_eq!(editor.errors().len(), 1);
    assert_eq!(editor.render_counter(), start + 1);
    assert_eq!(editor.sync().props().render_signal, editor.render_counter());

    // still broken, panel stays open
    type_text(&mut editor, "y");
    assert_eq!(editor.errors().len(), 1);
    assert_eq!(editor.render_counter(), start + 1);

    editor.handle_input(&WidgetInput::DeleteBackward);
    editor.handle_input(&WidgetInput::DeleteBackward);
    assert!(editor.errors().is_empty());
    assert_eq!(editor.render_counter(), start + 2);
    assert_eq!(widget_value(&editor), "{}");
}

#[test]
fn test_relayout_remeasures_widget() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    editor.sync().anchor().resize(Size::new(100, 40));
    editor.relayout();
    let size = editor.sync().widget().map(|w| w.size());
    assert_eq!(size, Some(Size::new(100, 40)));
}

#[test]
fn test_refresh_overwrites_buffer() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "old");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    harness.store.put(field.clone(), "new from elsewhere");
    editor.refresh().unwrap();
    assert_eq!(editor.value(), "new from elsewhere");
    assert_eq!(widget_value(&editor), "new from elsewhere");

    harness.advance(&mut editor, 1_000);
    assert!(harness.store.saves().is_empty());
}

#[test]
fn test_refresh_before_pending_save_settles_on_saved_value() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "one");
    let mut editor = harness.open(&field, LanguageId::PlainText);

    type_text(&mut editor, "x");
    editor.refresh().unwrap();
    assert_eq!(widget_value(&editor), "one");

    harness.advance(&mut editor, 1_000);
    let stored = harness.store.load(&field).unwrap();
    assert_eq!(stored, "xone");
    assert_eq!(editor.value(), stored);
    assert_eq!(widget_value(&editor), stored);
    assert_eq!(harness.store.saves().len(), 1);
}

#[test]
fn test_saved_value_for_previous_field_is_not_adopted() {
    let harness = Harness::new();
    let first = FieldRef::new("r1", "a");
    let second = FieldRef::new("r1", "b");
    harness.store.put(first.clone(), "");
    harness.store.put(second.clone(), "two");
    let mut editor = harness.open(&first, LanguageId::PlainText);

    type_text(&mut editor, "x");
    harness.advance(&mut editor, 500);
    assert_eq!(editor.value(), "x");

    editor.select(second).unwrap();
    harness.advance(&mut editor, 500);
    assert_eq!(widget_value(&editor), "two");
}

#[test]
fn test_language_switch_clears_json_errors() {
    let harness = Harness::new();
    let field = FieldRef::new("r1", "body");
    harness.store.put(field.clone(), "{");
    let mut editor = harness.open(&field, LanguageId::Json);
    assert_eq!(editor.errors().len(), 1);

    editor.set_language(LanguageId::Markdown);
    assert!(editor.errors().is_empty());
}

#[test]
fn test_waits_for_library_before_loading() {
    let runtime = AsyncRuntime::new().unwrap();
    let harness = Harness::new();
    let field = FieldRef::new("r1", "notes");
    harness.store.put(field.clone(), "seed");

    let loader = StaticResourceLoader::new()
        .with_resource(BUILTIN_STYLE_PATH, BUILTIN_STYLE)
        .with_resource(BUILTIN_SCRIPT_PATH, BUILTIN_SCRIPT)
        .with_delay(BUILTIN_STYLE_PATH, Duration::from_millis(20));
    let registry = Arc::new(LibraryRegistry::new());
    let mut deps = harness.deps(Rc::new(AllowAll));
    deps.registry = registry.clone();
    deps.load_request = Some(LoadRequest {
        source: LibrarySource {
            loader: Arc::new(loader),
            manifest: LibraryManifest::new(BUILTIN_STYLE_PATH, [BUILTIN_SCRIPT_PATH]),
            installer: RopeLibraryInstaller::factory(),
        },
        runtime: runtime.tokio_handle(),
    });

    let mut editor = FieldEditor::open(
        field,
        LanguageId::PlainText,
        Anchor::new("field", Size::new(60, 20)),
        deps,
    )
    .unwrap();
    assert!(!editor.is_loaded());
    assert_eq!(editor.phase(), SyncPhase::Loading);

    // nothing to type into yet
    type_text(&mut editor, "lost");
    editor.relayout();

    runtime.block_on(registry.wait()).ok().unwrap();
    editor.tick();
    assert!(editor.is_loaded());
    assert_eq!(widget_value(&editor), "seed");

    editor.close();
    assert_eq!(editor.phase(), SyncPhase::Disposed);
}
