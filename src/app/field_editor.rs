//! 字段编辑器：把同步引擎接到记录存储上
//!
//! Owns one [`EditorSync`] for the selected field. Edits flow out through a
//! debounced save keyed on the field, so switching fields neutralizes a save
//! still pending for the previous one. Diagnostics toggle an error panel; the
//! panel changes the container geometry, so toggling it bumps the render
//! signal and forces the widget to re-measure.
//!
//! A save that lands is fed back as the field value on the next tick, so the
//! widget always ends up showing what the store holds.

use crate::kernel::services::adapters::loader::LibraryRegistry;
use crate::kernel::services::ports::config::EditorConfig;
use crate::kernel::services::ports::record::{
    FieldRef, PermissionCheck, RecordError, RecordStore,
};
use crate::kernel::{
    Anchor, DebounceSite, Debounced, EditorProps, EditorSync, LanguageId, LoadRequest, Marker,
    RenderSignal, Scheduler, SyncEffect, SyncPhase, WidgetInput,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Collaborators a [`FieldEditor`] is wired to.
pub struct FieldEditorDeps {
    pub store: Rc<dyn RecordStore>,
    pub permissions: Rc<dyn PermissionCheck>,
    pub scheduler: Rc<Scheduler>,
    pub registry: Arc<LibraryRegistry>,
    pub load_request: Option<LoadRequest>,
    pub config: EditorConfig,
}

pub struct FieldEditor {
    field: FieldRef,
    language: LanguageId,
    value: String,
    read_only: bool,
    errors: Vec<Marker>,
    loaded: bool,
    sync: EditorSync,
    render: RenderSignal,
    save_site: DebounceSite<String, FieldRef>,
    save: Debounced<String>,
    store: Rc<dyn RecordStore>,
    permissions: Rc<dyn PermissionCheck>,
    scheduler: Rc<Scheduler>,
    config: EditorConfig,
    last_save_error: Rc<RefCell<Option<RecordError>>>,
    persisted: Rc<RefCell<Option<(FieldRef, String)>>>,
}

impl FieldEditor {
    /// Loads the field's value and mounts an editor for it.
    pub fn open(
        field: FieldRef,
        language: LanguageId,
        anchor: Anchor,
        deps: FieldEditorDeps,
    ) -> Result<Self, RecordError> {
        let FieldEditorDeps {
            store,
            permissions,
            scheduler,
            registry,
            load_request,
            config,
        } = deps;

        let value = store.load(&field)?;
        let read_only = !permissions.can_edit(&field);
        let render = RenderSignal::new();
        let props = EditorProps {
            value: value.clone(),
            language,
            read_only,
            render_signal: render.counter(),
        };
        let mut sync = EditorSync::new(anchor, props, registry, config.clone());
        if let Some(request) = load_request {
            sync = sync.with_load_request(request);
        }

        let last_save_error = Rc::new(RefCell::new(None));
        let persisted = Rc::new(RefCell::new(None));
        let mut save_site = DebounceSite::new(scheduler.clone());
        let save = save_site.create(
            save_fn(&field, &store, &permissions, &last_save_error, &persisted),
            config.save_debounce(),
            field.clone(),
        );

        let mut editor = Self {
            field,
            language,
            value,
            read_only,
            errors: Vec::new(),
            loaded: false,
            sync,
            render,
            save_site,
            save,
            store,
            permissions,
            scheduler,
            config,
            last_save_error,
            persisted,
        };
        let effects = editor.sync.mount();
        editor.apply(effects);
        Ok(editor)
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn errors(&self) -> &[Marker] {
        &self.errors
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn phase(&self) -> SyncPhase {
        self.sync.phase()
    }

    pub fn sync(&self) -> &EditorSync {
        &self.sync
    }

    pub fn render_counter(&self) -> u64 {
        self.render.counter()
    }

    pub fn take_save_error(&self) -> Option<RecordError> {
        self.last_save_error.borrow_mut().take()
    }

    /// Fires due saves, then lets the engine catch up with the widget.
    pub fn tick(&mut self) {
        self.scheduler.run_due();
        self.adopt_persisted();
        let effects = self.sync.tick();
        self.apply(effects);
    }

    pub fn handle_input(&mut self, input: &WidgetInput) {
        let effects = self.sync.handle_input(input);
        self.apply(effects);
    }

    /// Re-reads the record, e.g. after someone else changed it.
    pub fn refresh(&mut self) -> Result<(), RecordError> {
        self.value = self.store.load(&self.field)?;
        self.read_only = !self.permissions.can_edit(&self.field);
        self.push_props();
        Ok(())
    }

    /// Points the editor at another field.
    pub fn select(&mut self, field: FieldRef) -> Result<(), RecordError> {
        if field == self.field {
            return self.refresh();
        }
        let value = self.store.load(&field)?;
        tracing::debug!(from = %self.field, to = %field, "field selected");

        self.save = self.save_site.create(
            save_fn(
                &field,
                &self.store,
                &self.permissions,
                &self.last_save_error,
                &self.persisted,
            ),
            self.config.save_debounce(),
            field.clone(),
        );
        self.read_only = !self.permissions.can_edit(&field);
        self.field = field;
        self.value = value;
        self.push_props();
        Ok(())
    }

    pub fn set_language(&mut self, language: LanguageId) {
        self.language = language;
        self.push_props();
    }

    /// The surrounding layout changed size.
    pub fn relayout(&mut self) {
        self.render.trigger();
        self.push_props();
    }

    pub fn close(&mut self) {
        self.sync.dispose();
    }

    /// A refresh that raced a pending save may have shown the older stored
    /// value; the saved text wins.
    fn adopt_persisted(&mut self) {
        let Some((field, value)) = self.persisted.borrow_mut().take() else {
            return;
        };
        if field != self.field || value == self.value {
            return;
        }
        tracing::debug!(field = %field, "adopting saved value");
        self.value = value;
        self.push_props();
    }

    fn push_props(&mut self) {
        let props = EditorProps {
            value: self.value.clone(),
            language: self.language,
            read_only: self.read_only,
            render_signal: self.render.counter(),
        };
        let effects = self.sync.set_props(props);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<SyncEffect>) {
        let mut queue: VecDeque<SyncEffect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let props_dirty = match effect {
                SyncEffect::Loaded => {
                    self.loaded = true;
                    tracing::info!(field = %self.field, "field editor loaded");
                    false
                }
                SyncEffect::Changed(value) => {
                    self.save.call(value.clone());
                    // 回显给引擎：与缓冲区一致，不会重置光标
                    self.value = value;
                    true
                }
                SyncEffect::SyntaxErrors(markers) => {
                    let had_errors = !self.errors.is_empty();
                    self.errors = markers;
                    if had_errors != !self.errors.is_empty() {
                        self.render.trigger();
                        true
                    } else {
                        false
                    }
                }
            };

            if props_dirty {
                let props = EditorProps {
                    value: self.value.clone(),
                    language: self.language,
                    read_only: self.read_only,
                    render_signal: self.render.counter(),
                };
                queue.extend(self.sync.set_props(props));
            }
        }
    }
}

fn save_fn(
    field: &FieldRef,
    store: &Rc<dyn RecordStore>,
    permissions: &Rc<dyn PermissionCheck>,
    last_error: &Rc<RefCell<Option<RecordError>>>,
    persisted: &Rc<RefCell<Option<(FieldRef, String)>>>,
) -> impl Fn(String) + 'static {
    let field = field.clone();
    let store = store.clone();
    let permissions = permissions.clone();
    let last_error = last_error.clone();
    let persisted = persisted.clone();
    move |value: String| {
        if !permissions.can_edit(&field) {
            tracing::warn!(field = %field, "save rejected: no permission");
            *last_error.borrow_mut() = Some(RecordError::PermissionDenied(field.clone()));
            return;
        }
        match store.save(&field, &value) {
            Ok(()) => {
                tracing::debug!(field = %field, bytes = value.len(), "field saved");
                *persisted.borrow_mut() = Some((field.clone(), value));
            }
            Err(e) => {
                tracing::error!(field = %field, error = %e, "field save failed");
                *last_error.borrow_mut() = Some(e);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/field_editor.rs"]
mod tests;
