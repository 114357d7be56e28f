//! 内置编辑组件：基于 Rope 的最小实现
//!
//! Stands in for a heavyweight third-party widget. It is deliberately chatty:
//! every content change is followed by a decorations event even when the
//! diagnostics did not move.

use crate::kernel::language::LanguageId;
use crate::kernel::markers::Marker;
use crate::kernel::services::ports::resource::{
    InstallerFactory, LibraryInstaller, LoadError, Resource, ResourceKind,
};
use crate::kernel::widget::{
    Anchor, CursorPosition, EditorWidget, SharedLibrary, Size, WidgetEvent, WidgetEventSink,
    WidgetInput, WidgetLibrary, WidgetOptions,
};
use crate::models::TextBuffer;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const LIBRARY_NAME: &str = "rope";

pub const BUILTIN_STYLE_PATH: &str = "rope/theme.json";
pub const BUILTIN_SCRIPT_PATH: &str = "rope/languages.json";

pub const BUILTIN_STYLE: &str = r#"{
  "name": "default-dark",
  "foreground": "white",
  "background": "black",
  "errorForeground": "red"
}"#;

pub const BUILTIN_SCRIPT: &str = r#"{
  "languages": [
    { "id": "json", "validate": true },
    { "id": "javascript" },
    { "id": "sql" },
    { "id": "markdown" },
    { "id": "plaintext" }
  ]
}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTheme {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_foreground: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageContribution {
    pub id: LanguageId,
    #[serde(default)]
    pub validate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LanguagePack {
    #[serde(default)]
    pub languages: Vec<LanguageContribution>,
}

/// Returns JSON syntax errors for `text`. Blank input is not an error.
pub fn validate_json(text: &str) -> Vec<Marker> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(_) => Vec::new(),
        Err(err) => {
            let line = (err.line() as u32).max(1);
            let column = (err.column() as u32).max(1);
            vec![Marker::at(line, column, err.to_string())]
        }
    }
}

pub struct RopeWidgetLibrary {
    theme: WidgetTheme,
    validated: FxHashSet<LanguageId>,
    languages: FxHashSet<LanguageId>,
}

impl RopeWidgetLibrary {
    pub fn new(theme: WidgetTheme, packs: &[LanguagePack]) -> Self {
        let mut validated = FxHashSet::default();
        let mut languages = FxHashSet::default();
        for lang in packs.iter().flat_map(|pack| pack.languages.iter()) {
            languages.insert(lang.id);
            if lang.validate {
                validated.insert(lang.id);
            }
        }
        Self {
            theme,
            validated,
            languages,
        }
    }

    /// Library built from the embedded assets, bypassing the loader.
    pub fn builtin() -> Result<Self, LoadError> {
        let theme = parse_theme(BUILTIN_STYLE_PATH, BUILTIN_STYLE)?;
        let pack = parse_pack(BUILTIN_SCRIPT_PATH, BUILTIN_SCRIPT)?;
        Ok(Self::new(theme, &[pack]))
    }

    pub fn theme(&self) -> &WidgetTheme {
        &self.theme
    }

    pub fn supports(&self, language: LanguageId) -> bool {
        self.languages.contains(&language)
    }
}

impl WidgetLibrary for RopeWidgetLibrary {
    fn name(&self) -> &str {
        LIBRARY_NAME
    }

    fn create(
        &self,
        anchor: &Anchor,
        options: WidgetOptions,
        events: WidgetEventSink,
    ) -> Box<dyn EditorWidget> {
        if !self.supports(options.language) {
            tracing::warn!(language = %options.language, "language not registered, using plain text");
        }
        let widget = RopeWidget {
            buffer: TextBuffer::from_text(&options.value),
            anchor: anchor.clone(),
            size: anchor.size(),
            language: options.language,
            read_only: options.read_only,
            tab_size: options.tab_size.max(1),
            validated: self.validated.clone(),
            events,
            disposed: false,
            layout_passes: 0,
        };
        widget.emit(WidgetEvent::DecorationsChanged);
        Box::new(widget)
    }
}

pub struct RopeWidget {
    buffer: TextBuffer,
    anchor: Anchor,
    size: Size,
    language: LanguageId,
    read_only: bool,
    tab_size: u8,
    validated: FxHashSet<LanguageId>,
    events: WidgetEventSink,
    disposed: bool,
    layout_passes: usize,
}

impl RopeWidget {
    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    fn emit(&self, event: WidgetEvent) {
        if self.disposed {
            return;
        }
        let _ = self.events.emit(event);
    }

    fn content_changed(&self) {
        self.emit(WidgetEvent::ContentChanged);
        self.emit(WidgetEvent::DecorationsChanged);
    }
}

impl EditorWidget for RopeWidget {
    fn value(&self) -> String {
        self.buffer.text()
    }

    fn set_value(&mut self, value: &str) {
        if self.disposed {
            return;
        }
        self.buffer.set_text(value);
        self.content_changed();
    }

    fn cursor(&self) -> CursorPosition {
        let (line, column) = self.buffer.cursor_line_col();
        CursorPosition { line, column }
    }

    fn set_language(&mut self, language: LanguageId) {
        if self.language == language {
            return;
        }
        self.language = language;
        self.emit(WidgetEvent::DecorationsChanged);
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn layout(&mut self, size: Option<Size>) {
        self.size = size.unwrap_or_else(|| self.anchor.size());
        self.layout_passes += 1;
    }

    fn size(&self) -> Size {
        self.size
    }

    fn markers(&self) -> Vec<Marker> {
        if self.language == LanguageId::Json && self.validated.contains(&LanguageId::Json) {
            return validate_json(&self.buffer.text());
        }
        Vec::new()
    }

    fn handle_input(&mut self, input: &WidgetInput) {
        if self.disposed || self.read_only {
            return;
        }
        let changed = match input {
            WidgetInput::InsertText(text) if text == "\t" => {
                let spaces = " ".repeat(self.tab_size as usize);
                self.buffer.insert_str(&spaces)
            }
            WidgetInput::InsertText(text) => self.buffer.insert_str(text),
            WidgetInput::DeleteBackward => self.buffer.delete_backward(),
            WidgetInput::DeleteForward => self.buffer.delete_forward(),
            WidgetInput::CursorLeft => {
                self.buffer.move_left();
                false
            }
            WidgetInput::CursorRight => {
                self.buffer.move_right();
                false
            }
            WidgetInput::CursorHome => {
                self.buffer.move_line_start();
                false
            }
            WidgetInput::CursorEnd => {
                self.buffer.move_line_end();
                false
            }
        };
        if changed {
            self.content_changed();
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

fn parse_theme(location: &str, body: &str) -> Result<WidgetTheme, LoadError> {
    serde_json::from_str(body).map_err(|e| LoadError::Parse {
        resource: location.to_string(),
        message: e.to_string(),
    })
}

fn parse_pack(location: &str, body: &str) -> Result<LanguagePack, LoadError> {
    serde_json::from_str(body).map_err(|e| LoadError::Parse {
        resource: location.to_string(),
        message: e.to_string(),
    })
}

/// Theme first, then any number of language packs.
#[derive(Default)]
pub struct RopeLibraryInstaller {
    theme: Option<WidgetTheme>,
    packs: Vec<LanguagePack>,
}

impl RopeLibraryInstaller {
    pub fn factory() -> InstallerFactory {
        Arc::new(|| Box::new(RopeLibraryInstaller::default()) as Box<dyn LibraryInstaller>)
    }
}

impl LibraryInstaller for RopeLibraryInstaller {
    fn apply(&mut self, resource: &Resource, body: &str) -> Result<(), LoadError> {
        match resource.kind {
            ResourceKind::Style => {
                self.theme = Some(parse_theme(&resource.location, body)?);
            }
            ResourceKind::Script => {
                if self.theme.is_none() {
                    return Err(LoadError::MissingDependency {
                        resource: resource.location.clone(),
                        requires: "style",
                    });
                }
                self.packs.push(parse_pack(&resource.location, body)?);
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<SharedLibrary, LoadError> {
        let Some(theme) = self.theme else {
            return Err(LoadError::Install("no style resource".to_string()));
        };
        Ok(Arc::new(RopeWidgetLibrary::new(theme, &self.packs)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/rope.rs"]
mod tests;
