//! Boundary of the third-party editing widget.
//!
//! The widget is opaque: the engine only sees this trait surface and the
//! events the widget pushes through its [`WidgetEventSink`].

use super::language::LanguageId;
use super::markers::Marker;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// The container a widget is mounted into. Its size can change under the
/// widget (flex relayout) without the widget noticing until it re-measures.
#[derive(Debug, Clone)]
pub struct Anchor {
    id: String,
    size: Rc<Cell<Size>>,
}

impl Anchor {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            id: id.into(),
            size: Rc::new(Cell::new(size)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> Size {
        self.size.get()
    }

    pub fn resize(&self, size: Size) {
        self.size.set(size);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub value: String,
    pub language: LanguageId,
    pub read_only: bool,
    pub tab_size: u8,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    ContentChanged,
    DecorationsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetInput {
    InsertText(String),
    DeleteBackward,
    DeleteForward,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
}

/// Line/column of the widget cursor, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct WidgetEventSink {
    tx: mpsc::Sender<WidgetEvent>,
}

impl WidgetEventSink {
    pub fn channel() -> (Self, mpsc::Receiver<WidgetEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Returns false once the listener has unsubscribed.
    pub fn emit(&self, event: WidgetEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub trait EditorWidget {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn cursor(&self) -> CursorPosition;
    fn set_language(&mut self, language: LanguageId);
    fn set_read_only(&mut self, read_only: bool);
    /// `Some(size)` forces a size, `None` re-measures against the anchor.
    fn layout(&mut self, size: Option<Size>);
    fn size(&self) -> Size;
    fn markers(&self) -> Vec<Marker>;
    fn handle_input(&mut self, input: &WidgetInput);
    fn dispose(&mut self);
}

pub trait WidgetLibrary: Send + Sync {
    fn name(&self) -> &str;
    fn create(
        &self,
        anchor: &Anchor,
        options: WidgetOptions,
        events: WidgetEventSink,
    ) -> Box<dyn EditorWidget>;
}

pub type SharedLibrary = Arc<dyn WidgetLibrary>;
