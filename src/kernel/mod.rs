//! Headless editing core: debounce, render signal, marker diff and the
//! widget synchronization engine.

pub mod debounce;
pub mod language;
pub mod markers;
pub mod render_signal;
pub mod services;
pub mod sync;
pub mod timer;
pub mod widget;

pub use debounce::{delay_from_millis, DebounceSite, Debounced};
pub use language::LanguageId;
pub use markers::{markers_equal, Marker, MarkerTracker};
pub use render_signal::{RenderSignal, RenderTrigger};
pub use sync::{EditorProps, EditorSync, LoadRequest, SyncEffect, SyncPhase};
pub use timer::{Clock, ManualClock, Scheduler, SystemClock};
pub use widget::{
    Anchor, CursorPosition, EditorWidget, SharedLibrary, Size, WidgetEvent, WidgetEventSink,
    WidgetInput, WidgetLibrary, WidgetOptions,
};
