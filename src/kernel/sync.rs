//! 编辑器同步引擎
//!
//! Drives one widget instance from an external value and reports what the
//! widget does back as [`SyncEffect`]s:
//!
//! - `Unloaded -> Loading -> Ready -> Disposed`, skipping `Loading` when the
//!   shared library is already available at mount time.
//! - The widget is created with the props current at creation time, so values
//!   that arrive while the library loads are not lost.
//! - External values are compared against the last content the widget is
//!   known to hold, not against the previous prop. An edit that round-trips
//!   through the owner never re-enters the widget.
//! - Diagnostics are reported only when the marker list actually changes.

use super::language::LanguageId;
use super::markers::{Marker, MarkerTracker};
use super::services::adapters::loader::LibraryRegistry;
use super::services::ports::config::EditorConfig;
use super::services::ports::resource::{LibrarySource, LoadError};
use super::widget::{
    Anchor, EditorWidget, SharedLibrary, Size, WidgetEvent, WidgetEventSink, WidgetInput,
    WidgetOptions,
};
use std::sync::mpsc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorProps {
    pub value: String,
    pub language: LanguageId,
    pub read_only: bool,
    pub render_signal: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEffect {
    /// The widget became interactive. Emitted once per instance.
    Loaded,
    /// The user changed the buffer. Not debounced.
    Changed(String),
    /// The diagnostic list differs from the last one reported.
    SyntaxErrors(Vec<Marker>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Unloaded,
    Loading,
    Ready,
    Disposed,
}

impl SyncPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Disposed => "disposed",
        }
    }
}

/// How to start the shared load if nobody has yet.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub source: LibrarySource,
    pub runtime: tokio::runtime::Handle,
}

pub struct EditorSync {
    phase: SyncPhase,
    anchor: Anchor,
    props: EditorProps,
    config: EditorConfig,
    registry: Arc<LibraryRegistry>,
    load_request: Option<LoadRequest>,
    widget: Option<Box<dyn EditorWidget>>,
    events: Option<mpsc::Receiver<WidgetEvent>>,
    last_known: String,
    markers: MarkerTracker,
    failure_reported: bool,
}

impl EditorSync {
    pub fn new(
        anchor: Anchor,
        props: EditorProps,
        registry: Arc<LibraryRegistry>,
        config: EditorConfig,
    ) -> Self {
        let last_known = props.value.clone();
        Self {
            phase: SyncPhase::Unloaded,
            anchor,
            props,
            config,
            registry,
            load_request: None,
            widget: None,
            events: None,
            last_known,
            markers: MarkerTracker::default(),
            failure_reported: false,
        }
    }

    pub fn with_load_request(mut self, request: LoadRequest) -> Self {
        self.load_request = Some(request);
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn props(&self) -> &EditorProps {
        &self.props
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn last_known_content(&self) -> &str {
        &self.last_known
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers.current()
    }

    pub fn widget(&self) -> Option<&dyn EditorWidget> {
        self.widget.as_deref()
    }

    pub fn load_error(&self) -> Option<LoadError> {
        self.registry.failure()
    }

    pub fn mount(&mut self) -> Vec<SyncEffect> {
        if self.phase != SyncPhase::Unloaded {
            return Vec::new();
        }

        if let Some(library) = self.registry.available() {
            return self.create_widget(library);
        }

        if let Some(request) = self.load_request.as_ref() {
            self.registry.begin_load(&request.source, &request.runtime);
        }
        self.set_phase(SyncPhase::Loading);
        Vec::new()
    }

    /// Polls for load completion and drains queued widget events.
    pub fn tick(&mut self) -> Vec<SyncEffect> {
        match self.phase {
            SyncPhase::Loading => {
                if let Some(library) = self.registry.available() {
                    return self.create_widget(library);
                }
                if !self.failure_reported {
                    if let Some(err) = self.registry.failure() {
                        self.failure_reported = true;
                        tracing::error!(anchor = self.anchor.id(), error = %err, "editor cannot load");
                    }
                }
                Vec::new()
            }
            SyncPhase::Ready => self.drain_events(),
            SyncPhase::Unloaded | SyncPhase::Disposed => Vec::new(),
        }
    }

    pub fn set_props(&mut self, props: EditorProps) -> Vec<SyncEffect> {
        if self.phase == SyncPhase::Disposed {
            return Vec::new();
        }

        let prev = std::mem::replace(&mut self.props, props);
        let Some(widget) = self.widget.as_mut() else {
            return Vec::new();
        };

        if self.props.value != self.last_known {
            // 硬覆盖：光标位置不保留
            self.last_known = self.props.value.clone();
            widget.set_value(&self.props.value);
        } else if prev.value != self.props.value {
            tracing::debug!(anchor = self.anchor.id(), "external value matches buffer, skipped");
        }

        if prev.language != self.props.language {
            widget.set_language(self.props.language);
        }

        if prev.read_only != self.props.read_only {
            widget.set_read_only(self.props.read_only);
        }

        if prev.render_signal != self.props.render_signal {
            widget.layout(Some(Size::ZERO));
            widget.layout(None);
        }

        self.drain_events()
    }

    pub fn handle_input(&mut self, input: &WidgetInput) -> Vec<SyncEffect> {
        let Some(widget) = self.widget.as_mut() else {
            return Vec::new();
        };
        widget.handle_input(input);
        self.drain_events()
    }

    pub fn handle_widget_event(&mut self, event: WidgetEvent) -> Option<SyncEffect> {
        if self.phase != SyncPhase::Ready {
            return None;
        }
        let widget = self.widget.as_ref()?;

        match event {
            WidgetEvent::ContentChanged => {
                let value = widget.value();
                if value == self.last_known {
                    return None;
                }
                self.last_known = value.clone();
                Some(SyncEffect::Changed(value))
            }
            WidgetEvent::DecorationsChanged => {
                let markers = widget.markers();
                self.markers
                    .update(markers)
                    .map(|markers| SyncEffect::SyntaxErrors(markers.to_vec()))
            }
        }
    }

    /// Releases the widget. Safe before the widget exists and safe to repeat.
    pub fn dispose(&mut self) {
        if self.phase == SyncPhase::Disposed {
            return;
        }
        if let Some(mut widget) = self.widget.take() {
            widget.dispose();
        }
        self.events = None;
        self.set_phase(SyncPhase::Disposed);
    }

    fn create_widget(&mut self, library: SharedLibrary) -> Vec<SyncEffect> {
        let (sink, rx) = WidgetEventSink::channel();
        let options = WidgetOptions {
            value: self.props.value.clone(),
            language: self.props.language,
            read_only: self.props.read_only,
            tab_size: self.config.tab_size,
            word_wrap: self.config.word_wrap,
            show_line_numbers: self.config.show_line_numbers,
        };
        self.widget = Some(library.create(&self.anchor, options, sink));
        self.events = Some(rx);
        self.last_known = self.props.value.clone();
        self.set_phase(SyncPhase::Ready);
        tracing::info!(
            anchor = self.anchor.id(),
            library = library.name(),
            language = %self.props.language,
            "editor ready"
        );

        let mut effects = vec![SyncEffect::Loaded];
        effects.extend(self.drain_events());
        effects
    }

    fn drain_events(&mut self) -> Vec<SyncEffect> {
        let pending: Vec<WidgetEvent> = match self.events.as_ref() {
            Some(rx) => rx.try_iter().collect(),
            None => return Vec::new(),
        };
        pending
            .into_iter()
            .filter_map(|event| self.handle_widget_event(event))
            .collect()
    }

    fn set_phase(&mut self, phase: SyncPhase) {
        tracing::debug!(
            anchor = self.anchor.id(),
            from = self.phase.label(),
            to = phase.label(),
            "editor phase"
        );
        self.phase = phase;
    }
}

impl Drop for EditorSync {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/sync.rs"]
mod tests;
