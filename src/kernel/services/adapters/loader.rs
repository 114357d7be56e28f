//! 组件库加载：进程内只加载一次
//!
//! `LibraryRegistry` carries the library through
//! `Uninitialized -> Loading -> Loaded | Failed` in a watch channel. The first
//! caller that finds it uninitialized starts the load; everyone else observes
//! the same state, either by polling `available()` from the UI thread or by
//! awaiting `wait()`.

use crate::kernel::services::ports::resource::{
    LibrarySource, LoadError, LoadFuture, Resource, ResourceLoader,
};
use crate::kernel::widget::SharedLibrary;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Clone)]
pub enum LibraryState {
    Uninitialized,
    Loading,
    Loaded(SharedLibrary),
    Failed(LoadError),
}

impl LibraryState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Failed(_))
    }
}

impl std::fmt::Debug for LibraryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(library) => write!(f, "Loaded({})", library.name()),
            Self::Failed(err) => write!(f, "Failed({})", err),
            other => f.write_str(other.label()),
        }
    }
}

pub struct LibraryRegistry {
    state: watch::Sender<LibraryState>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<LibraryRegistry>> = OnceLock::new();

impl LibraryRegistry {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LibraryState::Uninitialized);
        Self { state }
    }

    pub fn preloaded(library: SharedLibrary) -> Self {
        let (state, _) = watch::channel(LibraryState::Loaded(library));
        Self { state }
    }

    /// The registry shared by every editor in the process.
    pub fn global() -> Arc<LibraryRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(LibraryRegistry::new()))
            .clone()
    }

    pub fn state(&self) -> LibraryState {
        self.state.borrow().clone()
    }

    pub fn available(&self) -> Option<SharedLibrary> {
        match &*self.state.borrow() {
            LibraryState::Loaded(library) => Some(library.clone()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<LoadError> {
        match &*self.state.borrow() {
            LibraryState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Starts loading on `runtime` unless a load was already started or
    /// finished. Returns whether this call started it.
    pub fn begin_load(
        self: &Arc<Self>,
        source: &LibrarySource,
        runtime: &tokio::runtime::Handle,
    ) -> bool {
        let started = self.state.send_if_modified(|state| {
            if matches!(state, LibraryState::Uninitialized) {
                *state = LibraryState::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            return false;
        }

        tracing::debug!(
            resources = source.manifest.resources().len(),
            "widget library load started"
        );
        let registry = Arc::clone(self);
        let source = source.clone();
        runtime.spawn(async move {
            let result = load_library(&source).await;
            registry.settle(result);
        });
        true
    }

    fn settle(&self, result: Result<SharedLibrary, LoadError>) {
        let next = match result {
            Ok(library) => {
                tracing::info!(library = library.name(), "widget library loaded");
                LibraryState::Loaded(library)
            }
            Err(err) => {
                tracing::error!(error = %err, "widget library failed to load");
                LibraryState::Failed(err)
            }
        };
        self.state.send_replace(next);
    }

    /// Resolves once the shared load settles. Never resolves if nobody starts
    /// the load.
    pub async fn wait(&self) -> Result<SharedLibrary, LoadError> {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(LibraryState::is_settled)
            .await
            .map(|state| (*state).clone());
        match settled {
            Ok(LibraryState::Loaded(library)) => Ok(library),
            Ok(LibraryState::Failed(err)) => Err(err),
            Ok(_) | Err(_) => Err(LoadError::Install("registry closed".to_string())),
        }
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_library(source: &LibrarySource) -> Result<SharedLibrary, LoadError> {
    let mut installer = (source.installer)();
    for resource in source.manifest.resources() {
        // 每一步都要等上一步完成：脚本依赖样式阶段安装的全局状态
        let body = source.loader.load(resource).await?;
        tracing::debug!(
            kind = resource.kind.label(),
            location = %resource.location,
            bytes = body.len(),
            "widget resource loaded"
        );
        installer.apply(resource, &body)?;
    }
    installer.finish()
}

/// Reads resources relative to a root directory.
pub struct FsResourceLoader {
    root: PathBuf,
}

impl FsResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, resource: &Resource) -> LoadFuture {
        let path = self.root.join(&resource.location);
        let name = resource.location.clone();
        Box::pin(async move {
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| LoadError::Io {
                    resource: name,
                    message: e.to_string(),
                })
        })
    }
}

/// In-memory resources with optional artificial latency.
///
/// Keeps a log of `start:<location>` / `end:<location>` entries so callers can
/// check how loads were sequenced.
#[derive(Default)]
pub struct StaticResourceLoader {
    bodies: FxHashMap<String, String>,
    delays: FxHashMap<String, Duration>,
    log: Arc<Mutex<Vec<String>>>,
}

impl StaticResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(location.into(), body.into());
        self
    }

    pub fn with_delay(mut self, location: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(location.into(), delay);
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

fn push_log(log: &Mutex<Vec<String>>, entry: String) {
    if let Ok(mut log) = log.lock() {
        log.push(entry);
    }
}

impl ResourceLoader for StaticResourceLoader {
    fn load(&self, resource: &Resource) -> LoadFuture {
        let location = resource.location.clone();
        let body = self.bodies.get(&location).cloned();
        let delay = self.delays.get(&location).copied();
        let log = self.log.clone();
        Box::pin(async move {
            push_log(&log, format!("start:{}", location));
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            push_log(&log, format!("end:{}", location));
            body.ok_or_else(|| LoadError::Io {
                resource: location,
                message: "not found".to_string(),
            })
        })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/loader.rs"]
mod tests;
