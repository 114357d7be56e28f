use crate::kernel::widget::SharedLibrary;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Style,
    Script,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Script => "script",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub kind: ResourceKind,
    pub location: String,
}

impl Resource {
    pub fn style(location: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Style,
            location: location.into(),
        }
    }

    pub fn script(location: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Script,
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Io { resource: String, message: String },
    Parse { resource: String, message: String },
    MissingDependency { resource: String, requires: &'static str },
    Install(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { resource, message } => {
                write!(f, "Failed to load {}: {}", resource, message)
            }
            LoadError::Parse { resource, message } => {
                write!(f, "Invalid resource {}: {}", resource, message)
            }
            LoadError::MissingDependency { resource, requires } => {
                write!(f, "{} loaded before {}", resource, requires)
            }
            LoadError::Install(msg) => write!(f, "Widget library install failed: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

/// Style first, then scripts in order. Later entries may depend on what
/// earlier ones installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryManifest {
    resources: Vec<Resource>,
}

impl LibraryManifest {
    pub fn new<I, S>(style: impl Into<String>, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resources = vec![Resource::style(style)];
        resources.extend(scripts.into_iter().map(Resource::script));
        Self { resources }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

pub type LoadFuture = Pin<Box<dyn Future<Output = Result<String, LoadError>> + Send + 'static>>;

/// "Load this resource, resolve when ready."
pub trait ResourceLoader: Send + Sync {
    fn load(&self, resource: &Resource) -> LoadFuture;
}

/// Receives each loaded resource in manifest order and finally produces the
/// library.
pub trait LibraryInstaller: Send {
    fn apply(&mut self, resource: &Resource, body: &str) -> Result<(), LoadError>;
    fn finish(self: Box<Self>) -> Result<SharedLibrary, LoadError>;
}

pub type InstallerFactory = Arc<dyn Fn() -> Box<dyn LibraryInstaller> + Send + Sync>;

#[derive(Clone)]
pub struct LibrarySource {
    pub loader: Arc<dyn ResourceLoader>,
    pub manifest: LibraryManifest,
    pub installer: InstallerFactory,
}

impl std::fmt::Debug for LibrarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibrarySource")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}
