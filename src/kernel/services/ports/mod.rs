//! Service ports: the interfaces the kernel depends on.

pub mod config;
pub mod record;
pub mod resource;
pub mod settings;

pub use config::EditorConfig;
pub use record::{AllowAll, FieldRef, PermissionCheck, RecordError, RecordStore};
pub use resource::{
    LibraryInstaller, LibraryManifest, LibrarySource, LoadError, LoadFuture, Resource,
    ResourceKind, ResourceLoader,
};
pub use settings::{EditorSettings, LibrarySettings, Settings};
