//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod config;
pub mod loader;
pub mod paths;
pub mod record;
pub mod record_watcher;
pub mod runtime;
pub mod settings;

pub use config::ConfigService;
pub use loader::{FsResourceLoader, LibraryRegistry, LibraryState, StaticResourceLoader};
pub use paths::{ensure_log_dir, get_log_dir};
pub use record::{JsonFileRecordStore, MemoryRecordStore};
pub use record_watcher::RecordWatcher;
pub use runtime::AsyncRuntime;
pub use settings::{ensure_settings_file, get_settings_path, load_settings};
