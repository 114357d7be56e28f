pub mod rope;

pub use rope::{RopeLibraryInstaller, RopeWidget, RopeWidgetLibrary};
