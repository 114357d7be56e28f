use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub library: LibrarySettings,
}

/// Overrides for [`super::config::EditorConfig`]; absent keys keep defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_debounce_ms: Option<i64>,
}

/// Where to load the widget library from. Empty means the built-in assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
}

impl LibrarySettings {
    pub fn is_configured(&self) -> bool {
        self.style.is_some() && !self.scripts.is_empty()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
