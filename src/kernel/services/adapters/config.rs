//! 配置服务：管理编辑器配置
//!
//! 默认值 + settings 文件中的覆盖项

use crate::kernel::services::ports::config::EditorConfig;
use crate::kernel::services::ports::settings::Settings;

pub struct ConfigService {
    editor: EditorConfig,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            editor: EditorConfig::default(),
        }
    }

    pub fn with_editor_config(editor: EditorConfig) -> Self {
        Self { editor }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut editor = EditorConfig::default();
        let overrides = &settings.editor;
        if let Some(tab_size) = overrides.tab_size {
            editor.tab_size = tab_size.max(1);
        }
        if let Some(word_wrap) = overrides.word_wrap {
            editor.word_wrap = word_wrap;
        }
        if let Some(show) = overrides.show_line_numbers {
            editor.show_line_numbers = show;
        }
        if let Some(ms) = overrides.save_debounce_ms {
            editor.save_debounce_ms = ms;
        }
        Self { editor }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorConfig {
        &mut self.editor
    }

    pub fn set_tab_size(&mut self, size: u8) {
        self.editor.tab_size = size;
    }

    pub fn set_save_debounce_ms(&mut self, ms: i64) {
        self.editor.save_debounce_ms = ms;
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/config.rs"]
mod tests;
