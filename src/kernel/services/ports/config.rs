use crate::kernel::debounce::delay_from_millis;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub tab_size: u8,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
    pub save_debounce_ms: i64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            word_wrap: false,
            show_line_numbers: true,
            save_debounce_ms: 500,
        }
    }
}

impl EditorConfig {
    pub fn save_debounce(&self) -> Duration {
        delay_from_millis(self.save_debounce_ms)
    }
}
