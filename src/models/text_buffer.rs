//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 光标管理（字符偏移）
//! - 字符偏移 ↔ 行列映射

use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    rope: Rope,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: 0,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Replaces everything. The cursor goes back to the start.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, char_idx: usize) {
        self.cursor = char_idx.min(self.rope.len_chars());
    }

    /// 0-based (line, column) of the cursor, column in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.cursor);
        let col = self.cursor - self.rope.line_to_char(line);
        (line, col)
    }

    pub fn insert_str(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.rope.insert(self.cursor, text);
        self.cursor += text.chars().count();
        true
    }

    /// Removes the grapheme before the cursor.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.prev_boundary(self.cursor);
        self.rope.remove(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Removes the grapheme after the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.rope.len_chars() {
            return false;
        }
        let end = self.next_boundary(self.cursor);
        self.rope.remove(self.cursor..end);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = self.prev_boundary(self.cursor);
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.rope.len_chars() {
            return false;
        }
        self.cursor = self.next_boundary(self.cursor);
        true
    }

    pub fn move_line_start(&mut self) -> bool {
        let line = self.rope.char_to_line(self.cursor);
        let start = self.rope.line_to_char(line);
        let moved = start != self.cursor;
        self.cursor = start;
        moved
    }

    pub fn move_line_end(&mut self) -> bool {
        let line = self.rope.char_to_line(self.cursor);
        let slice = self.rope.line(line);
        let mut end = self.rope.line_to_char(line) + slice.len_chars();
        // 不越过行尾换行符
        if slice.chars().last() == Some('\n') {
            end -= 1;
            if end > 0 && self.rope.char(end - 1) == '\r' {
                end -= 1;
            }
        }
        let moved = end != self.cursor;
        self.cursor = end;
        moved
    }

    fn prev_boundary(&self, char_idx: usize) -> usize {
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        if char_idx == line_start {
            // CRLF 视为一个换行
            if char_idx >= 2
                && self.rope.char(char_idx - 1) == '\n'
                && self.rope.char(char_idx - 2) == '\r'
            {
                return char_idx - 2;
            }
            return char_idx - 1;
        }
        let text = self.rope.slice(line_start..char_idx).to_string();
        let last = text.graphemes(true).next_back().map_or(1, |g| g.chars().count());
        char_idx - last
    }

    fn next_boundary(&self, char_idx: usize) -> usize {
        let line = self.rope.char_to_line(char_idx);
        let line_end = self.rope.line_to_char(line) + self.rope.line(line).len_chars();
        let text = self.rope.slice(char_idx..line_end).to_string();
        let first = text.graphemes(true).next().map_or(1, |g| g.chars().count());
        char_idx + first
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
