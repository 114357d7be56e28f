use serde::{Deserialize, Serialize};

/// A validation error reported by the widget, with a 1-based source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
}

impl Marker {
    pub fn at(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column.saturating_add(1),
            message: message.into(),
        }
    }
}

/// Positional comparison: same length and field-wise equal at every index.
///
/// Reordering otherwise identical markers counts as a change.
pub fn markers_equal(a: &[Marker], b: &[Marker]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| {
        x.start_line == y.start_line
            && x.start_column == y.start_column
            && x.end_line == y.end_line
            && x.end_column == y.end_column
            && x.message == y.message
    })
}

/// Remembers the last reported marker list and filters out repeats.
#[derive(Debug, Default)]
pub struct MarkerTracker {
    last: Vec<Marker>,
}

impl MarkerTracker {
    pub fn current(&self) -> &[Marker] {
        &self.last
    }

    pub fn update(&mut self, next: Vec<Marker>) -> Option<&[Marker]> {
        if markers_equal(&self.last, &next) {
            return None;
        }
        self.last = next;
        Some(&self.last)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/markers.rs"]
mod tests;
