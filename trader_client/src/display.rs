//! Bounded market data feed shown to the user.

use std::collections::VecDeque;

/// Maximum number of rendered quotes kept in the feed.
pub const DISPLAY_CAPACITY: usize = 50;

/// Rendered quotes, newest first. Never holds more than its capacity; the
/// oldest line is evicted on overflow.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    /// Empty feed with the standard capacity.
    pub fn new() -> Self {
        Self::with_capacity(DISPLAY_CAPACITY)
    }

    /// Empty feed holding at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert `line` at index 0, evicting the oldest line if the feed is full.
    pub fn push(&mut self, line: String) {
        self.lines.push_front(line);
        self.lines.truncate(self.capacity);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index` (0 is newest).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lines, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
