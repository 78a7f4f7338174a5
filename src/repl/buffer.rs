//! Line buffer shared between the line editor and the completion engine

use parking_lot::RwLock;

use crate::completion::{Position, TextSurface, word_end, word_start};

#[derive(Debug, Default)]
struct BufferState {
    text: String,
    /// Byte offset of the cursor in `text`
    cursor: usize,
}

/// Snapshot of the editor buffer the engine completes into
///
/// Reedline owns the real buffer; the completer and hinter copy it here
/// before talking to the engine.
#[derive(Debug, Default)]
pub struct LineBuffer {
    state: RwLock<BufferState>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer content and cursor byte offset
    ///
    /// The cursor is clamped to the text and moved back to a char boundary.
    pub fn set(&self, text: &str, cursor: usize) {
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }

        let mut state = self.state.write();
        state.text.clear();
        state.text.push_str(text);
        state.cursor = cursor;
    }

    pub fn text(&self) -> String {
        self.state.read().text.clone()
    }

    /// Cursor byte offset
    pub fn cursor_offset(&self) -> usize {
        self.state.read().cursor
    }

    /// Whether the buffer currently holds `text` with the cursor at `cursor`
    pub fn matches(&self, text: &str, cursor: usize) -> bool {
        let state = self.state.read();
        state.text == text && state.cursor == cursor
    }

    /// Byte span of the word fragment ending at the cursor
    pub fn word_span(&self) -> (usize, usize) {
        let state = self.state.read();
        (word_start(&state.text, state.cursor), state.cursor)
    }
}

impl TextSurface for LineBuffer {
    fn cursor(&self) -> Position {
        let state = self.state.read();
        let before = &state.text[..state.cursor];
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);

        Position::new(
            before.matches('\n').count(),
            before[line_start..].chars().count(),
        )
    }

    fn word_at_cursor(&self) -> String {
        let state = self.state.read();
        let start = word_start(&state.text, state.cursor);
        state.text[start..state.cursor].to_string()
    }

    fn replace_current_word(&self, text: &str) {
        let mut state = self.state.write();
        let start = word_start(&state.text, state.cursor);
        let end = word_end(&state.text, state.cursor);

        state.text.replace_range(start..end, text);
        state.cursor = start + text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_buffer(text: &str, cursor: usize) -> LineBuffer {
        let buffer = LineBuffer::new();
        buffer.set(text, cursor);
        buffer
    }

    #[test]
    fn test_cursor_position_single_line() {
        let buffer = create_test_buffer("let foo", 7);
        assert_eq!(buffer.cursor(), Position::new(0, 7));
        assert_eq!(buffer.word_at_cursor(), "foo");
        assert_eq!(buffer.word_span(), (4, 7));
    }

    #[test]
    fn test_cursor_position_multi_line() {
        let buffer = create_test_buffer("fn main() {\n    pri", 19);
        assert_eq!(buffer.cursor(), Position::new(1, 7));
        assert_eq!(buffer.line(), 1);
        assert_eq!(buffer.word_at_cursor(), "pri");
    }

    #[test]
    fn test_cursor_counts_characters() {
        let buffer = create_test_buffer("größe", "größe".len());
        assert_eq!(buffer.cursor(), Position::new(0, 5));
    }

    #[test]
    fn test_cursor_is_clamped() {
        let buffer = create_test_buffer("ab", 10);
        assert_eq!(buffer.cursor_offset(), 2);

        let buffer = create_test_buffer("ö", 1);
        assert_eq!(buffer.cursor_offset(), 0);
    }

    #[test]
    fn test_replace_current_word() {
        let buffer = create_test_buffer("let tot + 1", 6);
        buffer.replace_current_word("total");

        assert_eq!(buffer.text(), "let total + 1");
        assert_eq!(buffer.cursor_offset(), 9);
    }

    #[test]
    fn test_replace_at_word_boundary_inserts() {
        let buffer = create_test_buffer("x = ", 4);
        buffer.replace_current_word("value");
        assert_eq!(buffer.text(), "x = value");
    }

    #[test]
    fn test_matches() {
        let buffer = create_test_buffer("abc", 1);
        assert!(buffer.matches("abc", 1));
        assert!(!buffer.matches("abc", 2));
    }
}
