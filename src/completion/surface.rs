//! Text surface the engine completes into

use super::context::Position;

/// Editable text the engine is attached to
///
/// Implemented by the host widget or buffer. Methods take `&self`, the host
/// owns its own locking.
pub trait TextSurface: Send + Sync {
    /// Current cursor position
    fn cursor(&self) -> Position;

    /// Line the cursor is on
    fn line(&self) -> usize {
        self.cursor().line
    }

    /// Word fragment between the start of the current word and the cursor
    fn word_at_cursor(&self) -> String;

    /// Replace the word around the cursor with `text`, leaving the cursor
    /// after the inserted text
    fn replace_current_word(&self, text: &str);
}

/// Whether `c` is part of a word for completion purposes
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset where the word ending at byte offset `cursor` starts
///
/// Equal to `cursor` when the cursor is not preceded by a word character.
pub fn word_start(line: &str, cursor: usize) -> usize {
    let cursor = cursor.min(line.len());
    line[..cursor]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map_or(cursor, |(index, _)| index)
}

/// Byte offset where the word containing `cursor` ends
pub fn word_end(line: &str, cursor: usize) -> usize {
    let cursor = cursor.min(line.len());
    line[cursor..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(line.len(), |(index, _)| cursor + index)
}
