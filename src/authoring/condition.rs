//! The text input used to edit a conditional block's condition.

use std::ops::Range;

use super::focus::ConditionHandle;
use crate::util::byte_offset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEditor {
    pub handle: ConditionHandle,
    /// Block whose condition is being edited.
    pub block_id: String,
    pub text: String,
    /// Char offsets; a collapsed selection is the cursor.
    selection: Range<usize>,
}

impl ConditionEditor {
    /// An editor over `text` with the cursor at its end.
    pub fn new(
        handle: ConditionHandle,
        block_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let end = text.chars().count();
        Self {
            handle,
            block_id: block_id.into(),
            text,
            selection: end..end,
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    /// Replace the text as typed by the user; the cursor moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let len = self.len();
        self.selection = len..len;
    }

    pub fn select(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end || range.end > self.len() {
            return false;
        }
        self.selection = range;
        true
    }

    /// Insert at the cursor (replacing a non-empty selection) and move the
    /// cursor after the inserted text.
    pub fn insert(&mut self, insertion: &str) {
        let start = byte_offset(&self.text, self.selection.start);
        let end = byte_offset(&self.text, self.selection.end);
        self.text.replace_range(start..end, insertion);

        let cursor = self.selection.start + insertion.chars().count();
        self.selection = cursor..cursor;
    }

    /// Transform the selected text. Returns false when nothing is selected.
    pub fn transform_selection(&mut self, transform: impl Fn(&str) -> String) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let start = byte_offset(&self.text, self.selection.start);
        let end = byte_offset(&self.text, self.selection.end);
        let replacement = transform(&self.text[start..end]);
        self.text.replace_range(start..end, &replacement);

        self.selection = self.selection.start..self.selection.start + replacement.chars().count();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_cursor() {
        let mut editor = ConditionEditor::new(ConditionHandle(1), "b1", "EDAD > 18 && ");
        editor.insert("TIENE_HIJOS");

        assert_eq!(editor.text, "EDAD > 18 && TIENE_HIJOS");
        assert_eq!(editor.cursor(), 24);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut editor = ConditionEditor::new(ConditionHandle(1), "b1", "año ==  ");
        editor.select(7..7);
        editor.insert("X");

        assert_eq!(editor.text, "año == X ");
        assert_eq!(editor.cursor(), 8);
    }

    #[test]
    fn test_set_text_moves_cursor_to_end() {
        let mut editor = ConditionEditor::new(ConditionHandle(1), "b1", "LARGO");
        editor.set_text("AB");
        assert_eq!(editor.selection(), 2..2);
    }

    #[test]
    fn test_transform_selection() {
        let mut editor = ConditionEditor::new(ConditionHandle(1), "b1", "cargo == gerente");
        assert!(!editor.transform_selection(|s| s.to_uppercase()));

        editor.select(0..5);
        assert!(editor.transform_selection(|s| s.to_uppercase()));
        assert_eq!(editor.text, "CARGO == gerente");
    }
}
