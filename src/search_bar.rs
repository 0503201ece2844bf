//! Editable search buffer with a caret and an optional selection.
//!
//! Positions are char indices, not byte offsets.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EraseKey {
    Backspace,
    Delete,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchBar {
    text: String,
    caret: usize,
    /// Half-open `[start, end)` selection.
    selection: Option<(usize, usize)>,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    /// Selection if there is one, else the empty range at the caret.
    fn span(&self) -> (usize, usize) {
        self.selection.unwrap_or((self.caret, self.caret))
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        let from = self.byte_offset(start);
        let to = self.byte_offset(end);
        self.text.replace_range(from..to, "");
        self.caret = start;
        self.selection = None;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
        self.selection = None;
    }

    /// Replaces the selection, or inserts at the caret.
    pub fn insert(&mut self, ch: char) {
        let (start, end) = self.span();
        if start != end {
            self.remove_range(start, end);
        }
        let offset = self.byte_offset(self.caret);
        self.text.insert(offset, ch);
        self.caret += 1;
        self.selection = None;
    }

    /// Whether `key` is going to leave the buffer empty.
    pub fn will_be_clear(&self, key: EraseKey) -> bool {
        let len = self.len();
        let (start, end) = self.span();
        (start == 0 && end == len)
            || (key == EraseKey::Backspace && len == 1 && start == 1)
            || (key == EraseKey::Delete && len == 1 && start == 0)
    }

    /// Removes the selection, or one char next to the caret. Returns whether
    /// the text changed.
    pub fn erase(&mut self, key: EraseKey) -> bool {
        let (start, end) = self.span();
        if start != end {
            self.remove_range(start, end);
            return true;
        }
        match key {
            EraseKey::Backspace if self.caret > 0 => {
                self.remove_range(self.caret - 1, self.caret);
                true
            }
            EraseKey::Delete if self.caret < self.len() => {
                self.remove_range(self.caret, self.caret + 1);
                true
            }
            _ => false,
        }
    }

    pub fn select_all(&mut self) {
        let len = self.len();
        self.selection = (len > 0).then_some((0, len));
        self.caret = len;
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
        self.selection = None;
    }

    pub fn move_end(&mut self) {
        self.caret = self.len();
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(text: &str) -> SearchBar {
        let mut bar = SearchBar::new();
        text.chars().for_each(|ch| bar.insert(ch));
        bar
    }

    #[test]
    fn insert_appends_at_caret() {
        let mut bar = bar("gol");
        bar.move_home();
        bar.insert('>');
        assert_eq!(bar.text(), ">gol");
        assert_eq!(bar.caret(), 1);
    }

    #[test]
    fn insert_replaces_selection() {
        let mut bar = bar("gmail");
        bar.select_all();
        bar.insert('x');
        assert_eq!(bar.text(), "x");
        assert_eq!(bar.selection(), None);
    }

    #[test]
    fn backspace_and_delete_remove_neighbours() {
        let mut bar = bar("rust");
        assert!(bar.erase(EraseKey::Backspace));
        assert_eq!(bar.text(), "rus");
        assert!(!bar.erase(EraseKey::Delete));
        bar.move_home();
        assert!(bar.erase(EraseKey::Delete));
        assert_eq!(bar.text(), "us");
        assert!(!bar.erase(EraseKey::Backspace));
    }

    #[test]
    fn erase_handles_multibyte_text() {
        let mut bar = bar("zaż");
        assert!(bar.erase(EraseKey::Backspace));
        assert_eq!(bar.text(), "za");
    }

    #[test]
    fn will_be_clear_cases() {
        let single = bar("g");
        assert!(single.will_be_clear(EraseKey::Backspace));
        assert!(!single.will_be_clear(EraseKey::Delete));

        let mut at_start = bar("g");
        at_start.move_home();
        assert!(at_start.will_be_clear(EraseKey::Delete));
        assert!(!at_start.will_be_clear(EraseKey::Backspace));

        let longer = bar("go");
        assert!(!longer.will_be_clear(EraseKey::Backspace));

        let mut selected = bar("google");
        selected.select_all();
        assert!(selected.will_be_clear(EraseKey::Delete));

        assert!(SearchBar::new().will_be_clear(EraseKey::Backspace));
    }

    #[test]
    fn select_all_on_empty_buffer_selects_nothing() {
        let mut bar = SearchBar::new();
        bar.select_all();
        assert_eq!(bar.selection(), None);
    }
}
