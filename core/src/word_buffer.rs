//! The word currently being typed.
//!
//! Text is only appended at the end and removed from the end, one character
//! at a time, so no cursor is tracked. Removal always lands on a character
//! boundary.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBuffer {
    text: String,
}

impl WordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove and return the last character. No-op on an empty buffer.
    pub fn pop_char(&mut self) -> Option<char> {
        self.text.pop()
    }
}
