//! The host's text-input connection and editor description.
//!
//! `InputConnection` is the only way the keyboard touches the edited text
//! field. `MemoryInputConnection` is a complete in-memory text field used by
//! the CLI and tests.

use crate::auto_capitalize::sentence_start_caps;
use crate::key_action::KeyEvent;

/// Broad class of the field being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputClass {
    /// Free-form text (default)
    #[default]
    Text,
    Number,
    Phone,
    Datetime,
}

/// What the host tells us about the focused editor at input start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorInfo {
    pub input_class: InputClass,
    /// Package or application name, for logging only
    pub package_name: String,
}

impl EditorInfo {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn with_class(input_class: InputClass) -> Self {
        Self {
            input_class,
            ..Self::default()
        }
    }
}

/// Edit operations on the focused text field.
///
/// Return values report whether the host accepted the edit; callers in this
/// crate treat a rejected edit like any other no-op.
pub trait InputConnection {
    /// Insert `text` at the cursor, replacing any selection. Positive
    /// `new_cursor_position` places the cursor relative to the end of the
    /// inserted text (1 = right after it).
    fn commit_text(&mut self, text: &str, new_cursor_position: i32) -> bool;

    /// Delete `before` chars before and `after` chars after the cursor.
    fn delete_surrounding_text(&mut self, before: usize, after: usize) -> bool;

    /// Up to `n` chars immediately before the cursor.
    fn text_before_cursor(&self, n: usize) -> Option<String>;

    fn send_key_event(&mut self, event: KeyEvent) -> bool;

    /// Whether the next character typed should be capitalised.
    ///
    /// Hosts with native caps-mode support override this; the default looks
    /// at the text before the cursor.
    fn cursor_caps_mode(&self) -> bool {
        let before = self.text_before_cursor(64).unwrap_or_default();
        sentence_start_caps(&before)
    }
}

/// In-memory text field with a cursor and selection.
///
/// Positions are char indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryInputConnection {
    text: Vec<char>,
    selection_start: usize,
    selection_end: usize,
    /// Every raw key event received, in order
    pub key_events: Vec<KeyEvent>,
}

impl MemoryInputConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field holding `text` with the cursor at its end.
    pub fn with_text(text: &str) -> Self {
        let text: Vec<char> = text.chars().collect();
        let end = text.len();
        Self {
            text,
            selection_start: end,
            selection_end: end,
            key_events: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// (start, end) of the selection; equal when there is only a cursor.
    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    pub fn cursor(&self) -> usize {
        self.selection_end
    }

    /// Move the selection, clamped to the text.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.text.len();
        let (start, end) = (start.min(len), end.min(len));
        self.selection_start = start.min(end);
        self.selection_end = start.max(end);
    }

    fn place_cursor(&mut self, pos: usize) {
        let pos = pos.min(self.text.len());
        self.selection_start = pos;
        self.selection_end = pos;
    }

    fn delete_selection(&mut self) {
        if self.selection_start != self.selection_end {
            self.text.drain(self.selection_start..self.selection_end);
            self.selection_end = self.selection_start;
        }
    }
}

impl InputConnection for MemoryInputConnection {
    fn commit_text(&mut self, text: &str, new_cursor_position: i32) -> bool {
        self.delete_selection();
        let at = self.selection_start;
        let inserted: Vec<char> = text.chars().collect();
        let n = inserted.len();
        self.text.splice(at..at, inserted);

        let target = if new_cursor_position > 0 {
            (at + n + new_cursor_position as usize).saturating_sub(1)
        } else {
            at.saturating_sub(new_cursor_position.unsigned_abs() as usize)
        };
        self.place_cursor(target);
        true
    }

    fn delete_surrounding_text(&mut self, before: usize, after: usize) -> bool {
        let start = self.selection_start.saturating_sub(before);
        let end = (self.selection_end + after).min(self.text.len());
        // The selection itself survives; only text around it goes.
        let selected = self.selection_end - self.selection_start;
        self.text.drain(self.selection_end..end);
        self.text.drain(start..self.selection_start);
        self.selection_start = start;
        self.selection_end = start + selected;
        true
    }

    fn text_before_cursor(&self, n: usize) -> Option<String> {
        let end = self.selection_start;
        let start = end.saturating_sub(n);
        Some(self.text[start..end].iter().collect())
    }

    fn send_key_event(&mut self, event: KeyEvent) -> bool {
        self.key_events.push(event);
        match event {
            KeyEvent::Del => {
                if self.selection_start != self.selection_end {
                    self.delete_selection();
                } else {
                    self.delete_surrounding_text(1, 0);
                }
            }
            KeyEvent::ForwardDel => {
                if self.selection_start != self.selection_end {
                    self.delete_selection();
                } else {
                    self.delete_surrounding_text(0, 1);
                }
            }
            KeyEvent::DpadLeft => {
                let pos = self.selection_start.saturating_sub(1);
                self.place_cursor(pos);
            }
            KeyEvent::DpadRight => {
                let pos = self.selection_end + 1;
                self.place_cursor(pos);
            }
            KeyEvent::MoveHome | KeyEvent::DpadUp => self.place_cursor(0),
            KeyEvent::MoveEnd | KeyEvent::DpadDown => {
                let end = self.text.len();
                self.place_cursor(end);
            }
            KeyEvent::Enter => {
                self.commit_text("\n", 1);
            }
            KeyEvent::Tab => {
                self.commit_text("\t", 1);
            }
            KeyEvent::Escape => {}
        }
        true
    }
}
