//! Cursor movement tracking.
//!
//! The host reports the selection after every change, including changes the
//! keyboard caused itself. Before such an edit the keyboard calls
//! [`CursorTracker::ignore_next_move`]; the very next update then reports no
//! movement and clears the flag.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorTracker {
    selection_start: usize,
    selection_end: usize,
    ignore_next_move: bool,
    cursor_moved: bool,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection update from the host.
    pub fn update(&mut self, selection_start: usize, selection_end: usize) {
        self.cursor_moved = if self.ignore_next_move {
            self.ignore_next_move = false;
            false
        } else {
            selection_start != self.selection_start || selection_end != self.selection_end
        };
        if self.cursor_moved {
            tracing::debug!(selection_start, selection_end, "cursor moved");
        }
        self.selection_start = selection_start;
        self.selection_end = selection_end;
    }

    /// Whether the last update moved the cursor.
    pub fn did_cursor_move(&self) -> bool {
        self.cursor_moved
    }

    pub fn ignore_next_move(&mut self) {
        self.ignore_next_move = true;
    }

    pub fn is_ignoring_next_move(&self) -> bool {
        self.ignore_next_move
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }
}
