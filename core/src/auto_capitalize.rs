//! Auto-capitalisation helpers.
//!
//! Two concerns live here: deciding whether the next key should be shifted
//! (sentence starts), and small per-layout fix-ups run after each commit
//! such as turning a lone " i " into " I ".

use crate::input_connection::{EditorInfo, InputClass, InputConnection};
use crate::keyboard_state::KeyboardMode;

/// True if the text before the cursor ends a sentence (or is empty), so the
/// next character should be capitalised.
pub fn sentence_start_caps(before: &str) -> bool {
    if before.ends_with('\n') {
        return true;
    }
    let trimmed = before.trim_end_matches(' ');
    if trimmed.is_empty() {
        return true;
    }
    let had_space = trimmed.len() < before.len();
    had_space && trimmed.ends_with(['.', '!', '?'])
}

/// Mode the keyboard should show next.
///
/// Number and phone fields get the numeric screen; otherwise the shifted
/// screen when auto-capitalize is on and the field is at a sentence start.
pub fn keyboard_mode(
    editor: &EditorInfo,
    connection: Option<&dyn InputConnection>,
    auto_capitalize: bool,
) -> KeyboardMode {
    match editor.input_class {
        InputClass::Number | InputClass::Phone => KeyboardMode::Numeric,
        _ => {
            let caps = connection.map(|ic| ic.cursor_caps_mode()).unwrap_or(false);
            if auto_capitalize && caps {
                KeyboardMode::Shifted
            } else {
                KeyboardMode::Main
            }
        }
    }
}

/// Post-commit fix-ups a layout can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoCapitalizer {
    /// " i " -> " I "
    I,
    /// " i'" -> " I'"
    IApostrophe,
}

impl AutoCapitalizer {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i" => Some(Self::I),
            "i_apostrophe" => Some(Self::IApostrophe),
            _ => None,
        }
    }

    /// Rewrite the text before the cursor if it matches. Returns true when an
    /// edit was made.
    pub fn apply(self, ic: &mut dyn InputConnection) -> bool {
        let (pattern, replacement) = match self {
            Self::I => (" i ", "I "),
            Self::IApostrophe => (" i'", "I'"),
        };
        let before = ic.text_before_cursor(3).unwrap_or_default();
        if before != pattern {
            return false;
        }
        tracing::debug!(pattern, "auto capitalizing");
        ic.delete_surrounding_text(2, 0);
        ic.commit_text(replacement, 1);
        true
    }
}
