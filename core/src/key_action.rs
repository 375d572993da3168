//! Key actions: what a key (or one of its swipe directions) does.
//!
//! A `KeyAction` is pure data. Layout tables bind one to every key center and
//! swipe direction; the dispatcher in `dispatch` gives it behavior.

use serde::{Deserialize, Serialize};

/// Raw key events forwarded unchanged to the input connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEvent {
    /// Delete the character before the cursor
    Del,
    /// Delete the character after the cursor
    ForwardDel,
    /// Cursor left
    DpadLeft,
    /// Cursor right
    DpadRight,
    /// Cursor up
    DpadUp,
    /// Cursor down
    DpadDown,
    /// Enter/Return
    Enter,
    Tab,
    Escape,
    /// Move to line start
    MoveHome,
    /// Move to line end
    MoveEnd,
}

/// Horizontal placement of the keyboard on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl KeyboardPosition {
    /// Stable name used for saved state and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Parse the name produced by [`KeyboardPosition::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A function from the previous keyboard position to the next one.
///
/// Kept as data so layouts can be authored in TOML; consumers apply it with
/// [`PositionTransform::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionTransform {
    /// Left -> Right -> Center -> Left
    CycleLeft,
    /// Left -> Center -> Right -> Left
    CycleRight,
    /// Ignore the previous position
    Set(KeyboardPosition),
}

impl PositionTransform {
    pub fn apply(self, old: KeyboardPosition) -> KeyboardPosition {
        use KeyboardPosition::*;
        match self {
            Self::CycleLeft => match old {
                Left => Right,
                Center => Left,
                Right => Center,
            },
            Self::CycleRight => match old {
                Left => Center,
                Center => Right,
                Right => Left,
            },
            Self::Set(position) => position,
        }
    }
}

/// What a key does when it is released.
///
/// Constructed fresh each time a gesture is resolved; compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Commit literal text at the cursor
    CommitText(String),
    /// Send a raw key event
    SendEvent(KeyEvent),
    /// Delete the word before the cursor
    DeleteLastWord,
    /// Replace the word before the cursor
    ReplaceLastWord(String),
    ToggleShiftMode(bool),
    ToggleNumericMode(bool),
    ToggleEmojiMode(bool),
    ToggleCapsLock,
    SwitchLanguage,
    /// Move the keyboard; the transform receives the current position
    ChangePosition(PositionTransform),
}

impl KeyAction {
    /// Shorthand for `KeyAction::CommitText`.
    pub fn commit<T: Into<String>>(text: T) -> Self {
        Self::CommitText(text.into())
    }

    /// The committed text, for `CommitText` actions.
    pub fn commit_text(&self) -> Option<&str> {
        match self {
            Self::CommitText(text) => Some(text),
            _ => None,
        }
    }
}
