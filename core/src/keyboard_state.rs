//! Keyboard mode and modifier state.
//!
//! `KeyboardState` is the front-end's side of the dispatcher contract: it
//! receives the toggle callbacks and keeps the invariants that exactly one
//! screen is displayed and that shift and caps lock never both apply.

use crate::dispatch::KeyboardCallbacks;
use crate::key_action::KeyboardPosition;
use crate::lifecycle::SavedStateStore;
use serde::{Deserialize, Serialize};

const POSITION_KEY: &str = "keyboard.position";
const LAYOUT_KEY: &str = "keyboard.layout_index";

/// The screen currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardMode {
    #[default]
    Main,
    Shifted,
    Numeric,
    Emoji,
}

/// Which capitalisation applies to the next letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capitalization {
    None,
    /// One-shot shift
    Shift,
    CapsLock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardState {
    mode: KeyboardMode,
    caps_lock: bool,
    position: KeyboardPosition,
    layouts: Vec<String>,
    layout_index: usize,
}

impl KeyboardState {
    /// State for the given layout rotation. An empty list is allowed; language
    /// switching is then a no-op.
    pub fn new(layouts: Vec<String>, position: KeyboardPosition) -> Self {
        Self {
            mode: KeyboardMode::Main,
            caps_lock: false,
            position,
            layouts,
            layout_index: 0,
        }
    }

    pub fn mode(&self) -> KeyboardMode {
        self.mode
    }

    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    pub fn position(&self) -> KeyboardPosition {
        self.position
    }

    pub fn capitalization(&self) -> Capitalization {
        match (self.mode, self.caps_lock) {
            (KeyboardMode::Shifted, true) => Capitalization::CapsLock,
            (KeyboardMode::Shifted, false) => Capitalization::Shift,
            _ => Capitalization::None,
        }
    }

    /// Name of the active layout, if any are configured.
    pub fn layout(&self) -> Option<&str> {
        self.layouts.get(self.layout_index).map(String::as_str)
    }

    /// Force a mode, e.g. numeric for a number field at input start.
    pub fn set_mode(&mut self, mode: KeyboardMode) {
        self.mode = mode;
        if mode != KeyboardMode::Shifted {
            self.caps_lock = false;
        }
    }

    /// A character was committed: a one-shot shift is used up.
    pub fn on_text_committed(&mut self) {
        if self.mode == KeyboardMode::Shifted && !self.caps_lock {
            self.mode = KeyboardMode::Main;
        }
    }

    pub fn save_to(&self, store: &mut dyn SavedStateStore) {
        store.put(POSITION_KEY, self.position.as_str().to_string());
        store.put(LAYOUT_KEY, self.layout_index.to_string());
    }

    /// Restore position and layout; unreadable values are ignored.
    pub fn restore_from(&mut self, store: &dyn SavedStateStore) {
        if let Some(pos) = store
            .get(POSITION_KEY)
            .and_then(|p| KeyboardPosition::from_name(&p))
        {
            self.position = pos;
        }
        if let Some(index) = store.get(LAYOUT_KEY).and_then(|i| i.parse::<usize>().ok()) {
            if index < self.layouts.len() {
                self.layout_index = index;
            }
        }
    }
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new(Vec::new(), KeyboardPosition::default())
    }
}

impl KeyboardCallbacks for KeyboardState {
    fn on_toggle_shift_mode(&mut self, enable: bool) {
        if enable {
            self.mode = KeyboardMode::Shifted;
        } else {
            self.caps_lock = false;
            self.mode = KeyboardMode::Main;
        }
    }

    fn on_toggle_numeric_mode(&mut self, enable: bool) {
        self.caps_lock = false;
        self.mode = if enable {
            KeyboardMode::Numeric
        } else {
            KeyboardMode::Main
        };
    }

    fn on_toggle_emoji_mode(&mut self, enable: bool) {
        self.caps_lock = false;
        self.mode = if enable {
            KeyboardMode::Emoji
        } else {
            KeyboardMode::Main
        };
    }

    fn on_toggle_caps_lock(&mut self) {
        if self.caps_lock {
            self.caps_lock = false;
            self.mode = KeyboardMode::Main;
        } else {
            self.caps_lock = true;
            self.mode = KeyboardMode::Shifted;
        }
    }

    fn on_auto_capitalize(&mut self, enable: bool) {
        if self.caps_lock {
            return;
        }
        match (self.mode, enable) {
            (KeyboardMode::Main, true) => self.mode = KeyboardMode::Shifted,
            (KeyboardMode::Shifted, false) => self.mode = KeyboardMode::Main,
            _ => {}
        }
    }

    fn on_switch_language(&mut self) {
        if self.layouts.is_empty() {
            return;
        }
        self.layout_index = (self.layout_index + 1) % self.layouts.len();
        self.caps_lock = false;
        self.mode = KeyboardMode::Main;
        tracing::debug!(layout = ?self.layout(), "switched language");
    }

    fn on_change_position(&mut self, transform: &dyn Fn(KeyboardPosition) -> KeyboardPosition) {
        self.position = transform(self.position);
    }
}
