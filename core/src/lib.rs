//! thumbkey-core
//!
//! Language-agnostic core of a thumb-typing keyboard: the key action model,
//! layout tables, word prediction over a host spell checker, the key action
//! dispatcher and the input method service that ties them to a text field.
//!
//! Host services (the text field, the spell checker, persisted state) are
//! traits, so everything here runs without a platform behind it.
//!
//! Public API:
//! - `KeyAction` - What a key or swipe does
//! - `KeyboardDefinition` - A layout: screens of keys with swipe slots
//! - `PredictionManager` - Current word and its suggestions
//! - `ImeService` - Input method bridge with cursor tracking
//! - `perform_key_action` / `done_key_action` - Key action dispatch
//! - `Config` - Configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod key_action;
pub use key_action::{KeyAction, KeyEvent, KeyboardPosition, PositionTransform};

pub mod layout;
pub use layout::{
    swipe_direction, KeyC, KeyItemC, KeyboardC, KeyboardDefinition, KeyboardDefinitionSettings,
    SwipeDirection, SwipeNWay,
};

pub mod input_connection;
pub use input_connection::{EditorInfo, InputClass, InputConnection, MemoryInputConnection};

pub mod auto_capitalize;
pub use auto_capitalize::AutoCapitalizer;

pub mod keyboard_state;
pub use keyboard_state::{Capitalization, KeyboardMode, KeyboardState};

pub mod lifecycle;
pub use lifecycle::{
    InMemoryStateStore, LifecycleEvent, LifecycleOwner, LifecycleRegistry, LifecycleState,
    SavedStateStore,
};

// Prediction
pub mod spell_checker;
pub use spell_checker::{
    SentenceSuggestionsInfo, SpellCheckResult, SpellCheckerSession, SuggestionBatch,
    SuggestionRequest, SuggestionsInfo, TextServices,
};

pub mod suggestions;
pub use suggestions::{SubscriptionId, SuggestionFeed};

pub mod word_buffer;
pub use word_buffer::WordBuffer;

pub mod prediction;
pub use prediction::PredictionManager;

// Service
pub mod cursor;
pub use cursor::CursorTracker;

pub mod dispatch;
pub use dispatch::{done_key_action, perform_key_action, KeyFeedback, KeyboardCallbacks};

pub mod ime_service;
pub use ime_service::ImeService;

/// Keyboard configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum suggestions requested per word
    pub suggestion_limit: usize,
    /// How many characters before the cursor word edits look at
    pub text_before_cursor_window: usize,
    /// How long a released key stays highlighted, in milliseconds
    pub animation_helper_speed_ms: u64,
    /// Drags shorter than this (in pixels) count as taps
    pub min_swipe_length: f32,
    /// Shift at sentence starts and run the layout's capitalizers
    pub auto_capitalize: bool,
    /// Locale passed to the spell checker
    pub spell_check_locale: String,
    /// Layouts cycled by the switch-language key, in order
    pub layouts: Vec<String>,
    pub position: KeyboardPosition,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suggestion_limit: prediction::DEFAULT_SUGGESTION_LIMIT,
            text_before_cursor_window: 50,
            animation_helper_speed_ms: 250,
            min_swipe_length: 40.0,
            auto_capitalize: true,
            spell_check_locale: "en_US".to_string(),
            layouts: vec!["en_thumbkey_writer".to_string()],
            position: KeyboardPosition::Center,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Released-key highlight duration.
    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_helper_speed_ms)
    }

    /// A fresh keyboard state for the configured layouts and position.
    pub fn keyboard_state(&self) -> KeyboardState {
        KeyboardState::new(self.layouts.clone(), self.position)
    }
}

pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// True if `s` is non-empty and made only of alphabetic characters.
    pub fn is_word(s: &str) -> bool {
        !s.is_empty() && s.chars().all(char::is_alphabetic)
    }
}
