//! Key action dispatch.
//!
//! [`perform_key_action`] turns a resolved [`KeyAction`] into edits on the
//! input connection (through [`ImeService`], so prediction stays in sync) or
//! into mode changes reported to the front-end via [`KeyboardCallbacks`].
//! [`done_key_action`] handles the visual release feedback once the gesture
//! ends.

use std::time::{Duration, Instant};

use crate::input_connection::InputConnection;
use crate::ime_service::ImeService;
use crate::key_action::{KeyAction, KeyboardPosition};
use crate::keyboard_state::KeyboardMode;
use crate::layout::KeyboardDefinitionSettings;

/// Mode and placement changes the dispatcher asks the front-end to make.
pub trait KeyboardCallbacks {
    fn on_toggle_shift_mode(&mut self, enable: bool);
    fn on_toggle_numeric_mode(&mut self, enable: bool);
    fn on_toggle_emoji_mode(&mut self, enable: bool);
    fn on_toggle_caps_lock(&mut self);
    /// Called after each commit while auto-capitalize is on.
    fn on_auto_capitalize(&mut self, enable: bool);
    fn on_switch_language(&mut self);
    /// `transform` maps the old position to the new one.
    fn on_change_position(&mut self, transform: &dyn Fn(KeyboardPosition) -> KeyboardPosition);
}

pub fn perform_key_action<C: InputConnection>(
    action: &KeyAction,
    ime: &mut ImeService<C>,
    auto_capitalize: bool,
    settings: &KeyboardDefinitionSettings,
    callbacks: &mut dyn KeyboardCallbacks,
) {
    match action {
        KeyAction::CommitText(text) => {
            tracing::debug!(text = %text, "committing key text");
            ime.commit_text(text, 1);
            if auto_capitalize {
                ime.run_auto_capitalizers(&settings.auto_capitalizers);
                let mode = ime.keyboard_mode(auto_capitalize);
                callbacks.on_auto_capitalize(mode == KeyboardMode::Shifted);
            }
        }
        KeyAction::SendEvent(event) => {
            tracing::debug!(?event, "sending key event");
            ime.send_key_event(*event);
        }
        KeyAction::DeleteLastWord => {
            let word = ime.current_word();
            tracing::debug!(word = %word, "deleting last word");
            ime.replace_word(&word, None);
            ime.reset_prediction();
        }
        KeyAction::ReplaceLastWord(replacement) => {
            let word = ime.current_word();
            tracing::debug!(word = %word, replacement = %replacement, "replacing last word");
            ime.replace_word(&word, Some(replacement));
            ime.reset_prediction();
        }
        KeyAction::ToggleShiftMode(enable) => callbacks.on_toggle_shift_mode(*enable),
        KeyAction::ToggleNumericMode(enable) => callbacks.on_toggle_numeric_mode(*enable),
        KeyAction::ToggleEmojiMode(enable) => callbacks.on_toggle_emoji_mode(*enable),
        KeyAction::ToggleCapsLock => callbacks.on_toggle_caps_lock(),
        KeyAction::SwitchLanguage => callbacks.on_switch_language(),
        KeyAction::ChangePosition(transform) => {
            let transform = *transform;
            callbacks.on_change_position(&move |old| transform.apply(old));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReset {
    generation: u64,
    due: Instant,
}

/// Per-key press feedback: whether the key is being dragged and which text
/// was just released, shown briefly before it resets.
#[derive(Debug, Clone, Default)]
pub struct KeyFeedback {
    is_dragged: bool,
    released_key: Option<String>,
    pending: Option<PendingReset>,
    generation: u64,
}

impl KeyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragged(&self) -> bool {
        self.is_dragged
    }

    pub fn set_dragged(&mut self, dragged: bool) {
        self.is_dragged = dragged;
    }

    pub fn released_key(&self) -> Option<&str> {
        self.released_key.as_deref()
    }

    pub fn is_reset_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Bumped on every schedule; a reset fires only for the latest one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn schedule_reset(&mut self, due: Instant) {
        self.generation += 1;
        self.pending = Some(PendingReset {
            generation: self.generation,
            due,
        });
    }

    /// Fire the pending reset if it is due. Returns true if it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if p.generation == self.generation && now >= p.due => {
                self.pending = None;
                self.released_key = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending reset, e.g. when the key leaves the screen.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// The gesture on a key finished after `action` was performed.
pub fn done_key_action(action: &KeyAction, feedback: &mut KeyFeedback, now: Instant, delay: Duration) {
    feedback.is_dragged = false;
    match action.commit_text() {
        Some(text) => {
            feedback.released_key = Some(text.to_string());
            feedback.schedule_reset(now + delay);
        }
        None => {
            feedback.released_key = None;
            feedback.pending = None;
        }
    }
}
