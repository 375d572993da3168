//! The host-facing input method service.
//!
//! `ImeService` owns everything that lives for an input session: the input
//! connection, the prediction manager, cursor tracking and the lifecycle
//! registry. Text edits go through it so the prediction manager's word stays
//! consistent with what was actually committed.

use crate::auto_capitalize::{self, AutoCapitalizer};
use crate::cursor::CursorTracker;
use crate::input_connection::{EditorInfo, InputConnection};
use crate::key_action::KeyEvent;
use crate::keyboard_state::{KeyboardMode, KeyboardState};
use crate::lifecycle::{LifecycleEvent, LifecycleOwner, LifecycleRegistry, LifecycleState, SavedStateStore};
use crate::prediction::PredictionManager;
use crate::spell_checker::{SpellCheckResult, TextServices};
use crate::Config;

/// The part of `before` after its last space: the word at the cursor.
///
/// With no space in `before`, all of it is the word.
pub fn last_word(before: &str) -> &str {
    match before.rfind(' ') {
        Some(i) => &before[i + 1..],
        None => before,
    }
}

fn is_word_boundary(text: &str) -> bool {
    text == " " || text == "\n"
}

pub struct ImeService<C: InputConnection> {
    config: Config,
    text_services: Box<dyn TextServices>,
    saved_state: Box<dyn SavedStateStore>,
    connection: Option<C>,
    editor_info: EditorInfo,
    prediction: Option<PredictionManager>,
    cursor: CursorTracker,
    lifecycle: LifecycleRegistry,
}

impl<C: InputConnection> ImeService<C> {
    pub fn new(
        config: Config,
        text_services: Box<dyn TextServices>,
        saved_state: Box<dyn SavedStateStore>,
    ) -> Self {
        Self {
            config,
            text_services,
            saved_state,
            connection: None,
            editor_info: EditorInfo::default(),
            prediction: None,
            cursor: CursorTracker::new(),
            lifecycle: LifecycleRegistry::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========== Lifecycle ==========

    /// Service created: bring the lifecycle up and try to set up prediction.
    pub fn on_create(&mut self) {
        self.lifecycle.handle_lifecycle_event(LifecycleEvent::OnResume);
        self.ensure_prediction_manager("on_create");
    }

    /// A text field gained focus.
    pub fn on_start_input(&mut self, connection: C, editor_info: EditorInfo, restarting: bool) {
        tracing::debug!(restarting, package = %editor_info.package_name, "on_start_input");
        self.connection = Some(connection);
        self.editor_info = editor_info;
        self.ensure_prediction_manager("on_start_input");
    }

    /// The text field lost focus. Returns its connection.
    pub fn on_finish_input(&mut self) -> Option<C> {
        if let Some(pm) = self.prediction.as_mut() {
            pm.on_word_complete();
        }
        self.connection.take()
    }

    pub fn on_destroy(&mut self) {
        self.lifecycle.handle_lifecycle_event(LifecycleEvent::OnDestroy);
        self.connection = None;
        self.prediction = None;
    }

    fn ensure_prediction_manager(&mut self, phase: &str) {
        if self.prediction.is_some() {
            return;
        }
        let enabled = self.text_services.is_spell_checker_enabled();
        tracing::debug!(phase, enabled, "spell checker enabled");
        if !enabled {
            tracing::error!(phase, "spell checker is not enabled, predictions won't work");
            return;
        }
        let session = self
            .text_services
            .new_spell_checker_session(&self.config.spell_check_locale);
        self.prediction = Some(PredictionManager::with_limit(
            session,
            self.config.suggestion_limit,
        ));
        tracing::debug!(phase, "prediction manager initialized");
    }

    // ========== Accessors ==========

    pub fn connection(&self) -> Option<&C> {
        self.connection.as_ref()
    }

    pub fn connection_mut(&mut self) -> Option<&mut C> {
        self.connection.as_mut()
    }

    pub fn editor_info(&self) -> &EditorInfo {
        &self.editor_info
    }

    pub fn prediction(&self) -> Option<&PredictionManager> {
        self.prediction.as_ref()
    }

    pub fn prediction_mut(&mut self) -> Option<&mut PredictionManager> {
        self.prediction.as_mut()
    }

    /// Current suggestions; empty without a prediction manager.
    pub fn suggestions(&self) -> &[String] {
        self.prediction
            .as_ref()
            .map(PredictionManager::suggestions)
            .unwrap_or(&[])
    }

    pub fn saved_state(&self) -> &dyn SavedStateStore {
        self.saved_state.as_ref()
    }

    pub fn saved_state_mut(&mut self) -> &mut dyn SavedStateStore {
        self.saved_state.as_mut()
    }

    pub fn lifecycle(&self) -> &LifecycleRegistry {
        &self.lifecycle
    }

    /// Load the persisted position and layout into `keyboard`.
    pub fn restore_keyboard_state(&self, keyboard: &mut KeyboardState) {
        keyboard.restore_from(self.saved_state.as_ref());
        tracing::debug!(position = keyboard.position().as_str(), layout = ?keyboard.layout(), "restored keyboard state");
    }

    pub fn save_keyboard_state(&mut self, keyboard: &KeyboardState) {
        keyboard.save_to(self.saved_state.as_mut());
    }

    // ========== Text editing ==========

    /// Commit text and keep the current word in sync with it.
    pub fn commit_text(&mut self, text: &str, new_cursor_position: i32) {
        tracing::debug!(text, "commit_text");
        if let Some(ic) = self.connection.as_mut() {
            ic.commit_text(text, new_cursor_position);
        }

        let Some(pm) = self.prediction.as_mut() else {
            tracing::error!("cannot handle predictions, prediction manager not initialized");
            return;
        };
        if is_word_boundary(text) {
            tracing::debug!("word boundary detected");
            pm.on_word_complete();
        } else {
            pm.on_text_input(text);
        }
    }

    /// Delete one character before the cursor.
    pub fn handle_backspace(&mut self) {
        if let Some(ic) = self.connection.as_mut() {
            ic.delete_surrounding_text(1, 0);
        }
        match self.prediction.as_mut() {
            Some(pm) => pm.on_backspace(),
            None => tracing::error!("cannot handle predictions, prediction manager not initialized"),
        }
    }

    /// Replace the word at the cursor with an accepted suggestion.
    pub fn commit_suggestion(&mut self, suggestion: &str) {
        tracing::debug!(suggestion, "commit_suggestion");
        if self.prediction.is_none() {
            tracing::error!("cannot handle predictions, prediction manager not initialized");
            return;
        }
        let current = self.current_word();
        self.replace_word(&current, Some(suggestion));
        self.reset_prediction();
    }

    /// The word immediately before the cursor, read from the field.
    pub fn current_word(&self) -> String {
        let Some(ic) = self.connection.as_ref() else {
            return String::new();
        };
        let before = ic
            .text_before_cursor(self.config.text_before_cursor_window)
            .unwrap_or_default();
        last_word(&before).to_string()
    }

    /// Delete `word` (assumed to sit right before the cursor) one character
    /// at a time, then commit `replacement` if given.
    ///
    /// The ignore-cursor flag is only armed when the field actually changes;
    /// otherwise no cursor update follows to consume it.
    pub(crate) fn replace_word(&mut self, word: &str, replacement: Option<&str>) {
        if word.is_empty() && replacement.map_or(true, str::is_empty) {
            return;
        }
        let Some(ic) = self.connection.as_mut() else {
            return;
        };
        self.cursor.ignore_next_move();
        for _ in word.chars() {
            ic.delete_surrounding_text(1, 0);
        }
        if let Some(r) = replacement {
            ic.commit_text(r, 1);
        }
    }

    /// Run post-commit fix-ups on the field. If one rewrote the text, the
    /// word under construction is re-read so prediction sees the new case.
    pub fn run_auto_capitalizers(&mut self, capitalizers: &[AutoCapitalizer]) -> bool {
        let Some(ic) = self.connection.as_mut() else {
            return false;
        };
        let mut edited = false;
        for capitalizer in capitalizers {
            edited |= capitalizer.apply(&mut *ic);
        }
        if edited {
            let word = self.current_word();
            if let Some(pm) = self.prediction.as_mut() {
                pm.on_word_rewritten(&word);
            }
        }
        edited
    }

    pub(crate) fn reset_prediction(&mut self) {
        if let Some(pm) = self.prediction.as_mut() {
            pm.on_word_complete();
        }
    }

    pub fn send_key_event(&mut self, event: KeyEvent) {
        if let Some(ic) = self.connection.as_mut() {
            ic.send_key_event(event);
        }
    }

    /// Route an asynchronous spell-check result to the prediction manager.
    pub fn deliver_suggestions(&mut self, result: SpellCheckResult) -> bool {
        match self.prediction.as_mut() {
            Some(pm) => pm.on_suggestions(result),
            None => false,
        }
    }

    /// Mode the keyboard should show for the current field and cursor.
    pub fn keyboard_mode(&self, auto_capitalize: bool) -> KeyboardMode {
        auto_capitalize::keyboard_mode(
            &self.editor_info,
            self.connection.as_ref().map(|c| c as &dyn InputConnection),
            auto_capitalize,
        )
    }

    // ========== Cursor tracking ==========

    pub fn on_update_cursor_anchor_info(&mut self, selection_start: usize, selection_end: usize) {
        self.cursor.update(selection_start, selection_end);
    }

    pub fn did_cursor_move(&self) -> bool {
        self.cursor.did_cursor_move()
    }

    /// The next cursor update is the keyboard's own doing; don't report it.
    pub fn ignore_next_cursor_move(&mut self) {
        self.cursor.ignore_next_move();
    }

    pub fn cursor(&self) -> &CursorTracker {
        &self.cursor
    }
}

impl<C: InputConnection> LifecycleOwner for ImeService<C> {
    fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}
