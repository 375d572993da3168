//! A scriptable keyboard: gestures in, text field and suggestions out.
//!
//! `Keyboard` plays the part of the host platform. It owns an in-memory text
//! field, feeds gestures through the layout and the dispatcher, pumps the
//! word-list spell checker's replies back into the IME service and reports
//! its own edits to the cursor tracker.

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use thumbkey_core::{
    done_key_action, perform_key_action, Capitalization, Config, EditorInfo, ImeService,
    InMemoryStateStore, KeyAction, KeyEvent, KeyFeedback, KeyItemC, KeyboardDefinition,
    KeyboardMode, KeyboardPosition, KeyboardState, MemoryInputConnection, SwipeDirection,
};

use crate::layouts;
use crate::word_list::WordListSpellChecker;

/// One line of a gesture script.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tap { row: usize, col: usize },
    Swipe { row: usize, col: usize, direction: SwipeDirection },
    Drag { row: usize, col: usize, dx: f32, dy: f32 },
    /// Accept the n-th suggestion, counting from 1
    Pick(usize),
    /// The user moved the cursor
    Cursor { start: usize, end: usize },
    /// Let time pass, in milliseconds
    Tick(u64),
    Show,
}

fn arg<T: FromStr>(parts: &[&str], i: usize, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = parts
        .get(i)
        .ok_or_else(|| anyhow!("missing {}", what))?;
    raw.parse::<T>()
        .with_context(|| format!("bad {} '{}'", what, raw))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = parts.first() else {
            bail!("empty command");
        };
        let expect_len = |n: usize| -> Result<()> {
            if parts.len() != n {
                bail!("'{}' takes {} argument(s), got {}", name, n - 1, parts.len() - 1);
            }
            Ok(())
        };
        let cmd = match name {
            "tap" => {
                expect_len(3)?;
                Command::Tap {
                    row: arg(&parts, 1, "row")?,
                    col: arg(&parts, 2, "column")?,
                }
            }
            "swipe" => {
                expect_len(4)?;
                let direction = SwipeDirection::from_name(parts[3])
                    .ok_or_else(|| anyhow!("unknown swipe direction '{}'", parts[3]))?;
                Command::Swipe {
                    row: arg(&parts, 1, "row")?,
                    col: arg(&parts, 2, "column")?,
                    direction,
                }
            }
            "drag" => {
                expect_len(5)?;
                Command::Drag {
                    row: arg(&parts, 1, "row")?,
                    col: arg(&parts, 2, "column")?,
                    dx: arg(&parts, 3, "dx")?,
                    dy: arg(&parts, 4, "dy")?,
                }
            }
            "pick" => {
                expect_len(2)?;
                Command::Pick(arg(&parts, 1, "suggestion number")?)
            }
            "cursor" => {
                expect_len(3)?;
                Command::Cursor {
                    start: arg(&parts, 1, "start")?,
                    end: arg(&parts, 2, "end")?,
                }
            }
            "tick" => {
                expect_len(2)?;
                Command::Tick(arg(&parts, 1, "milliseconds")?)
            }
            "show" => {
                expect_len(1)?;
                Command::Show
            }
            other => bail!("unknown command '{}'", other),
        };
        Ok(cmd)
    }
}

/// Parse a script, skipping blank lines and `#` comments.
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    script
        .lines()
        .enumerate()
        .map(|(i, line)| (i, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(i, line)| line.parse().with_context(|| format!("line {}", i + 1)))
        .collect()
}

/// What the keyboard and the text field look like right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub text: String,
    pub selection: (usize, usize),
    pub mode: KeyboardMode,
    pub caps_lock: bool,
    /// What the shift key shows
    pub capitalization: Capitalization,
    pub position: KeyboardPosition,
    pub layout: Option<String>,
    pub current_word: String,
    pub suggestions: Vec<String>,
    pub released_key: Option<String>,
    pub cursor_moved: bool,
}

pub struct Keyboard {
    ime: ImeService<MemoryInputConnection>,
    state: KeyboardState,
    layouts: Vec<(String, KeyboardDefinition)>,
    feedback: KeyFeedback,
    checker: WordListSpellChecker,
    start: Instant,
    elapsed: Duration,
}

impl Keyboard {
    /// Load the configured layouts and focus an empty text field.
    pub fn new(config: Config, checker: WordListSpellChecker) -> Result<Self> {
        Self::with_editor(config, checker, EditorInfo::text())
    }

    pub fn with_editor(
        config: Config,
        checker: WordListSpellChecker,
        editor_info: EditorInfo,
    ) -> Result<Self> {
        if config.layouts.is_empty() {
            bail!("no layouts configured");
        }
        let layouts = config
            .layouts
            .iter()
            .map(|name| Ok((name.clone(), layouts::load(name)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut state = config.keyboard_state();
        let mut ime = ImeService::new(
            config,
            Box::new(checker.clone()),
            Box::new(InMemoryStateStore::new()),
        );
        ime.on_create();
        ime.restore_keyboard_state(&mut state);
        ime.on_start_input(MemoryInputConnection::new(), editor_info, false);
        let auto = ime.config().auto_capitalize;
        state.set_mode(ime.keyboard_mode(auto));
        tracing::info!(layout = ?state.layout(), mode = ?state.mode(), "keyboard ready");

        Ok(Self {
            ime,
            state,
            layouts,
            feedback: KeyFeedback::new(),
            checker,
            start: Instant::now(),
            elapsed: Duration::ZERO,
        })
    }

    pub fn ime(&self) -> &ImeService<MemoryInputConnection> {
        &self.ime
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    pub fn feedback(&self) -> &KeyFeedback {
        &self.feedback
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    fn layout_index(&self) -> usize {
        self.state
            .layout()
            .and_then(|name| self.layouts.iter().position(|(n, _)| n == name))
            .unwrap_or(0)
    }

    pub fn definition(&self) -> &KeyboardDefinition {
        &self.layouts[self.layout_index()].1
    }

    fn key_item(&self, row: usize, col: usize) -> Result<&KeyItemC> {
        self.definition()
            .screen(self.state.mode())
            .key(row, col)
            .ok_or_else(|| anyhow!("no key at row {} column {} on the {:?} screen", row, col, self.state.mode()))
    }

    pub fn tap(&mut self, row: usize, col: usize) -> Result<()> {
        let action = self.key_item(row, col)?.resolve(None).action.clone();
        self.perform(&action);
        Ok(())
    }

    pub fn swipe(&mut self, row: usize, col: usize, direction: SwipeDirection) -> Result<()> {
        let action = self.key_item(row, col)?.resolve(Some(direction)).action.clone();
        self.perform(&action);
        Ok(())
    }

    /// A raw drag on a key; short drags are taps.
    pub fn drag(&mut self, row: usize, col: usize, dx: f32, dy: f32) -> Result<()> {
        let min = self.ime.config().min_swipe_length;
        let action = self.key_item(row, col)?.resolve_drag(dx, dy, min).clone();
        self.feedback.set_dragged(true);
        self.perform(&action);
        Ok(())
    }

    /// Run one action the way a key release would.
    pub fn perform(&mut self, action: &KeyAction) {
        let index = self.layout_index();
        let auto = self.ime.config().auto_capitalize;
        let settings = &self.layouts[index].1.settings;
        perform_key_action(action, &mut self.ime, auto, settings, &mut self.state);

        match action {
            KeyAction::CommitText(_) if !auto => self.state.on_text_committed(),
            KeyAction::SendEvent(KeyEvent::Del) => {
                if let Some(pm) = self.ime.prediction_mut() {
                    pm.on_backspace();
                }
            }
            KeyAction::SwitchLanguage | KeyAction::ChangePosition(_) => {
                self.ime.save_keyboard_state(&self.state);
            }
            _ => {}
        }

        let delay = self.ime.config().animation_delay();
        let now = self.now();
        done_key_action(action, &mut self.feedback, now, delay);
        self.pump();
        self.sync_cursor(own_edit(action));
    }

    /// Accept the `n`-th suggestion (1-based).
    pub fn pick(&mut self, n: usize) -> Result<()> {
        let suggestion = n
            .checked_sub(1)
            .and_then(|i| self.ime.suggestions().get(i))
            .cloned()
            .ok_or_else(|| anyhow!("no suggestion {} (have {})", n, self.ime.suggestions().len()))?;
        self.ime.commit_suggestion(&suggestion);
        self.pump();
        self.sync_cursor(true);
        Ok(())
    }

    /// The user put the cursor somewhere else.
    pub fn cursor(&mut self, start: usize, end: usize) {
        if let Some(ic) = self.ime.connection_mut() {
            ic.set_selection(start, end);
        }
        self.sync_cursor(false);
    }

    /// Advance the clock and fire due feedback resets.
    pub fn tick(&mut self, ms: u64) -> bool {
        self.elapsed += Duration::from_millis(ms);
        let now = self.now();
        self.feedback.tick(now)
    }

    /// Hand queued spell-check replies to the IME service.
    fn pump(&mut self) -> usize {
        let results = self.checker.drain();
        let count = results.len();
        for result in results {
            self.ime.deliver_suggestions(result);
        }
        count
    }

    fn sync_cursor(&mut self, own_edit: bool) {
        let Some((start, end)) = self.ime.connection().map(MemoryInputConnection::selection) else {
            return;
        };
        if own_edit {
            self.ime.ignore_next_cursor_move();
        }
        self.ime.on_update_cursor_anchor_info(start, end);
        if self.ime.did_cursor_move() {
            // the word under construction is no longer at the cursor
            if let Some(pm) = self.ime.prediction_mut() {
                pm.on_word_complete();
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (text, selection) = self
            .ime
            .connection()
            .map(|c| (c.text(), c.selection()))
            .unwrap_or_default();
        Snapshot {
            text,
            selection,
            mode: self.state.mode(),
            caps_lock: self.state.caps_lock(),
            capitalization: self.state.capitalization(),
            position: self.state.position(),
            layout: self.state.layout().map(str::to_string),
            current_word: self
                .ime
                .prediction()
                .map(|p| p.current_word().to_string())
                .unwrap_or_default(),
            suggestions: self.ime.suggestions().to_vec(),
            released_key: self.feedback.released_key().map(str::to_string),
            cursor_moved: self.ime.did_cursor_move(),
        }
    }

    /// Execute one command; `show` returns a snapshot.
    pub fn run(&mut self, command: &Command) -> Result<Option<Snapshot>> {
        match *command {
            Command::Tap { row, col } => self.tap(row, col)?,
            Command::Swipe { row, col, direction } => self.swipe(row, col, direction)?,
            Command::Drag { row, col, dx, dy } => self.drag(row, col, dx, dy)?,
            Command::Pick(n) => self.pick(n)?,
            Command::Cursor { start, end } => self.cursor(start, end),
            Command::Tick(ms) => {
                self.tick(ms);
            }
            Command::Show => return Ok(Some(self.snapshot())),
        }
        Ok(None)
    }

    pub fn run_script(&mut self, script: &str) -> Result<Vec<Snapshot>> {
        let mut shown = Vec::new();
        for command in parse_script(script)? {
            if let Some(snapshot) = self.run(&command)? {
                shown.push(snapshot);
            }
        }
        Ok(shown)
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        self.feedback.cancel();
        self.ime.on_finish_input();
        self.ime.on_destroy();
    }
}

/// Whether the action's cursor movement is the keyboard's own doing rather
/// than the user steering the cursor.
fn own_edit(action: &KeyAction) -> bool {
    match action {
        KeyAction::SendEvent(event) => matches!(event, KeyEvent::Del | KeyEvent::ForwardDel | KeyEvent::Enter | KeyEvent::Tab),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!("tap 1 2".parse::<Command>().unwrap(), Command::Tap { row: 1, col: 2 });
        assert_eq!(
            "swipe 0 0 bottom_right".parse::<Command>().unwrap(),
            Command::Swipe {
                row: 0,
                col: 0,
                direction: SwipeDirection::BottomRight
            }
        );
        assert_eq!(
            "drag 2 1 -3.5 40".parse::<Command>().unwrap(),
            Command::Drag {
                row: 2,
                col: 1,
                dx: -3.5,
                dy: 40.0
            }
        );
        assert_eq!("pick 1".parse::<Command>().unwrap(), Command::Pick(1));
        assert_eq!(
            "cursor 0 4".parse::<Command>().unwrap(),
            Command::Cursor { start: 0, end: 4 }
        );
        assert_eq!("tick 300".parse::<Command>().unwrap(), Command::Tick(300));
        assert_eq!("  show ".parse::<Command>().unwrap(), Command::Show);
    }

    #[test]
    fn test_parse_errors() {
        assert!("tap 1".parse::<Command>().is_err());
        assert!("tap one 2".parse::<Command>().is_err());
        assert!("swipe 0 0 sideways".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_script_skips_comments() {
        let cmds = parse_script("# greet\ntap 1 1\n\n  # again\nshow\n").unwrap();
        assert_eq!(cmds, vec![Command::Tap { row: 1, col: 1 }, Command::Show]);

        let err = parse_script("tap 1 1\nwat\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_own_edit() {
        assert!(own_edit(&KeyAction::commit("a")));
        assert!(own_edit(&KeyAction::DeleteLastWord));
        assert!(own_edit(&KeyAction::SendEvent(KeyEvent::Del)));
        assert!(!own_edit(&KeyAction::SendEvent(KeyEvent::DpadLeft)));
    }
}
