//! Gesture scripts replayed against the writer layout and the built-in word
//! list.
//!
//! Grid reference for the main screen:
//!   row 0: s r o emoji
//!   row 1: n h a 123
//!   row 2: t i e backspace
//!   row 3: space return

use pretty_assertions::assert_eq;
use thumbkey::{Keyboard, WordList, WordListSpellChecker};
use thumbkey_core::{Capitalization, Config, EditorInfo, InputClass, KeyboardMode, KeyboardPosition};

fn checker() -> WordListSpellChecker {
    WordListSpellChecker::new(WordList::builtin().unwrap())
}

fn plain() -> Keyboard {
    let config = Config {
        auto_capitalize: false,
        ..Config::default()
    };
    Keyboard::new(config, checker()).unwrap()
}

fn show(kb: &mut Keyboard, script: &str) -> thumbkey::Snapshot {
    let mut shown = kb.run_script(&format!("{}\nshow\n", script)).unwrap();
    shown.pop().unwrap()
}

#[test]
fn test_typing_shows_suggestions_and_pick_replaces_word() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 1 1\ntap 2 2\nswipe 1 2 left");
    assert_eq!(snap.text, "hel");
    assert_eq!(snap.current_word, "hel");
    assert_eq!(&snap.suggestions[..2], &["help".to_string(), "hello".to_string()]);

    let snap = show(&mut kb, "pick 2");
    assert_eq!(snap.text, "hello");
    assert_eq!(snap.current_word, "");
    assert!(snap.suggestions.is_empty());
    assert!(!snap.cursor_moved);
    assert!(kb.run_script("pick 1").is_err());
}

#[test]
fn test_space_clears_suggestions() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 2 0\nswipe 1 1 top_right");
    assert_eq!(snap.text, "tb");
    let snap = show(&mut kb, "tap 3 0");
    assert_eq!(snap.text, "tb ");
    assert!(snap.suggestions.is_empty());
    assert_eq!(snap.current_word, "");
}

#[test]
fn test_auto_capitalize_at_sentence_start() {
    let mut kb = Keyboard::new(Config::default(), checker()).unwrap();
    assert_eq!(kb.state().mode(), KeyboardMode::Shifted);

    let snap = show(&mut kb, "tap 0 0\ntap 1 1");
    assert_eq!(snap.text, "Sh");
    assert_eq!(snap.mode, KeyboardMode::Main);

    let snap = show(&mut kb, "swipe 2 1 bottom\ntap 3 0");
    assert_eq!(snap.text, "Sh. ");
    assert_eq!(snap.mode, KeyboardMode::Shifted);
}

#[test]
fn test_manual_shift_is_one_shot_and_caps_lock_sticks() {
    let mut kb = plain();
    let snap = show(&mut kb, "swipe 1 2 top");
    assert_eq!(snap.capitalization, Capitalization::Shift);
    let snap = show(&mut kb, "tap 1 2\ntap 1 2");
    assert_eq!(snap.text, "Aa");
    assert_eq!(snap.mode, KeyboardMode::Main);

    // shift, then the shifted screen's shift swipe is caps lock
    let snap = show(&mut kb, "swipe 1 2 top\nswipe 1 2 top\ntap 0 0\ntap 0 0");
    assert_eq!(snap.text, "AaSS");
    assert!(snap.caps_lock);
    assert_eq!(snap.mode, KeyboardMode::Shifted);
    assert_eq!(snap.capitalization, Capitalization::CapsLock);
}

#[test]
fn test_backspace_and_delete_last_word() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 1 1\ntap 2 1\ntap 3 0\nswipe 1 1 bottom_right\ntap 0 2");
    assert_eq!(snap.text, "hi yo");

    let snap = show(&mut kb, "tap 2 3");
    assert_eq!(snap.text, "hi y");
    assert_eq!(snap.current_word, "y");
    assert!(!snap.cursor_moved);

    let snap = show(&mut kb, "swipe 2 3 left");
    assert_eq!(snap.text, "hi ");
    assert_eq!(snap.current_word, "");
}

#[test]
fn test_numeric_screen_round_trip() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 1 3\ntap 0 0\ntap 1 1");
    assert_eq!(snap.mode, KeyboardMode::Numeric);
    assert_eq!(snap.text, "15");

    let snap = show(&mut kb, "tap 0 3\ntap 0 0");
    assert_eq!(snap.mode, KeyboardMode::Main);
    assert_eq!(snap.text, "15s");
}

#[test]
fn test_number_field_starts_numeric() {
    let kb = Keyboard::with_editor(
        Config::default(),
        checker(),
        EditorInfo::with_class(InputClass::Number),
    )
    .unwrap();
    assert_eq!(kb.state().mode(), KeyboardMode::Numeric);
}

#[test]
fn test_change_position() {
    let mut kb = plain();
    let snap = show(&mut kb, "swipe 0 3 right");
    assert_eq!(snap.position, KeyboardPosition::Right);
    let snap = show(&mut kb, "swipe 0 3 left\nswipe 0 3 left");
    assert_eq!(snap.position, KeyboardPosition::Left);
    assert_eq!(snap.text, "");
}

#[test]
fn test_released_key_resets_after_delay() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 0 0");
    assert_eq!(snap.released_key.as_deref(), Some("s"));
    let snap = show(&mut kb, "tick 100");
    assert_eq!(snap.released_key.as_deref(), Some("s"));
    let snap = show(&mut kb, "tick 200");
    assert_eq!(snap.released_key, None);

    // a newer release restarts the wait
    show(&mut kb, "tap 0 1\ntick 200\ntap 0 2\ntick 100");
    assert_eq!(kb.feedback().released_key(), Some("o"));

    let snap = show(&mut kb, "tap 1 3");
    assert_eq!(snap.released_key, None);
}

#[test]
fn test_drag_resolves_by_length_and_angle() {
    let mut kb = plain();
    let snap = show(&mut kb, "drag 0 0 3 3\ndrag 0 0 30 30");
    assert_eq!(snap.text, "sw");
    assert!(!kb.feedback().is_dragged());
}

#[test]
fn test_user_cursor_move_ends_word() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 1 2\ntap 1 2");
    assert_eq!(snap.current_word, "aa");

    let snap = show(&mut kb, "cursor 0 0");
    assert!(snap.cursor_moved);
    assert_eq!(snap.current_word, "");
    assert!(snap.suggestions.is_empty());

    let snap = show(&mut kb, "tap 0 0");
    assert_eq!(snap.text, "saa");
    assert_eq!(snap.selection, (1, 1));
    assert!(!snap.cursor_moved);
}

#[test]
fn test_disabled_spell_checker() {
    let config = Config {
        auto_capitalize: false,
        ..Config::default()
    };
    let mut kb = Keyboard::new(config, WordListSpellChecker::disabled()).unwrap();
    let snap = show(&mut kb, "tap 1 1\ntap 2 2");
    assert_eq!(snap.text, "he");
    assert!(snap.suggestions.is_empty());
    assert!(kb.ime().prediction().is_none());
}

#[test]
fn test_bad_config_is_rejected() {
    let config = Config {
        layouts: vec![],
        ..Config::default()
    };
    assert!(Keyboard::new(config, checker()).is_err());

    let config = Config {
        layouts: vec!["nope".to_string()],
        ..Config::default()
    };
    assert!(Keyboard::new(config, checker()).is_err());
}

#[test]
fn test_snapshot_json() {
    let mut kb = plain();
    let snap = show(&mut kb, "tap 0 0");
    let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["text"], "s");
    assert_eq!(json["mode"], "main");
    assert_eq!(json["capitalization"], "none");
    assert_eq!(json["position"], "center");
    assert_eq!(json["layout"], "en_thumbkey_writer");
}

#[test]
fn test_word_list_and_config_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("words.txt");
    std::fs::write(&words, "# tiny\nhat\t30\nham\t20\nhas\t10\n").unwrap();
    let config_path = dir.path().join("thumbkey.toml");
    std::fs::write(
        &config_path,
        "auto_capitalize = false\nsuggestion_limit = 2\nposition = \"left\"\n",
    )
    .unwrap();

    let config = Config::load_toml(&config_path).unwrap();
    let checker = WordListSpellChecker::new(WordList::load(&words).unwrap());
    let mut kb = Keyboard::new(config, checker).unwrap();

    let snap = show(&mut kb, "tap 1 1\ntap 1 2");
    assert_eq!(snap.text, "ha");
    assert_eq!(snap.position, KeyboardPosition::Left);
    assert_eq!(snap.suggestions, vec!["hat", "ham"]);

    assert!(WordList::load(dir.path().join("missing.txt")).is_err());
}
