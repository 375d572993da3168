//! Keyboard layout tables and gesture resolution.
//!
//! Layouts are plain immutable data: a grid of key items, each with a center
//! key and up to eight swipe keys. They are authored in TOML and loaded once
//! with [`KeyboardDefinition::from_toml_str`]; the raw file format is
//! validated into the runtime types defined here.
//!
//! Gesture resolution turns a drag offset into a [`SwipeDirection`] and then
//! into the key bound to that direction (falling back to the center key).

use crate::auto_capitalize::AutoCapitalizer;
use crate::error::{Error, Result};
use crate::key_action::KeyAction;
use crate::keyboard_state::KeyboardMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the eight compass directions a swipe can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::Top => "top",
            Self::TopRight => "top_right",
            Self::Left => "left",
            Self::Right => "right",
            Self::BottomLeft => "bottom_left",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottom_right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }
}

/// How many sectors a key's swipe circle is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeNWay {
    #[default]
    EightWay,
    FourWayCross,
    FourWayDiagonal,
    TwoWayVertical,
    TwoWayHorizontal,
}

/// Resolve a drag offset to a swipe direction.
///
/// Offsets are in screen coordinates (y grows downward). Drags no longer
/// than `min_swipe_length` are taps and return `None`. The angle is measured
/// from straight down, clockwise toward the right.
pub fn swipe_direction(
    dx: f32,
    dy: f32,
    min_swipe_length: f32,
    swipe_type: SwipeNWay,
) -> Option<SwipeDirection> {
    let (x, y) = (dx as f64, dy as f64);
    let swipe_length = (x * x + y * y).sqrt();
    if swipe_length <= min_swipe_length as f64 {
        return None;
    }

    let angle_dir = x.atan2(y).to_degrees();
    let angle = if angle_dir < 0.0 {
        360.0 + angle_dir
    } else {
        angle_dir
    };
    let within = |lo: f64, hi: f64| (lo..=hi).contains(&angle);

    use SwipeDirection::*;
    let direction = match swipe_type {
        SwipeNWay::EightWay => {
            if within(22.5, 67.5) {
                BottomRight
            } else if within(67.5, 112.5) {
                Right
            } else if within(112.5, 157.5) {
                TopRight
            } else if within(157.5, 202.5) {
                Top
            } else if within(202.5, 247.5) {
                TopLeft
            } else if within(247.5, 292.5) {
                Left
            } else if within(292.5, 337.5) {
                BottomLeft
            } else {
                Bottom
            }
        }
        SwipeNWay::FourWayCross => {
            if within(45.0, 135.0) {
                Right
            } else if within(135.0, 225.0) {
                Top
            } else if within(225.0, 315.0) {
                Left
            } else {
                Bottom
            }
        }
        SwipeNWay::FourWayDiagonal => {
            if within(0.0, 90.0) {
                BottomRight
            } else if within(90.0, 180.0) {
                TopRight
            } else if within(180.0, 270.0) {
                TopLeft
            } else {
                BottomLeft
            }
        }
        SwipeNWay::TwoWayVertical => {
            if within(90.0, 270.0) {
                Top
            } else {
                Bottom
            }
        }
        SwipeNWay::TwoWayHorizontal => {
            if within(0.0, 180.0) {
                Right
            } else {
                Left
            }
        }
    };
    Some(direction)
}

/// What a key shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisplay {
    Text(String),
    /// Named icon, resolved by the front-end
    Icon(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSizeVariant {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorVariant {
    Primary,
    #[default]
    Secondary,
    Muted,
}

/// A single key: the center of a key item or one of its swipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyC {
    pub display: Option<KeyDisplay>,
    pub action: KeyAction,
    pub size: FontSizeVariant,
    pub color: ColorVariant,
}

impl KeyC {
    /// A plain text key: commits and shows `text`.
    pub fn text<T: Into<String>>(text: T) -> Self {
        let text = text.into();
        Self {
            display: Some(KeyDisplay::Text(text.clone())),
            action: KeyAction::CommitText(text),
            size: FontSizeVariant::default(),
            color: ColorVariant::default(),
        }
    }

    pub fn action(action: KeyAction) -> Self {
        Self {
            display: None,
            action,
            size: FontSizeVariant::default(),
            color: ColorVariant::default(),
        }
    }
}

/// A key zone on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyItemC {
    pub center: KeyC,
    pub swipe_type: SwipeNWay,
    pub swipes: BTreeMap<SwipeDirection, KeyC>,
    /// Number of grid cells this key spans horizontally
    pub width: u8,
}

impl KeyItemC {
    pub fn new(center: KeyC) -> Self {
        Self {
            center,
            swipe_type: SwipeNWay::default(),
            swipes: BTreeMap::new(),
            width: 1,
        }
    }

    pub fn with_swipe(mut self, direction: SwipeDirection, key: KeyC) -> Self {
        self.swipes.insert(direction, key);
        self
    }

    /// The key bound to `direction`, or the center key for taps and for
    /// directions without a binding.
    pub fn resolve(&self, direction: Option<SwipeDirection>) -> &KeyC {
        direction
            .and_then(|d| self.swipes.get(&d))
            .unwrap_or(&self.center)
    }

    /// Resolve a raw drag offset on this key to its action.
    pub fn resolve_drag(&self, dx: f32, dy: f32, min_swipe_length: f32) -> &KeyAction {
        let direction = swipe_direction(dx, dy, min_swipe_length, self.swipe_type);
        &self.resolve(direction).action
    }
}

/// A full keyboard screen: rows of key items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardC {
    pub rows: Vec<Vec<KeyItemC>>,
}

impl KeyboardC {
    pub fn key(&self, row: usize, col: usize) -> Option<&KeyItemC> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyItemC> {
        self.rows.iter().flatten()
    }

    /// Derive the shifted screen: letters upper-cased, and the swipe that
    /// enables shift becomes caps lock.
    pub fn to_shifted(&self) -> KeyboardC {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(shift_item).collect())
            .collect();
        KeyboardC { rows }
    }
}

fn shift_item(item: &KeyItemC) -> KeyItemC {
    KeyItemC {
        center: shift_key(&item.center),
        swipe_type: item.swipe_type,
        swipes: item
            .swipes
            .iter()
            .map(|(d, k)| (*d, shift_key(k)))
            .collect(),
        width: item.width,
    }
}

fn shift_key(key: &KeyC) -> KeyC {
    let upper = |s: &str| {
        if crate::utils::is_word(s) {
            s.to_uppercase()
        } else {
            s.to_string()
        }
    };
    let action = match &key.action {
        KeyAction::CommitText(t) => KeyAction::CommitText(upper(t)),
        KeyAction::ToggleShiftMode(true) => KeyAction::ToggleCapsLock,
        other => other.clone(),
    };
    let display = match &key.display {
        Some(KeyDisplay::Text(t)) => Some(KeyDisplay::Text(upper(t))),
        other => other.clone(),
    };
    KeyC {
        display,
        action,
        size: key.size,
        color: key.color,
    }
}

/// The four screens a layout provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardDefinitionModes {
    pub main: KeyboardC,
    pub shifted: KeyboardC,
    pub numeric: KeyboardC,
    pub emoji: KeyboardC,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardDefinitionSettings {
    /// Fix-ups run after every commit while auto-capitalize is on
    pub auto_capitalizers: Vec<AutoCapitalizer>,
}

/// A complete keyboard: title, screens and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardDefinition {
    pub title: String,
    pub modes: KeyboardDefinitionModes,
    pub settings: KeyboardDefinitionSettings,
}

impl KeyboardDefinition {
    /// Parse and validate a layout from its TOML source.
    ///
    /// `name` only labels errors. A missing `shifted` screen is derived from
    /// `main` with [`KeyboardC::to_shifted`].
    pub fn from_toml_str(name: &str, content: &str) -> Result<Self> {
        let raw: RawDefinition = toml::from_str(content)?;
        let ctx = LayoutContext {
            name,
            shared: &raw.shared,
        };

        let main = ctx.keyboard(&raw.main)?;
        let shifted = match &raw.shifted {
            Some(s) => ctx.keyboard(s)?,
            None => main.to_shifted(),
        };
        let numeric = ctx.keyboard(&raw.numeric)?;
        let emoji = ctx.keyboard(&raw.emoji)?;

        let auto_capitalizers = raw
            .auto_capitalizers
            .iter()
            .map(|n| {
                AutoCapitalizer::from_name(n)
                    .ok_or_else(|| ctx.invalid(format!("unknown auto capitalizer '{}'", n)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title: raw.title,
            modes: KeyboardDefinitionModes {
                main,
                shifted,
                numeric,
                emoji,
            },
            settings: KeyboardDefinitionSettings { auto_capitalizers },
        })
    }

    /// The screen shown in `mode`.
    pub fn screen(&self, mode: KeyboardMode) -> &KeyboardC {
        match mode {
            KeyboardMode::Main => &self.modes.main,
            KeyboardMode::Shifted => &self.modes.shifted,
            KeyboardMode::Numeric => &self.modes.numeric,
            KeyboardMode::Emoji => &self.modes.emoji,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDefinition {
    title: String,
    #[serde(default)]
    auto_capitalizers: Vec<String>,
    #[serde(default)]
    shared: BTreeMap<String, RawKeyItem>,
    main: RawKeyboard,
    shifted: Option<RawKeyboard>,
    numeric: RawKeyboard,
    emoji: RawKeyboard,
}

#[derive(Debug, Deserialize)]
struct RawKeyboard {
    rows: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    keys: Vec<RawKeyItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawKeyItem {
    /// Name of an entry in the `[shared]` table
    shared: Option<String>,
    center: Option<RawKey>,
    #[serde(default)]
    swipe_type: SwipeNWay,
    #[serde(default)]
    swipes: BTreeMap<String, RawKey>,
    width: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawKey {
    /// Shorthand for `action = { commit_text = ... }`
    commit: Option<String>,
    action: Option<KeyAction>,
    display: Option<String>,
    icon: Option<String>,
    #[serde(default)]
    size: FontSizeVariant,
    #[serde(default)]
    color: ColorVariant,
}

struct LayoutContext<'a> {
    name: &'a str,
    shared: &'a BTreeMap<String, RawKeyItem>,
}

impl LayoutContext<'_> {
    fn invalid(&self, reason: String) -> Error {
        Error::InvalidLayout {
            layout: self.name.to_string(),
            reason,
        }
    }

    fn keyboard(&self, raw: &RawKeyboard) -> Result<KeyboardC> {
        let rows = raw
            .rows
            .iter()
            .map(|row| row.keys.iter().map(|k| self.item(k)).collect())
            .collect::<Result<Vec<Vec<_>>>>()?;
        if rows.iter().all(Vec::is_empty) {
            return Err(self.invalid("keyboard screen has no keys".to_string()));
        }
        Ok(KeyboardC { rows })
    }

    fn item(&self, raw: &RawKeyItem) -> Result<KeyItemC> {
        if let Some(shared) = &raw.shared {
            let target = self
                .shared
                .get(shared)
                .ok_or_else(|| self.invalid(format!("unknown shared key '{}'", shared)))?;
            if target.shared.is_some() {
                return Err(self.invalid(format!("shared key '{}' is itself a reference", shared)));
            }
            return self.item(target);
        }

        let center = raw
            .center
            .as_ref()
            .ok_or_else(|| self.invalid("key item without a center key".to_string()))?;
        let mut swipes = BTreeMap::new();
        for (name, key) in &raw.swipes {
            let direction = SwipeDirection::from_name(name)
                .ok_or_else(|| self.invalid(format!("unknown swipe direction '{}'", name)))?;
            swipes.insert(direction, self.key(key)?);
        }

        Ok(KeyItemC {
            center: self.key(center)?,
            swipe_type: raw.swipe_type,
            swipes,
            width: raw.width.unwrap_or(1).max(1),
        })
    }

    fn key(&self, raw: &RawKey) -> Result<KeyC> {
        let action = match (&raw.commit, &raw.action) {
            (Some(text), None) => KeyAction::CommitText(text.clone()),
            (None, Some(action)) => action.clone(),
            (Some(_), Some(_)) => {
                return Err(self.invalid("key sets both 'commit' and 'action'".to_string()))
            }
            (None, None) => return Err(self.invalid("key has no action".to_string())),
        };
        let display = match (&raw.icon, &raw.display) {
            (Some(icon), _) => Some(KeyDisplay::Icon(icon.clone())),
            (None, Some(text)) => Some(KeyDisplay::Text(text.clone())),
            (None, None) => action
                .commit_text()
                .map(|t| KeyDisplay::Text(t.to_string())),
        };
        Ok(KeyC {
            display,
            action,
            size: raw.size,
            color: raw.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_action::{KeyEvent, PositionTransform};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_drag_is_a_tap() {
        assert_eq!(swipe_direction(3.0, 4.0, 5.0, SwipeNWay::EightWay), None);
        assert_eq!(swipe_direction(0.0, 0.0, 0.0, SwipeNWay::EightWay), None);
    }

    #[test]
    fn test_eight_way_directions() {
        let dir = |dx, dy| swipe_direction(dx, dy, 10.0, SwipeNWay::EightWay);
        assert_eq!(dir(0.0, 50.0), Some(SwipeDirection::Bottom));
        assert_eq!(dir(0.0, -50.0), Some(SwipeDirection::Top));
        assert_eq!(dir(50.0, 0.0), Some(SwipeDirection::Right));
        assert_eq!(dir(-50.0, 0.0), Some(SwipeDirection::Left));
        assert_eq!(dir(40.0, 40.0), Some(SwipeDirection::BottomRight));
        assert_eq!(dir(-40.0, 40.0), Some(SwipeDirection::BottomLeft));
        assert_eq!(dir(40.0, -40.0), Some(SwipeDirection::TopRight));
        assert_eq!(dir(-40.0, -40.0), Some(SwipeDirection::TopLeft));
    }

    #[test]
    fn test_four_way_variants() {
        let cross = |dx, dy| swipe_direction(dx, dy, 10.0, SwipeNWay::FourWayCross);
        assert_eq!(cross(40.0, 35.0), Some(SwipeDirection::Right));
        assert_eq!(cross(5.0, -40.0), Some(SwipeDirection::Top));

        let diag = |dx, dy| swipe_direction(dx, dy, 10.0, SwipeNWay::FourWayDiagonal);
        assert_eq!(diag(1.0, 40.0), Some(SwipeDirection::BottomRight));
        assert_eq!(diag(-1.0, 40.0), Some(SwipeDirection::BottomLeft));
        assert_eq!(diag(30.0, -1.0), Some(SwipeDirection::TopRight));
        assert_eq!(diag(-30.0, -1.0), Some(SwipeDirection::TopLeft));
    }

    #[test]
    fn test_two_way_variants() {
        let vert = |dx, dy| swipe_direction(dx, dy, 10.0, SwipeNWay::TwoWayVertical);
        assert_eq!(vert(30.0, -20.0), Some(SwipeDirection::Top));
        assert_eq!(vert(30.0, 20.0), Some(SwipeDirection::Bottom));

        let horiz = |dx, dy| swipe_direction(dx, dy, 10.0, SwipeNWay::TwoWayHorizontal);
        assert_eq!(horiz(20.0, -30.0), Some(SwipeDirection::Right));
        assert_eq!(horiz(-20.0, 30.0), Some(SwipeDirection::Left));
    }

    #[test]
    fn test_resolve_falls_back_to_center() {
        let item = KeyItemC::new(KeyC::text("r")).with_swipe(SwipeDirection::Bottom, KeyC::text("g"));
        assert_eq!(item.resolve(None).action, KeyAction::commit("r"));
        assert_eq!(
            item.resolve(Some(SwipeDirection::Bottom)).action,
            KeyAction::commit("g")
        );
        assert_eq!(
            item.resolve(Some(SwipeDirection::Top)).action,
            KeyAction::commit("r")
        );
        assert_eq!(item.resolve_drag(0.0, 60.0, 20.0), &KeyAction::commit("g"));
        assert_eq!(item.resolve_drag(0.0, 6.0, 20.0), &KeyAction::commit("r"));
    }

    #[test]
    fn test_to_shifted_uppercases_letters_only() {
        let keyboard = KeyboardC {
            rows: vec![vec![
                KeyItemC::new(KeyC::text("a"))
                    .with_swipe(SwipeDirection::Top, KeyC::action(KeyAction::ToggleShiftMode(true)))
                    .with_swipe(SwipeDirection::Bottom, KeyC::action(KeyAction::ToggleShiftMode(false)))
                    .with_swipe(SwipeDirection::Left, KeyC::text("@")),
            ]],
        };
        let shifted = keyboard.to_shifted();
        let item = shifted.key(0, 0).unwrap();
        assert_eq!(item.center.action, KeyAction::commit("A"));
        assert_eq!(item.center.display, Some(KeyDisplay::Text("A".to_string())));
        assert_eq!(
            item.resolve(Some(SwipeDirection::Top)).action,
            KeyAction::ToggleCapsLock
        );
        assert_eq!(
            item.resolve(Some(SwipeDirection::Bottom)).action,
            KeyAction::ToggleShiftMode(false)
        );
        assert_eq!(
            item.resolve(Some(SwipeDirection::Left)).action,
            KeyAction::commit("@")
        );
    }

    const SMALL: &str = r#"
title = "tiny"
auto_capitalizers = ["i"]

[shared.backspace]
center = { action = { send_event = "del" }, icon = "backspace" }
swipes.left = { action = "delete_last_word" }

[[main.rows]]
[[main.rows.keys]]
center = { commit = "s", size = "large", color = "primary" }
swipe_type = "four_way_diagonal"
swipes.bottom_right = { commit = "w" }
[[main.rows.keys]]
shared = "backspace"

[[numeric.rows]]
[[numeric.rows.keys]]
center = { commit = "1" }

[[emoji.rows]]
[[emoji.rows.keys]]
center = { commit = "🙂" }
swipes.top = { action = { change_position = "cycle_right" } }
"#;

    #[test]
    fn test_parse_small_layout() {
        let def = KeyboardDefinition::from_toml_str("tiny", SMALL).unwrap();
        assert_eq!(def.title, "tiny");
        assert_eq!(def.settings.auto_capitalizers, vec![AutoCapitalizer::I]);

        let s = def.modes.main.key(0, 0).unwrap();
        assert_eq!(s.swipe_type, SwipeNWay::FourWayDiagonal);
        assert_eq!(s.center.size, FontSizeVariant::Large);
        assert_eq!(s.center.display, Some(KeyDisplay::Text("s".to_string())));
        assert_eq!(
            s.resolve(Some(SwipeDirection::BottomRight)).action,
            KeyAction::commit("w")
        );

        let backspace = def.modes.main.key(0, 1).unwrap();
        assert_eq!(backspace.center.action, KeyAction::SendEvent(KeyEvent::Del));
        assert_eq!(
            backspace.center.display,
            Some(KeyDisplay::Icon("backspace".to_string()))
        );
        assert_eq!(
            backspace.resolve(Some(SwipeDirection::Left)).action,
            KeyAction::DeleteLastWord
        );

        // derived
        assert_eq!(
            def.modes.shifted.key(0, 0).unwrap().center.action,
            KeyAction::commit("S")
        );
        assert_eq!(
            def.modes.emoji.key(0, 0).unwrap().resolve(Some(SwipeDirection::Top)).action,
            KeyAction::ChangePosition(PositionTransform::CycleRight)
        );
    }

    #[test]
    fn test_invalid_layouts_are_rejected() {
        let bad_direction = SMALL.replace("swipes.bottom_right", "swipes.sideways");
        let err = KeyboardDefinition::from_toml_str("tiny", &bad_direction).unwrap_err();
        assert!(matches!(err, Error::InvalidLayout { .. }));
        assert!(err.to_string().contains("sideways"));

        let bad_shared = SMALL.replace("shared = \"backspace\"", "shared = \"nope\"");
        assert!(KeyboardDefinition::from_toml_str("tiny", &bad_shared).is_err());

        let bad_capitalizer = SMALL.replace("[\"i\"]", "[\"shout\"]");
        assert!(KeyboardDefinition::from_toml_str("tiny", &bad_capitalizer).is_err());

        let both = SMALL.replace(
            "center = { commit = \"1\" }",
            "center = { commit = \"1\", action = \"switch_language\" }",
        );
        assert!(KeyboardDefinition::from_toml_str("tiny", &both).is_err());

        let not_toml = "title = ";
        assert!(matches!(
            KeyboardDefinition::from_toml_str("tiny", not_toml),
            Err(Error::TomlDe(_))
        ));
    }
}
