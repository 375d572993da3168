//! Built-in keyboard layouts.
//!
//! Layout sources are compiled in and parsed on demand, so a bad layout is
//! reported when it is first selected rather than at startup.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use thumbkey_core::KeyboardDefinition;

static BUILTIN: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        "en_thumbkey_writer",
        include_str!("../layouts/en_thumbkey_writer.toml"),
    );
    m
});

/// Names of the built-in layouts, sorted.
pub fn names() -> Vec<&'static str> {
    BUILTIN.keys().copied().collect()
}

pub fn load(name: &str) -> Result<KeyboardDefinition> {
    let source = BUILTIN
        .get(name)
        .ok_or_else(|| anyhow!("unknown layout '{}' (available: {})", name, names().join(", ")))?;
    let def = KeyboardDefinition::from_toml_str(name, source)?;
    tracing::debug!(name, title = %def.title, "loaded layout");
    Ok(def)
}
