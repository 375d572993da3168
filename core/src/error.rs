//! Error types for configuration and layout loading.
//!
//! The keystroke path never fails: missing services and connections are
//! absorbed and logged. Only setup (reading config files, parsing layout
//! tables) reports errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid layout '{layout}': {reason}")]
    InvalidLayout { layout: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
