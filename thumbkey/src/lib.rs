//! thumbkey
//!
//! English layouts and a word-list spell checker for `thumbkey-core`, plus a
//! scriptable [`Keyboard`](driver::Keyboard) that stands in for the host
//! platform so gesture sequences can be replayed from the command line.

pub mod driver;
pub mod layouts;
pub mod word_list;

pub use driver::{parse_script, Command, Keyboard, Snapshot};
pub use word_list::{WordList, WordListSpellChecker};
