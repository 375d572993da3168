//! Word-list spell checker.
//!
//! Words and their frequencies live in an `fst::Map`. A request returns
//! completions of the typed prefix ranked by frequency, followed by words one
//! edit away when completions run short. Replies are queued rather than
//! returned, the way a platform spell checker answers on its own schedule;
//! the driver drains the queue and hands the results to the IME service.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use thumbkey_core::utils::normalize;
use thumbkey_core::{
    SentenceSuggestionsInfo, SpellCheckResult, SpellCheckerSession, SuggestionRequest,
    SuggestionsInfo, TextServices,
};

/// Built-in English list, `word<TAB>frequency` per line.
const BUILTIN_WORDS: &str = include_str!("../data/words.txt");

/// How many prefix matches are scanned before ranking.
const MAX_COMPLETION_SCAN: usize = 2000;

const EDIT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz'";

pub struct WordList {
    map: Map<Vec<u8>>,
}

impl WordList {
    /// Parse a word list: one word per line, optionally followed by a tab and
    /// a frequency. Blank lines and `#` comments are skipped; duplicates keep
    /// the highest frequency.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut words: BTreeMap<String, u64> = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (word, freq) = match line.split_once('\t') {
                Some((w, f)) => {
                    let freq = f
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("line {}: bad frequency '{}'", lineno + 1, f))?;
                    (w, freq)
                }
                None => (line, 1),
            };
            let word = normalize(word).to_lowercase();
            if word.is_empty() {
                continue;
            }
            let entry = words.entry(word).or_insert(0);
            *entry = (*entry).max(freq);
        }

        let mut builder = MapBuilder::new(Vec::new())?;
        for (word, freq) in &words {
            builder.insert(word, *freq)?;
        }
        let bytes = builder.into_inner()?;
        let map = Map::new(bytes)?;
        tracing::debug!(words = map.len(), "word list built");
        Ok(Self { map })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading word list {}", path.display()))?;
        Self::from_text(&text)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_text(BUILTIN_WORDS)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.map.get(word.to_lowercase())
    }

    /// Up to `limit` suggestions for `word`, in the typed word's case.
    pub fn suggest(&self, word: &str, limit: usize) -> SuggestionsInfo {
        let lower = normalize(word).to_lowercase();
        if lower.is_empty() {
            return SuggestionsInfo::default();
        }

        let mut ranked = self.completions(&lower);
        if ranked.len() < limit {
            let mut corrections = self.corrections(&lower);
            corrections.retain(|(w, _)| !ranked.iter().any(|(r, _)| r == w));
            ranked.extend(corrections);
        }
        ranked.truncate(limit);

        let mut info = SuggestionsInfo::new(ranked.into_iter().map(|(w, _)| match_case(word, &w)));
        info.in_dictionary = self.map.contains_key(&lower);
        info
    }

    /// Words starting with `prefix`, most frequent first.
    fn completions(&self, prefix: &str) -> Vec<(String, u64)> {
        let mut found = Vec::new();
        let mut stream = self.map.range().ge(prefix).into_stream();
        while let Some((key, freq)) = stream.next() {
            if !key.starts_with(prefix.as_bytes()) || found.len() >= MAX_COMPLETION_SCAN {
                break;
            }
            if let Ok(word) = std::str::from_utf8(key) {
                found.push((word.to_string(), freq));
            }
        }
        sort_ranked(&mut found);
        found
    }

    /// Known words one deletion, transposition, substitution or insertion
    /// away from `word`, most frequent first.
    fn corrections(&self, word: &str) -> Vec<(String, u64)> {
        let chars: Vec<char> = word.chars().collect();
        let mut candidates: Vec<String> = Vec::new();
        for i in 0..=chars.len() {
            if i < chars.len() {
                let mut c = chars.clone();
                c.remove(i);
                candidates.push(c.into_iter().collect());
            }
            if i + 1 < chars.len() {
                let mut c = chars.clone();
                c.swap(i, i + 1);
                candidates.push(c.into_iter().collect());
            }
            for letter in EDIT_ALPHABET.chars() {
                if i < chars.len() && chars[i] != letter {
                    let mut c = chars.clone();
                    c[i] = letter;
                    candidates.push(c.into_iter().collect());
                }
                let mut c = chars.clone();
                c.insert(i, letter);
                candidates.push(c.into_iter().collect());
            }
        }

        let mut found: Vec<(String, u64)> = candidates
            .into_iter()
            .filter(|c| c != word)
            .filter_map(|c| self.map.get(&c).map(|f| (c, f)))
            .collect();
        sort_ranked(&mut found);
        found.dedup_by(|a, b| a.0 == b.0);
        found
    }
}

impl std::fmt::Debug for WordList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList").field("words", &self.map.len()).finish()
    }
}

fn sort_ranked(words: &mut [(String, u64)]) {
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Give `word` the capitalisation pattern of `typed`.
fn match_case(typed: &str, word: &str) -> String {
    let mut letters = typed.chars().filter(|c| c.is_alphabetic());
    let Some(first) = letters.next() else {
        return word.to_string();
    };
    let rest_upper = typed.chars().filter(|c| c.is_alphabetic()).count() > 1
        && letters.all(char::is_uppercase);
    if first.is_uppercase() && rest_upper {
        word.to_uppercase()
    } else if first.is_uppercase() {
        let mut chars = word.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        word.to_string()
    }
}

type Outbox = Rc<RefCell<VecDeque<SpellCheckResult>>>;

/// A session bound to one word list; replies go to the shared outbox.
struct WordListSession {
    words: Rc<WordList>,
    outbox: Outbox,
}

impl SpellCheckerSession for WordListSession {
    fn get_sentence_suggestions(&mut self, request: SuggestionRequest) {
        let info = self.words.suggest(&request.text, request.limit);
        tracing::debug!(seq = request.seq, word = %request.text, found = info.suggestions.len(), "spell check");
        self.outbox.borrow_mut().push_back(SpellCheckResult::sentences(
            request.seq,
            vec![SentenceSuggestionsInfo { infos: vec![info] }],
        ));
    }

    fn close(&mut self) {
        self.outbox.borrow_mut().clear();
    }
}

/// Text services backed by a [`WordList`].
///
/// Clones share the word list and the reply queue, so one clone can be
/// handed to the IME service while another drains replies.
#[derive(Clone)]
pub struct WordListSpellChecker {
    /// `None` when spell checking is turned off
    words: Option<Rc<WordList>>,
    outbox: Outbox,
}

impl WordListSpellChecker {
    pub fn new(words: WordList) -> Self {
        Self {
            words: Some(Rc::new(words)),
            outbox: Outbox::default(),
        }
    }

    /// A checker that reports itself disabled; prediction stays off.
    pub fn disabled() -> Self {
        Self {
            words: None,
            outbox: Outbox::default(),
        }
    }

    pub fn words(&self) -> Option<&WordList> {
        self.words.as_deref()
    }

    /// Replies not yet handed on, oldest first.
    pub fn pending(&self) -> usize {
        self.outbox.borrow().len()
    }

    pub fn drain(&self) -> Vec<SpellCheckResult> {
        self.outbox.borrow_mut().drain(..).collect()
    }
}

impl TextServices for WordListSpellChecker {
    fn is_spell_checker_enabled(&self) -> bool {
        self.words.is_some()
    }

    fn new_spell_checker_session(&self, locale: &str) -> Option<Box<dyn SpellCheckerSession>> {
        if !locale.starts_with("en") {
            tracing::warn!(locale, "no word list for locale");
            return None;
        }
        let words = self.words.clone()?;
        Some(Box::new(WordListSession {
            words,
            outbox: self.outbox.clone(),
        }))
    }
}
