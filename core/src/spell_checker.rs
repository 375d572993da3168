//! The host's spell-checking service.
//!
//! Requests are fire-and-forget: a session receives a [`SuggestionRequest`]
//! and the host later hands the answer back as a [`SpellCheckResult`]
//! carrying the request's sequence number. Results may come in the per-word
//! or per-sentence shape; both flatten to a plain list of strings.

/// One asynchronous suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Sequence token; the matching result must echo it back
    pub seq: u64,
    pub text: String,
    /// Ceiling on suggestions per word
    pub limit: usize,
}

/// Suggestions for a single word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionsInfo {
    pub suggestions: Vec<String>,
    /// The word was found as-is in the dictionary
    pub in_dictionary: bool,
}

impl SuggestionsInfo {
    pub fn new<I, S>(suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suggestions: suggestions.into_iter().map(Into::into).collect(),
            in_dictionary: false,
        }
    }
}

/// Suggestions for each word of a sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceSuggestionsInfo {
    pub infos: Vec<SuggestionsInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionBatch {
    Words(Vec<SuggestionsInfo>),
    Sentences(Vec<SentenceSuggestionsInfo>),
}

impl SuggestionBatch {
    /// All suggestions in delivery order. Blank entries are dropped.
    pub fn flatten(&self) -> Vec<String> {
        let words: Box<dyn Iterator<Item = &SuggestionsInfo>> = match self {
            Self::Words(infos) => Box::new(infos.iter()),
            Self::Sentences(sentences) => Box::new(sentences.iter().flat_map(|s| s.infos.iter())),
        };
        words
            .flat_map(|info| info.suggestions.iter())
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// A result delivered by the host for request `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellCheckResult {
    pub seq: u64,
    pub batch: SuggestionBatch,
}

impl SpellCheckResult {
    pub fn words(seq: u64, infos: Vec<SuggestionsInfo>) -> Self {
        Self {
            seq,
            batch: SuggestionBatch::Words(infos),
        }
    }

    pub fn sentences(seq: u64, sentences: Vec<SentenceSuggestionsInfo>) -> Self {
        Self {
            seq,
            batch: SuggestionBatch::Sentences(sentences),
        }
    }
}

/// An open spell-checker session.
pub trait SpellCheckerSession {
    /// Queue a request. The answer arrives later through the host.
    fn get_sentence_suggestions(&mut self, request: SuggestionRequest);

    /// Release the session. Further requests may be ignored.
    fn close(&mut self) {}
}

/// Access to the host's text services.
pub trait TextServices {
    fn is_spell_checker_enabled(&self) -> bool;

    /// Open a session for `locale`, or `None` if the service refuses.
    fn new_spell_checker_session(&self, locale: &str) -> Option<Box<dyn SpellCheckerSession>>;
}
