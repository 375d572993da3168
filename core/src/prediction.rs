//! Word prediction backed by the host spell checker.
//!
//! `PredictionManager` keeps the word being typed and an observable list of
//! suggestions for it. Every change to the word issues a new request with a
//! fresh sequence number; results are applied only if they answer the latest
//! request and the word is still non-empty. Anything else is stale and
//! dropped, so a slow reply can never overwrite newer suggestions or bring
//! back suggestions for a word the user already finished or deleted.
//!
//! Without a spell-checker session the manager runs in no-op mode: input is
//! logged and ignored and the suggestion list stays empty.

use crate::spell_checker::{SpellCheckResult, SpellCheckerSession, SuggestionRequest};
use crate::suggestions::{SubscriptionId, SuggestionFeed};
use crate::word_buffer::WordBuffer;

/// Default ceiling on suggestions requested per word.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

pub struct PredictionManager {
    session: Option<Box<dyn SpellCheckerSession>>,
    current_word: WordBuffer,
    feed: SuggestionFeed,
    limit: usize,
    /// Sequence number of the latest request, 0 before any
    latest_seq: u64,
    /// Whether `latest_seq` is still awaiting an answer worth applying
    awaiting: bool,
    stale_dropped: u64,
}

impl PredictionManager {
    /// Create a manager over `session`; `None` gives no-op mode.
    pub fn new(session: Option<Box<dyn SpellCheckerSession>>) -> Self {
        Self::with_limit(session, DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn with_limit(session: Option<Box<dyn SpellCheckerSession>>, limit: usize) -> Self {
        tracing::debug!(available = session.is_some(), "spell checker session created");
        Self {
            session,
            current_word: WordBuffer::new(),
            feed: SuggestionFeed::new(),
            limit: limit.max(1),
            latest_seq: 0,
            awaiting: false,
            stale_dropped: 0,
        }
    }

    /// False in no-op mode.
    pub fn is_available(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_word(&self) -> &str {
        self.current_word.as_str()
    }

    pub fn suggestions(&self) -> &[String] {
        self.feed.current()
    }

    pub fn feed(&self) -> &SuggestionFeed {
        &self.feed
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&[String]) + 'static,
    {
        self.feed.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.feed.unsubscribe(id)
    }

    /// Sequence number of the most recent request.
    pub fn latest_request(&self) -> u64 {
        self.latest_seq
    }

    /// Results discarded because a newer request or word boundary superseded them.
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }

    /// Text was typed into the current word.
    pub fn on_text_input(&mut self, text: &str) {
        if self.session.is_none() {
            tracing::error!(text, "no spell checker session; ignoring text input");
            return;
        }
        self.current_word.push_str(text);
        tracing::debug!(word = self.current_word.as_str(), "current word");
        self.request_suggestions();
    }

    /// One character was deleted. No-op on an empty word.
    pub fn on_backspace(&mut self) {
        if self.current_word.pop_char().is_none() {
            return;
        }
        tracing::debug!(word = self.current_word.as_str(), "current word after backspace");
        self.request_suggestions();
    }

    /// The word was rewritten in the field, e.g. auto-capitalised. Adopt
    /// `word` and ask again; nothing happens between words or when the text
    /// is unchanged.
    pub fn on_word_rewritten(&mut self, word: &str) {
        if self.session.is_none() || self.current_word.is_empty() || self.current_word.as_str() == word {
            return;
        }
        self.current_word.clear();
        self.current_word.push_str(word);
        tracing::debug!(word, "current word rewritten");
        self.request_suggestions();
    }

    /// The word ended (space, newline, accepted suggestion, word edit).
    pub fn on_word_complete(&mut self) {
        self.current_word.clear();
        self.awaiting = false;
        self.feed.clear();
        tracing::debug!("word completed, suggestions cleared");
    }

    /// Apply a result delivered by the host. Returns true if it was applied.
    pub fn on_suggestions(&mut self, result: SpellCheckResult) -> bool {
        if !self.awaiting || result.seq != self.latest_seq || self.current_word.is_empty() {
            self.stale_dropped += 1;
            tracing::warn!(
                seq = result.seq,
                latest = self.latest_seq,
                "dropping stale suggestions"
            );
            return false;
        }
        let suggestions = result.batch.flatten();
        tracing::debug!(?suggestions, seq = result.seq, "got suggestions");
        self.feed.publish(suggestions);
        true
    }

    fn request_suggestions(&mut self) {
        if self.current_word.is_empty() {
            self.awaiting = false;
            self.feed.clear();
            tracing::debug!("empty word, suggestions cleared");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.latest_seq += 1;
        self.awaiting = true;
        let request = SuggestionRequest {
            seq: self.latest_seq,
            text: self.current_word.as_str().to_string(),
            limit: self.limit,
        };
        tracing::debug!(word = %request.text, seq = request.seq, "requesting suggestions");
        session.get_sentence_suggestions(request);
    }
}

impl Drop for PredictionManager {
    fn drop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
    }
}

impl std::fmt::Debug for PredictionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionManager")
            .field("available", &self.is_available())
            .field("current_word", &self.current_word.as_str())
            .field("suggestions", &self.feed.current())
            .field("latest_seq", &self.latest_seq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell_checker::{SentenceSuggestionsInfo, SuggestionsInfo};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<SuggestionRequest>>>);

    impl SpellCheckerSession for Recorder {
        fn get_sentence_suggestions(&mut self, request: SuggestionRequest) {
            self.0.borrow_mut().push(request);
        }
    }

    fn manager() -> (PredictionManager, Recorder) {
        let rec = Recorder::default();
        (PredictionManager::new(Some(Box::new(rec.clone()))), rec)
    }

    fn words(seq: u64, list: &[&str]) -> SpellCheckResult {
        SpellCheckResult::words(seq, vec![SuggestionsInfo::new(list.iter().copied())])
    }

    #[test]
    fn test_text_input_requests_with_full_word() {
        let (mut pm, rec) = manager();
        pm.on_text_input("h");
        pm.on_text_input("e");
        let reqs = rec.0.borrow();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].text, "he");
        assert_eq!(reqs[1].limit, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(reqs[1].seq, 2);
    }

    #[test]
    fn test_buffer_tracks_net_input() {
        let (mut pm, _) = manager();
        pm.on_backspace();
        assert_eq!(pm.current_word(), "");
        for s in ["c", "a", "t"] {
            pm.on_text_input(s);
        }
        pm.on_backspace();
        pm.on_text_input("r");
        assert_eq!(pm.current_word(), "car");
        for _ in 0..5 {
            pm.on_backspace();
        }
        assert_eq!(pm.current_word(), "");
    }

    #[test]
    fn test_backspace_to_empty_clears_suggestions_without_request() {
        let (mut pm, rec) = manager();
        pm.on_text_input("a");
        assert!(pm.on_suggestions(words(1, &["a", "an"])));
        assert_eq!(pm.suggestions(), &["a".to_string(), "an".to_string()]);
        pm.on_backspace();
        assert!(pm.suggestions().is_empty());
        assert_eq!(rec.0.borrow().len(), 1);
    }

    #[test]
    fn test_rewritten_word_is_requested_again() {
        let (mut pm, rec) = manager();
        pm.on_word_rewritten("I");
        assert_eq!(pm.current_word(), "");
        assert!(rec.0.borrow().is_empty());

        pm.on_text_input("i");
        pm.on_text_input("'");
        pm.on_word_rewritten("i'");
        assert_eq!(rec.0.borrow().len(), 2);

        pm.on_word_rewritten("I'");
        assert_eq!(pm.current_word(), "I'");
        let reqs = rec.0.borrow();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[2].text, "I'");
        assert_eq!(pm.latest_request(), 3);
    }

    #[test]
    fn test_word_complete_always_empties() {
        let (mut pm, _) = manager();
        pm.on_word_complete();
        assert_eq!(pm.current_word(), "");
        assert!(pm.suggestions().is_empty());

        pm.on_text_input("th");
        pm.on_suggestions(words(1, &["the", "this"]));
        pm.on_word_complete();
        assert_eq!(pm.current_word(), "");
        assert!(pm.suggestions().is_empty());
    }

    #[test]
    fn test_sentence_results_are_flattened() {
        let (mut pm, _) = manager();
        pm.on_text_input("yo");
        let result = SpellCheckResult::sentences(
            1,
            vec![SentenceSuggestionsInfo {
                infos: vec![SuggestionsInfo::new(["you", "your"])],
            }],
        );
        assert!(pm.on_suggestions(result));
        assert_eq!(pm.suggestions(), &["you".to_string(), "your".to_string()]);
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let (mut pm, _) = manager();
        pm.on_text_input("t");
        pm.on_text_input("h");
        // reply to "t" arrives after "th" was requested
        assert!(!pm.on_suggestions(words(1, &["to"])));
        assert!(pm.on_suggestions(words(2, &["the"])));
        assert_eq!(pm.suggestions(), &["the".to_string()]);
        assert_eq!(pm.stale_dropped(), 1);
    }

    #[test]
    fn test_reply_after_word_cleared_does_not_resurrect_suggestions() {
        let (mut pm, _) = manager();
        pm.on_text_input("w");
        pm.on_backspace();
        assert!(!pm.on_suggestions(words(1, &["we", "was"])));
        assert!(pm.suggestions().is_empty());

        pm.on_text_input("x");
        pm.on_word_complete();
        let seq = pm.latest_request();
        assert!(!pm.on_suggestions(words(seq, &["xylophone"])));
        assert!(pm.suggestions().is_empty());
    }

    #[test]
    fn test_last_shape_to_arrive_wins_for_current_request() {
        let (mut pm, _) = manager();
        pm.on_text_input("go");
        pm.on_suggestions(words(1, &["go"]));
        pm.on_suggestions(SpellCheckResult::sentences(
            1,
            vec![SentenceSuggestionsInfo {
                infos: vec![SuggestionsInfo::new(["good"])],
            }],
        ));
        assert_eq!(pm.suggestions(), &["good".to_string()]);
    }

    #[test]
    fn test_empty_result_means_no_suggestions() {
        let (mut pm, _) = manager();
        pm.on_text_input("q");
        pm.on_suggestions(words(1, &["qi"]));
        assert!(pm.on_suggestions(SpellCheckResult::words(1, vec![])));
        assert!(pm.suggestions().is_empty());
    }

    #[test]
    fn test_noop_mode_ignores_everything() {
        let mut pm = PredictionManager::new(None);
        assert!(!pm.is_available());
        pm.on_text_input("a");
        pm.on_backspace();
        assert_eq!(pm.current_word(), "");
        assert!(!pm.on_suggestions(words(0, &["a"])));
        assert!(pm.suggestions().is_empty());
    }

    #[test]
    fn test_subscribers_see_published_lists() {
        let (mut pm, _) = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        pm.subscribe(move |s| sink.borrow_mut().push(s.len()));
        pm.on_text_input("i");
        pm.on_suggestions(words(1, &["in", "is", "it"]));
        pm.on_word_complete();
        assert_eq!(*seen.borrow(), vec![0, 3, 0]);
    }
}
