//! Observable suggestion list.
//!
//! A single writer (the prediction manager) publishes; any number of readers
//! subscribe with a callback or poll [`SuggestionFeed::current`]. Publishing
//! a list equal to the current one notifies nobody.

use std::fmt;

/// Handle returned by [`SuggestionFeed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&[String])>;

#[derive(Default)]
pub struct SuggestionFeed {
    current: Vec<String>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
    /// Number of times the list actually changed
    version: u64,
}

impl SuggestionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register a callback. It is invoked immediately with the current list
    /// and then on every change.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&[String]) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        callback(&self.current);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Replace the list. Returns true if it changed.
    pub fn publish(&mut self, suggestions: Vec<String>) -> bool {
        if suggestions == self.current {
            return false;
        }
        self.current = suggestions;
        self.version += 1;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.current);
        }
        true
    }

    pub fn clear(&mut self) -> bool {
        self.publish(Vec::new())
    }
}

impl fmt::Debug for SuggestionFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionFeed")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .field("version", &self.version)
            .finish()
    }
}
