//! Host lifecycle and saved-state contracts.
//!
//! The IME service does not inherit these from a host framework; it owns a
//! `LifecycleRegistry` and is handed a `SavedStateStore`, so the whole core
//! runs in plain unit tests.

use std::collections::HashMap;

/// Lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LifecycleState {
    Destroyed,
    #[default]
    Initialized,
    Created,
    Started,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    OnCreate,
    OnStart,
    OnResume,
    OnPause,
    OnStop,
    OnDestroy,
}

impl LifecycleEvent {
    /// State reached after this event.
    pub fn target_state(self) -> LifecycleState {
        match self {
            Self::OnCreate | Self::OnStop => LifecycleState::Created,
            Self::OnStart | Self::OnPause => LifecycleState::Started,
            Self::OnResume => LifecycleState::Resumed,
            Self::OnDestroy => LifecycleState::Destroyed,
        }
    }
}

/// Something providing the current lifecycle state.
pub trait LifecycleOwner {
    fn lifecycle_state(&self) -> LifecycleState;
}

/// Tracks the current lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct LifecycleRegistry {
    state: LifecycleState,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Apply `event`, stepping through intermediate states one at a time.
    ///
    /// Destroyed is terminal: events after it are ignored.
    pub fn handle_lifecycle_event(&mut self, event: LifecycleEvent) {
        if self.state == LifecycleState::Destroyed {
            tracing::warn!(?event, "lifecycle event after destroy ignored");
            return;
        }
        let target = event.target_state();
        if target == LifecycleState::Destroyed {
            self.enter(LifecycleState::Destroyed);
            return;
        }
        while self.state < target {
            let next = match self.state {
                LifecycleState::Initialized => LifecycleState::Created,
                LifecycleState::Created => LifecycleState::Started,
                _ => LifecycleState::Resumed,
            };
            self.enter(next);
        }
        while self.state > target {
            let next = match self.state {
                LifecycleState::Resumed => LifecycleState::Started,
                _ => LifecycleState::Created,
            };
            self.enter(next);
        }
    }

    fn enter(&mut self, state: LifecycleState) {
        tracing::debug!(from = ?self.state, to = ?state, "lifecycle transition");
        self.state = state;
    }
}

impl LifecycleOwner for LifecycleRegistry {
    fn lifecycle_state(&self) -> LifecycleState {
        self.state
    }
}

/// Key/value store for state that should survive the view being recreated.
pub trait SavedStateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    values: HashMap<String, String>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SavedStateStore for InMemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}
