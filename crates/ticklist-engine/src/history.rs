/// Linear undo/redo engine over an event log.
///
/// Owns the current `State`, an ordered log of reversible events, and a
/// cursor separating applied events from the discardable redo tail.
/// Replaying `events[..cursor]` from the seeded initial state always
/// reproduces `state`. Every successful mutation notifies the published
/// store and writes the state through to the persistence context.
use ticklist_store::{PersistenceContext, Store, Subscription};

use crate::event::Event;
use crate::model::State;

/// Undo/redo history for a single checklist document.
///
/// One `History` per logical document; the feature key is the namespace its
/// state occupies inside the shared storage blob.
pub struct History {
    state: State,
    events: Vec<Event>,
    cursor: usize,
    store: Store<State>,
    ctx: PersistenceContext,
    feature_key: String,
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("feature_key", &self.feature_key)
            .field("events_len", &self.events.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl History {
    /// Creates an engine seeded from the persisted state under
    /// `feature_key`, falling back to `initial` when the slot is absent or
    /// unreadable.
    pub fn new(feature_key: impl Into<String>, initial: State, ctx: PersistenceContext) -> Self {
        let feature_key = feature_key.into();
        let state = match ctx.load::<State>(&feature_key) {
            Some(recovered) => {
                tracing::debug!("Recovered persisted state for {feature_key:?}");
                recovered
            }
            None => initial,
        };
        let store = Store::new(state.clone());
        Self {
            state,
            events: Vec::new(),
            cursor: 0,
            store,
            ctx,
            feature_key,
        }
    }

    /// Creates an engine with no persistence behind it.
    ///
    /// Convenience constructor for tests and storage-less hosts.
    pub fn in_memory(initial: State) -> Self {
        Self::new("list", initial, PersistenceContext::detached())
    }

    /// Records a new event: truncates the redo tail, coalesces or appends,
    /// then advances over the event.
    ///
    /// Consecutive `EditItem` events on the same (group, item) position and
    /// consecutive `EditGroup` events on the same group collapse into the
    /// prior log entry, so a rapid edit session undoes as one step.
    pub fn record(&mut self, event: Event) {
        self.events.truncate(self.cursor);

        let coalesced = match (self.events.last_mut(), &event) {
            (
                Some(Event::EditItem {
                    group_index: prior_group,
                    item_index: prior_item,
                    edited: prior_edited,
                    ..
                }),
                Event::EditItem {
                    group_index,
                    item_index,
                    edited,
                    ..
                },
            ) if prior_group == group_index && prior_item == item_index => {
                *prior_edited = edited.clone();
                true
            }
            (
                Some(Event::EditGroup {
                    group_index: prior_group,
                    edited: prior_edited,
                    ..
                }),
                Event::EditGroup {
                    group_index, edited, ..
                },
            ) if prior_group == group_index => {
                *prior_edited = edited.clone();
                true
            }
            _ => false,
        };

        if coalesced {
            // Step back over the merged entry so the shared redo path
            // applies its forward transform exactly once.
            self.cursor -= 1;
        } else {
            self.events.push(event);
        }

        let advanced = self.redo();
        debug_assert!(advanced, "event log and cursor desynchronized");
    }

    /// Moves the cursor back one event and applies its inverse transform.
    ///
    /// Returns `false` at the start of the log, leaving the state untouched.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.events[self.cursor].revert(&mut self.state);
        self.publish();
        true
    }

    /// Applies the forward transform of the event at the cursor and advances.
    ///
    /// Returns `false` at the end of the log, leaving the state untouched.
    pub fn redo(&mut self) -> bool {
        if self.cursor == self.events.len() {
            return false;
        }
        self.events[self.cursor].apply(&mut self.state);
        self.cursor += 1;
        self.publish();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.events.len()
    }

    /// The current state snapshot.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The feature key this engine persists under.
    pub fn feature_key(&self) -> &str {
        &self.feature_key
    }

    /// The store this engine publishes through.
    pub fn store(&self) -> &Store<State> {
        &self.store
    }

    /// Attaches an observer to the published state.
    pub fn subscribe(&self, observer: impl FnMut(&State) + 'static) -> Subscription<State> {
        self.store.subscribe(observer)
    }

    fn publish(&self) {
        self.store.set(self.state.clone());
        self.ctx.save(&self.feature_key, &self.state);
    }
}
