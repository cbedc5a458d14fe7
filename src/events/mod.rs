//! Typed status channel.
//!
//! The board reports every meaningful transition as a [`GameEvent`]. Hosts
//! subscribe with a callback through [`Observers`] (owned by the board) and
//! can also read the bounded [`EventLog`].

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::battle::BattleResult;
use crate::core::PlayerId;

/// Something the host UI should know about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Headline plus secondary hint.
    Status { title: String, hint: String },
    /// Replaces only the secondary hint line.
    ActionHint { text: String },
    /// The category being fought over, or `None` when no duel is running.
    CategoryFocus { category: Option<String> },
    /// Whether a "start battle" request would currently be accepted.
    StartEnabled { enabled: bool },
    /// A duel began (countdown included).
    BattleStarted { attacker: PlayerId, defender: PlayerId, category: String },
    /// A duel finished.
    BattleResolved(BattleResult),
    /// Best-of-3 score after a round, in series player order.
    SeriesScore { scores: [(PlayerId, u8); 2] },
    /// One player remains.
    GameOver { winner: PlayerId },
}

impl GameEvent {
    /// Build a status event.
    pub fn status(title: impl Into<String>, hint: impl Into<String>) -> Self {
        GameEvent::Status { title: title.into(), hint: hint.into() }
    }

    /// Build an action-hint event.
    pub fn hint(text: impl Into<String>) -> Self {
        GameEvent::ActionHint { text: text.into() }
    }
}

/// Identifies a subscription for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Callback = Box<dyn FnMut(&GameEvent)>;

/// Registered event callbacks, invoked in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u32,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Deliver an event to every subscriber.
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("subscribers", &self.subscribers.len()).finish()
    }
}

/// Most recent events, oldest first, bounded to `capacity`.
#[derive(Clone, Debug)]
pub struct EventLog {
    events: Vector<GameEvent>,
    capacity: usize,
}

impl EventLog {
    /// Default number of events retained.
    pub const DEFAULT_CAPACITY: usize = 256;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { events: Vector::new(), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    /// Cheap persistent copy of the retained events.
    #[must_use]
    pub fn events(&self) -> Vector<GameEvent> {
        self.events.clone()
    }

    /// Most recent status event, if any is retained.
    #[must_use]
    pub fn last_status(&self) -> Option<(&str, &str)> {
        self.events.iter().rev().find_map(|e| match e {
            GameEvent::Status { title, hint } => Some((title.as_str(), hint.as_str())),
            _ => None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_subscribers_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();

        let sink = Rc::clone(&seen);
        let id = observers.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        observers.publish(&GameEvent::status("Ready", ""));
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.publish(&GameEvent::hint("ignored"));

        assert_eq!(seen.borrow().as_slice(), &[GameEvent::status("Ready", "")]);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = EventLog::new(2);
        log.push(GameEvent::hint("a"));
        log.push(GameEvent::status("b", "c"));
        log.push(GameEvent::hint("d"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.last_status(), Some(("b", "c")));
        assert_eq!(log.events().front(), Some(&GameEvent::status("b", "c")));
    }

    #[test]
    fn test_event_serde() {
        let event = GameEvent::CategoryFocus { category: Some("Technology".into()) };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
