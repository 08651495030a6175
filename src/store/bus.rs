//! Publish/subscribe bus with per-subscriber error isolation.

use std::fmt;

use thiserror::Error;

use super::event::{StoreEvent, Topic};

/// Failure reported by a subscriber callback. Logged, never propagated.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type returned by subscriber callbacks.
pub type SubscriberResult = Result<(), SubscriberError>;

type Callback = Box<dyn FnMut(&StoreEvent) -> SubscriberResult>;

/// Handle returned by `on`; pass it to `off` to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Subscriber {
    id: u64,
    /// `None` receives every event.
    filter: Option<Topic>,
    callback: Callback,
}

/// Ordered list of subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one topic.
    pub fn on<F>(&mut self, topic: Topic, callback: F) -> Subscription
    where
        F: FnMut(&StoreEvent) -> SubscriberResult + 'static,
    {
        self.add(Some(topic), Box::new(callback))
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&StoreEvent) -> SubscriberResult + 'static,
    {
        self.add(None, Box::new(callback))
    }

    fn add(&mut self, filter: Option<Topic>, callback: Callback) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            callback,
        });
        Subscription(id)
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn off(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != subscription.0);
        self.subscribers.len() != before
    }

    /// Deliver `event` to matching subscribers in registration order.
    ///
    /// A failing subscriber is logged and skipped; the rest still run.
    /// Returns the number of failures.
    pub fn emit(&mut self, event: &StoreEvent) -> usize {
        let topic = event.topic();
        let mut failures = 0;
        for sub in &mut self.subscribers {
            if sub.filter.is_some_and(|t| t != topic) {
                continue;
            }
            if let Err(e) = (sub.callback)(event) {
                failures += 1;
                log::warn!("Subscriber {} failed on '{}': {}", sub.id, topic, e);
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::event::{CollectionKind, Slot, SlotValue};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn page_event(old: u32, new: u32) -> StoreEvent {
        StoreEvent::SlotChanged {
            old: SlotValue::CurrentPage(old),
            new: SlotValue::CurrentPage(new),
        }
    }

    #[test]
    fn test_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.on_any(move |_| {
                log.borrow_mut().push(name);
                Ok(())
            });
        }
        bus.emit(&page_event(1, 2));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_subscriber_is_isolated() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        bus.on_any(|_| Err(SubscriberError::new("boom")));
        let counter = Rc::clone(&hits);
        bus.on_any(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        assert_eq!(bus.emit(&page_event(1, 2)), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_topic_filter_and_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        let sub = bus.on(Topic::Slot(Slot::CurrentPage), move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.emit(&page_event(1, 2));
        bus.emit(&StoreEvent::Changed {
            collection: CollectionKind::Annotations,
            len: 0,
        });
        assert_eq!(*hits.borrow(), 1);

        assert!(bus.off(sub));
        assert!(!bus.off(sub));
        bus.emit(&page_event(2, 3));
        assert_eq!(*hits.borrow(), 1);
        assert!(bus.is_empty());
    }
}
