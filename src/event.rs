//! Typed event channels.
//!
//! One channel per event kind, subscribed and unsubscribed explicitly,
//! dispatched in registration order on the current thread. Dispatch runs over
//! a snapshot of the subscriber list, so callbacks may subscribe or
//! unsubscribe without affecting the batch in flight.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Token returned by [`EventChannel::subscribe`]; required to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<E> {
    id: SubscriptionId,
    once: bool,
    callback: Rc<dyn Fn(&E)>,
}

struct ChannelInner<E> {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber<E>>>,
}

/// A cheap-clone handle to a single-kind event channel.
pub struct EventChannel<E> {
    inner: Rc<ChannelInner<E>>,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                next_id: Cell::new(1),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    fn insert(&self, once: bool, callback: Rc<dyn Fn(&E)>) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push(Subscriber { id, once, callback });
        id
    }

    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> SubscriptionId {
        self.insert(false, Rc::new(callback))
    }

    /// Subscribe for exactly one emission; the entry is dropped when the next
    /// batch is taken.
    pub fn once(&self, callback: impl Fn(&E) + 'static) -> SubscriptionId {
        self.insert(true, Rc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }

    /// Dispatch `event` to every current subscriber, in registration order.
    pub fn emit(&self, event: &E) {
        let batch: Vec<Rc<dyn Fn(&E)>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let batch = subscribers
                .iter()
                .map(|subscriber| Rc::clone(&subscriber.callback))
                .collect();
            subscribers.retain(|subscriber| !subscriber.once);
            batch
        };
        for callback in batch {
            callback(event);
        }
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        self.inner.subscribers.borrow_mut().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}
