//! Host services consumed by effect sequencers.
//!
//! Audio playback, object pooling and messaging belong to the embedding
//! application; sequencers only see these traits. [`Messenger`] is a small
//! in-process publish/subscribe bus for hosts that have none.

use std::cell::RefCell;

use crate::time::CancellationToken;

/// Identity of a pooled object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// Pool that takes objects back for reuse.
pub trait ObjectPool {
    /// Return `object` to the pool.
    fn remove(&self, object: ObjectId);
}

/// Sound effect playback.
pub trait AudioService {
    /// Start playing the named effect. Playback is abandoned once `token` is
    /// cancelled.
    fn play_sound_effect(&self, name: &str, token: &CancellationToken);
}

/// Publish side of a message bus.
pub trait MessageBus<M> {
    fn publish(&self, message: M);
}

/// Published when the stasis prison lands and should start dealing damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartTriggerDamageMessage;

type Subscriber<M> = Box<dyn FnMut(&M)>;

/// Single-threaded publish/subscribe bus.
///
/// Subscribers are called in subscription order. A subscriber added while a
/// message is being delivered only sees later messages.
pub struct Messenger<M> {
    subscribers: RefCell<Vec<Subscriber<M>>>,
}

impl<M> Default for Messenger<M> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<M> Messenger<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl FnMut(&M) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<M> MessageBus<M> for Messenger<M> {
    fn publish(&self, message: M) {
        let mut current = std::mem::take(&mut *self.subscribers.borrow_mut());
        for subscriber in current.iter_mut() {
            subscriber(&message);
        }
        let mut subscribers = self.subscribers.borrow_mut();
        current.append(&mut subscribers);
        *subscribers = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let messenger = Messenger::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b"] {
            let log = log.clone();
            messenger.subscribe(move |m| log.borrow_mut().push(format!("{label}{m}")));
        }

        messenger.publish(1);
        messenger.publish(2);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_subscribe_during_publish() {
        let messenger = Rc::new(Messenger::<StartTriggerDamageMessage>::new());
        let late_calls = Rc::new(Cell::new(0));

        let bus = messenger.clone();
        let calls = late_calls.clone();
        let mut subscribed = false;
        messenger.subscribe(move |_| {
            if !subscribed {
                subscribed = true;
                let calls = calls.clone();
                bus.subscribe(move |_| calls.set(calls.get() + 1));
            }
        });

        messenger.publish(StartTriggerDamageMessage);
        assert_eq!(late_calls.get(), 0);
        assert_eq!(messenger.subscriber_count(), 2);

        messenger.publish(StartTriggerDamageMessage);
        assert_eq!(late_calls.get(), 1);
    }
}
