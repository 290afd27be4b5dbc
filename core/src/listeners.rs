//! Ordered listener registry with typed subscription tokens.

use std::{fmt, marker::PhantomData};

type Callback<T> = Box<dyn FnMut(&T)>;

/// Token returned by [`Listeners::subscribe`], used to unsubscribe later.
///
/// The payload type is part of the token so a throughput subscription can
/// never be used to remove a log listener.
pub struct Subscription<T> {
    id: u64,
    marker: PhantomData<fn(&T)>,
}

impl<T> Subscription<T> {
    const fn new(id: u64) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Subscription<T> {}

impl<T> PartialEq for Subscription<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Subscription<T> {}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}

/// Listeners invoked synchronously, in subscription order, for every payload.
pub struct Listeners<T> {
    entries: Vec<(u64, Callback<T>)>,
    next_id: u64,
}

impl<T> Listeners<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers a listener and returns the token that removes it.
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription<T>
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, Box::new(listener)));
        Subscription::new(id)
    }

    /// Removes a listener; returns whether it was still registered.
    pub fn unsubscribe(&mut self, subscription: Subscription<T>) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscription.id);
        self.entries.len() != before
    }

    /// Invokes every listener with the payload.
    pub fn emit(&mut self, payload: &T) {
        for (_, listener) in &mut self.entries {
            listener(payload);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn listeners_fire_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for tag in ["a", "b", "c"] {
            let seen = Rc::clone(&seen);
            let _ = listeners.subscribe(move |value: &u32| seen.borrow_mut().push((tag, *value)));
        }

        listeners.emit(&7);

        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_the_matching_listener() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        let first = {
            let count = Rc::clone(&count);
            listeners.subscribe(move |_: &()| *count.borrow_mut() += 1)
        };
        let _second = {
            let count = Rc::clone(&count);
            listeners.subscribe(move |_: &()| *count.borrow_mut() += 10)
        };

        assert!(listeners.unsubscribe(first));
        assert!(!listeners.unsubscribe(first));
        listeners.emit(&());

        assert_eq!(*count.borrow(), 10);
        assert_eq!(listeners.len(), 1);
    }
}
