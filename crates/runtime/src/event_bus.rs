use foundation::ids::{IdAllocator, ListenerId};

type Listener<E> = Box<dyn FnMut(&E)>;

/// Typed synchronous event emitter.
///
/// Listeners run in registration order, on the caller's stack, before `emit`
/// returns. One emitter carries exactly one payload type; components that fire
/// several kinds of events hold one emitter per kind.
pub struct Emitter<E> {
    ids: IdAllocator,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe_boxed(Box::new(listener))
    }

    pub fn subscribe_boxed(&mut self, listener: Box<dyn FnMut(&E)>) -> ListenerId {
        let id = ListenerId::next(&mut self.ids);
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener.
    ///
    /// Returns `true` if the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Dispatches `event` to every listener. Returns the number of listeners run.
    pub fn emit(&mut self, event: &E) -> usize {
        for (_id, listener) in &mut self.listeners {
            listener(event);
        }
        self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Emitter;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatches_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: Emitter<u32> = Emitter::new();

        let a = Rc::clone(&seen);
        emitter.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        emitter.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        assert_eq!(emitter.emit(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter: Emitter<()> = Emitter::new();
        let c = Rc::clone(&count);
        let id = emitter.subscribe(move |_| *c.borrow_mut() += 1);

        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(*count.borrow(), 1);
        assert!(emitter.is_empty());
    }
}
