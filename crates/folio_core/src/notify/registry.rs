//! Single-threaded handler registry with RAII unsubscription.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

struct RegistryInner<E: ?Sized> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// Shared list of handlers for events of type `E`.
pub(crate) struct HandlerRegistry<E: ?Sized> {
    inner: Rc<RefCell<RegistryInner<E>>>,
}

impl<E: ?Sized + 'static> HandlerRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub(crate) fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let handler: Handler<E> = Rc::new(handler);
            inner.handlers.push((id, handler));
            id
        };

        let weak: Weak<RefCell<RegistryInner<E>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .handlers
                    .retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// Calls every handler once; returns how many were called.
    pub(crate) fn emit(&self, event: &E) -> usize {
        // Snapshot first: handlers may subscribe or unsubscribe re-entrantly.
        let handlers: Vec<Handler<E>> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

impl<E: ?Sized> Clone for HandlerRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Live registration of a handler; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicit teardown; equivalent to dropping.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
