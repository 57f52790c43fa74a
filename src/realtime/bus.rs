/**
 * Realtime Message Bus
 *
 * In-process publish/subscribe fan-out for inbound frames. Any number of
 * independent listeners register with `subscribe` and receive every message
 * the transport delivers from then on, in arrival order.
 *
 * # Delivery rules
 *
 * - Delivery is synchronous: `publish` returns after every listener ran.
 * - A listener registered after a message arrived never sees that message.
 * - A listener that returns an error or panics is logged and skipped for
 *   that message; the others still receive it and it stays registered.
 * - A listener removed while a message is being dispatched receives nothing
 *   further, not even the rest of the current dispatch.
 * - Publishing from inside a listener queues the message behind the one
 *   being dispatched, so every listener observes the same order.
 *
 * The bus is single-threaded (`Rc`), matching the event loop that drives it.
 */
use crate::shared::{InboundMessage, SharedError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Result returned by a listener for one message
pub type ListenerResult = Result<(), SharedError>;

type Listener = Box<dyn FnMut(&InboundMessage) -> ListenerResult>;

/// Identifies one registration on a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Rc<RefCell<Listener>>)>,
}

impl Registry {
    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(existing, _)| *existing == id)
    }
}

#[derive(Default)]
struct BusInner {
    registry: RefCell<Registry>,
    queue: RefCell<VecDeque<InboundMessage>>,
    dispatching: Cell<bool>,
}

impl BusInner {
    fn remove(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(existing, _)| *existing != id);
        before != registry.listeners.len()
    }
}

/// Fan-out registry for inbound messages
///
/// Cloning a `MessageBus` yields another handle to the same registry.
///
/// # Example
///
/// ```rust
/// use lexdraft::realtime::MessageBus;
/// use lexdraft::shared::InboundMessage;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let bus = MessageBus::new();
/// let seen = Rc::new(Cell::new(0));
/// let counter = seen.clone();
/// let subscription = bus.subscribe(move |_message| {
///     counter.set(counter.get() + 1);
///     Ok(())
/// });
///
/// bus.publish(InboundMessage::Unknown);
/// subscription.unsubscribe();
/// bus.publish(InboundMessage::Unknown);
/// assert_eq!(seen.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Rc<BusInner>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it receives every message published from now on
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&InboundMessage) -> ListenerResult + 'static,
    {
        let mut registry = self.inner.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        let boxed: Listener = Box::new(listener);
        registry.listeners.push((id, Rc::new(RefCell::new(boxed))));
        tracing::debug!(
            "[Bus] Listener {:?} registered ({} active)",
            id,
            registry.listeners.len()
        );

        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.registry.borrow().listeners.len()
    }

    /// Deliver a message to every registered listener
    ///
    /// Returns the number of listener invocations that completed without
    /// error during this call. A message published from inside a listener is
    /// queued and counted by the outer call, so the inner call returns 0.
    pub fn publish(&self, message: InboundMessage) -> usize {
        self.inner.queue.borrow_mut().push_back(message);
        if self.inner.dispatching.replace(true) {
            tracing::debug!("[Bus] Publish during dispatch, message queued");
            return 0;
        }

        let mut delivered = 0;
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(message) = next else { break };
            delivered += self.dispatch(&message);
        }
        self.inner.dispatching.set(false);
        delivered
    }

    fn dispatch(&self, message: &InboundMessage) -> usize {
        let snapshot = self.inner.registry.borrow().listeners.clone();
        let mut delivered = 0;

        for (id, listener) in snapshot {
            if !self.inner.registry.borrow().contains(id) {
                continue;
            }
            let Ok(mut guard) = listener.try_borrow_mut() else {
                tracing::warn!("[Bus] Listener {:?} is already running, skipping", id);
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let callback: &mut Listener = &mut guard;
                callback(message)
            }));
            match outcome {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(
                        "[Bus] Listener {:?} failed on '{}': {}",
                        id,
                        message.kind(),
                        e
                    );
                }
                Err(_) => {
                    tracing::error!(
                        "[Bus] Listener {:?} panicked on '{}'",
                        id,
                        message.kind()
                    );
                }
            }
        }

        tracing::debug!(
            "[Bus] '{}' delivered to {} listener(s)",
            message.kind(),
            delivered
        );
        delivered
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("listeners", &self.listener_count())
            .field("dispatching", &self.inner.dispatching.get())
            .finish()
    }
}

/// Handle returned by `MessageBus::subscribe`
///
/// Dropping the handle unsubscribes the listener.
#[must_use = "dropping a Subscription unsubscribes its listener"]
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|inner| inner.registry.borrow().contains(self.id))
    }

    /// Remove the listener
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            if inner.remove(self.id) {
                tracing::debug!("[Bus] Listener {:?} unsubscribed", self.id);
            }
        }
    }
}
