//! Event bus for host-wide and cross-plugin communication
//!
//! A synchronous publish/subscribe hub keyed by event name. Dispatch happens
//! on the emitting thread, in subscription order, and the first failing
//! handler aborts the remaining invocations for that emit. Callers that need
//! full delivery must accept at-most-partial delivery on error.
//!
//! Subscriptions are removed through the handle returned by [`EventBus::subscribe`]
//! rather than by comparing handler identity, so the same closure may be
//! subscribed more than once and each registration fires independently.

use crate::core::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Event handler function type
pub type EventHandler = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Handle identifying one subscription; consumed by [`EventBus::unsubscribe`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: String,
    id: Uuid,
}

impl Subscription {
    /// Name of the event this subscription is registered for
    pub fn event(&self) -> &str {
        &self.event
    }
}

struct Registration {
    id: Uuid,
    handler: EventHandler,
}

/// Synchronous publish/subscribe hub
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Registration>>>,
}

impl EventBus {
    /// Create a new event bus with no subscriptions
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a handler to an event name
    ///
    /// Handlers are invoked in subscription order. Subscribing the same
    /// handler twice registers it twice.
    pub fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription {
        let id = Uuid::new_v4();
        let mut handlers = self.handlers.write().unwrap();
        handlers
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, handler });

        Subscription {
            event: event.to_string(),
            id,
        }
    }

    /// Remove the registration behind a subscription handle
    ///
    /// A handle that was already removed (or never existed) is a no-op.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut handlers = self.handlers.write().unwrap();
        if let Some(regs) = handlers.get_mut(&subscription.event) {
            if let Some(pos) = regs.iter().position(|r| r.id == subscription.id) {
                regs.remove(pos);
            }
            if regs.is_empty() {
                handlers.remove(&subscription.event);
            }
        }
    }

    /// Emit an event to all current subscribers, in subscription order
    ///
    /// The handler list is copied under a short read lock and the lock is
    /// released before any handler runs, so a handler may subscribe,
    /// unsubscribe, or emit without deadlocking. A handler added during an
    /// in-flight emit is not invoked for that same emit. The first handler
    /// error aborts the remaining invocations and is returned to the caller.
    pub fn emit(&self, event: &str, payload: &Value) -> Result<()> {
        let snapshot: Vec<EventHandler> = {
            let handlers = self.handlers.read().unwrap();
            handlers
                .get(event)
                .map(|regs| regs.iter().map(|r| r.handler.clone()).collect())
                .unwrap_or_default()
        };

        for handler in snapshot {
            handler(payload)?;
        }

        Ok(())
    }

    /// Number of registrations for an event name
    pub fn subscriber_count(&self, event: &str) -> usize {
        let handlers = self.handlers.read().unwrap();
        handlers.get(event).map(|regs| regs.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BookdenError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counting_handler(counter: Arc<AtomicUsize>) -> EventHandler {
        Arc::new(move |_payload| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe("book.added", counting_handler(counter.clone()));
        bus.emit("book.added", &json!({ "id": 7 })).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = EventBus::new();
        assert!(bus.emit("nobody.listens", &json!({})).is_ok());
    }

    #[test]
    fn test_handlers_invoked_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            bus.subscribe(
                "plugin.loaded",
                Arc::new(move |_payload| {
                    order.lock().unwrap().push(i);
                    Ok(())
                }),
            );
        }

        bus.emit("plugin.loaded", &json!({})).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_failing_handler_aborts_remaining() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        bus.subscribe(
            "plugin.loaded",
            Arc::new(move |_| {
                first.lock().unwrap().push("first");
                Ok(())
            }),
        );
        bus.subscribe(
            "plugin.loaded",
            Arc::new(|_| Err(BookdenError::EventError("second handler failed".into()))),
        );
        let third = order.clone();
        bus.subscribe(
            "plugin.loaded",
            Arc::new(move |_| {
                third.lock().unwrap().push("third");
                Ok(())
            }),
        );

        let err = bus.emit("plugin.loaded", &json!({})).unwrap_err();
        assert!(matches!(err, BookdenError::EventError(_)));
        assert!(err.to_string().contains("second handler failed"));

        // Third handler never ran
        assert_eq!(*order.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_duplicate_subscription_fires_twice() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(counter.clone());

        bus.subscribe("book.added", handler.clone());
        bus.subscribe("book.added", handler);
        assert_eq!(bus.subscriber_count("book.added"), 2);

        bus.emit("book.added", &json!({})).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_registration() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(counter.clone());

        let first = bus.subscribe("book.added", handler.clone());
        bus.subscribe("book.added", handler);

        bus.unsubscribe(&first);
        assert_eq!(bus.subscriber_count("book.added"), 1);

        bus.emit("book.added", &json!({})).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_handle_is_noop() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let sub = bus.subscribe("book.added", counting_handler(counter.clone()));
        bus.unsubscribe(&sub);
        // Second removal of the same handle does nothing
        bus.unsubscribe(&sub);

        bus.subscribe("book.added", counting_handler(counter.clone()));
        bus.emit("book.added", &json!({})).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_reenter_the_bus() {
        let bus = Arc::new(EventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let reentrant_bus = bus.clone();
        let reentrant_counter = counter.clone();
        bus.subscribe(
            "outer",
            Arc::new(move |_| {
                // Subscribing from inside a handler must not deadlock, and the
                // new handler is not invoked for the in-flight emit.
                reentrant_bus.subscribe("outer", counting_handler(reentrant_counter.clone()));
                Ok(())
            }),
        );

        bus.emit("outer", &json!({})).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count("outer"), 2);

        bus.emit("outer", &json!({})).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
