//! Deferred event queue between widgets and the app.
//!
//! Widgets never mutate the registry directly. They push events here while
//! drawing; the app drains the queue once per frame (`poll()`) and applies
//! them in order, then runs decoder reconciliation.

use std::any::Any;
use std::sync::{Arc, Mutex};

use log::warn;

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 256;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

/// FIFO event queue. Clones share the same queue.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("queue_len", &self.len()).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit<E: Event>(&self, event: E) {
        self.emit_boxed(Box::new(event));
    }

    pub fn emit_boxed(&self, event: BoxedEvent) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!("EventBus queue full ({} events), evicting oldest {}", queue.len(), evict_count);
            queue.drain(0..evict_count);
        }
        queue.push(event);
    }

    /// Take every queued event, oldest first.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Downcast a queued event to its concrete type.
///
/// Derefs to `dyn Event` first; calling `as_any()` on the box itself would
/// hit the blanket impl for `Box<dyn Event>` and never match.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct TestEvent {
        value: i32,
    }

    #[derive(Clone, Debug)]
    struct OtherEvent;

    #[test]
    fn test_poll_keeps_order_and_drains() {
        let bus = EventBus::new();
        bus.emit(TestEvent { value: 1 });
        bus.emit(OtherEvent);
        bus.emit(TestEvent { value: 2 });

        let events = bus.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(downcast_event::<TestEvent>(&events[0]).unwrap().value, 1);
        assert!(downcast_event::<OtherEvent>(&events[1]).is_some());
        assert!(downcast_event::<TestEvent>(&events[1]).is_none());
        assert!(bus.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let bus = EventBus::new();
        let widget_side = bus.clone();
        widget_side.emit_boxed(Box::new(TestEvent { value: 7 }));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let bus = EventBus::new();
        for value in 0..(MAX_QUEUE_SIZE as i32 + 1) {
            bus.emit(TestEvent { value });
        }
        let events = bus.poll();
        assert_eq!(events.len(), MAX_QUEUE_SIZE / 2 + 1);
        assert_eq!(
            downcast_event::<TestEvent>(&events[0]).unwrap().value,
            (MAX_QUEUE_SIZE / 2) as i32
        );
    }
}
