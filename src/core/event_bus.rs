//! Pub/Sub event bus between the pipeline and whatever shell drives it.
//!
//! - `subscribe()` registers a callback per event type, invoked synchronously on `emit()`
//! - `emit()` also queues the event so a shell loop can `poll()` them in batches
//!
//! Callback order is FIFO within one event type. The pipeline runs on a single
//! logical thread, so emission order equals pipeline order (countdown ticks of
//! take 1 always precede take 2's, `CompositeReady` always comes last).

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Events older than this are dropped when nobody polls
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Subscribers = Arc<RwLock<HashMap<TypeId, Vec<Callback>>>>;
type Queue = Arc<Mutex<Vec<BoxedEvent>>>;

pub type BoxedEvent = Box<dyn Event>;

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Subscribers,
    queue: Queue,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type E.
    ///
    /// ```ignore
    /// bus.subscribe::<CountdownTick, _>(|t| println!("{}...", t.remaining));
    /// ```
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event + Clone>(&self, event: E) {
        dispatch(&self.subscribers, &self.queue, event);
    }

    /// Drain everything emitted since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Handle for the session and pipeline stages.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            inner: Some((Arc::clone(&self.subscribers), Arc::clone(&self.queue))),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Cloneable emitter handle. `EventEmitter::dummy()` discards everything.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Option<(Subscribers, Queue)>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

impl EventEmitter {
    /// No-op emitter (tests, or a shell that doesn't care about progress)
    pub fn dummy() -> Self {
        Self { inner: None }
    }

    pub fn emit<E: Event + Clone>(&self, event: E) {
        if let Some((subscribers, queue)) = &self.inner {
            dispatch(subscribers, queue, event);
        }
    }
}

fn dispatch<E: Event + Clone>(subscribers: &Subscribers, queue: &Queue, event: E) {
    if let Some(cbs) = subscribers
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&TypeId::of::<E>())
    {
        for cb in cbs {
            cb(&event);
        }
    }

    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
    if queue.len() >= MAX_QUEUE_SIZE {
        let evict_count = queue.len() / 2;
        warn!(
            "Event queue full ({} events), evicting oldest {}",
            queue.len(),
            evict_count
        );
        queue.drain(0..evict_count);
    }
    queue.push(Box::new(event));
}

/// Downcast a polled event to its concrete type.
///
/// Must deref to `dyn Event` first: `Box<dyn Event>` itself satisfies the blanket
/// impl, and calling `as_any()` on the box would yield the box's TypeId.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
