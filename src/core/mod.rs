//! Core plumbing shared by the pipeline and the shell.

pub mod event_bus;
pub mod events;

pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
