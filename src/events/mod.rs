pub mod listeners;

pub use listeners::{
    Event, EventTarget, INLINE_HANDLER_EVENTS, Listener, ListenerOptions, ListenerRecord,
    MemoryTarget, TrackedTarget,
};
