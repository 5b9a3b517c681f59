use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Event types whose inline `on<type>` handler properties are reported alongside
/// registered listeners.
pub const INLINE_HANDLER_EVENTS: [&str; 10] = [
    "click",
    "dblclick",
    "mousedown",
    "mouseup",
    "mouseover",
    "mouseout",
    "mousemove",
    "keydown",
    "keyup",
    "keypress",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub detail: Option<Value>,
}

impl Event {
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            detail: None,
        }
    }

    pub fn custom(event_type: &str, detail: Option<Value>) -> Self {
        Self {
            event_type: event_type.to_string(),
            detail,
        }
    }
}

/// Listeners compare by pointer identity, like function references on the platform.
pub type Listener = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

/// Capability of something that can hold and fire event listeners.
pub trait EventTarget {
    fn add_event_listener(&mut self, event: &str, listener: Listener, options: ListenerOptions);

    fn remove_event_listener(&mut self, event: &str, listener: &Listener, options: ListenerOptions);

    /// Fire `event`; returns whether any listener ran.
    fn dispatch_event(&mut self, event: &Event) -> bool;

    /// The `on<event>` handler property, if set.
    fn inline_handler(&self, event: &str) -> Option<Listener>;

    /// Markup of the target, recorded with each registration when available.
    fn outer_html(&self) -> Option<String> {
        None
    }
}

#[derive(Clone)]
pub struct ListenerRecord {
    pub listener: Listener,
    pub options: ListenerOptions,
    pub outer_html: Option<String>,
    pub inline: bool,
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("listener", &Rc::as_ptr(&self.listener))
            .field("options", &self.options)
            .field("outer_html", &self.outer_html)
            .field("inline", &self.inline)
            .finish()
    }
}

/// Wraps an `EventTarget` and keeps a record of the listeners registered through it, so
/// they can be listed later. The wrapped target is never modified behind its back:
/// every registration is forwarded unchanged.
pub struct TrackedTarget<T: EventTarget> {
    inner: T,
    listeners: BTreeMap<String, Vec<ListenerRecord>>,
}

impl<T: EventTarget> TrackedTarget<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            listeners: BTreeMap::new(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn add_event_listener(&mut self, event: &str, listener: Listener, options: ListenerOptions) {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(ListenerRecord {
                listener: listener.clone(),
                options,
                outer_html: self.inner.outer_html(),
                inline: false,
            });
        self.inner.add_event_listener(event, listener, options);
    }

    /// Forget `listener` for `event`. With `suppress`, only the bookkeeping is updated and
    /// the wrapped target keeps the listener.
    pub fn remove_event_listener(
        &mut self,
        event: &str,
        listener: &Listener,
        options: ListenerOptions,
        suppress: bool,
    ) {
        if let Some(records) = self.listeners.get_mut(event) {
            records.retain(|r| {
                !(Rc::ptr_eq(&r.listener, listener) && r.options.capture == options.capture)
            });
            if records.is_empty() {
                self.listeners.remove(event);
            }
        }
        if !suppress {
            self.inner.remove_event_listener(event, listener, options);
        }
    }

    pub fn on(&mut self, event: &str, listener: Listener, options: ListenerOptions) -> &mut Self {
        self.add_event_listener(event, listener, options);
        self
    }

    pub fn off(&mut self, event: &str, listener: &Listener, options: ListenerOptions) -> &mut Self {
        self.remove_event_listener(event, listener, options, false);
        self
    }

    /// Dispatch a custom event carrying `detail`.
    pub fn emit(&mut self, event: &str, detail: Option<Value>) -> &mut Self {
        self.inner.dispatch_event(&Event::custom(event, detail));
        self
    }

    /// Tracked listeners plus current inline handlers, for one event type or all of them.
    ///
    /// Inline handlers are looked up on every call and never stored.
    pub fn get_event_listeners(&self, event_type: Option<&str>) -> BTreeMap<String, Vec<ListenerRecord>> {
        let mut out: BTreeMap<String, Vec<ListenerRecord>> = self
            .listeners
            .iter()
            .filter(|(event, _)| event_type.is_none_or(|t| t == event.as_str()))
            .map(|(event, records)| (event.clone(), records.clone()))
            .collect();

        for event in INLINE_HANDLER_EVENTS {
            if event_type.is_some_and(|t| t != event) {
                continue;
            }
            if let Some(handler) = self.inner.inline_handler(event) {
                out.entry(event.to_string()).or_default().push(ListenerRecord {
                    listener: handler,
                    options: ListenerOptions::default(),
                    outer_html: None,
                    inline: true,
                });
            }
        }
        out
    }

    /// Per-event listener counts, one `"<event> ----------------> <n>"` line each.
    pub fn summary(&self) -> String {
        self.get_event_listeners(None)
            .iter()
            .map(|(event, records)| format!("{event} ----------------> {}\n", records.len()))
            .collect()
    }
}

/// Plain in-memory event target.
#[derive(Default)]
pub struct MemoryTarget {
    listeners: Vec<(String, Listener, ListenerOptions)>,
    inline: HashMap<String, Listener>,
    markup: Option<String>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markup(markup: &str) -> Self {
        Self {
            markup: Some(markup.to_string()),
            ..Self::default()
        }
    }

    /// Set the `on<event>` property; `event` is the bare type, e.g. `click`.
    pub fn set_inline_handler(&mut self, event: &str, handler: Option<Listener>) {
        match handler {
            Some(h) => {
                self.inline.insert(event.to_string(), h);
            }
            None => {
                self.inline.remove(event);
            }
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.iter().filter(|(e, _, _)| e == event).count()
    }
}

impl EventTarget for MemoryTarget {
    fn add_event_listener(&mut self, event: &str, listener: Listener, options: ListenerOptions) {
        let duplicate = self.listeners.iter().any(|(e, l, o)| {
            e == event && Rc::ptr_eq(l, &listener) && o.capture == options.capture
        });
        if !duplicate {
            self.listeners.push((event.to_string(), listener, options));
        }
    }

    fn remove_event_listener(&mut self, event: &str, listener: &Listener, options: ListenerOptions) {
        self.listeners.retain(|(e, l, o)| {
            !(e == event && Rc::ptr_eq(l, listener) && o.capture == options.capture)
        });
    }

    fn dispatch_event(&mut self, event: &Event) -> bool {
        let matching: Vec<(Listener, ListenerOptions)> = self
            .listeners
            .iter()
            .filter(|(e, _, _)| *e == event.event_type)
            .map(|(_, l, o)| (l.clone(), *o))
            .collect();
        let mut fired = false;

        for (listener, options) in matching {
            if options.once {
                self.remove_event_listener(&event.event_type, &listener, options);
            }
            listener(event);
            fired = true;
        }
        if let Some(handler) = self.inline.get(&event.event_type).cloned() {
            handler(event);
            fired = true;
        }
        fired
    }

    fn inline_handler(&self, event: &str) -> Option<Listener> {
        self.inline.get(event).cloned()
    }

    fn outer_html(&self) -> Option<String> {
        self.markup.clone()
    }
}
