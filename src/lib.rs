use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
    pub once: bool,
}

impl ListenerOptions {
    // Bubble phase, not passive, not once.
    pub const DEFAULT: Self = Self {
        capture: false,
        passive: false,
        once: false,
    };
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// The legacy boolean third argument to addEventListener is the capture flag.
impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self {
            capture,
            ..Self::DEFAULT
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub time_stamp_ms: i64,
}

impl Event {
    pub fn new(event_type: &str, time_stamp_ms: i64) -> Self {
        Self {
            event_type: event_type.to_string(),
            time_stamp_ms,
        }
    }
}

#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new(callable: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(callable))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    // Listener identity is the callable, not its body: two closures with the
    // same code are distinct listeners, two clones of one Handler are the same.
    pub fn same_callable(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.same_callable(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

pub trait EventTarget {
    fn add_event_listener(&mut self, event: &str, handler: Handler, options: ListenerOptions);

    fn remove_event_listener(&mut self, event: &str, handler: &Handler, capture: bool) -> bool;
}

pub fn on<T: EventTarget>(
    target: Option<&mut T>,
    event: &str,
    handler: Option<Handler>,
    options: Option<ListenerOptions>,
) {
    let (Some(target), Some(handler)) = (target, handler) else {
        return;
    };
    if event.is_empty() {
        return;
    }
    target.add_event_listener(event, handler, options.unwrap_or(ListenerOptions::DEFAULT));
}

pub fn off<T: EventTarget>(
    target: Option<&mut T>,
    event: &str,
    handler: Option<&Handler>,
    capture: bool,
) {
    let (Some(target), Some(handler)) = (target, handler) else {
        return;
    };
    if event.is_empty() {
        return;
    }
    target.remove_event_listener(event, handler, capture);
}

#[derive(Debug, Clone)]
struct RegisteredListener {
    options: ListenerOptions,
    handler: Handler,
}

#[derive(Debug, Clone)]
pub struct ListenerSet {
    map: HashMap<String, Vec<RegisteredListener>>,
    created_at: Instant,
}

impl Default for ListenerSet {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            created_at: Instant::now(),
        }
    }
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, event: &str) -> usize {
        self.map.get(event).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn options_for(&self, event: &str, handler: &Handler) -> Option<ListenerOptions> {
        self.map
            .get(event)?
            .iter()
            .find(|listener| listener.handler == *handler)
            .map(|listener| listener.options)
    }

    pub fn dispatch(&mut self, event_type: &str) -> usize {
        let Some(listeners) = self.map.get(event_type) else {
            return 0;
        };
        let snapshot = listeners.clone();
        // Events are stamped with milliseconds since the target was created,
        // like a document-relative DOM timeStamp.
        let time_stamp_ms =
            i64::try_from(self.created_at.elapsed().as_millis()).unwrap_or(i64::MAX);
        let event = Event::new(event_type, time_stamp_ms);
        for listener in &snapshot {
            listener.handler.call(&event);
        }
        if let Some(listeners) = self.map.get_mut(event_type) {
            listeners.retain(|listener| !listener.options.once);
            if listeners.is_empty() {
                self.map.remove(event_type);
            }
        }
        snapshot.len()
    }
}

impl EventTarget for ListenerSet {
    fn add_event_listener(&mut self, event: &str, handler: Handler, options: ListenerOptions) {
        let listeners = self.map.entry(event.to_string()).or_default();

        // Match browser semantics: dedupe only when the same callable is
        // re-registered for the same type/capture pair.
        if listeners
            .iter()
            .any(|existing| existing.options.capture == options.capture && existing.handler == handler)
        {
            return;
        }

        listeners.push(RegisteredListener { options, handler });
    }

    fn remove_event_listener(&mut self, event: &str, handler: &Handler, capture: bool) -> bool {
        let Some(listeners) = self.map.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|listener| listener.options.capture == capture && listener.handler == *handler)
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                self.map.remove(event);
            }
            return true;
        }

        false
    }
}

pub trait UnitSource {
    fn next_unit(&mut self) -> f64;
}

const NONZERO_STATE_FALLBACK: u64 = 0xA5A5_A5A5_A5A5_A5A5;

#[derive(Debug, Clone)]
pub struct SeededUnitSource {
    state: u64,
}

impl SeededUnitSource {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                NONZERO_STATE_FALLBACK
            } else {
                seed
            },
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }
}

impl UnitSource for SeededUnitSource {
    fn next_unit(&mut self) -> f64 {
        // xorshift64*: simple deterministic PRNG for ephemeral ids.
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = if x == 0 { NONZERO_STATE_FALLBACK } else { x };
        let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        // Convert top 53 bits to [0.0, 1.0).
        let mantissa = out >> 11;
        (mantissa as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

impl UnitSource for rand::rngs::ThreadRng {
    fn next_unit(&mut self) -> f64 {
        rand::Rng::random(self)
    }
}

pub fn short_id_with(source: &mut impl UnitSource) -> String {
    let v = ((1.0 + source.next_unit()) * 65536.0).floor() as u32;
    // v >= 0x10000, so the hex form always has a leading digit to drop.
    let hex = format!("{v:x}");
    hex[1..].to_string()
}

pub fn short_id() -> String {
    short_id_with(&mut rand::rng())
}
