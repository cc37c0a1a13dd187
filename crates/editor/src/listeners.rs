use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const UPDATE: &str = "update";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Handler<P> = Rc<dyn Fn(&P)>;

/// Event-keyed callback registry. Registration order is delivery order.
/// Triggering runs against a snapshot, so a handler may add or remove
/// listeners without affecting the cycle in flight; additions are first
/// delivered on the next trigger.
pub struct Listeners<P> {
    inner: RefCell<ListenerTable<P>>,
}

struct ListenerTable<P> {
    events: HashMap<String, Vec<(ListenerId, Handler<P>)>>,
    next_id: u64,
}

impl<P> Listeners<P> {
    pub fn new() -> Listeners<P> {
        Listeners {
            inner: RefCell::new(ListenerTable {
                events: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    pub fn add(&self, event: &str, handler: impl Fn(&P) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner
            .events
            .entry(event.to_string())
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    pub fn remove(&self, event: &str, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(handlers) = inner.events.get_mut(event) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .events
            .get(event)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    pub fn trigger(&self, event: &str, payload: &P) {
        let snapshot: Vec<Handler<P>> = {
            let inner = self.inner.borrow();
            inner
                .events
                .get(event)
                .map(|handlers| handlers.iter().map(|(_, h)| Rc::clone(h)).collect())
                .unwrap_or_default()
        };
        for handler in snapshot {
            (*handler)(payload);
        }
    }
}

impl<P> Default for Listeners<P> {
    fn default() -> Self {
        Listeners::new()
    }
}
