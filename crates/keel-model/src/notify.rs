//! Listener bookkeeping for add and remove events.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

/// A registered element callback.
pub(crate) type Listener<T> = Rc<dyn Fn(&T)>;

/// Ordered add/remove listener lists for one container or view.
///
/// Dispatch snapshots the list first, so a listener that registers further
/// listeners never sees them invoked for the event already in flight. No
/// list borrow is held while a listener runs.
pub(crate) struct ListenerSet<T> {
    added: RefCell<Vec<Listener<T>>>,
    removed: RefCell<Vec<Listener<T>>>,
}

impl<T> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            added: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn on_added(&self, listener: Listener<T>) {
        self.added.borrow_mut().push(listener);
    }

    pub(crate) fn on_removed(&self, listener: Listener<T>) {
        self.removed.borrow_mut().push(listener);
    }

    pub(crate) fn notify_added(&self, element: &T) {
        Self::dispatch(&self.added, element);
    }

    pub(crate) fn notify_removed(&self, element: &T) {
        Self::dispatch(&self.removed, element);
    }

    fn dispatch(list: &RefCell<Vec<Listener<T>>>, element: &T) {
        let snapshot: Vec<Listener<T>> = list.borrow().clone();
        if snapshot.is_empty() {
            return;
        }
        trace!(listeners = snapshot.len(), "dispatching element event");
        for listener in snapshot {
            listener(element);
        }
    }
}
