//! Ordered keyed storage and event fan-out.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::notify::{Listener, ListenerSet};
use crate::view::ViewCore;

/// The keyed store behind a container: name-ordered elements, the
/// container's own listeners, and the live views fanned out to on every
/// mutation.
///
/// Dispatch never holds the element-map borrow, so listeners are free to
/// re-enter the container (query it, or add to it) mid-event.
pub(crate) struct RegistryCore<T> {
    elements: RefCell<BTreeMap<String, T>>,
    listeners: ListenerSet<T>,
    /// Live views in creation order. Dead entries are pruned on dispatch.
    views: RefCell<Vec<Weak<ViewCore<T>>>>,
}

impl<T: Clone + 'static> RegistryCore<T> {
    pub(crate) fn new() -> Self {
        Self {
            elements: RefCell::new(BTreeMap::new()),
            listeners: ListenerSet::new(),
            views: RefCell::new(Vec::new()),
        }
    }

    /// Insert or replace. A replacement notifies `removed(old)` before the
    /// new element is stored, then `added(new)` after it is.
    pub(crate) fn insert(&self, name: String, element: T) {
        let old = self.elements.borrow_mut().remove(&name);
        if let Some(old) = old {
            debug!(name = %name, "replacing element");
            self.notify_removed(&old);
        } else {
            debug!(name = %name, "adding element");
        }

        let announced = element.clone();
        self.elements.borrow_mut().insert(name, element);
        self.notify_added(&announced);
    }

    /// Apply `f` to the stored element and hand back the updated value.
    ///
    /// The element is cloned out, mutated, and written back, so `f` runs
    /// with no map borrow held. No events fire.
    pub(crate) fn update(&self, name: &str, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut element = self.elements.borrow().get(name).cloned()?;
        f(&mut element);
        self.elements
            .borrow_mut()
            .insert(name.to_string(), element.clone());
        Some(element)
    }

    pub(crate) fn get(&self, name: &str) -> Option<T> {
        self.elements.borrow().get(name).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.elements.borrow().contains_key(name)
    }

    /// All elements, ascending by name.
    pub(crate) fn all(&self) -> Vec<T> {
        self.elements.borrow().values().cloned().collect()
    }

    pub(crate) fn as_map(&self) -> BTreeMap<String, T> {
        self.elements.borrow().clone()
    }

    /// (name, element) pairs, ascending by name.
    pub(crate) fn entries(&self) -> Vec<(String, T)> {
        self.elements
            .borrow()
            .iter()
            .map(|(name, element)| (name.clone(), element.clone()))
            .collect()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.elements.borrow().keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub(crate) fn on_added(&self, listener: Listener<T>) {
        self.listeners.on_added(listener);
    }

    pub(crate) fn on_removed(&self, listener: Listener<T>) {
        self.listeners.on_removed(listener);
    }

    /// Register a view for event fan-out. Views are held weakly: once every
    /// handle to a view is gone, its entry is dropped on the next dispatch.
    pub(crate) fn attach_view(&self, view: &Rc<ViewCore<T>>) {
        self.views.borrow_mut().push(Rc::downgrade(view));
    }

    /// Container listeners first, then each live view whose predicate
    /// matches, in view creation order.
    fn notify_added(&self, element: &T) {
        self.listeners.notify_added(element);
        for view in self.live_views() {
            if view.matches(element) {
                view.listeners().notify_added(element);
            }
        }
    }

    fn notify_removed(&self, element: &T) {
        self.listeners.notify_removed(element);
        for view in self.live_views() {
            if view.matches(element) {
                view.listeners().notify_removed(element);
            }
        }
    }

    /// Snapshot the live views and prune dead entries. The borrow ends
    /// before any listener runs, so views may be created mid-dispatch;
    /// they only see later events.
    fn live_views(&self) -> Vec<Rc<ViewCore<T>>> {
        let mut views = self.views.borrow_mut();
        views.retain(|view| view.strong_count() > 0);
        views.iter().filter_map(Weak::upgrade).collect()
    }
}
