//! Event recorders for container and view listener tests.
//!
//! An [`EventRecorder`] registers add/remove listeners and keeps every
//! dispatched event in order, so tests assert on one vector instead of
//! wiring `Rc<RefCell<Vec<..>>>` by hand each time.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use keel_model::element::Element;
use keel_model::{FilteredView, NamedContainer, TypedView};
use tracing::trace;

/// One recorded listener invocation, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded<T> {
    Added(T),
    Removed(T),
}

/// Records the add/remove events of a container or view.
///
/// A recorder can be attached to several sources; events interleave in
/// dispatch order.
pub struct EventRecorder<T> {
    events: Rc<RefCell<Vec<Recorded<T>>>>,
}

impl<T: Clone + Debug + 'static> EventRecorder<T> {
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register add/remove listeners on `container`.
    pub fn attach(&self, container: &NamedContainer<T>) {
        let events = Rc::clone(&self.events);
        container.when_object_added(move |element: &T| {
            trace!(?element, "recorded add");
            events.borrow_mut().push(Recorded::Added(element.clone()));
        });
        let events = Rc::clone(&self.events);
        container.when_object_removed(move |element: &T| {
            trace!(?element, "recorded removal");
            events.borrow_mut().push(Recorded::Removed(element.clone()));
        });
    }

    /// Register add/remove listeners on a filtered view.
    pub fn attach_view(&self, view: &FilteredView<T>) {
        let events = Rc::clone(&self.events);
        view.when_object_added(move |element: &T| {
            trace!(?element, "recorded view add");
            events.borrow_mut().push(Recorded::Added(element.clone()));
        });
        let events = Rc::clone(&self.events);
        view.when_object_removed(move |element: &T| {
            trace!(?element, "recorded view removal");
            events.borrow_mut().push(Recorded::Removed(element.clone()));
        });
    }

    /// Register add/remove listeners on a typed view whose element type is
    /// this recorder's `T`.
    pub fn attach_typed<B>(&self, view: &TypedView<B, T>)
    where
        B: Element + Clone + 'static,
        T: Element,
    {
        let events = Rc::clone(&self.events);
        view.when_object_added(move |element: &T| {
            trace!(?element, "recorded typed add");
            events.borrow_mut().push(Recorded::Added(element.clone()));
        });
        let events = Rc::clone(&self.events);
        view.when_object_removed(move |element: &T| {
            trace!(?element, "recorded typed removal");
            events.borrow_mut().push(Recorded::Removed(element.clone()));
        });
    }

    /// Everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<Recorded<T>> {
        self.events.borrow().clone()
    }

    /// Only the added elements, oldest first.
    pub fn added(&self) -> Vec<T> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::Added(element) => Some(element.clone()),
                Recorded::Removed(_) => None,
            })
            .collect()
    }

    /// Only the removed elements, oldest first.
    pub fn removed(&self) -> Vec<T> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Recorded::Removed(element) => Some(element.clone()),
                Recorded::Added(_) => None,
            })
            .collect()
    }

    /// Drain the recorded events, leaving the recorder empty.
    pub fn take(&self) -> Vec<Recorded<T>> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl<T: Clone + Debug + 'static> Default for EventRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
