//! Live views over a container: predicate-filtered and type-narrowed.
//!
//! A view stores no elements. Queries re-filter the backing container on
//! every call, and the container pushes add/remove events through each
//! view's predicate as they happen. Views register with the container in
//! creation order and are dropped from dispatch once released.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::container::ContainerState;
use crate::element::{simple_type_name, Element};
use crate::error::ModelError;
use crate::notify::ListenerSet;

pub(crate) type Predicate<T> = Rc<dyn Fn(&T) -> bool>;

/// The part of a view the container dispatches into: its predicate and
/// its own listener lists. Held weakly by the container.
pub(crate) struct ViewCore<T> {
    predicate: Predicate<T>,
    listeners: ListenerSet<T>,
}

impl<T> ViewCore<T> {
    fn new(predicate: Predicate<T>) -> Rc<Self> {
        Rc::new(Self {
            predicate,
            listeners: ListenerSet::new(),
        })
    }

    pub(crate) fn matches(&self, element: &T) -> bool {
        (self.predicate)(element)
    }

    pub(crate) fn listeners(&self) -> &ListenerSet<T> {
        &self.listeners
    }

    fn predicate(&self) -> Predicate<T> {
        Rc::clone(&self.predicate)
    }
}

/// A live, predicate-filtered view of a [`NamedContainer`].
///
/// The view reflects the container's current contents on every query and
/// forwards add/remove events for elements its predicate accepts. Chained
/// [`matching`](Self::matching) calls intersect predicates; every view in
/// a chain observes the backing container directly, so intermediate views
/// can be dropped freely.
///
/// [`NamedContainer`]: crate::container::NamedContainer
pub struct FilteredView<T> {
    state: Rc<ContainerState<T>>,
    core: Rc<ViewCore<T>>,
}

impl<T> Clone for FilteredView<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone + 'static> FilteredView<T> {
    pub(crate) fn over(state: Rc<ContainerState<T>>, predicate: Predicate<T>) -> Self {
        let core = ViewCore::new(predicate);
        state.registry.attach_view(&core);
        Self { state, core }
    }

    /// Matching elements, ascending by name.
    pub fn get_all(&self) -> Vec<T> {
        self.state
            .registry
            .all()
            .into_iter()
            .filter(|element| self.core.matches(element))
            .collect()
    }

    /// Names of matching elements, ascending.
    pub fn names(&self) -> Vec<String> {
        self.state
            .registry
            .entries()
            .into_iter()
            .filter(|(_, element)| self.core.matches(element))
            .map(|(name, _)| name)
            .collect()
    }

    /// Name-to-element snapshot of the matching subset.
    pub fn as_map(&self) -> BTreeMap<String, T> {
        self.state
            .registry
            .entries()
            .into_iter()
            .filter(|(_, element)| self.core.matches(element))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.get_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.get_all().into_iter()
    }

    /// One-shot filtered snapshot of the matching elements.
    pub fn find_all(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.get_all()
            .into_iter()
            .filter(|element| predicate(element))
            .collect()
    }

    /// Resolve `name` against the backing container (rules included), then
    /// apply this view's predicate. An element that exists but is filtered
    /// out resolves to `Ok(None)`.
    pub fn find_by_name(&self, name: &str) -> Result<Option<T>, ModelError> {
        match self.state.resolve(name)? {
            Some(element) if self.core.matches(&element) => Ok(Some(element)),
            _ => Ok(None),
        }
    }

    /// Like [`find_by_name`](Self::find_by_name), but absence (or a
    /// filtered-out element) is an error.
    pub fn get_by_name(&self, name: &str) -> Result<T, ModelError> {
        self.find_by_name(name)?
            .ok_or_else(|| ModelError::unknown(&self.state.type_display, name))
    }

    /// Invoke `listener` for each added element this view's predicate
    /// accepts, from now on.
    pub fn when_object_added(&self, listener: impl Fn(&T) + 'static) {
        self.core.listeners().on_added(Rc::new(listener));
    }

    /// Invoke `listener` for each displaced element this view's predicate
    /// accepts, from now on.
    pub fn when_object_removed(&self, listener: impl Fn(&T) + 'static) {
        self.core.listeners().on_removed(Rc::new(listener));
    }

    /// Replay the current matching elements (ascending by name), then
    /// follow future matching additions.
    pub fn all(&self, listener: impl Fn(&T) + 'static) {
        let listener: Rc<dyn Fn(&T)> = Rc::new(listener);
        for element in self.get_all() {
            listener(&element);
        }
        self.core.listeners().on_added(listener);
    }

    /// Narrow further: the new view matches elements accepted by both this
    /// view's predicate and `predicate`.
    pub fn matching(&self, predicate: impl Fn(&T) -> bool + 'static) -> FilteredView<T> {
        let parent = self.core.predicate();
        FilteredView::over(
            Rc::clone(&self.state),
            Rc::new(move |element: &T| parent(element) && predicate(element)),
        )
    }

    /// Narrow to elements whose runtime type is `S`, keeping this view's
    /// predicate.
    pub fn with_type<S>(&self) -> TypedView<T, S>
    where
        T: Element,
        S: Element + Clone,
    {
        TypedView::over(Rc::clone(&self.state), Some(self.core.predicate()))
    }
}

impl<T: Clone + 'static> IntoIterator for &FilteredView<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A live view of the elements whose runtime type is `S`.
///
/// Queries yield `S` directly, and by-name misses report `S`'s display
/// name rather than the container's. Type membership is an exact runtime
/// type check.
pub struct TypedView<T, S> {
    state: Rc<ContainerState<T>>,
    core: Rc<ViewCore<T>>,
    type_display: String,
    _element: PhantomData<fn() -> S>,
}

impl<T, S> Clone for TypedView<T, S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            core: Rc::clone(&self.core),
            type_display: self.type_display.clone(),
            _element: PhantomData,
        }
    }
}

impl<T, S> TypedView<T, S>
where
    T: Element + Clone + 'static,
    S: Element + Clone,
{
    pub(crate) fn over(state: Rc<ContainerState<T>>, inherited: Option<Predicate<T>>) -> Self {
        let predicate: Predicate<T> = match inherited {
            Some(parent) => {
                Rc::new(move |element: &T| element.as_any().is::<S>() && parent(element))
            }
            None => Rc::new(|element: &T| element.as_any().is::<S>()),
        };
        Self::from_predicate(state, predicate)
    }

    fn from_predicate(state: Rc<ContainerState<T>>, predicate: Predicate<T>) -> Self {
        let core = ViewCore::new(predicate);
        state.registry.attach_view(&core);
        Self {
            state,
            core,
            type_display: simple_type_name::<S>(),
            _element: PhantomData,
        }
    }

    fn narrow(element: &T) -> Option<S> {
        element.as_any().downcast_ref::<S>().cloned()
    }

    /// The display name used in this view's error messages: `S`'s simple
    /// type name.
    pub fn type_display_name(&self) -> &str {
        &self.type_display
    }

    /// Matching elements as `S`, ascending by name.
    pub fn get_all(&self) -> Vec<S> {
        self.state
            .registry
            .all()
            .into_iter()
            .filter(|element| self.core.matches(element))
            .filter_map(|element| Self::narrow(&element))
            .collect()
    }

    /// Names of matching elements, ascending.
    pub fn names(&self) -> Vec<String> {
        self.state
            .registry
            .entries()
            .into_iter()
            .filter(|(_, element)| self.core.matches(element))
            .map(|(name, _)| name)
            .collect()
    }

    /// Name-to-`S` snapshot of the matching subset.
    pub fn as_map(&self) -> BTreeMap<String, S> {
        self.state
            .registry
            .entries()
            .into_iter()
            .filter(|(_, element)| self.core.matches(element))
            .filter_map(|(name, element)| Self::narrow(&element).map(|narrowed| (name, narrowed)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.get_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::vec::IntoIter<S> {
        self.get_all().into_iter()
    }

    /// One-shot filtered snapshot of the matching elements, as `S`.
    pub fn find_all(&self, predicate: impl Fn(&S) -> bool) -> Vec<S> {
        self.get_all()
            .into_iter()
            .filter(|element| predicate(element))
            .collect()
    }

    /// Resolve `name` against the backing container (rules included). An
    /// element of a different runtime type resolves to `Ok(None)`.
    pub fn find_by_name(&self, name: &str) -> Result<Option<S>, ModelError> {
        match self.state.resolve(name)? {
            Some(element) if self.core.matches(&element) => Ok(Self::narrow(&element)),
            _ => Ok(None),
        }
    }

    /// Like [`find_by_name`](Self::find_by_name), but absence (or a
    /// wrong-typed element) is an error naming `S`.
    pub fn get_by_name(&self, name: &str) -> Result<S, ModelError> {
        self.find_by_name(name)?
            .ok_or_else(|| ModelError::unknown(&self.type_display, name))
    }

    /// Invoke `listener` for each added element of type `S` this view
    /// accepts, from now on.
    pub fn when_object_added(&self, listener: impl Fn(&S) + 'static) {
        self.core.listeners().on_added(Rc::new(move |element: &T| {
            if let Some(concrete) = element.as_any().downcast_ref::<S>() {
                listener(concrete);
            }
        }));
    }

    /// Invoke `listener` for each displaced element of type `S` this view
    /// accepts, from now on.
    pub fn when_object_removed(&self, listener: impl Fn(&S) + 'static) {
        self.core.listeners().on_removed(Rc::new(move |element: &T| {
            if let Some(concrete) = element.as_any().downcast_ref::<S>() {
                listener(concrete);
            }
        }));
    }

    /// Replay the current matching elements (ascending by name), then
    /// follow future matching additions.
    pub fn all(&self, listener: impl Fn(&S) + 'static) {
        let listener: Rc<dyn Fn(&S)> = Rc::new(listener);
        for element in self.get_all() {
            listener(&element);
        }
        let forward = Rc::clone(&listener);
        self.core.listeners().on_added(Rc::new(move |element: &T| {
            if let Some(concrete) = element.as_any().downcast_ref::<S>() {
                forward(concrete);
            }
        }));
    }

    /// Narrow further with a predicate over `S`.
    pub fn matching(&self, predicate: impl Fn(&S) -> bool + 'static) -> TypedView<T, S> {
        let parent = self.core.predicate();
        TypedView::from_predicate(
            Rc::clone(&self.state),
            Rc::new(move |element: &T| {
                parent(element)
                    && element
                        .as_any()
                        .downcast_ref::<S>()
                        .is_some_and(|concrete| predicate(concrete))
            }),
        )
    }
}

impl<T, S> IntoIterator for &TypedView<T, S>
where
    T: Element + Clone + 'static,
    S: Element + Clone,
{
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
