//! The container facade: named registration, rule-backed lookup, and
//! listener management.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::element::{simple_type_name, Element};
use crate::error::ModelError;
use crate::registry::RegistryCore;
use crate::rules::{FnRule, Rule, RuleEngine};
use crate::view::{FilteredView, TypedView};

/// Shared state behind a container and all of its views.
pub(crate) struct ContainerState<T> {
    pub(crate) type_display: String,
    pub(crate) registry: RegistryCore<T>,
    pub(crate) rules: RuleEngine,
}

impl<T: Clone + 'static> ContainerState<T> {
    /// Resolution shared by every by-name accessor: a miss runs one rule
    /// pass, then the registry is consulted again.
    pub(crate) fn resolve(&self, name: &str) -> Result<Option<T>, ModelError> {
        if let Some(element) = self.registry.get(name) {
            return Ok(Some(element));
        }
        self.rules.run(name)?;
        Ok(self.registry.get(name))
    }
}

/// A named, type-aware object container.
///
/// Elements live under unique names and iterate in ascending name order.
/// Lookups for absent names fall through to registered [`Rule`]s, which may
/// materialize the element on the spot. [`matching`](Self::matching) and
/// [`with_type`](Self::with_type) carve out live views that track the
/// container from then on.
///
/// A `NamedContainer` is a cheap handle on shared state: clones, rules, and
/// listeners all observe the same elements. It is single-threaded by
/// design (`!Send`); every notification completes before the mutating call
/// returns.
pub struct NamedContainer<T> {
    state: Rc<ContainerState<T>>,
}

impl<T> Clone for NamedContainer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> NamedContainer<T> {
    /// Create a container whose element display name is derived from `T`.
    pub fn new() -> Self {
        Self::with_display_name(simple_type_name::<T>())
    }

    /// Create a container with an explicit element display name.
    ///
    /// Useful for trait-object containers, where the derived name
    /// (`Box<dyn Element>`) reads poorly in messages.
    pub fn with_display_name(type_display: impl Into<String>) -> Self {
        Self {
            state: Rc::new(ContainerState {
                type_display: type_display.into(),
                registry: RegistryCore::new(),
                rules: RuleEngine::new(),
            }),
        }
    }

    /// The display name of the element type, fixed at construction.
    pub fn type_display_name(&self) -> &str {
        &self.state.type_display
    }

    /// `"<element type display name> container"`.
    pub fn display_name(&self) -> String {
        format!("{} container", self.state.type_display)
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Insert `element` under `name`, replacing any existing association.
    ///
    /// A replacement notifies removed-listeners with the old element before
    /// the new one is stored; added-listeners always hear about the new
    /// element afterwards.
    pub fn add(&self, name: impl Into<String>, element: T) {
        self.state.registry.insert(name.into(), element);
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All elements, ascending by name.
    pub fn get_all(&self) -> Vec<T> {
        self.state.registry.all()
    }

    /// Name-to-element snapshot, keys ascending.
    pub fn as_map(&self) -> BTreeMap<String, T> {
        self.state.registry.as_map()
    }

    /// All names, ascending.
    pub fn names(&self) -> Vec<String> {
        self.state.registry.names()
    }

    pub fn len(&self) -> usize {
        self.state.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot iterator, ascending by name. Each call starts a fresh
    /// snapshot; elements added after the call are not yielded.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.get_all().into_iter()
    }

    /// One-shot filtered snapshot. The live equivalent is
    /// [`matching`](Self::matching).
    pub fn find_all(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.get_all()
            .into_iter()
            .filter(|element| predicate(element))
            .collect()
    }

    // ── By-name resolution ───────────────────────────────────────────

    /// Look up `name`, running the rules once on a miss.
    ///
    /// `Ok(None)` means no element exists even after rules ran; `Err` only
    /// reports a failing rule.
    pub fn find_by_name(&self, name: &str) -> Result<Option<T>, ModelError> {
        self.state.resolve(name)
    }

    /// Like [`find_by_name`](Self::find_by_name), but absence is an error
    /// carrying the container's element display name.
    pub fn get_by_name(&self, name: &str) -> Result<T, ModelError> {
        self.state
            .resolve(name)?
            .ok_or_else(|| ModelError::unknown(&self.state.type_display, name))
    }

    /// Resolve `name` exactly as [`get_by_name`](Self::get_by_name) does,
    /// apply `f` to the stored element, and return the updated value.
    ///
    /// Configuration is not an add: no events fire.
    pub fn configure(&self, name: &str, f: impl FnOnce(&mut T)) -> Result<T, ModelError> {
        if !self.state.registry.contains(name) {
            self.state.rules.run(name)?;
        }
        self.state
            .registry
            .update(name, f)
            .ok_or_else(|| ModelError::unknown(&self.state.type_display, name))
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// Append a rule. Rules run in registration order on lookup misses.
    pub fn add_rule(&self, rule: impl Rule + 'static) {
        self.state.rules.add(Rc::new(rule));
    }

    /// Append a rule built from a description and a closure. The closure
    /// typically captures a clone of this container and adds to it.
    pub fn add_rule_fn(&self, description: impl Into<String>, action: impl Fn(&str) + 'static) {
        self.state
            .rules
            .add(Rc::new(FnRule::new(description.into(), action)));
    }

    /// The registered rules, in registration order.
    pub fn rules(&self) -> Vec<Rc<dyn Rule>> {
        self.state.rules.rules()
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Invoke `listener` for every element added from now on, including
    /// the new element of a replacement.
    pub fn when_object_added(&self, listener: impl Fn(&T) + 'static) {
        self.state.registry.on_added(Rc::new(listener));
    }

    /// Invoke `listener` for every element displaced by a replacement.
    pub fn when_object_removed(&self, listener: impl Fn(&T) + 'static) {
        self.state.registry.on_removed(Rc::new(listener));
    }

    /// Invoke `listener` once for every current element (ascending by
    /// name), then for every element added later: each past and future
    /// element exactly once.
    pub fn all(&self, listener: impl Fn(&T) + 'static) {
        let listener: Rc<dyn Fn(&T)> = Rc::new(listener);
        for element in self.get_all() {
            listener(&element);
        }
        self.state.registry.on_added(listener);
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Live view of the elements satisfying `predicate`. The view holds no
    /// copies; queries and events track this container from now on.
    pub fn matching(&self, predicate: impl Fn(&T) -> bool + 'static) -> FilteredView<T> {
        FilteredView::over(Rc::clone(&self.state), Rc::new(predicate))
    }

    /// Live view of the elements whose runtime type is `S`.
    pub fn with_type<S>(&self) -> TypedView<T, S>
    where
        T: Element,
        S: Element + Clone,
    {
        TypedView::over(Rc::clone(&self.state), None)
    }

    /// Shorthand for `with_type::<S>()` plus a forward add-listener. The
    /// listener only hears about elements added after this call; use
    /// [`TypedView::all`] to replay current elements too.
    pub fn with_type_added<S>(&self, listener: impl Fn(&S) + 'static) -> TypedView<T, S>
    where
        T: Element,
        S: Element + Clone,
    {
        let view = self.with_type::<S>();
        view.when_object_added(listener);
        view
    }
}

impl<T: Clone + 'static> Default for NamedContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> fmt::Display for NamedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl<T: Clone + 'static> IntoIterator for &NamedContainer<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Widget {
        size: u32,
    }

    fn widget(size: u32) -> Widget {
        Widget { size }
    }

    // ── Naming ───────────────────────────────────────────────────────

    #[test]
    fn test_display_name_derived_from_type() {
        let container: NamedContainer<Widget> = NamedContainer::new();
        assert_eq!(container.type_display_name(), "Widget");
        assert_eq!(container.display_name(), "Widget container");
        assert_eq!(container.to_string(), "Widget container");
    }

    #[test]
    fn test_display_name_override() {
        let container: NamedContainer<Widget> = NamedContainer::with_display_name("part");
        assert_eq!(container.type_display_name(), "part");
        assert_eq!(container.display_name(), "part container");
    }

    // ── Ordering and queries ─────────────────────────────────────────

    #[test]
    fn test_elements_iterate_ascending_by_name() {
        let container = NamedContainer::new();
        container.add("banana", widget(2));
        container.add("apple", widget(1));
        container.add("cherry", widget(3));

        assert_eq!(
            container.get_all(),
            vec![widget(1), widget(2), widget(3)]
        );
        assert_eq!(container.names(), vec!["apple", "banana", "cherry"]);
        assert_eq!(container.len(), 3);
        assert!(!container.is_empty());
    }

    #[test]
    fn test_as_map_reflects_associations() {
        let container = NamedContainer::new();
        container.add("b", widget(2));
        container.add("a", widget(1));

        let map = container.as_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&widget(1)));
        assert_eq!(map.get("b"), Some(&widget(2)));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_iteration_is_a_snapshot() {
        let container = NamedContainer::new();
        container.add("a", widget(1));

        let mut seen = Vec::new();
        for element in &container {
            // Adding mid-iteration must not extend the sequence.
            container.add("z", widget(26));
            seen.push(element);
        }

        assert_eq!(seen, vec![widget(1)]);
        assert_eq!(container.len(), 2);
        // A fresh iteration sees the addition.
        assert_eq!(container.iter().count(), 2);
    }

    #[test]
    fn test_find_all_snapshot_filter() {
        let container = NamedContainer::new();
        container.add("small", widget(1));
        container.add("big", widget(10));

        let big = container.find_all(|w| w.size > 5);
        assert_eq!(big, vec![widget(10)]);
    }

    // ── By-name resolution ───────────────────────────────────────────

    #[test]
    fn test_find_by_name_hit_and_miss() {
        let container = NamedContainer::new();
        container.add("present", widget(1));

        assert_eq!(container.find_by_name("present").unwrap(), Some(widget(1)));
        assert_eq!(container.find_by_name("absent").unwrap(), None);
    }

    #[test]
    fn test_get_by_name_missing_message() {
        let container: NamedContainer<Widget> = NamedContainer::new();
        let err = container.get_by_name("unknown").unwrap_err();
        assert_eq!(err.to_string(), "Widget with name 'unknown' not found.");
    }

    #[test]
    fn test_get_by_name_uses_display_name_override() {
        let container: NamedContainer<Widget> = NamedContainer::with_display_name("part");
        let err = container.get_by_name("unknown").unwrap_err();
        assert_eq!(err.to_string(), "part with name 'unknown' not found.");
    }

    #[test]
    fn test_configure_mutates_and_returns() {
        let container = NamedContainer::new();
        container.add("w", widget(1));

        let updated = container.configure("w", |w| w.size = 42).unwrap();
        assert_eq!(updated, widget(42));
        assert_eq!(container.get_by_name("w").unwrap(), widget(42));
    }

    #[test]
    fn test_configure_missing_fails_like_get() {
        let container: NamedContainer<Widget> = NamedContainer::new();
        let err = container.configure("nope", |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "Widget with name 'nope' not found.");
    }

    #[test]
    fn test_configure_fires_no_events() {
        let container = NamedContainer::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = Rc::clone(&log);
            container.when_object_added(move |w: &Widget| log.borrow_mut().push(w.clone()));
        }

        container.add("w", widget(1));
        container.configure("w", |w| w.size = 2).unwrap();

        assert_eq!(*log.borrow(), vec![widget(1)]);
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn test_rule_materializes_on_lookup() {
        let container = NamedContainer::new();
        let handle = container.clone();
        container.add_rule_fn("default widgets", move |name| {
            handle.add(name.to_string(), widget(0));
        });

        assert_eq!(container.find_by_name("lazy").unwrap(), Some(widget(0)));
        assert_eq!(container.get_by_name("lazy").unwrap(), widget(0));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_rules_only_run_on_miss() {
        let container = NamedContainer::new();
        let calls = Rc::new(RefCell::new(0));
        {
            let calls = Rc::clone(&calls);
            container.add_rule_fn("counter", move |_| *calls.borrow_mut() += 1);
        }

        container.add("present", widget(1));
        container.get_by_name("present").unwrap();
        assert_eq!(*calls.borrow(), 0);

        let _ = container.find_by_name("absent");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_every_rule_runs_even_after_a_hit() {
        let container = NamedContainer::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let handle = container.clone();
        let first_log = Rc::clone(&log);
        container.add_rule_fn("first", move |name| {
            first_log.borrow_mut().push("first");
            handle.add(name.to_string(), widget(1));
        });
        let second_log = Rc::clone(&log);
        container.add_rule_fn("second", move |_| {
            second_log.borrow_mut().push("second");
        });

        container.get_by_name("thing").unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_nested_lookups_do_not_rerun_inflight_rules() {
        // A rule that resolves other names (and re-resolves its own) while
        // applying: each externally queried name gets at most one apply per
        // rule.
        let container: NamedContainer<Widget> = NamedContainer::new();
        let applied = Rc::new(RefCell::new(Vec::new()));

        let handle = container.clone();
        let log = Rc::clone(&applied);
        container.add_rule_fn("nested", move |name| {
            log.borrow_mut().push(name.to_string());
            if name == "beta" {
                // Looking up an unrelated name applies the rules for it.
                let _ = handle.find_by_name("alpha");
                // Looking up the in-flight name again must be a no-op.
                let _ = handle.find_by_name("beta");
            }
            handle.add(name.to_string(), widget(0));
        });

        container.get_by_name("beta").unwrap();
        assert_eq!(*applied.borrow(), vec!["beta", "alpha"]);

        assert!(container.find_by_name("alpha").unwrap().is_some());
        assert!(container.find_by_name("beta").unwrap().is_some());
    }

    #[test]
    fn test_failing_rule_propagates_and_guard_clears() {
        struct Failing;

        impl Rule for Failing {
            fn description(&self) -> String {
                "fails".to_string()
            }

            fn apply(&self, _name: &str) -> Result<(), crate::rules::RuleError> {
                Err(crate::rules::RuleError::new("boom"))
            }
        }

        let container: NamedContainer<Widget> = NamedContainer::new();
        container.add_rule(Failing);

        let err = container.find_by_name("x").unwrap_err();
        assert_eq!(err.to_string(), "rule failed while resolving 'x': boom");

        // Guard released: the next lookup fails the same way instead of
        // silently returning None.
        assert!(container.get_by_name("x").is_err());
    }

    #[test]
    fn test_rules_introspection() {
        let container: NamedContainer<Widget> = NamedContainer::new();
        container.add_rule_fn("make defaults", |_| {});
        container.add_rule_fn("make generated", |_| {});

        let rules = container.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].description(), "make defaults");
        assert_eq!(rules[1].description(), "make generated");

        // Introspected rules can be applied directly.
        rules[0].apply("anything").unwrap();
    }

    // ── Listeners ────────────────────────────────────────────────────

    #[test]
    fn test_added_listeners_fire_in_order() {
        let container = NamedContainer::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["one", "two"] {
            let log = Rc::clone(&log);
            container.when_object_added(move |w: &Widget| {
                log.borrow_mut().push(format!("{tag}:{}", w.size));
            });
        }

        container.add("a", widget(1));
        container.add("b", widget(2));

        assert_eq!(
            *log.borrow(),
            vec!["one:1", "two:1", "one:2", "two:2"]
        );
    }

    #[test]
    fn test_replacement_fires_removed_then_added() {
        let container = NamedContainer::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let added = Rc::clone(&log);
        container.when_object_added(move |w: &Widget| {
            added.borrow_mut().push(format!("added:{}", w.size));
        });
        let removed = Rc::clone(&log);
        container.when_object_removed(move |w: &Widget| {
            removed.borrow_mut().push(format!("removed:{}", w.size));
        });

        container.add("x", widget(1));
        container.add("x", widget(2));

        assert_eq!(
            *log.borrow(),
            vec!["added:1", "removed:1", "added:2"]
        );
        assert_eq!(container.get_by_name("x").unwrap(), widget(2));
    }

    #[test]
    fn test_all_replays_then_follows() {
        let container = NamedContainer::new();
        container.add("b", widget(2));
        container.add("a", widget(1));

        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = Rc::clone(&log);
            container.all(move |w: &Widget| log.borrow_mut().push(w.size));
        }
        // Replay is ascending by name.
        assert_eq!(*log.borrow(), vec![1, 2]);

        container.add("c", widget(3));
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_listener_added_during_dispatch_misses_inflight_event() {
        let container: NamedContainer<Widget> = NamedContainer::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let handle = container.clone();
        let outer = Rc::clone(&log);
        container.when_object_added(move |w: &Widget| {
            outer.borrow_mut().push(format!("outer:{}", w.size));
            let inner = Rc::clone(&outer);
            handle.when_object_added(move |w: &Widget| {
                inner.borrow_mut().push(format!("inner:{}", w.size));
            });
        });

        container.add("a", widget(1));
        assert_eq!(*log.borrow(), vec!["outer:1"]);
    }
}
