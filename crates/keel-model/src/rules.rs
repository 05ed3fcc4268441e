//! Rule trait and the lazy-resolution engine.
//!
//! Rules give a container chain-of-responsibility behavior for names that
//! have no element yet: a lookup miss runs every registered rule once, in
//! registration order, and a rule may satisfy the lookup by adding the
//! element as a side effect (usually through a captured container handle).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::error::ModelError;

/// A named-element materialization rule.
pub trait Rule {
    /// Human-readable description of what this rule can materialize.
    ///
    /// For introspection and diagnostics only; the resolution engine never
    /// consults it.
    fn description(&self) -> String;

    /// Attempt to satisfy a lookup for `name`.
    ///
    /// Either adds a matching element to the owning container or does
    /// nothing. Called at most once per name per resolution pass.
    fn apply(&self, name: &str) -> Result<(), RuleError>;
}

/// Error returned by a failing [`Rule::apply`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuleError {
    message: String,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for RuleError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RuleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A rule built from a description and an infallible closure.
pub(crate) struct FnRule<F> {
    description: String,
    action: F,
}

impl<F: Fn(&str)> FnRule<F> {
    pub(crate) fn new(description: String, action: F) -> Self {
        Self {
            description,
            action,
        }
    }
}

impl<F: Fn(&str)> Rule for FnRule<F> {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn apply(&self, name: &str) -> Result<(), RuleError> {
        (self.action)(name);
        Ok(())
    }
}

/// Runs the registered rules for unresolved names, guarding against
/// reentrant resolution of the same name.
pub(crate) struct RuleEngine {
    rules: RefCell<Vec<Rc<dyn Rule>>>,
    /// Names with a pass currently in flight.
    resolving: RefCell<HashSet<String>>,
}

impl RuleEngine {
    pub(crate) fn new() -> Self {
        Self {
            rules: RefCell::new(Vec::new()),
            resolving: RefCell::new(HashSet::new()),
        }
    }

    pub(crate) fn add(&self, rule: Rc<dyn Rule>) {
        self.rules.borrow_mut().push(rule);
    }

    /// The registered rules, in registration order.
    pub(crate) fn rules(&self) -> Vec<Rc<dyn Rule>> {
        self.rules.borrow().clone()
    }

    /// Run one resolution pass for `name`.
    ///
    /// Every registered rule's `apply` runs once in registration order, even
    /// after one of them has already added the element. A pass already in
    /// flight for `name` (a rule looked the same name up again) returns
    /// immediately without invoking anything. A failing rule aborts the
    /// pass; the in-flight mark is released on every exit path.
    pub(crate) fn run(&self, name: &str) -> Result<(), ModelError> {
        if !self.resolving.borrow_mut().insert(name.to_string()) {
            return Ok(());
        }
        let _guard = InFlight {
            resolving: &self.resolving,
            name,
        };

        let pass: Vec<Rc<dyn Rule>> = self.rules.borrow().clone();
        if pass.is_empty() {
            return Ok(());
        }
        debug!(name, rules = pass.len(), "running resolution pass");
        for rule in pass {
            rule.apply(name).map_err(|e| ModelError::RuleFailed {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Removes the in-flight mark when the pass ends, whether it returned,
/// failed, or unwound.
struct InFlight<'a> {
    resolving: &'a RefCell<HashSet<String>>,
    name: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.resolving.borrow_mut().remove(self.name);
    }
}
