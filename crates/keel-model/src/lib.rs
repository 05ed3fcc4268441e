#![deny(unsafe_code)]

//! keel-model — the named, type-aware object registry at the core of a
//! keel build model.
//!
//! Callers register elements under unique names, look them up directly or
//! through lazily-applied [`rules`], observe live filtered [`view`]s, and
//! hand the whole surface to a configuration-script layer through
//! [`DynamicAccess`].
//!
//! Iteration order is always ascending by name, never insertion order.
//! Everything here is single-threaded and synchronous: handles are cheap
//! `Rc` clones and listeners run to completion before the mutating call
//! returns.

/// Container facade over the keyed store, rules, and views.
pub mod container;
/// Property/method dispatch surface for script integration.
pub mod dynamic;
/// Element storage capability and type-name helpers.
pub mod element;
/// Shared error types.
pub mod error;
mod notify;
mod registry;
/// Rule trait and the lazy-resolution engine.
pub mod rules;
/// Live filtered and typed views.
pub mod view;

pub use container::NamedContainer;
pub use dynamic::{CallArg, DynamicAccess, DynamicError};
pub use element::Element;
pub use error::ModelError;
pub use keel_macros::Element;
pub use rules::{Rule, RuleError};
pub use view::{FilteredView, TypedView};
