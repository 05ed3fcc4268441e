//! The dynamic-access boundary: a container exposed to a configuration
//! script as a bag of named properties and single-argument configure
//! methods.
//!
//! Scripts reach elements only through this contract, so every access
//! path runs full rule resolution. Absence degrades to `false`/not-found;
//! a failing rule is a real error and propagates unchanged.

use std::collections::BTreeMap;
use std::fmt;

use crate::container::NamedContainer;
use crate::error::ModelError;

/// One argument of a dynamic method invocation.
pub enum CallArg<T> {
    /// A configuration block to apply to the resolved element.
    Configure(Box<dyn FnOnce(&mut T)>),

    /// Any other scripting value, carried opaquely.
    Value(String),
}

impl<T> CallArg<T> {
    /// A [`CallArg::Configure`] from a closure.
    pub fn configure(f: impl FnOnce(&mut T) + 'static) -> Self {
        CallArg::Configure(Box::new(f))
    }
}

impl<T> fmt::Debug for CallArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Configure(_) => f.write_str("Configure(..)"),
            CallArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Failures at the dynamic-access boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DynamicError {
    #[error("property '{name}' not found on {container}")]
    PropertyNotFound { container: String, name: String },

    #[error("method '{name}' not found for the supplied arguments")]
    MethodNotFound { name: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Property and method dispatch by name, as seen from a configuration
/// script.
///
/// `has_property` mirrors resolved lookup: it runs the rules on a miss
/// and reports whether an element exists afterwards. A method call is
/// recognized only as `name(configure_block)`; any other argument shape
/// is "method not found", checked before rules ever run.
pub trait DynamicAccess<T> {
    /// Whether `name` resolves to an element, rules included.
    fn has_property(&self, name: &str) -> Result<bool, DynamicError>;

    /// The element under `name`, or [`DynamicError::PropertyNotFound`].
    fn get_property(&self, name: &str) -> Result<T, DynamicError>;

    /// The current name-to-element mapping, keys ascending.
    fn properties(&self) -> BTreeMap<String, T>;

    /// Whether `invoke_method(name, args)` would dispatch: exactly one
    /// argument, a configure block, and `has_property(name)`.
    fn has_method(&self, name: &str, args: &[CallArg<T>]) -> Result<bool, DynamicError>;

    /// Resolve `name`, apply the single configure-block argument, and
    /// return the updated element. Anything else is
    /// [`DynamicError::MethodNotFound`].
    fn invoke_method(&self, name: &str, args: Vec<CallArg<T>>) -> Result<T, DynamicError>;
}

impl<T: Clone + 'static> DynamicAccess<T> for NamedContainer<T> {
    fn has_property(&self, name: &str) -> Result<bool, DynamicError> {
        Ok(self.find_by_name(name)?.is_some())
    }

    fn get_property(&self, name: &str) -> Result<T, DynamicError> {
        self.find_by_name(name)?
            .ok_or_else(|| DynamicError::PropertyNotFound {
                container: self.display_name(),
                name: name.to_string(),
            })
    }

    fn properties(&self) -> BTreeMap<String, T> {
        self.as_map()
    }

    fn has_method(&self, name: &str, args: &[CallArg<T>]) -> Result<bool, DynamicError> {
        match args {
            [CallArg::Configure(_)] => self.has_property(name),
            _ => Ok(false),
        }
    }

    fn invoke_method(&self, name: &str, mut args: Vec<CallArg<T>>) -> Result<T, DynamicError> {
        if !self.has_method(name, &args)? {
            return Err(DynamicError::MethodNotFound {
                name: name.to_string(),
            });
        }
        match args.pop() {
            Some(CallArg::Configure(configure)) => Ok(self.configure(name, configure)?),
            _ => Err(DynamicError::MethodNotFound {
                name: name.to_string(),
            }),
        }
    }
}
