//! Declared model elements and prefix rules.
//!
//! A manifest's `[[element]]` entries become [`DeclaredElement`]s registered
//! up front; its `[[rule]]` entries become [`PrefixRule`]s that materialize
//! elements the first time a matching name is looked up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use keel_model::{Element, NamedContainer, Rule, RuleError};

/// A model element produced from manifest data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Element)]
pub struct DeclaredElement {
    /// Free-form kind tag (e.g. "task", "toolchain").
    #[serde(default)]
    pub kind: String,

    /// Free-form string properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DeclaredElement {
    /// Create an element with the given kind and no properties.
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

/// A rule that materializes a declared element for any looked-up name
/// starting with a fixed prefix. Names without the prefix are ignored.
pub struct PrefixRule {
    prefix: String,
    description: String,
    template: DeclaredElement,
    container: NamedContainer<DeclaredElement>,
}

impl PrefixRule {
    pub fn new(
        prefix: &str,
        description: &str,
        template: DeclaredElement,
        container: NamedContainer<DeclaredElement>,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            description: description.to_string(),
            template,
            container,
        }
    }
}

impl Rule for PrefixRule {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn apply(&self, name: &str) -> Result<(), RuleError> {
        if name.starts_with(&self.prefix) {
            debug!(name, prefix = %self.prefix, "materializing declared element");
            self.container.add(name.to_string(), self.template.clone());
        }
        Ok(())
    }
}
