//! Error types shared across the container model.

/// Errors surfaced by container lookups and rule resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No element answered to the name, even after rules ran.
    ///
    /// The message text is stable; callers match on it.
    #[error("{type_display} with name '{name}' not found.")]
    UnknownElement {
        /// Display name of the container's element type.
        type_display: String,
        /// The name that failed to resolve.
        name: String,
    },

    /// A rule's `apply` failed while resolving a name.
    #[error("rule failed while resolving '{name}': {message}")]
    RuleFailed {
        /// The name whose resolution pass was aborted.
        name: String,
        /// The failing rule's error message.
        message: String,
    },
}

impl ModelError {
    pub(crate) fn unknown(type_display: &str, name: &str) -> Self {
        ModelError::UnknownElement {
            type_display: type_display.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_element_display() {
        let err = ModelError::unknown("Widget", "missing");
        assert_eq!(err.to_string(), "Widget with name 'missing' not found.");
    }

    #[test]
    fn test_rule_failed_display() {
        let err = ModelError::RuleFailed {
            name: "gen-a".to_string(),
            message: "backing store offline".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rule failed while resolving 'gen-a': backing store offline"
        );
    }
}
