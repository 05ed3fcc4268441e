#![deny(unsafe_code)]

//! Manifest loading, validation, and model construction for Keel.
//!
//! Loads TOML model manifests and validates them against the expected
//! schema. Provides the [`ModelManifest`] type as the central manifest
//! structure, and the [`declared`] module for the element and rule types
//! a manifest builds into a container.

/// Declared elements and prefix rules built from manifests.
pub mod declared;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::declared::{DeclaredElement, PrefixRule};
use keel_model::NamedContainer;

/// Errors that can occur during manifest loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// A declarative model manifest.
///
/// ## TOML Example
///
/// ```toml
/// [model]
/// name = "widget"
///
/// [[element]]
/// name = "render"
/// kind = "task"
///
/// [element.properties]
/// threads = "4"
///
/// [[rule]]
/// prefix = "gen-"
/// kind = "generated"
/// description = "synthesize gen-* elements"
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    /// The model's identity.
    #[serde(default)]
    pub model: ModelSection,

    /// Elements registered up front.
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementDecl>,

    /// Rules that materialize elements lazily.
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDecl>,
}

/// The `[model]` section.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    /// Element type display name for the container (e.g. `"widget"` gives
    /// the error format `widget with name '..' not found.`).
    #[serde(default)]
    pub name: String,

    /// Optional free-form description.
    #[serde(default)]
    pub description: String,
}

/// A single `[[element]]` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDecl {
    /// Unique element name within the manifest.
    pub name: String,

    /// Free-form kind tag (e.g. "task", "toolchain").
    #[serde(default)]
    pub kind: String,

    /// Free-form string properties.
    #[serde(default)]
    pub properties: std::collections::BTreeMap<String, String>,
}

/// A single `[[rule]]` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDecl {
    /// Names starting with this prefix are materialized on first lookup.
    pub prefix: String,

    /// Kind tag for materialized elements.
    #[serde(default)]
    pub kind: String,

    /// Rule description for diagnostics. Defaults to a generated one.
    #[serde(default)]
    pub description: String,

    /// Properties for materialized elements.
    #[serde(default)]
    pub properties: std::collections::BTreeMap<String, String>,
}

impl ModelManifest {
    /// Load a manifest from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = tokio::fs::read_to_string(path).await?;
        let manifest: ModelManifest = toml::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ManifestError> {
        let manifest: ModelManifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.model.name.is_empty() {
            return Err(ManifestError::Validation(
                "model.name must not be empty".to_string(),
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for (i, decl) in self.elements.iter().enumerate() {
            if decl.name.is_empty() {
                return Err(ManifestError::Validation(format!(
                    "element[{i}].name must not be empty"
                )));
            }
            if !seen.insert(decl.name.as_str()) {
                return Err(ManifestError::Validation(format!(
                    "element[{i}].name {:?} is declared more than once",
                    decl.name
                )));
            }
        }

        for (i, decl) in self.rules.iter().enumerate() {
            if decl.prefix.is_empty() {
                return Err(ManifestError::Validation(format!(
                    "rule[{i}].prefix must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Build a [`NamedContainer`] from the manifest: declared elements are
    /// registered up front, and each `[[rule]]` becomes a [`PrefixRule`]
    /// on the container, in declaration order.
    pub fn build_container(&self) -> NamedContainer<DeclaredElement> {
        let container: NamedContainer<DeclaredElement> =
            NamedContainer::with_display_name(self.model.name.clone());

        for decl in &self.elements {
            container.add(
                decl.name.clone(),
                DeclaredElement {
                    kind: decl.kind.clone(),
                    properties: decl.properties.clone(),
                },
            );
        }

        for decl in &self.rules {
            let description = if decl.description.is_empty() {
                format!("materialize '{}*' elements", decl.prefix)
            } else {
                decl.description.clone()
            };
            let template = DeclaredElement {
                kind: decl.kind.clone(),
                properties: decl.properties.clone(),
            };
            container.add_rule(PrefixRule::new(
                &decl.prefix,
                &description,
                template,
                container.clone(),
            ));
        }

        container
    }
}
