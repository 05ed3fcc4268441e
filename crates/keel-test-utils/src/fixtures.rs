//! Element fixtures shared across workspace tests.
//!
//! Two small element types with distinct runtime types, for exercising
//! containers, typed views, and the derive in one place.

use keel_model::Element;

/// A concrete element with a label and a size.
#[derive(Debug, Clone, PartialEq, Eq, Element)]
pub struct Widget {
    pub label: String,
    pub size: u32,
}

impl Widget {
    pub fn new(label: &str, size: u32) -> Self {
        Self {
            label: label.to_string(),
            size,
        }
    }
}

/// A second element type, for heterogeneous containers.
#[derive(Debug, Clone, PartialEq, Eq, Element)]
pub struct Gizmo {
    pub spin: i8,
}

impl Gizmo {
    pub fn new(spin: i8) -> Self {
        Self { spin }
    }
}

/// Box an element for a `NamedContainer<Box<dyn Element>>`.
pub fn boxed(element: impl Element) -> Box<dyn Element> {
    Box::new(element)
}
