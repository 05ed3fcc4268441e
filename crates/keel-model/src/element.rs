//! Element storage capability and display-name derivation.
//!
//! Containers only require `Clone + 'static` of their element type; the
//! [`Element`] trait comes into play when a container holds trait objects
//! or when callers carve out typed views with
//! [`NamedContainer::with_type`](crate::NamedContainer::with_type).
//! `#[derive(Element)]` from `keel-macros` generates the impl for any
//! `Clone + 'static` type.

use std::any::Any;
use std::fmt;

/// Runtime-typed storage capability for container elements.
pub trait Element: Any {
    /// The element as `&dyn Any`, for type tests and downcasts.
    fn as_any(&self) -> &dyn Any;

    /// Mutable access as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone into a fresh boxed trait object.
    fn clone_boxed(&self) -> Box<dyn Element>;
}

impl Clone for Box<dyn Element> {
    fn clone(&self) -> Self {
        self.as_ref().clone_boxed()
    }
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Element")
    }
}

/// Boxed elements see through the box: type tests and downcasts on a
/// `Box<dyn Element>` examine the inner concrete type, so a typed view over
/// a heterogeneous container matches what was stored, not the box.
impl Element for Box<dyn Element> {
    fn as_any(&self) -> &dyn Any {
        self.as_ref().as_any()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self.as_mut().as_any_mut()
    }

    fn clone_boxed(&self) -> Box<dyn Element> {
        self.as_ref().clone_boxed()
    }
}

/// The display name a container derives for its element type: the full
/// `type_name` with module paths stripped from every segment.
pub(crate) fn simple_type_name<T: ?Sized>() -> String {
    strip_paths(std::any::type_name::<T>())
}

fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            segment.push(ch);
        } else if ch == ':' {
            // Path separator: drop everything collected for this segment.
            segment.clear();
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(&segment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Toolchain {
        version: u32,
    }

    impl Element for Toolchain {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn clone_boxed(&self) -> Box<dyn Element> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_strip_paths_plain_type() {
        assert_eq!(strip_paths("keel_model::element::tests::Toolchain"), "Toolchain");
        assert_eq!(strip_paths("u32"), "u32");
    }

    #[test]
    fn test_strip_paths_generics() {
        assert_eq!(
            strip_paths("core::option::Option<alloc::string::String>"),
            "Option<String>"
        );
        assert_eq!(
            strip_paths("alloc::boxed::Box<dyn keel_model::element::Element>"),
            "Box<dyn Element>"
        );
    }

    #[test]
    fn test_strip_paths_tuples_and_refs() {
        assert_eq!(strip_paths("(u32, alloc::string::String)"), "(u32, String)");
        assert_eq!(strip_paths("&str"), "&str");
    }

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name::<Toolchain>(), "Toolchain");
        assert_eq!(simple_type_name::<Box<dyn Element>>(), "Box<dyn Element>");
    }

    #[test]
    fn test_boxed_element_sees_through() {
        let boxed: Box<dyn Element> = Box::new(Toolchain { version: 3 });

        assert!(boxed.as_any().is::<Toolchain>());
        let inner = boxed.as_any().downcast_ref::<Toolchain>().unwrap();
        assert_eq!(inner.version, 3);
    }

    #[test]
    fn test_boxed_element_clone() {
        let boxed: Box<dyn Element> = Box::new(Toolchain { version: 7 });
        let copy = boxed.clone();

        let original = boxed.as_any().downcast_ref::<Toolchain>().unwrap();
        let cloned = copy.as_any().downcast_ref::<Toolchain>().unwrap();
        assert_eq!(original, cloned);
    }

    #[test]
    fn test_as_any_mut_downcast() {
        let mut boxed: Box<dyn Element> = Box::new(Toolchain { version: 1 });

        let inner = boxed.as_any_mut().downcast_mut::<Toolchain>().unwrap();
        inner.version = 2;

        assert_eq!(
            boxed.as_any().downcast_ref::<Toolchain>().unwrap().version,
            2
        );
    }
}
