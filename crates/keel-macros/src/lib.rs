#![deny(unsafe_code)]

//! Procedural macros for keel.
//!
//! This crate provides the derive macro used across the keel workspace:
//!
//! - `#[derive(Element)]`: implement `keel_model::Element` for a
//!   `Clone + 'static` type

extern crate proc_macro;

mod element;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for the `Element` storage capability.
///
/// Generates the `as_any` / `as_any_mut` / `clone_boxed` plumbing so the
/// type can live in heterogeneous `Box<dyn Element>` containers and be
/// carved out of them again through typed views. The type must implement
/// `Clone` and contain no borrowed data.
///
/// # Example
///
/// ```ignore
/// use keel_model::Element;
///
/// #[derive(Clone, Element)]
/// struct SourceSet {
///     pub root: String,
/// }
/// ```
#[proc_macro_derive(Element)]
pub fn derive_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    element::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
