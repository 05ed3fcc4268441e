//! Implementation of `#[derive(Element)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if let syn::Data::Union(_) = &input.data {
        return Err(syn::Error::new_spanned(
            name,
            "Element cannot be derived for unions",
        ));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::keel_model::element::Element for #name #ty_generics #where_clause {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn clone_boxed(&self) -> ::std::boxed::Box<dyn ::keel_model::element::Element> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }
        }
    })
}
