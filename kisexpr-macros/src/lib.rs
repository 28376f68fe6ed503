//! Procedural macros for converting between `kisexpr` trees and Rust structs.
//! See the `kisexpr::convert` module for the traits the derives implement.
use syn::{parse_macro_input, DeriveInput};

pub(crate) mod common;
mod from_node;
mod to_node;

/// Derive the `FromNode` trait.
#[proc_macro_derive(FromNode, attributes(sexpr))]
pub fn derive_from_node(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let derive_input = parse_macro_input!(input as DeriveInput);
    from_node::derive_from_node_impl(derive_input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive the `ToNode` trait.
#[proc_macro_derive(ToNode, attributes(sexpr))]
pub fn derive_to_node(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let derive_input = parse_macro_input!(input as DeriveInput);
    to_node::derive_to_node_impl(derive_input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
