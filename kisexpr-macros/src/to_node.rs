use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, spanned::Spanned, DataStruct, DeriveInput, WherePredicate};

use crate::common::{inner_type, struct_fields, FieldKind};

pub fn derive_to_node_impl(derive_input: DeriveInput) -> syn::Result<TokenStream> {
    match &derive_input.data {
        syn::Data::Struct(data_struct) => derive_to_node_struct(&derive_input, data_struct),
        syn::Data::Enum(_) => Err(syn::Error::new(
            derive_input.span(),
            "Can not derive ToNode for enums.",
        )),
        syn::Data::Union(_) => Err(syn::Error::new(
            derive_input.span(),
            "Can not derive ToNode for unions.",
        )),
    }
}

fn derive_to_node_struct(
    derive_input: &DeriveInput,
    data_struct: &DataStruct,
) -> syn::Result<TokenStream> {
    let struct_ident = &derive_input.ident;
    let fields = struct_fields(data_struct, "ToNode")?;

    let mut code_fields = Vec::new();
    let mut predicates: Vec<WherePredicate> = Vec::new();

    for field in &fields {
        let field_ident = field.ident;
        let field_name = &field.name;
        let ty = field.ty;

        match field.kind {
            FieldKind::Value => {
                predicates.push(parse_quote!(#ty: ::kisexpr::convert::ToValue));
                code_fields.push(quote! {
                    if let Some(value) = ::kisexpr::convert::ToValue::to_value(&self.#field_ident) {
                        node.add_value(value);
                    }
                });
            }
            FieldKind::Child => {
                predicates.push(parse_quote!(#ty: ::kisexpr::convert::ToNode));
                code_fields.push(quote! {
                    ::kisexpr::convert::ToNode::write_into(
                        &self.#field_ident,
                        node.add_child(::kisexpr::Node::new(#field_name)),
                    );
                });
            }
            FieldKind::Optional => {
                if let Some(inner) = inner_type(ty) {
                    predicates.push(parse_quote!(#inner: ::kisexpr::convert::ToNode));
                }
                code_fields.push(quote! {
                    if let Some(field_value) = &self.#field_ident {
                        ::kisexpr::convert::ToNode::write_into(
                            field_value,
                            node.add_child(::kisexpr::Node::new(#field_name)),
                        );
                    }
                });
            }
            FieldKind::Repeated => {
                if let Some(inner) = inner_type(ty) {
                    predicates.push(parse_quote!(#inner: ::kisexpr::convert::ToNode));
                }
                code_fields.push(quote! {
                    for field_value in self.#field_ident.iter() {
                        ::kisexpr::convert::ToNode::write_into(
                            field_value,
                            node.add_child(::kisexpr::Node::new(#field_name)),
                        );
                    }
                });
            }
        }
    }

    // Bounds are only needed when field types may mention type parameters.
    let mut modified_generics = derive_input.generics.clone();
    if !derive_input.generics.params.is_empty() {
        modified_generics.make_where_clause().predicates.extend(predicates);
    }
    let (impl_generics, ty_generics, where_clause) = modified_generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::kisexpr::convert::ToNode for #struct_ident #ty_generics
        #where_clause {
            fn write_into(&self, node: &mut ::kisexpr::Node) {
                #(#code_fields)*
            }
        }
    })
}
