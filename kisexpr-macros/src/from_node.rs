use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, spanned::Spanned, DataStruct, DeriveInput, WherePredicate};

use crate::common::{inner_type, struct_fields, FieldKind};

pub fn derive_from_node_impl(derive_input: DeriveInput) -> syn::Result<TokenStream> {
    match &derive_input.data {
        syn::Data::Struct(data_struct) => derive_from_node_struct(&derive_input, data_struct),
        syn::Data::Enum(_) => Err(syn::Error::new(
            derive_input.span(),
            "Can not derive FromNode for enums.",
        )),
        syn::Data::Union(_) => Err(syn::Error::new(
            derive_input.span(),
            "Can not derive FromNode for unions.",
        )),
    }
}

fn derive_from_node_struct(
    derive_input: &DeriveInput,
    data_struct: &DataStruct,
) -> syn::Result<TokenStream> {
    let struct_ident = &derive_input.ident;
    let fields = struct_fields(data_struct, "FromNode")?;

    let mut code_fields = Vec::new();
    let mut constr_fields = Vec::new();
    let mut predicates: Vec<WherePredicate> = Vec::new();

    // Position of the next value field among the node's values.
    let mut value_index = 0usize;

    for field in &fields {
        let field_ident = field.ident;
        let field_name = &field.name;
        let ty = field.ty;
        let field_ident_var = format_ident!("var_{}", field_ident);

        match field.kind {
            FieldKind::Value => {
                predicates.push(parse_quote!(#ty: ::kisexpr::convert::FromValue));
                code_fields.push(quote! {
                    let #field_ident_var = <#ty as ::kisexpr::convert::FromValue>::from_value(node.value(#value_index))
                        .map_err(|err| ::kisexpr::convert::ConversionError::field(#field_name, err))?;
                });
                value_index += 1;
            }
            FieldKind::Child => {
                predicates.push(parse_quote!(#ty: ::kisexpr::convert::FromNode));
                code_fields.push(quote! {
                    let #field_ident_var = match node.child(#field_name) {
                        Some(child) => <#ty as ::kisexpr::convert::FromNode>::from_node(child)
                            .map_err(|err| ::kisexpr::convert::ConversionError::field(#field_name, err))?,
                        None => {
                            return Err(::kisexpr::convert::ConversionError::MissingChild(#field_name.into()));
                        }
                    };
                });
            }
            FieldKind::Optional => {
                if let Some(inner) = inner_type(ty) {
                    predicates.push(parse_quote!(#inner: ::kisexpr::convert::FromNode));
                }
                code_fields.push(quote! {
                    let #field_ident_var = node
                        .child(#field_name)
                        .map(|child| ::kisexpr::convert::FromNode::from_node(child))
                        .transpose()
                        .map_err(|err| ::kisexpr::convert::ConversionError::field(#field_name, err))?;
                });
            }
            FieldKind::Repeated => {
                if let Some(inner) = inner_type(ty) {
                    predicates.push(parse_quote!(#inner: ::kisexpr::convert::FromNode));
                }
                code_fields.push(quote! {
                    let #field_ident_var = node
                        .children_named(#field_name)
                        .map(|child| ::kisexpr::convert::FromNode::from_node(child))
                        .collect::<::std::result::Result<_, _>>()
                        .map_err(|err| ::kisexpr::convert::ConversionError::field(#field_name, err))?;
                });
            }
        }

        constr_fields.push(quote! {
            #field_ident: #field_ident_var
        });
    }

    // Bounds are only needed when field types may mention type parameters.
    let mut modified_generics = derive_input.generics.clone();
    if !derive_input.generics.params.is_empty() {
        modified_generics.make_where_clause().predicates.extend(predicates);
    }
    let (impl_generics, ty_generics, where_clause) = modified_generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::kisexpr::convert::FromNode for #struct_ident #ty_generics
        #where_clause {
            fn from_node(node: &::kisexpr::Node) -> ::std::result::Result<Self, ::kisexpr::convert::ConversionError> {
                #(#code_fields)*
                Ok(Self {
                    #(#constr_fields),*
                })
            }
        }
    })
}
