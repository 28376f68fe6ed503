use quote::ToTokens;
use syn::{Attribute, DataStruct, Field, GenericArgument, LitStr, PathArguments, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Value,
    Child,
    Optional,
    Repeated,
}

pub struct FieldData<'a> {
    pub ty: &'a Type,
    pub ident: &'a syn::Ident,
    pub kind: FieldKind,
    /// Token of the child node, or the field name for values.
    pub name: String,
}

/// Parse the `sexpr` attributes on a field.
pub fn parse_sexpr_attributes(field: &Field) -> syn::Result<(FieldKind, Option<String>)> {
    let mut kind = FieldKind::Value;
    let mut rename = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("sexpr") {
            continue;
        }

        parse_sexpr_attribute(attr, &mut kind, &mut rename)?;
    }

    Ok((kind, rename))
}

fn parse_sexpr_attribute(
    attr: &Attribute,
    kind: &mut FieldKind,
    rename: &mut Option<String>,
) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        let path = &meta.path;
        if path.is_ident("value") {
            *kind = FieldKind::Value;
            Ok(())
        } else if path.is_ident("child") {
            *kind = FieldKind::Child;
            Ok(())
        } else if path.is_ident("optional") {
            *kind = FieldKind::Optional;
            Ok(())
        } else if path.is_ident("repeated") {
            *kind = FieldKind::Repeated;
            Ok(())
        } else if path.is_ident("rename") {
            let value = meta.value()?;
            let name: LitStr = value.parse()?;
            *rename = Some(name.value());
            Ok(())
        } else {
            Err(meta.error("unrecognized sexpr attribute"))
        }
    })
}

/// Collect the fields of a struct.
///
/// Value fields must come before child fields, and an optional value field must
/// be the last value field: a `None` writes nothing, which would shift the
/// values after it.
pub fn struct_fields<'a>(
    data_struct: &'a DataStruct,
    trait_name: &str,
) -> syn::Result<Vec<FieldData<'a>>> {
    let mut fields = Vec::new();

    // Whether we have seen a child field so far.
    let mut seen_child = false;

    // Whether we have seen an optional value field so far.
    let mut seen_optional_value = false;

    for field in &data_struct.fields {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(
                field,
                format!("Fields must be named to derive {}.", trait_name),
            ));
        };

        let (kind, rename) = parse_sexpr_attributes(field)?;

        if kind == FieldKind::Value {
            if seen_child {
                return Err(syn::Error::new_spanned(
                    field,
                    "Value fields must come before child fields.",
                ));
            }

            if seen_optional_value {
                return Err(syn::Error::new_spanned(
                    field,
                    "Optional value fields must come after all other value fields.",
                ));
            }

            seen_optional_value = is_option(&field.ty);
        } else {
            seen_child = true;
        }

        let name = rename.unwrap_or_else(|| format!("{}", ident.to_token_stream()));
        let name = name.strip_prefix("r#").map(str::to_string).unwrap_or(name);

        fields.push(FieldData {
            ty: &field.ty,
            ident,
            kind,
            name,
        });
    }

    Ok(fields)
}

/// Whether `ty` is written as `Option<...>`.
pub fn is_option(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };

    type_path
        .path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Option")
}

/// The type argument of `Option<T>` or `Vec<T>`.
pub fn inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };

    let segment = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    arguments.args.iter().find_map(|argument| match argument {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use super::{struct_fields, FieldKind};
    use syn::{parse_quote, Data, DeriveInput};

    fn fields_of(input: DeriveInput) -> syn::Result<Vec<(String, FieldKind)>> {
        let Data::Struct(data_struct) = &input.data else {
            panic!("expected a struct");
        };
        let fields = struct_fields(data_struct, "FromNode")?;
        Ok(fields.into_iter().map(|field| (field.name, field.kind)).collect())
    }

    #[test]
    fn trailing_optional_value_is_accepted() {
        let input: DeriveInput = parse_quote! {
            struct Pad {
                kind: String,
                number: Option<String>,
                #[sexpr(optional)]
                at: Option<Position>,
            }
        };

        let fields = fields_of(input).unwrap();
        assert_eq!(
            fields,
            [
                ("kind".to_string(), FieldKind::Value),
                ("number".to_string(), FieldKind::Value),
                ("at".to_string(), FieldKind::Optional),
            ]
        );
    }

    #[test]
    fn value_after_optional_value_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Pad {
                number: Option<String>,
                kind: String,
            }
        };

        let err = fields_of(input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Optional value fields must come after all other value fields."
        );
    }

    #[test]
    fn value_after_child_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Pad {
                #[sexpr(child)]
                at: Position,
                kind: String,
            }
        };

        let err = fields_of(input).unwrap_err();
        assert_eq!(err.to_string(), "Value fields must come before child fields.");
    }
}
