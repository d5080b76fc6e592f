//! Entity derive macro implementation.

mod attrs;

use attrs::{field_attr, struct_attr};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let options = struct_attr(&input.attrs)?;
    let entity_name = name.to_string();
    let table_name = options.table.clone().unwrap_or_else(|| entity_name.clone());

    let mut columns = Vec::new();
    let mut value_arms = Vec::new();
    let mut has_encrypted = false;

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = field_attr(&field.attrs)?;
        if attr.skip {
            continue;
        }

        let property = field_ident.to_string();
        let property = property.strip_prefix("r#").unwrap_or(&property).to_string();
        let column = match (&attr.column, options.rename_all) {
            (Some(column), _) => column.clone(),
            (None, Some(rule)) => rule.apply(&property),
            (None, None) => property.clone(),
        };
        let column_type = column_type_tokens(&field.ty)?;

        let mut info = quote! {
            ::sqlweave::ColumnInfo::new(#property, #column_type).column_name(#column)
        };
        if let Some(display) = &attr.display {
            info = quote! { #info.display_name(#display) };
        }
        if attr.is_id {
            info = quote! { #info.primary_key() };
        }
        if attr.identity {
            info = quote! { #info.identity() };
        }
        if attr.required {
            info = quote! { #info.required() };
        }
        if attr.read_only {
            info = quote! { #info.read_only() };
        }
        if attr.encrypted {
            has_encrypted = true;
            info = quote! { #info.encrypted() };
        }
        columns.push(quote! { .column(#info) });

        value_arms.push(quote! {
            #property => ::core::option::Option::Some(
                ::sqlweave::Value::from(::core::clone::Clone::clone(&self.#field_ident))
            ),
        });
    }

    if columns.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Entity requires at least one mapped field",
        ));
    }

    let schema = options.schema.as_ref().map(|s| quote! { .schema(#s) });
    let database = options.database.as_ref().map(|d| quote! { .database(#d) });
    let encryption = match (&options.symmetric_key, &options.certificate) {
        (Some(key), Some(cert)) => Some(quote! { .encryption(#key, #cert) }),
        _ if has_encrypted => {
            return Err(syn::Error::new_spanned(
                &input,
                "encrypted fields require #[orm(symmetric_key = \"...\", certificate = \"...\")]",
            ));
        }
        _ => None,
    };

    Ok(quote! {
        impl ::sqlweave::Entity for #name {
            fn describe() -> ::sqlweave::EntityMetadata {
                ::sqlweave::EntityMetadata::new(#entity_name, #table_name)
                    #schema
                    #database
                    #encryption
                    #(#columns)*
            }

            fn value(&self, property: &str) -> ::core::option::Option<::sqlweave::Value> {
                match property {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        // Auto-register this entity via inventory
        ::sqlweave::inventory::submit! {
            ::sqlweave::EntityRegistration {
                name: #entity_name,
                describe: <#name as ::sqlweave::Entity>::describe,
            }
        }
    })
}

/// Map a field's Rust type to a `ColumnType`, looking through `Option`.
///
/// Unrecognised types map to `Text`. Integers wider than `i64` are rejected since
/// they have no lossless `Value` conversion.
fn column_type_tokens(ty: &syn::Type) -> Result<TokenStream> {
    let inner = option_inner(ty).unwrap_or(ty);
    let variant = match last_segment(inner) {
        Some(seg) => match seg.ident.to_string().as_str() {
            "bool" => quote! { Bool },
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => quote! { Int },
            "u64" | "usize" | "isize" | "i128" | "u128" => {
                return Err(syn::Error::new_spanned(
                    ty,
                    format!(
                        "`{}` cannot be mapped to a column; use i64 or a narrower integer",
                        seg.ident
                    ),
                ));
            }
            "f32" | "f64" => quote! { Float },
            "Decimal" => quote! { Decimal },
            "Uuid" => quote! { Uuid },
            "NaiveDate" => quote! { Date },
            "NaiveDateTime" => quote! { DateTime },
            "Value" => quote! { Json },
            "Vec" if is_byte_vec(seg) => quote! { Bytes },
            _ => quote! { Text },
        },
        None => quote! { Text },
    };
    Ok(quote! { ::sqlweave::ColumnType::#variant })
}

fn last_segment(ty: &syn::Type) -> Option<&syn::PathSegment> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    type_path.path.segments.last()
}

fn single_generic(seg: &syn::PathSegment) -> Option<&syn::Type> {
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let seg = last_segment(ty)?;
    if seg.ident != "Option" {
        return None;
    }
    single_generic(seg)
}

fn is_byte_vec(seg: &syn::PathSegment) -> bool {
    single_generic(seg)
        .and_then(last_segment)
        .is_some_and(|inner| inner.ident == "u8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn column_type(ty: syn::Type) -> String {
        column_type_tokens(&ty).unwrap().to_string()
    }

    #[test]
    fn test_column_type_inference() {
        assert!(column_type(parse_quote!(i32)).ends_with("Int"));
        assert!(column_type(parse_quote!(Option<f64>)).ends_with("Float"));
        assert!(column_type(parse_quote!(Vec<u8>)).ends_with("Bytes"));
        assert!(column_type(parse_quote!(Vec<String>)).ends_with("Text"));
        assert!(column_type(parse_quote!(chrono::NaiveDate)).ends_with("Date"));
        assert!(column_type(parse_quote!(Option<uuid::Uuid>)).ends_with("Uuid"));
    }

    #[test]
    fn test_wide_integers_are_rejected() {
        let types: [syn::Type; 3] = [
            parse_quote!(u64),
            parse_quote!(Option<usize>),
            parse_quote!(i128),
        ];
        for ty in types {
            let err = column_type_tokens(&ty).unwrap_err();
            assert!(err.to_string().contains("cannot be mapped to a column"));
        }
    }

    #[test]
    fn test_expand_reports_unsupported_field() {
        let input: DeriveInput = parse_quote! {
            struct Counter {
                #[orm(id)]
                id: i64,
                hits: u64,
            }
        };
        let err = expand(input).unwrap_err();
        assert!(err.to_string().contains("`u64` cannot be mapped"));
    }

    #[test]
    fn test_expand_generates_registration() {
        let input: DeriveInput = parse_quote! {
            #[orm(table = "Counter", rename_all = "PascalCase")]
            struct Counter {
                #[orm(id)]
                id: i64,
                hit_count: i32,
            }
        };
        let tokens = expand(input).unwrap().to_string();
        assert!(tokens.contains("\"HitCount\""));
        assert!(tokens.contains("EntityRegistration"));
    }
}
