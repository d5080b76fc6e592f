//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{Attribute, Result};

/// Column naming applied to fields without an explicit `column`.
#[derive(Clone, Copy)]
pub(super) enum RenameRule {
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(lit: &syn::LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename_all rule `{other}`; expected PascalCase, camelCase, snake_case or SCREAMING_SNAKE_CASE"
                ),
            )),
        }
    }

    pub fn apply(self, field: &str) -> String {
        match self {
            Self::Pascal => field.to_upper_camel_case(),
            Self::Camel => field.to_lower_camel_case(),
            Self::Snake => field.to_snake_case(),
            Self::ScreamingSnake => field.to_shouty_snake_case(),
        }
    }
}

/// Struct-level `#[orm(...)]` options.
#[derive(Default)]
pub(super) struct StructAttr {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub database: Option<String>,
    pub symmetric_key: Option<syn::LitStr>,
    pub certificate: Option<syn::LitStr>,
    pub rename_all: Option<RenameRule>,
}

impl syn::parse::Parse for StructAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut out = StructAttr::default();

        loop {
            if input.is_empty() {
                break;
            }

            let key: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            if key == "table" {
                out.table = Some(value.value());
            } else if key == "schema" {
                out.schema = Some(value.value());
            } else if key == "database" {
                out.database = Some(value.value());
            } else if key == "symmetric_key" {
                out.symmetric_key = Some(value);
            } else if key == "certificate" {
                out.certificate = Some(value);
            } else if key == "rename_all" {
                out.rename_all = Some(RenameRule::parse(&value)?);
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown struct attribute `{key}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(out)
    }
}

/// Collect every struct-level `#[orm(...)]` into one [`StructAttr`].
pub(super) fn struct_attr(attrs: &[Attribute]) -> Result<StructAttr> {
    let mut out = StructAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let parsed: StructAttr = attr.parse_args()?;
        out.table = parsed.table.or(out.table);
        out.schema = parsed.schema.or(out.schema);
        out.database = parsed.database.or(out.database);
        out.symmetric_key = parsed.symmetric_key.or(out.symmetric_key);
        out.certificate = parsed.certificate.or(out.certificate);
        out.rename_all = parsed.rename_all.or(out.rename_all);
    }

    if out.symmetric_key.is_some() != out.certificate.is_some() {
        let span = out
            .symmetric_key
            .as_ref()
            .or(out.certificate.as_ref())
            .map(|lit| lit.span())
            .unwrap_or_else(proc_macro2::Span::call_site);
        return Err(syn::Error::new(
            span,
            "symmetric_key and certificate must be set together",
        ));
    }
    Ok(out)
}

/// Field-level `#[orm(...)]` options.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub display: Option<String>,
    pub is_id: bool,
    pub identity: bool,
    pub required: bool,
    pub read_only: bool,
    pub encrypted: bool,
    pub skip: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut out = FieldAttr::default();

        // Comma-separated flags or key = "value" pairs
        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            if input.peek(syn::Token![=]) {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                if ident == "column" {
                    out.column = Some(value.value());
                } else if ident == "display" {
                    out.display = Some(value.value());
                } else {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown field attribute `{ident}`"),
                    ));
                }
            } else if ident == "id" || ident == "primary_key" {
                out.is_id = true;
            } else if ident == "identity" {
                out.identity = true;
            } else if ident == "required" {
                out.required = true;
            } else if ident == "read_only" {
                out.read_only = true;
            } else if ident == "encrypted" {
                out.encrypted = true;
            } else if ident == "skip" {
                out.skip = true;
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown field flag `{ident}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(out)
    }
}

/// Merge every `#[orm(...)]` on a field.
pub(super) fn field_attr(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        out.column = parsed.column.or(out.column);
        out.display = parsed.display.or(out.display);
        out.is_id |= parsed.is_id;
        out.identity |= parsed.identity;
        out.required |= parsed.required;
        out.read_only |= parsed.read_only;
        out.encrypted |= parsed.encrypted;
        out.skip |= parsed.skip;
    }
    Ok(out)
}
