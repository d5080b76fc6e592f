//! Derive macros for sqlweave
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

/// Derive `Entity` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlweave::Entity;
///
/// #[derive(Entity)]
/// #[orm(table = "Airport", schema = "dbo", rename_all = "PascalCase")]
/// struct Airport {
///     #[orm(id, identity)]
///     id: i64,
///     #[orm(required, display = "Airport Code")]
///     code: String,
///     #[orm(column = "RunwayCount")]
///     runways: i32,
/// }
/// ```
///
/// # Struct attributes
///
/// - `table = "name"` - Table name (defaults to the struct name)
/// - `schema = "name"` / `database = "name"` - Qualifiers for the table
/// - `rename_all = "..."` - Column naming for fields without `column`:
///   `PascalCase`, `camelCase`, `snake_case` or `SCREAMING_SNAKE_CASE`
/// - `symmetric_key = "..."`, `certificate = "..."` - Key pair for encrypted columns
///
/// # Field attributes
///
/// - `column = "name"` - Column name
/// - `display = "text"` - Name used in validation messages
/// - `id` - Primary key
/// - `identity` - Engine-generated; never inserted or updated
/// - `required` - Must not be blank (see `sqlweave::validate`)
/// - `read_only` - Selected but never inserted or updated
/// - `encrypted` - Stored with the entity's symmetric key
/// - `skip` - Not mapped
///
/// Integer fields wider than `i64` (`u64`, `usize`, `i128`, ...) are rejected.
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
