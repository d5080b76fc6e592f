//! Per-entity schema metadata.
//!
//! An [`EntityMetadata`] maps an entity's property names to column names, types and
//! flags. It is produced by [`Entity::describe`] (usually generated by
//! `#[derive(Entity)]`), built once per type and cached for the process lifetime by
//! [`metadata_for`].
//!
//! ```ignore
//! use sqlweave::{ColumnInfo, ColumnType, EntityMetadata};
//!
//! let meta = EntityMetadata::new("Airport", "Airport")
//!     .schema("dbo")
//!     .column(ColumnInfo::new("id", ColumnType::Int).column_name("Id").primary_key().identity())
//!     .column(ColumnInfo::new("code", ColumnType::Text).column_name("Code").required());
//! ```

use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Logical type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    DateTime,
    Json,
}

/// Mapping of one entity property to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub property_name: String,
    pub column_name: String,
    pub display_name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub identity: bool,
    pub required: bool,
    pub read_only: bool,
    pub encrypted: bool,
}

impl ColumnInfo {
    /// A plain column whose column and display names equal the property name.
    pub fn new(property_name: impl Into<String>, column_type: ColumnType) -> Self {
        let property_name = property_name.into();
        Self {
            column_name: property_name.clone(),
            display_name: property_name.clone(),
            property_name,
            column_type,
            primary_key: false,
            identity: false,
            required: false,
            read_only: false,
            encrypted: false,
        }
    }

    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = name.into();
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Engine-generated value; never inserted or updated.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Validated column identifier.
    pub fn ident(&self) -> SqlResult<Ident> {
        Ident::parse(&self.column_name)
    }

    /// Neither read-only nor identity.
    pub fn is_updateable(&self) -> bool {
        !self.read_only && !self.identity
    }
}

/// Static schema of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    entity_name: String,
    table: String,
    schema: Option<String>,
    database: Option<String>,
    symmetric_key: Option<String>,
    certificate: Option<String>,
    columns: Vec<ColumnInfo>,
}

impl EntityMetadata {
    pub fn new(entity_name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            table: table.into(),
            schema: None,
            database: None,
            symmetric_key: None,
            certificate: None,
            columns: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Symmetric key and certificate used for encrypted columns.
    pub fn encryption(mut self, key: impl Into<String>, certificate: impl Into<String>) -> Self {
        self.symmetric_key = Some(key.into());
        self.certificate = Some(certificate.into());
        self
    }

    pub fn column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column);
        self
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_for(&self, property: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.property_name == property)
    }

    /// Like [`column_for`](Self::column_for) but reports an unknown property.
    pub fn require_column(&self, property: &str) -> SqlResult<&ColumnInfo> {
        self.column_for(property).ok_or_else(|| {
            SqlError::argument(format!(
                "Entity '{}' has no mapped property '{property}'",
                self.entity_name
            ))
        })
    }

    /// Properties that are neither read-only nor identity.
    pub fn updateable_properties(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.is_updateable())
    }

    /// Properties written by INSERT.
    pub fn insertable_properties(
        &self,
        exclude_primary_key: bool,
    ) -> impl Iterator<Item = &ColumnInfo> {
        self.columns
            .iter()
            .filter(move |c| c.is_updateable() && !(exclude_primary_key && c.primary_key))
    }

    pub fn required_properties(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.required)
    }

    pub fn primary_key(&self) -> SqlResult<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .ok_or_else(|| SqlError::MissingPrimaryKey {
                entity: self.entity_name.clone(),
            })
    }

    pub fn has_encrypted_columns(&self) -> bool {
        self.columns.iter().any(|c| c.encrypted)
    }

    /// `(key, certificate)` when the entity declares column encryption.
    pub fn encryption_keys(&self) -> Option<(&str, &str)> {
        match (&self.symmetric_key, &self.certificate) {
            (Some(k), Some(c)) => Some((k, c)),
            _ => None,
        }
    }

    /// `[database.]schema.table`, falling back to `default_schema`.
    pub fn table_ident(&self, default_schema: &str) -> SqlResult<Ident> {
        let schema = self.schema.as_deref().unwrap_or(default_schema);
        let prefix = match &self.database {
            Some(db) => Ident::qualified(db, schema)?,
            None => Ident::parse(schema)?,
        };
        Ok(prefix.join(Ident::parse(&self.table)?))
    }
}

/// A type with a static schema.
///
/// Usually implemented with `#[derive(Entity)]`.
pub trait Entity: 'static {
    fn describe() -> EntityMetadata;

    /// Current value of a mapped property, `None` for unknown properties.
    fn value(&self, property: &str) -> Option<Value>;
}

type Registry = RwLock<HashMap<TypeId, Arc<EntityMetadata>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Cached metadata for `T`, built on first use.
pub fn metadata_for<T: Entity>() -> Arc<EntityMetadata> {
    let id = TypeId::of::<T>();
    if let Ok(map) = registry().read() {
        if let Some(meta) = map.get(&id) {
            return Arc::clone(meta);
        }
    }

    let built = Arc::new(T::describe());
    match registry().write() {
        Ok(mut map) => Arc::clone(map.entry(id).or_insert(built)),
        // A poisoned lock only means another thread panicked mid-insert; the
        // freshly built value is still correct.
        Err(_) => built,
    }
}

/// Registration entry submitted by `#[derive(Entity)]`.
pub struct EntityRegistration {
    pub name: &'static str,
    pub describe: fn() -> EntityMetadata,
}

inventory::collect!(EntityRegistration);

/// Every entity declared with `#[derive(Entity)]` in the final binary.
pub fn registered_entities() -> impl Iterator<Item = &'static EntityRegistration> {
    inventory::iter::<EntityRegistration>.into_iter()
}
