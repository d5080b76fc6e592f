//! Dialect-aware statement builder.
//!
//! [`SqlBuilder`] composes compiler output into complete statements for one entity:
//! count, exists, select, aggregate, insert, update, delete, merge/upsert, truncate
//! and last-insert-id. Every value travels as a parameter; identifiers are validated
//! and quoted by the dialect.
//!
//! ## Design
//!
//! - One [`Statement`] per call: SQL text plus a fresh [`ParamMap`] (`@p1`, `@p2`, ...).
//! - Unfiltered UPDATE/DELETE and full-table MERGE are allowed but logged at `warn`.
//! - An update with nothing to change yields an empty statement, which callers
//!   treat as a no-op.

mod delete;
mod insert;
mod merge;
mod select;
mod update;

use crate::compiler::Compiler;
use crate::config::BuilderConfig;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use crate::metadata::{ColumnInfo, Entity, EntityMetadata};
use crate::params::ParamMap;
use crate::query::Criterion;
use crate::value::Value;

/// Tracing target for every event emitted while building statements.
pub const SQL_TARGET: &str = "sqlweave.sql";

/// A finished statement: SQL text and its parameter bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: ParamMap,
}

impl Statement {
    fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: ParamMap::new(),
        }
    }

    /// Nothing to execute (e.g. an update with no changed properties).
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Builds statements for one entity in one dialect.
///
/// # Example
/// ```ignore
/// use sqlweave::{metadata_for, MySql, Predicate, Query, SqlBuilder};
///
/// let meta = metadata_for::<Airport>();
/// let builder = SqlBuilder::new(&MySql, &meta);
/// let stmt = builder.select(&Query::new().filter(Predicate::equal_to("code", "LAX")))?;
/// assert_eq!(stmt.sql, "SELECT `Id`, `Code` FROM `dbo`.`Airport` WHERE (`Code` = @p1)");
/// ```
#[derive(Debug, Clone)]
pub struct SqlBuilder<'a> {
    dialect: &'a dyn Dialect,
    metadata: &'a EntityMetadata,
    config: BuilderConfig,
}

impl<'a> SqlBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, metadata: &'a EntityMetadata) -> Self {
        Self {
            dialect,
            metadata,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn metadata(&self) -> &'a EntityMetadata {
        self.metadata
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// `TRUNCATE TABLE <table>`. Run it inside a caller-owned transaction.
    pub fn truncate(&self) -> SqlResult<Statement> {
        let sql = format!("TRUNCATE TABLE {}", self.table()?);
        Ok(self.finish("truncate", sql, ParamMap::new()))
    }

    /// Statement returning the identity generated by the last insert.
    pub fn last_insert_id(&self) -> Statement {
        Statement::raw(self.dialect.last_insert_id_sql())
    }

    fn compiler(&self) -> Compiler<'a> {
        Compiler::new(self.dialect, self.metadata)
    }

    fn table(&self) -> SqlResult<String> {
        let ident = self.metadata.table_ident(&self.config.default_schema)?;
        Ok(ident.render(self.dialect))
    }

    fn column(&self, column: &ColumnInfo) -> SqlResult<String> {
        Ok(column.ident()?.render(self.dialect))
    }

    /// A single quoted name such as a MERGE alias.
    fn quoted(&self, name: &str) -> SqlResult<String> {
        Ok(Ident::quoted(name)?.render(self.dialect))
    }

    /// `(key, certificate)` when encrypted columns must be wrapped.
    fn encryption(&self) -> Option<(&'a str, &'a str)> {
        if self.dialect.supports_encryption() && self.metadata.has_encrypted_columns() {
            self.metadata.encryption_keys()
        } else {
            None
        }
    }

    /// Placeholder (or encrypting expression) for a value written to `column`.
    fn bind_value(&self, column: &ColumnInfo, value: Value, params: &mut ParamMap) -> String {
        let name = self.dialect.parameter_name(params.next_index());
        params.push(name.clone(), value);
        match self.encryption() {
            Some((key, _)) if column.encrypted => self.dialect.encrypt_value(key, &name),
            _ => name,
        }
    }

    fn value_of<E: Entity>(&self, entity: &E, column: &ColumnInfo) -> SqlResult<Value> {
        entity.value(&column.property_name).ok_or_else(|| {
            SqlError::argument(format!(
                "Entity '{}' does not expose a value for property '{}'",
                self.metadata.entity_name(),
                column.property_name
            ))
        })
    }

    /// ` WHERE a AND b`, or empty when there are no filters.
    fn where_clause<'c>(
        &self,
        filters: impl IntoIterator<Item = &'c Criterion>,
        params: &mut ParamMap,
    ) -> SqlResult<String> {
        let compiler = self.compiler();
        let parts = filters
            .into_iter()
            .map(|c| compiler.criterion_into(c, params))
            .collect::<SqlResult<Vec<_>>>()?;
        if parts.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" WHERE {}", parts.join(" AND ")))
        }
    }

    /// Open/close the symmetric key around statements touching encrypted columns.
    fn wrap_encrypted(&self, sql: String, touches_encrypted: bool) -> String {
        match self.encryption() {
            Some((key, cert)) if touches_encrypted => self.dialect.wrap_encryption(sql, key, cert),
            _ => sql,
        }
    }

    fn finish(&self, kind: &'static str, sql: String, params: ParamMap) -> Statement {
        if self.config.log_sql {
            tracing::debug!(
                target: SQL_TARGET,
                kind,
                entity = self.metadata.entity_name(),
                dialect = self.dialect.name(),
                params = params.len(),
                sql = %self.config.loggable(&sql),
                "built statement"
            );
        }
        Statement { sql, params }
    }

    fn warn_unfiltered(&self, kind: &'static str) {
        tracing::warn!(
            target: SQL_TARGET,
            kind,
            entity = self.metadata.entity_name(),
            "statement has no WHERE clause and affects every row"
        );
    }
}
