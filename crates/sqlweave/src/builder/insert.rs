//! INSERT statements.

use super::{SqlBuilder, Statement};
use crate::error::{SqlError, SqlResult};
use crate::metadata::{ColumnInfo, Entity};
use crate::params::ParamMap;

impl SqlBuilder<'_> {
    /// `INSERT INTO <table> (<columns>) VALUES (<params>)`
    ///
    /// Identity and read-only properties are skipped; dialects that let the engine
    /// assign keys also skip the primary key.
    pub fn insert<E: Entity>(&self, entity: &E) -> SqlResult<Statement> {
        let columns = self.insert_columns()?;
        let names = self.column_list(&columns)?;

        let mut params = ParamMap::new();
        let mut values = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = self.value_of(entity, column)?;
            values.push(self.bind_value(column, value, &mut params));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table()?,
            names.join(", "),
            values.join(", ")
        );
        let touches = columns.iter().any(|c| c.encrypted);
        let sql = self.wrap_encrypted(sql, touches);
        Ok(self.finish("insert", sql, params))
    }

    pub(super) fn insert_columns(&self) -> SqlResult<Vec<&ColumnInfo>> {
        let columns: Vec<_> = self
            .metadata
            .insertable_properties(self.dialect.insert_excludes_primary_key())
            .collect();
        if columns.is_empty() {
            return Err(SqlError::argument(format!(
                "Entity '{}' has no insertable properties",
                self.metadata.entity_name()
            )));
        }
        Ok(columns)
    }

    pub(super) fn column_list(&self, columns: &[&ColumnInfo]) -> SqlResult<Vec<String>> {
        columns.iter().map(|c| self.column(c)).collect()
    }
}
