//! Upsert and scoped MERGE statements.
//!
//! MySQL upserts with `INSERT ... ON DUPLICATE KEY UPDATE`. SQL Server uses
//! `MERGE`; the multi-row form also deletes target rows missing from the source,
//! limited to the rows matching an optional filter:
//!
//! ```text
//! WITH [target] AS (SELECT * FROM <table> WHERE <filter>)
//! MERGE [target] AS [t]
//! USING (VALUES (...), (...)) AS [s] (<columns>) ON ([t].[Id] = [s].[Id])
//! WHEN MATCHED THEN UPDATE SET ...
//! WHEN NOT MATCHED BY TARGET THEN INSERT (...) VALUES (...)
//! WHEN NOT MATCHED BY SOURCE THEN DELETE;
//! ```

use super::{SQL_TARGET, SqlBuilder, Statement};
use crate::dialect::UpsertStyle;
use crate::error::{SqlError, SqlResult};
use crate::metadata::{ColumnInfo, Entity};
use crate::params::ParamMap;
use crate::query::Criterion;

impl SqlBuilder<'_> {
    /// Insert-or-update one row.
    pub fn merge_one<E: Entity>(&self, entity: &E) -> SqlResult<Statement> {
        match self.dialect.upsert_style() {
            UpsertStyle::OnDuplicateKey => self.upsert_on_duplicate(std::slice::from_ref(entity)),
            UpsertStyle::Merge => self.merge_statement(std::slice::from_ref(entity), None, false),
        }
    }

    /// Insert-or-update many rows; on `MERGE` dialects also delete target rows
    /// within `filter` that are absent from `rows`.
    ///
    /// - No filter: the whole table is the scope (full synchronisation).
    /// - No rows with a filter: degrades to `DELETE ... WHERE <filter>`.
    /// - No rows without a filter: rejected.
    pub fn merge_many<E: Entity>(
        &self,
        rows: &[E],
        filter: Option<&Criterion>,
    ) -> SqlResult<Statement> {
        match self.dialect.upsert_style() {
            UpsertStyle::OnDuplicateKey => {
                if filter.is_some() {
                    return Err(SqlError::unsupported(
                        "merge_many",
                        format!(
                            "{} cannot restrict an upsert to a filtered scope",
                            self.dialect.name()
                        ),
                    ));
                }
                if rows.is_empty() {
                    return Err(SqlError::argument("merge_many requires at least one row"));
                }
                self.upsert_on_duplicate(rows)
            }
            UpsertStyle::Merge => match (rows.is_empty(), filter) {
                (true, Some(filter)) => {
                    let mut params = ParamMap::new();
                    let where_sql = self.where_clause(std::iter::once(filter), &mut params)?;
                    let sql = format!("DELETE FROM {}{where_sql}", self.table()?);
                    Ok(self.finish("merge", sql, params))
                }
                (true, None) => Err(SqlError::argument(
                    "merge_many with no rows requires a filter",
                )),
                (false, filter) => {
                    if filter.is_none() {
                        tracing::warn!(
                            target: SQL_TARGET,
                            entity = self.metadata.entity_name(),
                            rows = rows.len(),
                            "unfiltered merge synchronises the whole table and deletes rows absent from the source"
                        );
                    }
                    self.merge_statement(rows, filter, true)
                }
            },
        }
    }

    fn update_targets(&self) -> Vec<&ColumnInfo> {
        self.metadata
            .updateable_properties()
            .filter(|c| !c.primary_key)
            .collect()
    }

    /// `INSERT ... VALUES (...), (...) ON DUPLICATE KEY UPDATE c = VALUES(c), ...`
    fn upsert_on_duplicate<E: Entity>(&self, rows: &[E]) -> SqlResult<Statement> {
        let columns = self.insert_columns()?;
        let names = self.column_list(&columns)?;

        let updates = self
            .update_targets()
            .into_iter()
            .map(|c| {
                let quoted = self.column(c)?;
                Ok(format!("{quoted} = VALUES({quoted})"))
            })
            .collect::<SqlResult<Vec<_>>>()?;
        if updates.is_empty() {
            return Err(SqlError::argument(format!(
                "Entity '{}' has no updateable properties to upsert",
                self.metadata.entity_name()
            )));
        }

        let mut params = ParamMap::new();
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = self.value_of(row, column)?;
                values.push(self.bind_value(column, value, &mut params));
            }
            tuples.push(format!("({})", values.join(", ")));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {} ON DUPLICATE KEY UPDATE {}",
            self.table()?,
            names.join(", "),
            tuples.join(", "),
            updates.join(", ")
        );
        Ok(self.finish("merge", sql, params))
    }

    fn merge_statement<E: Entity>(
        &self,
        rows: &[E],
        filter: Option<&Criterion>,
        delete_missing: bool,
    ) -> SqlResult<Statement> {
        let pk = self.metadata.primary_key()?;
        let inserts = self.insert_columns()?;
        let updates = self.update_targets();

        // Source columns: the key first, then every insertable column.
        let mut source: Vec<&ColumnInfo> = vec![pk];
        source.extend(inserts.iter().copied().filter(|c| !c.primary_key));

        let t = self.quoted("t")?;
        let s = self.quoted("s")?;
        let pk_col = self.column(pk)?;

        let mut params = ParamMap::new();
        let mut sql = String::new();

        match filter {
            Some(filter) => {
                let where_sql = self.where_clause(std::iter::once(filter), &mut params)?;
                let target = self.quoted("target")?;
                sql.push_str(&format!(
                    "WITH {target} AS (SELECT * FROM {}{where_sql}) MERGE {target} AS {t}",
                    self.table()?
                ));
            }
            None => sql.push_str(&format!("MERGE {} AS {t}", self.table()?)),
        }

        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(source.len());
            for column in &source {
                let value = self.value_of(row, column)?;
                values.push(self.bind_value(column, value, &mut params));
            }
            tuples.push(format!("({})", values.join(", ")));
        }
        let source_names = self.column_list(&source)?;
        sql.push_str(&format!(
            " USING (VALUES {}) AS {s} ({}) ON ({t}.{pk_col} = {s}.{pk_col})",
            tuples.join(", "),
            source_names.join(", ")
        ));

        if !updates.is_empty() {
            let sets = updates
                .iter()
                .map(|c| {
                    let col = self.column(c)?;
                    Ok(format!("{t}.{col} = {s}.{col}"))
                })
                .collect::<SqlResult<Vec<_>>>()?;
            sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
            sql.push_str(&sets.join(", "));
        }

        let insert_names = self.column_list(&inserts)?;
        let insert_values: Vec<String> = insert_names.iter().map(|c| format!("{s}.{c}")).collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED BY TARGET THEN INSERT ({}) VALUES ({})",
            insert_names.join(", "),
            insert_values.join(", ")
        ));

        if delete_missing {
            sql.push_str(" WHEN NOT MATCHED BY SOURCE THEN DELETE");
        }
        sql.push(';');

        let touches = source.iter().any(|c| c.encrypted);
        let sql = self.wrap_encrypted(sql, touches);
        Ok(self.finish("merge", sql, params))
    }
}
