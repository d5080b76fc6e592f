//! UPDATE statements.

use super::{SqlBuilder, Statement};
use crate::error::SqlResult;
use crate::metadata::{ColumnInfo, Entity};
use crate::params::ParamMap;
use crate::predicate::Predicate;
use crate::query::{Criterion, Query};
use crate::value::Value;

impl SqlBuilder<'_> {
    /// SET only the properties whose value differs between `current` and `original`.
    ///
    /// Returns an empty [`Statement`] when nothing changed.
    pub fn update_changed<E: Entity>(
        &self,
        current: &E,
        original: &E,
        filter: Option<&Criterion>,
    ) -> SqlResult<Statement> {
        let changes = self.changed_values(current, original)?;
        if changes.is_empty() {
            return Ok(Statement::default());
        }
        self.build_update("update", changes, filter.into_iter())
    }

    /// Like [`update_changed`](Self::update_changed), keyed on the original's primary key.
    pub fn update_changed_by_key<E: Entity>(
        &self,
        current: &E,
        original: &E,
    ) -> SqlResult<Statement> {
        let changes = self.changed_values(current, original)?;
        if changes.is_empty() {
            return Ok(Statement::default());
        }
        let key = self.key_criterion(original)?;
        self.build_update("update", changes, std::iter::once(&key))
    }

    /// SET every updateable property, WHERE from the query.
    pub fn update_by_query<E: Entity>(&self, entity: &E, query: &Query) -> SqlResult<Statement> {
        let values = self
            .metadata
            .updateable_properties()
            .map(|c| Ok((c, self.value_of(entity, c)?)))
            .collect::<SqlResult<Vec<_>>>()?;
        self.build_update("update", values, query.filters().iter())
    }

    fn changed_values<'m, E: Entity>(
        &'m self,
        current: &E,
        original: &E,
    ) -> SqlResult<Vec<(&'m ColumnInfo, Value)>> {
        let mut changes = Vec::new();
        for column in self.metadata.updateable_properties() {
            let now = self.value_of(current, column)?;
            let before = self.value_of(original, column)?;
            if now != before {
                changes.push((column, now));
            }
        }
        Ok(changes)
    }

    pub(super) fn key_criterion<E: Entity>(&self, entity: &E) -> SqlResult<Criterion> {
        let pk = self.metadata.primary_key()?;
        let value = self.value_of(entity, pk)?;
        Ok(Predicate::equal_to(pk.property_name.clone(), value).into())
    }

    fn build_update<'c>(
        &self,
        kind: &'static str,
        values: Vec<(&ColumnInfo, Value)>,
        filters: impl Iterator<Item = &'c Criterion>,
    ) -> SqlResult<Statement> {
        let mut params = ParamMap::new();
        let mut sets = Vec::with_capacity(values.len());
        let mut touches = false;
        for (column, value) in values {
            touches |= column.encrypted;
            let quoted = self.column(column)?;
            let bound = self.bind_value(column, value, &mut params);
            sets.push(format!("{quoted} = {bound}"));
        }

        let where_sql = self.where_clause(filters, &mut params)?;
        if where_sql.is_empty() {
            self.warn_unfiltered(kind);
        }

        let sql = format!(
            "UPDATE {} SET {}{where_sql}",
            self.table()?,
            sets.join(", ")
        );
        let sql = self.wrap_encrypted(sql, touches);
        Ok(self.finish(kind, sql, params))
    }
}
