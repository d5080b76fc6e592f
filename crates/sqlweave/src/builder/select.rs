//! COUNT / EXISTS / SELECT / aggregate statements.

use super::{SqlBuilder, Statement};
use crate::error::{SqlError, SqlResult};
use crate::params::ParamMap;
use crate::query::{AggregateQuery, Query};

impl SqlBuilder<'_> {
    /// `SELECT COUNT(*) FROM <table><where>`
    pub fn count(&self, query: &Query) -> SqlResult<Statement> {
        let mut params = ParamMap::new();
        let where_sql = self.where_clause(query.filters(), &mut params)?;
        let sql = format!("SELECT COUNT(*) FROM {}{where_sql}", self.table()?);
        Ok(self.finish("count", sql, params))
    }

    /// One row holding 1 when any row matches, 0 (or false) otherwise.
    pub fn exists(&self, query: &Query) -> SqlResult<Statement> {
        let mut params = ParamMap::new();
        let where_sql = self.where_clause(query.filters(), &mut params)?;
        let subquery = format!("SELECT 1 FROM {}{where_sql}", self.table()?);
        let sql = self.dialect.exists(&subquery);
        Ok(self.finish("exists", sql, params))
    }

    /// `SELECT <columns> FROM <table><where><order><paging>`
    ///
    /// Encrypted columns are decrypted in the select list when the dialect supports
    /// column encryption and the entity declares a key.
    pub fn select(&self, query: &Query) -> SqlResult<Statement> {
        if query.is_paged()
            && query.ordering().is_empty()
            && self.dialect.requires_order_for_paging()
        {
            return Err(SqlError::argument(format!(
                "Paging on {} requires at least one ORDER BY key",
                self.dialect.name()
            )));
        }

        let decrypt = self.encryption().is_some();
        let columns = self
            .metadata
            .columns()
            .iter()
            .map(|c| {
                let quoted = self.column(c)?;
                Ok(if decrypt && c.encrypted {
                    self.dialect.decrypt_column(&quoted, c.column_type)
                } else {
                    quoted
                })
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let mut params = ParamMap::new();
        let where_sql = self.where_clause(query.filters(), &mut params)?;

        let mut sql = format!(
            "SELECT {} FROM {}{where_sql}",
            columns.join(", "),
            self.table()?
        );

        if !query.ordering().is_empty() {
            let compiler = self.compiler();
            let keys = query
                .ordering()
                .iter()
                .map(|o| {
                    let key = compiler.expr_into(&o.key, &mut params)?;
                    Ok(if o.ascending { key } else { format!("{key} DESC") })
                })
                .collect::<SqlResult<Vec<_>>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        if query.is_paged() {
            self.dialect.append_pagination(
                &mut sql,
                query.skip_count().unwrap_or(0),
                query.take_count(),
            );
        }

        let sql = self.wrap_encrypted(sql, decrypt);
        Ok(self.finish("select", sql, params))
    }

    /// `SELECT <aggregates>[, <keys>] FROM <table><where>[ GROUP BY <keys>][ HAVING <c>]`
    ///
    /// The wrapped query contributes only its filters; ordering or paging on it is
    /// rejected.
    pub fn aggregate(&self, query: &AggregateQuery) -> SqlResult<Statement> {
        if query.aggregates().is_empty() && query.group_keys().is_empty() {
            return Err(SqlError::argument(
                "Aggregate query needs at least one aggregate or group key",
            ));
        }
        let base = query.query();
        if !base.ordering().is_empty() || base.is_paged() {
            return Err(SqlError::argument("Aggregate query cannot be ordered or paged"));
        }

        let compiler = self.compiler();
        let mut params = ParamMap::new();

        let mut projection = query
            .aggregates()
            .iter()
            .map(|a| {
                compiler.aggregate_into(a.function, a.target.as_ref(), &a.alias, &mut params)
            })
            .collect::<SqlResult<Vec<_>>>()?;

        // Each key is compiled once so the projection and GROUP BY stay identical.
        let keys = query
            .group_keys()
            .iter()
            .map(|k| compiler.key_into(k, &mut params))
            .collect::<SqlResult<Vec<_>>>()?;
        projection.extend(keys.iter().cloned());

        let where_sql = self.where_clause(base.filters(), &mut params)?;
        let mut sql = format!(
            "SELECT {} FROM {}{where_sql}",
            projection.join(", "),
            self.table()?
        );

        if !keys.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(having) = query.having_criterion() {
            sql.push_str(" HAVING ");
            sql.push_str(&compiler.criterion_into(having, &mut params)?);
        }

        Ok(self.finish("aggregate", sql, params))
    }
}
