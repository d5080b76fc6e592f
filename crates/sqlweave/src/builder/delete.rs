//! DELETE statements.

use super::{SqlBuilder, Statement};
use crate::error::SqlResult;
use crate::metadata::Entity;
use crate::params::ParamMap;
use crate::query::Query;

impl SqlBuilder<'_> {
    /// `DELETE FROM <table><where>`
    pub fn delete(&self, query: &Query) -> SqlResult<Statement> {
        let mut params = ParamMap::new();
        let where_sql = self.where_clause(query.filters(), &mut params)?;
        if where_sql.is_empty() {
            self.warn_unfiltered("delete");
        }
        let sql = format!("DELETE FROM {}{where_sql}", self.table()?);
        Ok(self.finish("delete", sql, params))
    }

    /// Delete one row by its primary key.
    pub fn delete_by_key<E: Entity>(&self, entity: &E) -> SqlResult<Statement> {
        let key = self.key_criterion(entity)?;
        let mut params = ParamMap::new();
        let where_sql = self.where_clause(std::iter::once(&key), &mut params)?;
        let sql = format!("DELETE FROM {}{where_sql}", self.table()?);
        Ok(self.finish("delete", sql, params))
    }
}
