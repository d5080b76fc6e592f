//! SQL dialect strategies.
//!
//! A [`Dialect`] owns every piece of engine-specific syntax the builder needs:
//!
//! - Identifier quoting: `` ` `` (MySQL), `[]` (SQL Server)
//! - Parameter naming: `@p1`, `@p2`, ...
//! - Pagination: `LIMIT n OFFSET m` vs `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
//! - Upsert style: `ON DUPLICATE KEY UPDATE` vs `MERGE`
//! - Column-level encryption wrapping (SQL Server symmetric keys)
//!
//! Statement templates never inline quote characters or paging keywords; they go
//! through [`Dialect::format_identifier`] and [`Dialect::append_pagination`].

mod mysql;
mod sqlserver;

pub use mysql::MySql;
pub use sqlserver::SqlServer;

use crate::ident::Ident;
use crate::metadata::ColumnType;

/// How a dialect expresses insert-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// `INSERT ... ON DUPLICATE KEY UPDATE c = VALUES(c)`
    OnDuplicateKey,
    /// `MERGE ... WHEN MATCHED ... WHEN NOT MATCHED ...`
    Merge,
}

/// Engine-specific SQL rendering rules.
pub trait Dialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote a single identifier part, escaping the closing quote character.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Render a validated (possibly dotted) identifier.
    fn format_identifier(&self, ident: &Ident) -> String {
        ident
            .parts()
            .iter()
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Placeholder name for the `n`-th (1-based) parameter of a statement.
    fn parameter_name(&self, n: usize) -> String {
        format!("@p{n}")
    }

    /// Append the paging clause (with a leading space).
    ///
    /// `take: None` means "no upper bound".
    fn append_pagination(&self, sql: &mut String, skip: u64, take: Option<u64>);

    /// Whether paging needs an ORDER BY to be deterministic (and legal).
    fn requires_order_for_paging(&self) -> bool {
        false
    }

    /// Whether INSERT omits the primary key column entirely.
    fn insert_excludes_primary_key(&self) -> bool {
        false
    }

    fn upsert_style(&self) -> UpsertStyle;

    /// Wrap a `SELECT 1 FROM ...` subquery into a single boolean-ish row.
    fn exists(&self, subquery: &str) -> String {
        format!("SELECT EXISTS({subquery})")
    }

    /// Statement that returns the identity generated by the last insert.
    fn last_insert_id_sql(&self) -> &'static str;

    /// Engine ceiling on bound parameters per command.
    fn max_parameters(&self) -> usize;

    /// Whether the engine supports symmetric-key column encryption.
    fn supports_encryption(&self) -> bool {
        false
    }

    /// Select-list expression for an encrypted column.
    fn decrypt_column(&self, column: &str, _ty: ColumnType) -> String {
        column.to_string()
    }

    /// Value expression for writing to an encrypted column.
    fn encrypt_value(&self, _key: &str, placeholder: &str) -> String {
        placeholder.to_string()
    }

    /// Surround a statement with key open/close commands.
    fn wrap_encryption(&self, sql: String, _key: &str, _certificate: &str) -> String {
        sql
    }
}

/// Shared quoting helpers.
pub mod helpers {
    /// Backtick quoting with `` ` `` doubled.
    pub fn quote_backtick(ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Bracket quoting with `]` doubled.
    pub fn quote_bracket(ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(d: &dyn Dialect, skip: u64, take: Option<u64>) -> String {
        let mut sql = String::from("SELECT 1");
        d.append_pagination(&mut sql, skip, take);
        sql
    }

    #[test]
    fn mysql_pagination() {
        assert_eq!(paged(&MySql, 20, Some(10)), "SELECT 1 LIMIT 10 OFFSET 20");
        assert_eq!(
            paged(&MySql, 5, None),
            "SELECT 1 LIMIT 18446744073709551615 OFFSET 5"
        );
    }

    #[test]
    fn sqlserver_pagination() {
        assert_eq!(
            paged(&SqlServer, 20, Some(10)),
            "SELECT 1 OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(paged(&SqlServer, 5, None), "SELECT 1 OFFSET 5 ROWS");
    }

    #[test]
    fn parameter_names_are_one_based() {
        assert_eq!(MySql.parameter_name(1), "@p1");
        assert_eq!(SqlServer.parameter_name(12), "@p12");
    }

    #[test]
    fn format_identifier_quotes_each_part() {
        let ident = Ident::parse("TestSchema.TestEntity").unwrap();
        assert_eq!(MySql.format_identifier(&ident), "`TestSchema`.`TestEntity`");
        assert_eq!(
            SqlServer.format_identifier(&ident),
            "[TestSchema].[TestEntity]"
        );
    }

    #[test]
    fn exists_forms() {
        assert_eq!(
            MySql.exists("SELECT 1 FROM `t`"),
            "SELECT EXISTS(SELECT 1 FROM `t`)"
        );
        assert_eq!(
            SqlServer.exists("SELECT 1 FROM [t]"),
            "SELECT CASE WHEN EXISTS(SELECT 1 FROM [t]) THEN 1 ELSE 0 END"
        );
    }

    #[test]
    fn engine_ceilings() {
        assert_eq!(SqlServer.max_parameters(), 2100);
        assert_eq!(MySql.max_parameters(), 65535);
    }
}
