//! MySQL dialect.
//!
//! - Backtick identifier quoting
//! - `LIMIT n OFFSET m` pagination (no ORDER BY requirement)
//! - `INSERT ... ON DUPLICATE KEY UPDATE` upserts; inserts skip the primary key
//! - No column-level encryption: encrypted columns are read and written plainly

use super::{Dialect, UpsertStyle, helpers};

/// Largest row count MySQL accepts in `LIMIT`, used for offset-only paging.
const UNBOUNDED_LIMIT: u64 = u64::MAX;

/// MySQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn append_pagination(&self, sql: &mut String, skip: u64, take: Option<u64>) {
        let take = take.unwrap_or(UNBOUNDED_LIMIT);
        sql.push_str(&format!(" LIMIT {take} OFFSET {skip}"));
    }

    fn insert_excludes_primary_key(&self) -> bool {
        true
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::OnDuplicateKey
    }

    fn last_insert_id_sql(&self) -> &'static str {
        "SELECT LAST_INSERT_ID()"
    }

    fn max_parameters(&self) -> usize {
        65_535
    }
}
