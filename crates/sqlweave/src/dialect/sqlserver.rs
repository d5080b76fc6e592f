//! SQL Server dialect.
//!
//! - Square bracket identifier quoting (`[name]`, `]` doubled)
//! - `OFFSET m ROWS FETCH NEXT n ROWS ONLY` pagination, which requires ORDER BY
//! - `MERGE` for upserts and scoped synchronisation
//! - Symmetric-key column encryption (`ENCRYPTBYKEY` / `DECRYPTBYKEY`)

use super::{Dialect, UpsertStyle, helpers};
use crate::metadata::ColumnType;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl SqlServer {
    /// Target type a decrypted `VARBINARY` is converted back to.
    fn decrypted_type(ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Bool => "BIT",
            ColumnType::Int => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Decimal => "DECIMAL(38, 10)",
            ColumnType::Uuid => "UNIQUEIDENTIFIER",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME2",
            ColumnType::Bytes => "VARBINARY(MAX)",
            ColumnType::Text | ColumnType::Json => "NVARCHAR(MAX)",
        }
    }
}

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn append_pagination(&self, sql: &mut String, skip: u64, take: Option<u64>) {
        sql.push_str(&format!(" OFFSET {skip} ROWS"));
        if let Some(take) = take {
            sql.push_str(&format!(" FETCH NEXT {take} ROWS ONLY"));
        }
    }

    fn requires_order_for_paging(&self) -> bool {
        true
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::Merge
    }

    fn exists(&self, subquery: &str) -> String {
        format!("SELECT CASE WHEN EXISTS({subquery}) THEN 1 ELSE 0 END")
    }

    fn last_insert_id_sql(&self) -> &'static str {
        "SELECT SCOPE_IDENTITY()"
    }

    fn max_parameters(&self) -> usize {
        2_100
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn decrypt_column(&self, column: &str, ty: ColumnType) -> String {
        format!(
            "CONVERT({}, DECRYPTBYKEY({column})) AS {column}",
            Self::decrypted_type(ty)
        )
    }

    fn encrypt_value(&self, key: &str, placeholder: &str) -> String {
        format!(
            "ENCRYPTBYKEY(KEY_GUID('{}'), {placeholder})",
            key.replace('\'', "''")
        )
    }

    fn wrap_encryption(&self, sql: String, key: &str, certificate: &str) -> String {
        let key = self.quote_identifier(key);
        let certificate = self.quote_identifier(certificate);
        let sql = sql.trim_end_matches(';');
        format!(
            "OPEN SYMMETRIC KEY {key} DECRYPTION BY CERTIFICATE {certificate}; {sql}; CLOSE SYMMETRIC KEY {key};"
        )
    }
}
