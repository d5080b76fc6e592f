//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Settings shared by [`SqlBuilder`](crate::SqlBuilder) and
/// [`CommandAssembler`](crate::CommandAssembler).
///
/// # Example
/// ```ignore
/// use sqlweave::BuilderConfig;
///
/// let config = BuilderConfig::new()
///     .with_default_schema("sales")
///     .with_max_logged_sql_length(None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Schema used when an entity declares none.
    pub default_schema: String,
    /// Overrides the dialect's parameter ceiling.
    pub max_parameters: Option<usize>,
    /// Emit a `debug!` event for every built statement.
    pub log_sql: bool,
    /// Truncate logged SQL (in bytes). `None` logs it in full.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_schema: "dbo".to_string(),
            max_parameters: None,
            log_sql: true,
            max_logged_sql_length: Some(200),
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn with_max_parameters(mut self, max: usize) -> Self {
        self.max_parameters = Some(max);
        self
    }

    pub fn with_log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn with_max_logged_sql_length(mut self, len: Option<usize>) -> Self {
        self.max_logged_sql_length = len;
        self
    }

    /// SQL as it should appear in log output.
    pub(crate) fn loggable<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.max_logged_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
