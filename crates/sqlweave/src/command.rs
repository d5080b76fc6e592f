//! Binding a [`Statement`] onto a provider command.
//!
//! The assembler is the only place a statement meets a driver. It checks the
//! engine's parameter ceiling before touching the command, then sets the text
//! and adds one parameter per map entry, turning [`Value::Null`] into the
//! provider's [`DbValue::DbNull`] sentinel.

use crate::builder::{SQL_TARGET, Statement};
use crate::config::BuilderConfig;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// A parameter value as a provider sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    DbNull,
    Value(Value),
}

impl From<Value> for DbValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DbValue::DbNull,
            other => DbValue::Value(other),
        }
    }
}

/// Minimal surface a provider command must offer.
pub trait DbCommand {
    fn set_text(&mut self, sql: &str);
    fn add_parameter(&mut self, name: &str, value: DbValue);
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    pub name: String,
    pub value: DbValue,
}

/// In-memory [`DbCommand`], handy for drivers that take text plus a parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedCommand {
    pub text: String,
    pub parameters: Vec<BoundParameter>,
}

impl DbCommand for PreparedCommand {
    fn set_text(&mut self, sql: &str) {
        self.text = sql.to_string();
    }

    fn add_parameter(&mut self, name: &str, value: DbValue) {
        self.parameters.push(BoundParameter {
            name: name.to_string(),
            value,
        });
    }
}

/// Binds statements onto commands under an engine parameter ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAssembler {
    max_parameters: usize,
}

impl CommandAssembler {
    /// Use the dialect's ceiling (SQL Server 2100, MySQL 65535).
    pub fn for_dialect(dialect: &dyn Dialect) -> Self {
        Self {
            max_parameters: dialect.max_parameters(),
        }
    }

    /// Dialect ceiling unless the config overrides it.
    pub fn from_config(dialect: &dyn Dialect, config: &BuilderConfig) -> Self {
        Self {
            max_parameters: config
                .max_parameters
                .unwrap_or_else(|| dialect.max_parameters()),
        }
    }

    pub fn with_max_parameters(mut self, max: usize) -> Self {
        self.max_parameters = max;
        self
    }

    pub fn max_parameters(&self) -> usize {
        self.max_parameters
    }

    /// Set text and parameters on `command`.
    ///
    /// Fails without modifying `command` when the statement is empty or has more
    /// parameters than the ceiling allows.
    pub fn assemble(&self, statement: &Statement, command: &mut impl DbCommand) -> SqlResult<()> {
        if statement.is_empty() {
            return Err(SqlError::argument(
                "Cannot assemble an empty statement; treat it as a no-op",
            ));
        }
        let count = statement.params.len();
        if count > self.max_parameters {
            return Err(SqlError::ParameterLimitExceeded {
                count,
                max: self.max_parameters,
            });
        }

        command.set_text(&statement.sql);
        for (name, value) in statement.params.iter() {
            tracing::trace!(target: SQL_TARGET, param = name, kind = value.kind(), "bind");
            command.add_parameter(name, DbValue::from(value.clone()));
        }
        Ok(())
    }

    /// Assemble into a fresh [`PreparedCommand`].
    pub fn prepare(&self, statement: &Statement) -> SqlResult<PreparedCommand> {
        let mut command = PreparedCommand::default();
        self.assemble(statement, &mut command)?;
        Ok(command)
    }
}
