//! # sqlweave
//!
//! A predicate compiler and dialect-aware SQL builder for MySQL and SQL Server.
//!
//! ## Features
//!
//! - **Criteria as data**: filters are [`Predicate`] trees or typed [`Expr`]s, both serde-serializable
//! - **Parameterized only**: every value becomes `@p1`, `@p2`, ...; nothing is spliced into SQL
//! - **Two dialects**: backtick/`LIMIT`/`ON DUPLICATE KEY` ([`MySql`]) and bracket/`OFFSET FETCH`/`MERGE` ([`SqlServer`])
//! - **Static schemas**: `#[derive(Entity)]` describes the column mapping once; it is cached per type
//! - **Scoped merge**: synchronise a subset of a table, deleting only rows inside the scope
//!
//! ## Example
//!
//! ```ignore
//! use sqlweave::prelude::*;
//!
//! #[derive(Entity)]
//! #[orm(table = "Airport", schema = "dbo", rename_all = "PascalCase")]
//! struct Airport {
//!     #[orm(id, identity)]
//!     id: i64,
//!     #[orm(required, display = "Airport Code")]
//!     code: String,
//!     runways: i32,
//! }
//!
//! let meta = metadata_for::<Airport>();
//! let builder = SqlBuilder::new(&SqlServer, &meta);
//!
//! let stmt = builder.select(
//!     &Query::new()
//!         .filter(Predicate::equal_to("code", "LAX") | Predicate::equal_to("code", "AUS"))
//!         .filter(col("runways").gt(2))
//!         .order_by("code")
//!         .page(1, 20)?,
//! )?;
//! // SELECT [Id], [Code], [Runways] FROM [dbo].[Airport]
//! //   WHERE (([Code] = @p1) OR ([Code] = @p2)) AND ([Runways] > @p3)
//! //   ORDER BY [Code] OFFSET 0 ROWS FETCH NEXT 20 ROWS ONLY
//!
//! let mut command = PreparedCommand::default();
//! CommandAssembler::for_dialect(&SqlServer).assemble(&stmt, &mut command)?;
//! ```

pub mod builder;
pub mod command;
pub mod compiler;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod ident;
pub mod metadata;
pub mod params;
pub mod predicate;
pub mod prelude;
pub mod query;
pub mod validate;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{SQL_TARGET, SqlBuilder, Statement};
pub use command::{BoundParameter, CommandAssembler, DbCommand, DbValue, PreparedCommand};
pub use compiler::{Compiled, Compiler};
pub use config::BuilderConfig;
pub use dialect::{Dialect, MySql, SqlServer, UpsertStyle};
pub use error::{SqlError, SqlResult};
pub use expr::{BinaryOp, Expr, Function, PropertySource, col, lit};
pub use ident::Ident;
pub use metadata::{
    ColumnInfo, ColumnType, Entity, EntityMetadata, EntityRegistration, metadata_for,
    registered_entities,
};
pub use params::ParamMap;
pub use predicate::{Comparison, ComparisonValue, Operator, Predicate};
pub use query::{Aggregate, AggregateFunction, AggregateQuery, Criterion, OrderBy, Query};
pub use validate::validate;
pub use value::Value;

// Re-export inventory for use by derive macros
pub use inventory;

#[cfg(feature = "derive")]
pub use sqlweave_derive::Entity;
