//! Convenient imports for typical `sqlweave` usage.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! ```

pub use crate::{
    AggregateQuery, BuilderConfig, CommandAssembler, Criterion, DbCommand, Entity, MySql,
    PreparedCommand, Predicate, Query, SqlBuilder, SqlError, SqlResult, SqlServer, Statement,
    Value, col, lit, metadata_for, validate,
};
