//! Query criteria: filters, ordering, paging and aggregates.

use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, col};
use crate::predicate::Predicate;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One filter root: a predicate tree or a typed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    Predicate(Predicate),
    Expr(Expr),
}

impl From<Predicate> for Criterion {
    fn from(p: Predicate) -> Self {
        Criterion::Predicate(p)
    }
}

impl From<Expr> for Criterion {
    fn from(e: Expr) -> Self {
        Criterion::Expr(e)
    }
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: Expr,
    pub ascending: bool,
}

/// Filters (AND-ed), ordering and optional paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    filters: Vec<Criterion>,
    order: Vec<OrderBy>,
    skip: Option<u64>,
    take: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter root; roots are joined with AND.
    pub fn filter(mut self, criterion: impl Into<Criterion>) -> Self {
        self.filters.push(criterion.into());
        self
    }

    pub fn where_between(
        self,
        property: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.filter(Predicate::between(property, low, high))
    }

    pub fn where_in<V: Into<Value>>(
        self,
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filter(Predicate::in_list(property, values))
    }

    pub fn where_is_null(self, property: impl Into<String>) -> Self {
        self.filter(Predicate::is_null(property))
    }

    pub fn where_is_not_null(self, property: impl Into<String>) -> Self {
        self.filter(Predicate::is_not_null(property))
    }

    pub fn order_by(self, property: impl Into<String>) -> Self {
        self.order_by_expr(col(property), true)
    }

    pub fn order_by_desc(self, property: impl Into<String>) -> Self {
        self.order_by_expr(col(property), false)
    }

    pub fn order_by_expr(mut self, key: Expr, ascending: bool) -> Self {
        self.order.push(OrderBy { key, ascending });
        self
    }

    /// Append ordering from a sort expression such as `"Name, Code DESC"`.
    ///
    /// Each comma-separated field is `property [ASC|DESC]` (case-insensitive).
    pub fn sort(mut self, expression: &str) -> SqlResult<Self> {
        for field in expression.split(',') {
            let mut words = field.split_whitespace();
            let Some(property) = words.next() else {
                continue;
            };
            let ascending = match words.next() {
                None => true,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => true,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => false,
                Some(dir) => {
                    return Err(SqlError::argument(format!(
                        "Invalid sort direction '{dir}' for '{property}'"
                    )));
                }
            };
            if let Some(extra) = words.next() {
                return Err(SqlError::argument(format!(
                    "Unexpected '{extra}' in sort field '{}'",
                    field.trim()
                )));
            }
            self.order.push(OrderBy {
                key: col(property),
                ascending,
            });
        }
        Ok(self)
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: u64) -> Self {
        self.take = Some(n);
        self
    }

    /// 1-based page of `page_size` rows.
    pub fn page(self, page: u64, page_size: u64) -> SqlResult<Self> {
        if page == 0 || page_size == 0 {
            return Err(SqlError::argument(format!(
                "Page and page size must be positive, got page {page} of size {page_size}"
            )));
        }
        let skip = (page - 1).checked_mul(page_size).ok_or_else(|| {
            SqlError::argument(format!(
                "Page {page} of size {page_size} overflows the row offset"
            ))
        })?;
        Ok(self.skip(skip).take(page_size))
    }

    pub fn filters(&self) -> &[Criterion] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn take_count(&self) -> Option<u64> {
        self.take
    }

    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }
}

/// SQL aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn sql(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    fn alias_prefix(self) -> &'static str {
        match self {
            AggregateFunction::Count => "Count",
            AggregateFunction::Sum => "Sum",
            AggregateFunction::Avg => "Avg",
            AggregateFunction::Min => "Min",
            AggregateFunction::Max => "Max",
        }
    }
}

/// One projected aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub function: AggregateFunction,
    /// `None` means `*` (COUNT only).
    pub target: Option<Expr>,
    pub alias: String,
}

/// Aggregates over a filtered query, with optional grouping and HAVING.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateQuery {
    query: Query,
    aggregates: Vec<Aggregate>,
    group_by: Vec<Expr>,
    having: Option<Criterion>,
}

impl AggregateQuery {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// Add an aggregate; without an alias it is named `<Func>_<n>`.
    pub fn aggregate(
        mut self,
        function: AggregateFunction,
        target: Option<Expr>,
        alias: Option<&str>,
    ) -> Self {
        let alias = match alias {
            Some(a) => a.to_string(),
            None => format!("{}_{}", function.alias_prefix(), self.aggregates.len()),
        };
        self.aggregates.push(Aggregate {
            function,
            target,
            alias,
        });
        self
    }

    /// `COUNT(*)`
    pub fn count(self, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Count, None, alias)
    }

    pub fn count_of(self, property: impl Into<String>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Count, Some(col(property)), alias)
    }

    pub fn sum(self, property: impl Into<String>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Sum, Some(col(property)), alias)
    }

    pub fn avg(self, property: impl Into<String>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Avg, Some(col(property)), alias)
    }

    pub fn min(self, property: impl Into<String>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Min, Some(col(property)), alias)
    }

    pub fn max(self, property: impl Into<String>, alias: Option<&str>) -> Self {
        self.aggregate(AggregateFunction::Max, Some(col(property)), alias)
    }

    pub fn group_by(self, property: impl Into<String>) -> Self {
        self.group_by_expr(col(property))
    }

    pub fn group_by_expr(mut self, key: Expr) -> Self {
        self.group_by.push(key);
        self
    }

    pub fn having(mut self, criterion: impl Into<Criterion>) -> Self {
        self.having = Some(criterion.into());
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    pub fn group_keys(&self) -> &[Expr] {
        &self.group_by
    }

    pub fn having_criterion(&self) -> Option<&Criterion> {
        self.having.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_expression_parses_fields() {
        let q = Query::new().sort("name, code DESC, id asc").unwrap();
        let keys: Vec<_> = q.ordering().iter().map(|o| (o.key.clone(), o.ascending)).collect();
        assert_eq!(
            keys,
            vec![(col("name"), true), (col("code"), false), (col("id"), true)]
        );
    }

    #[test]
    fn sort_expression_rejects_bad_direction() {
        let err = Query::new().sort("name sideways").unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn empty_sort_expression_is_noop() {
        let q = Query::new().sort("").unwrap();
        assert!(q.ordering().is_empty());
    }

    #[test]
    fn page_is_one_based() {
        let q = Query::new().page(3, 25).unwrap();
        assert_eq!(q.skip_count(), Some(50));
        assert_eq!(q.take_count(), Some(25));
        assert!(Query::new().page(0, 25).is_err());
    }

    #[test]
    fn page_offset_overflow_is_rejected() {
        let err = Query::new().page(u64::MAX, 2).unwrap_err();
        assert!(err.is_argument());

        let last = Query::new().page(u64::MAX, 1).unwrap();
        assert_eq!(last.skip_count(), Some(u64::MAX - 1));
    }

    #[test]
    fn default_aggregate_aliases_count_existing() {
        let q = AggregateQuery::new(Query::new())
            .count(None)
            .sum("amount", None)
            .max("amount", Some("Largest"))
            .avg("amount", None);
        let aliases: Vec<_> = q.aggregates().iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(aliases, vec!["Count_0", "Sum_1", "Largest", "Avg_3"]);
    }

    #[test]
    fn helpers_add_filters() {
        let q = Query::new()
            .where_between("amount", 1, 10)
            .where_in("code", ["LAX"])
            .where_is_null("closed")
            .where_is_not_null("opened");
        assert_eq!(q.filters().len(), 4);
    }
}
