//! Filter criteria as a tree of comparison and logical nodes.
//!
//! A [`Predicate`] names entity *properties* (not columns); the compiler resolves
//! them through the entity's metadata.
//!
//! # Example
//! ```ignore
//! use sqlweave::predicate::{self, Predicate};
//!
//! let p = Predicate::equal_to("code", "LAX") | Predicate::equal_to("code", "AUS");
//! let q = predicate::and(Some(p), Some(Predicate::greater_than("runways", 2)));
//! ```

use crate::error::{SqlError, SqlResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::ops;

/// Comparison operator of a [`Comparison`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    Like,
    NotLike,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    IsNull,
    IsNotNull,
    In,
    NotIn,
}

impl Operator {
    /// SQL text for binary operators; `None` for null checks and list membership.
    pub fn sql(self) -> Option<&'static str> {
        match self {
            Operator::EqualTo => Some("="),
            Operator::NotEqualTo => Some("<>"),
            Operator::Like => Some("LIKE"),
            Operator::NotLike => Some("NOT LIKE"),
            Operator::LessThan => Some("<"),
            Operator::LessThanOrEqualTo => Some("<="),
            Operator::GreaterThan => Some(">"),
            Operator::GreaterThanOrEqualTo => Some(">="),
            Operator::IsNull | Operator::IsNotNull | Operator::In | Operator::NotIn => None,
        }
    }

    fn is_null_check(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    fn is_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComparisonValue {
    /// Null checks carry nothing.
    None,
    Single(Value),
    List(Vec<Value>),
}

/// `<property> <operator> <value>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    property: String,
    operator: Operator,
    value: ComparisonValue,
}

impl Comparison {
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &ComparisonValue {
        &self.value
    }
}

/// A boolean-valued filter criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Comparison(Comparison),
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Build a comparison, checking that the value shape fits the operator.
    ///
    /// - `IsNull`/`IsNotNull` take [`ComparisonValue::None`]
    /// - `In`/`NotIn` take [`ComparisonValue::List`]
    /// - every other operator takes [`ComparisonValue::Single`]
    pub fn comparison(
        property: impl Into<String>,
        operator: Operator,
        value: ComparisonValue,
    ) -> SqlResult<Self> {
        let property = property.into();
        let fits = match &value {
            ComparisonValue::None => operator.is_null_check(),
            ComparisonValue::List(_) => operator.is_list(),
            ComparisonValue::Single(_) => !operator.is_null_check() && !operator.is_list(),
        };
        if !fits {
            return Err(SqlError::argument(format!(
                "Operator {operator:?} cannot be applied to property '{property}' with value {value:?}"
            )));
        }
        Ok(Predicate::Comparison(Comparison {
            property,
            operator,
            value,
        }))
    }

    fn single(property: impl Into<String>, operator: Operator, value: Value) -> Self {
        Predicate::Comparison(Comparison {
            property: property.into(),
            operator,
            value: ComparisonValue::Single(value),
        })
    }

    fn list(property: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Predicate::Comparison(Comparison {
            property: property.into(),
            operator,
            value: ComparisonValue::List(values),
        })
    }

    pub fn equal_to(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::EqualTo, value.into())
    }

    pub fn not_equal_to(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::NotEqualTo, value.into())
    }

    pub fn greater_than(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::GreaterThan, value.into())
    }

    pub fn greater_than_or_equal_to(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::GreaterThanOrEqualTo, value.into())
    }

    pub fn less_than(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::LessThan, value.into())
    }

    pub fn less_than_or_equal_to(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(property, Operator::LessThanOrEqualTo, value.into())
    }

    /// Raw LIKE pattern; `%` and `_` are passed through.
    pub fn like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(property, Operator::Like, Value::Text(pattern.into()))
    }

    pub fn not_like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(property, Operator::NotLike, Value::Text(pattern.into()))
    }

    /// `LIKE 'value%'`
    pub fn starts_with(property: impl Into<String>, value: &str) -> Self {
        Self::like(property, format!("{value}%"))
    }

    /// `LIKE '%value'`
    pub fn ends_with(property: impl Into<String>, value: &str) -> Self {
        Self::like(property, format!("%{value}"))
    }

    /// `LIKE '%value%'`
    pub fn contains(property: impl Into<String>, value: &str) -> Self {
        Self::like(property, format!("%{value}%"))
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Predicate::Comparison(Comparison {
            property: property.into(),
            operator: Operator::IsNull,
            value: ComparisonValue::None,
        })
    }

    pub fn is_not_null(property: impl Into<String>) -> Self {
        Predicate::Comparison(Comparison {
            property: property.into(),
            operator: Operator::IsNotNull,
            value: ComparisonValue::None,
        })
    }

    pub fn in_list<V: Into<Value>>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::list(
            property,
            Operator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn not_in<V: Into<Value>>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::list(
            property,
            Operator::NotIn,
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// `low <= property <= high`, as two inclusive comparisons.
    pub fn between(
        property: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        let property = property.into();
        Self::greater_than_or_equal_to(property.clone(), low)
            & Self::less_than_or_equal_to(property, high)
    }

    /// Number of comparison leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::Comparison(_) => 1,
            Predicate::Not(p) => p.leaf_count(),
            Predicate::And(l, r) | Predicate::Or(l, r) => l.leaf_count() + r.leaf_count(),
        }
    }
}

/// `left AND right`; an absent operand yields the other unchanged.
pub fn and(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
    match (left, right) {
        (Some(l), Some(r)) => Some(Predicate::And(Box::new(l), Box::new(r))),
        (l, r) => l.or(r),
    }
}

/// `left OR right`; an absent operand yields the other unchanged.
pub fn or(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
    match (left, right) {
        (Some(l), Some(r)) => Some(Predicate::Or(Box::new(l), Box::new(r))),
        (l, r) => l.or(r),
    }
}

/// `NOT p`; `not(None)` is `None`.
pub fn not(predicate: Option<Predicate>) -> Option<Predicate> {
    predicate.map(|p| Predicate::Not(Box::new(p)))
}

impl ops::BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl ops::BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_rejects_value_on_null_check() {
        let err = Predicate::comparison(
            "code",
            Operator::IsNull,
            ComparisonValue::Single(Value::from("LAX")),
        )
        .unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn comparison_rejects_list_on_single_operator() {
        assert!(
            Predicate::comparison("code", Operator::EqualTo, ComparisonValue::List(vec![]))
                .is_err()
        );
        assert!(
            Predicate::comparison("code", Operator::In, ComparisonValue::Single(1.into()))
                .is_err()
        );
        assert!(Predicate::comparison("code", Operator::In, ComparisonValue::List(vec![])).is_ok());
    }

    #[test]
    fn pattern_helpers() {
        let Predicate::Comparison(c) = Predicate::contains("name", "port") else {
            panic!("expected comparison");
        };
        assert_eq!(c.operator(), Operator::Like);
        assert_eq!(c.value(), &ComparisonValue::Single(Value::from("%port%")));

        let Predicate::Comparison(c) = Predicate::starts_with("name", "Aus") else {
            panic!("expected comparison");
        };
        assert_eq!(c.value(), &ComparisonValue::Single(Value::from("Aus%")));
    }

    #[test]
    fn combinators_are_identity_on_absent_operand() {
        let p = Predicate::equal_to("code", "LAX");
        assert_eq!(and(None, Some(p.clone())), Some(p.clone()));
        assert_eq!(or(Some(p.clone()), None), Some(p.clone()));
        assert_eq!(and(None, None), None);
        assert_eq!(not(None), None);
        assert_eq!(not(Some(p.clone())), Some(!p));
    }

    #[test]
    fn between_is_two_inclusive_bounds() {
        let p = Predicate::between("runways", 1, 4);
        let manual = Predicate::greater_than_or_equal_to("runways", 1)
            & Predicate::less_than_or_equal_to("runways", 4);
        assert_eq!(p, manual);
        assert_eq!(p.leaf_count(), 2);
    }

    #[test]
    fn serde_round_trip() {
        let p = Predicate::in_list("code", ["LAX", "AUS"]) | Predicate::is_null("code");
        let json = serde_json::to_string(&p).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
