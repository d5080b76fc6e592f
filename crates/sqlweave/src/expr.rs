//! Typed property/value expressions.
//!
//! [`Expr`] is the expression-tree form of a filter: property references, literals,
//! comparison/logical/arithmetic operators and a fixed set of string and math
//! functions. Build it fluently:
//!
//! ```ignore
//! use sqlweave::expr::{col, lit};
//!
//! let e = col("amount").gt(100).and(col("name").contains("port"));
//! let total = (col("price") * col("quantity")).ge(lit(50));
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::ops;

/// Binary operators of the typed expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn sql(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Functions callable on a property expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Contains,
    StartsWith,
    EndsWith,
    ToUpper,
    ToLower,
    Trim,
    /// `start[, length]`
    Substring,
    Abs,
    /// optional precision
    Round,
    Floor,
    Ceiling,
    /// Any function without a SQL translation.
    Named(String),
}

impl Function {
    /// Display name used in error messages.
    pub fn name(&self) -> &str {
        match self {
            Function::Contains => "Contains",
            Function::StartsWith => "StartsWith",
            Function::EndsWith => "EndsWith",
            Function::ToUpper => "ToUpper",
            Function::ToLower => "ToLower",
            Function::Trim => "Trim",
            Function::Substring => "Substring",
            Function::Abs => "Abs",
            Function::Round => "Round",
            Function::Floor => "Floor",
            Function::Ceiling => "Ceiling",
            Function::Named(name) => name,
        }
    }
}

/// Where a property reference reads its value from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertySource {
    /// A column of the entity being queried.
    Entity,
    /// A member of a value captured from the caller; compiled as a parameter.
    Captured(Value),
}

/// A typed expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Property {
        name: String,
        source: PropertySource,
    },
    Literal(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Call {
        function: Function,
        target: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Reference an entity property.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Property {
        name: name.into(),
        source: PropertySource::Entity,
    }
}

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    /// A property of a captured outer value, e.g. `filter.min_amount`.
    ///
    /// In WHERE clauses it becomes a parameter bound to `value`; in aggregate
    /// projections it resolves to the entity column of the same name.
    pub fn captured(name: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::Property {
            name: name.into(),
            source: PropertySource::Captured(value.into()),
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into()),
        }
    }

    fn call(self, function: Function, args: Vec<Expr>) -> Expr {
        Expr::Call {
            function,
            target: Box::new(self),
            args,
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    /// `= NULL`, rewritten to `IS NULL` on compilation.
    pub fn is_null(self) -> Expr {
        self.eq(Expr::Literal(Value::Null))
    }

    pub fn is_not_null(self) -> Expr {
        self.ne(Expr::Literal(Value::Null))
    }

    pub fn contains(self, value: impl Into<Expr>) -> Expr {
        self.call(Function::Contains, vec![value.into()])
    }

    pub fn starts_with(self, value: impl Into<Expr>) -> Expr {
        self.call(Function::StartsWith, vec![value.into()])
    }

    pub fn ends_with(self, value: impl Into<Expr>) -> Expr {
        self.call(Function::EndsWith, vec![value.into()])
    }

    pub fn to_upper(self) -> Expr {
        self.call(Function::ToUpper, Vec::new())
    }

    pub fn to_lower(self) -> Expr {
        self.call(Function::ToLower, Vec::new())
    }

    pub fn trim(self) -> Expr {
        self.call(Function::Trim, Vec::new())
    }

    pub fn substring(self, start: impl Into<Expr>, length: Option<Expr>) -> Expr {
        let mut args = vec![start.into()];
        args.extend(length);
        self.call(Function::Substring, args)
    }

    pub fn abs(self) -> Expr {
        self.call(Function::Abs, Vec::new())
    }

    pub fn round(self, precision: Option<Expr>) -> Expr {
        self.call(Function::Round, precision.into_iter().collect())
    }

    pub fn floor(self) -> Expr {
        self.call(Function::Floor, Vec::new())
    }

    pub fn ceiling(self) -> Expr {
        self.call(Function::Ceiling, Vec::new())
    }

    /// Call a function by name. Only the names with a SQL translation compile.
    pub fn method(self, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        self.call(Function::Named(name.into()), args)
    }
}

impl<T: Into<Value>> From<T> for Expr {
    fn from(value: T) -> Self {
        Expr::Literal(value.into())
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

macro_rules! impl_arith {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl ops::$trait for Expr {
                type Output = Expr;

                fn $method(self, rhs: Expr) -> Expr {
                    self.binary(BinaryOp::$op, rhs)
                }
            }
        )*
    };
}

impl_arith!(
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_builds_tree() {
        let e = col("amount").gt(100);
        assert_eq!(
            e,
            Expr::Binary {
                op: BinaryOp::Gt,
                left: Box::new(col("amount")),
                right: Box::new(Expr::Literal(Value::Int(100))),
            }
        );
    }

    #[test]
    fn arithmetic_operators() {
        let e = col("price") * col("quantity");
        assert!(matches!(e, Expr::Binary { op: BinaryOp::Mul, .. }));
        let e = col("a") % lit(2);
        assert!(matches!(e, Expr::Binary { op: BinaryOp::Mod, .. }));
    }

    #[test]
    fn optional_arguments() {
        let Expr::Call { args, .. } = col("name").substring(1, None) else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        let Expr::Call { args, .. } = col("amount").round(Some(lit(2))) else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
    }
}
