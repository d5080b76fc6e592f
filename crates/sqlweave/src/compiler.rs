//! Predicate and expression compiler.
//!
//! [`Compiler`] lowers a [`Predicate`] or typed [`Expr`] into SQL text, pushing one
//! parameter per literal into a [`ParamMap`]. Every comparison and logical node is
//! parenthesized, so the output never depends on operator precedence:
//!
//! ```text
//! Predicate::greater_than("amount", 100)              → (`Amount` > @p1)
//! equal_to("code", "LAX") | equal_to("code", "AUS")   → ((`Code` = @p1) OR (`Code` = @p2))
//! Predicate::in_list("code", Vec::<&str>::new())      → (1 = 0)
//! col("code").eq(Value::Null)                         → (`Code` IS NULL)
//! ```
//!
//! The compiler holds no mutable state. Parameter numbering comes from the map
//! passed in, so several clauses of one statement share a single sequence.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::expr::{BinaryOp, Expr, Function, PropertySource};
use crate::ident::Ident;
use crate::metadata::EntityMetadata;
use crate::params::ParamMap;
use crate::predicate::{Comparison, ComparisonValue, Operator, Predicate};
use crate::query::{AggregateFunction, Criterion};
use crate::value::Value;

/// SQL text plus its parameter bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: ParamMap,
}

/// How property references resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompileMode {
    /// WHERE/HAVING/ORDER BY: captured properties become parameters.
    Predicate,
    /// Aggregate projection: every property resolves to a bare column.
    Aggregate,
}

/// Lowers criteria for one entity in one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    dialect: &'a dyn Dialect,
    metadata: &'a EntityMetadata,
}

impl<'a> Compiler<'a> {
    pub fn new(dialect: &'a dyn Dialect, metadata: &'a EntityMetadata) -> Self {
        Self { dialect, metadata }
    }

    /// Compile a predicate with a fresh parameter map (`@p1`, `@p2`, ...).
    pub fn compile(&self, predicate: &Predicate) -> SqlResult<Compiled> {
        let mut params = ParamMap::new();
        let sql = self.predicate_into(predicate, &mut params)?;
        Ok(Compiled { sql, params })
    }

    /// Compile a typed expression with a fresh parameter map.
    pub fn compile_expr(&self, expr: &Expr) -> SqlResult<Compiled> {
        let mut params = ParamMap::new();
        let sql = self.expr_into(expr, &mut params)?;
        Ok(Compiled { sql, params })
    }

    /// Compile one aggregate projection with a fresh parameter map.
    pub fn compile_aggregate(
        &self,
        function: AggregateFunction,
        target: Option<&Expr>,
        alias: &str,
    ) -> SqlResult<Compiled> {
        let mut params = ParamMap::new();
        let sql = self.aggregate_into(function, target, alias, &mut params)?;
        Ok(Compiled { sql, params })
    }

    /// Compile a predicate, continuing the numbering of `params`.
    pub fn predicate_into(
        &self,
        predicate: &Predicate,
        params: &mut ParamMap,
    ) -> SqlResult<String> {
        let mut sql = String::new();
        self.write_predicate(predicate, params, &mut sql)?;
        Ok(sql)
    }

    /// Compile a typed expression, continuing the numbering of `params`.
    pub fn expr_into(&self, expr: &Expr, params: &mut ParamMap) -> SqlResult<String> {
        let mut sql = String::new();
        self.write_expr(expr, CompileMode::Predicate, params, &mut sql)?;
        Ok(sql)
    }

    /// Compile either criterion form, continuing the numbering of `params`.
    pub fn criterion_into(
        &self,
        criterion: &Criterion,
        params: &mut ParamMap,
    ) -> SqlResult<String> {
        match criterion {
            Criterion::Predicate(p) => self.predicate_into(p, params),
            Criterion::Expr(e) => self.expr_into(e, params),
        }
    }

    /// Compile a grouping key: properties resolve to bare columns.
    pub fn key_into(&self, key: &Expr, params: &mut ParamMap) -> SqlResult<String> {
        let mut sql = String::new();
        self.write_expr(key, CompileMode::Aggregate, params, &mut sql)?;
        Ok(sql)
    }

    /// `FUNC(<expr>|*) AS <alias>`.
    pub fn aggregate_into(
        &self,
        function: AggregateFunction,
        target: Option<&Expr>,
        alias: &str,
        params: &mut ParamMap,
    ) -> SqlResult<String> {
        let mut sql = String::from(function.sql());
        sql.push('(');
        match target {
            Some(expr) => self.write_expr(expr, CompileMode::Aggregate, params, &mut sql)?,
            None if function == AggregateFunction::Count => sql.push('*'),
            None => {
                return Err(SqlError::argument(format!(
                    "{} requires a property",
                    function.sql()
                )));
            }
        }
        sql.push_str(") AS ");
        sql.push_str(&Ident::parse(alias)?.render(self.dialect));
        Ok(sql)
    }

    /// Quoted column for an entity property.
    pub fn column(&self, property: &str) -> SqlResult<String> {
        let column = self.metadata.require_column(property)?;
        Ok(column.ident()?.render(self.dialect))
    }

    fn bind(&self, value: Value, params: &mut ParamMap) -> String {
        let name = self.dialect.parameter_name(params.next_index());
        params.push(name.clone(), value);
        name
    }

    fn write_predicate(
        &self,
        predicate: &Predicate,
        params: &mut ParamMap,
        sql: &mut String,
    ) -> SqlResult<()> {
        match predicate {
            Predicate::Comparison(c) => self.write_comparison(c, params, sql),
            Predicate::Not(child) => {
                sql.push_str("NOT (");
                self.write_predicate(child, params, sql)?;
                sql.push(')');
                Ok(())
            }
            Predicate::And(l, r) => self.write_logical(l, "AND", r, params, sql),
            Predicate::Or(l, r) => self.write_logical(l, "OR", r, params, sql),
        }
    }

    fn write_logical(
        &self,
        left: &Predicate,
        op: &str,
        right: &Predicate,
        params: &mut ParamMap,
        sql: &mut String,
    ) -> SqlResult<()> {
        sql.push('(');
        self.write_predicate(left, params, sql)?;
        sql.push(' ');
        sql.push_str(op);
        sql.push(' ');
        self.write_predicate(right, params, sql)?;
        sql.push(')');
        Ok(())
    }

    fn write_comparison(
        &self,
        comparison: &Comparison,
        params: &mut ParamMap,
        sql: &mut String,
    ) -> SqlResult<()> {
        let column = self.column(comparison.property())?;
        let op = comparison.operator();

        match (op, comparison.value()) {
            (Operator::IsNull, ComparisonValue::None) => write_null_check(sql, &column, true),
            (Operator::IsNotNull, ComparisonValue::None) => write_null_check(sql, &column, false),
            (Operator::EqualTo, ComparisonValue::Single(Value::Null)) => {
                write_null_check(sql, &column, true)
            }
            (Operator::NotEqualTo, ComparisonValue::Single(Value::Null)) => {
                write_null_check(sql, &column, false)
            }
            (Operator::In | Operator::NotIn, ComparisonValue::List(values)) => {
                let negated = op == Operator::NotIn;
                if values.is_empty() {
                    sql.push_str(if negated { "(1 = 1)" } else { "(1 = 0)" });
                    return Ok(());
                }
                let names: Vec<String> = values
                    .iter()
                    .map(|v| self.bind(v.clone(), params))
                    .collect();
                sql.push('(');
                sql.push_str(&column);
                sql.push_str(if negated { " NOT IN (" } else { " IN (" });
                sql.push_str(&names.join(", "));
                sql.push_str("))");
            }
            (_, ComparisonValue::Single(value)) => {
                let Some(op_sql) = op.sql() else {
                    return Err(malformed(comparison));
                };
                let name = self.bind(value.clone(), params);
                sql.push('(');
                sql.push_str(&column);
                sql.push(' ');
                sql.push_str(op_sql);
                sql.push(' ');
                sql.push_str(&name);
                sql.push(')');
            }
            _ => return Err(malformed(comparison)),
        }
        Ok(())
    }

    fn write_expr(
        &self,
        expr: &Expr,
        mode: CompileMode,
        params: &mut ParamMap,
        sql: &mut String,
    ) -> SqlResult<()> {
        match expr {
            Expr::Property { name, source } => match (source, mode) {
                (PropertySource::Entity, _)
                | (PropertySource::Captured(_), CompileMode::Aggregate) => {
                    sql.push_str(&self.column(name)?);
                }
                (PropertySource::Captured(value), CompileMode::Predicate) => {
                    let name = self.bind(value.clone(), params);
                    sql.push_str(&name);
                }
            },
            Expr::Literal(value) => {
                let name = self.bind(value.clone(), params);
                sql.push_str(&name);
            }
            Expr::Binary { op, left, right } => {
                if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
                    let is_null = *op == BinaryOp::Eq;
                    if is_null_constant(right, mode) {
                        let mut operand = String::new();
                        self.write_expr(left, mode, params, &mut operand)?;
                        write_null_check(sql, &operand, is_null);
                        return Ok(());
                    }
                    if is_null_constant(left, mode) {
                        let mut operand = String::new();
                        self.write_expr(right, mode, params, &mut operand)?;
                        write_null_check(sql, &operand, is_null);
                        return Ok(());
                    }
                }
                sql.push('(');
                self.write_expr(left, mode, params, sql)?;
                sql.push(' ');
                sql.push_str(op.sql());
                sql.push(' ');
                self.write_expr(right, mode, params, sql)?;
                sql.push(')');
            }
            Expr::Not(child) => {
                sql.push_str("NOT (");
                self.write_expr(child, mode, params, sql)?;
                sql.push(')');
            }
            Expr::Call {
                function,
                target,
                args,
            } => self.write_call(function, target, args, mode, params, sql)?,
        }
        Ok(())
    }

    fn write_call(
        &self,
        function: &Function,
        target: &Expr,
        args: &[Expr],
        mode: CompileMode,
        params: &mut ParamMap,
        sql: &mut String,
    ) -> SqlResult<()> {
        let (min, max) = match function {
            Function::Contains | Function::StartsWith | Function::EndsWith => (1, 1),
            Function::ToUpper
            | Function::ToLower
            | Function::Trim
            | Function::Abs
            | Function::Floor
            | Function::Ceiling => (0, 0),
            Function::Substring => (1, 2),
            Function::Round => (0, 1),
            Function::Named(name) => {
                return Err(SqlError::unsupported(
                    name.clone(),
                    "function has no SQL translation",
                ));
            }
        };
        if args.len() < min || args.len() > max {
            return Err(SqlError::argument(format!(
                "{} expects {} argument(s), got {}",
                function.name(),
                if min == max {
                    min.to_string()
                } else {
                    format!("{min}..={max}")
                },
                args.len()
            )));
        }

        let mut target_sql = String::new();
        self.write_expr(target, mode, params, &mut target_sql)?;
        let mut arg_sql = Vec::with_capacity(args.len());
        for arg in args {
            let mut s = String::new();
            self.write_expr(arg, mode, params, &mut s)?;
            arg_sql.push(s);
        }

        let rendered = match function {
            Function::Contains => format!("({target_sql} LIKE CONCAT('%', {}, '%'))", arg_sql[0]),
            Function::StartsWith => format!("({target_sql} LIKE CONCAT({}, '%'))", arg_sql[0]),
            Function::EndsWith => format!("({target_sql} LIKE CONCAT('%', {}))", arg_sql[0]),
            Function::ToUpper => format!("UPPER({target_sql})"),
            Function::ToLower => format!("LOWER({target_sql})"),
            Function::Trim => format!("TRIM({target_sql})"),
            Function::Abs => format!("ABS({target_sql})"),
            Function::Floor => format!("FLOOR({target_sql})"),
            Function::Ceiling => format!("CEILING({target_sql})"),
            Function::Substring => {
                let mut s = format!("SUBSTRING({target_sql}");
                for a in &arg_sql {
                    s.push_str(", ");
                    s.push_str(a);
                }
                s.push(')');
                s
            }
            // SQL Server's ROUND has no one-argument form.
            Function::Round => match arg_sql.first() {
                Some(precision) => format!("ROUND({target_sql}, {precision})"),
                None => format!("ROUND({target_sql}, 0)"),
            },
            Function::Named(name) => {
                return Err(SqlError::unsupported(
                    name.clone(),
                    "function has no SQL translation",
                ));
            }
        };
        sql.push_str(&rendered);
        Ok(())
    }
}

fn write_null_check(sql: &mut String, operand: &str, is_null: bool) {
    sql.push('(');
    sql.push_str(operand);
    sql.push_str(if is_null { " IS NULL)" } else { " IS NOT NULL)" });
}

/// A literal null, or a captured null outside aggregate projections.
fn is_null_constant(expr: &Expr, mode: CompileMode) -> bool {
    match expr {
        Expr::Literal(Value::Null) => true,
        Expr::Property {
            source: PropertySource::Captured(Value::Null),
            ..
        } => mode == CompileMode::Predicate,
        _ => false,
    }
}

fn malformed(comparison: &Comparison) -> SqlError {
    SqlError::argument(format!(
        "Operator {:?} cannot be applied to property '{}' with value {:?}",
        comparison.operator(),
        comparison.property(),
        comparison.value()
    ))
}
