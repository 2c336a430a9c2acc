// Copyright 2026 the Formwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conditional-visibility evaluation.
//!
//! An element's `visibleIf` text is handed to a [`ConditionEvaluator`], which
//! turns it into a boolean against the survey's current answers ([`Values`]).
//! The store builds one evaluator per element on first use through an
//! [`EvaluatorFactory`] and reuses it on every later pass.
//!
//! [`ExpressionRunner`] is the built-in evaluator. Its `pest` grammar
//! (`condition.pest`) covers the comparison subset forms actually use:
//!
//! ```text
//!   {age} >= 18 and ({country} = 'NZ' or {country} notempty)
//! ```
//!
//! - `{name}` reads an answer; dotted names (`{address.city}`) walk into
//!   objects. Unknown names read as `null`.
//! - Literals: numbers, `'single'` or `"double"` quoted strings, `true`,
//!   `false`.
//! - Comparisons: `=`/`==`, `!=`/`<>`, `<`, `<=`, `>`, `>=`, and the postfix
//!   tests `empty` / `notempty`.
//! - Logic: `and`/`&&`, `or`/`||`, `not`/`!`, parentheses.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;

use pest::Parser as _;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use serde_json::{Map, Value};

use self::grammar::{ConditionParser, Rule};
use crate::error::ConditionError;

/// Answers a condition is evaluated against, keyed by question name.
pub type Values = Map<String, Value>;

/// Builds an evaluator bound to an expression.
pub type EvaluatorFactory = fn(&str) -> Box<dyn ConditionEvaluator>;

/// Turns an expression plus a data context into a boolean.
pub trait ConditionEvaluator: fmt::Debug {
    /// Rebinds the evaluator to a new expression.
    fn set_expression(&mut self, expression: &str);

    /// Evaluates the bound expression against `values`.
    fn run(&mut self, values: &Values) -> Result<bool, ConditionError>;
}

/// Default [`EvaluatorFactory`]: an [`ExpressionRunner`].
#[must_use]
pub fn expression_runner(expression: &str) -> Box<dyn ConditionEvaluator> {
    Box::new(ExpressionRunner::new(expression))
}

/// The built-in [`ConditionEvaluator`].
///
/// Parsing is deferred to the first [`run`](ConditionEvaluator::run) after the
/// expression is set, and the parsed tree is kept until the expression
/// changes.
#[derive(Clone, Debug)]
pub struct ExpressionRunner {
    expression: String,
    parsed: Option<Expr>,
}

impl ExpressionRunner {
    /// Creates a runner bound to `expression`.
    #[must_use]
    pub fn new(expression: &str) -> Self {
        Self {
            expression: expression.to_owned(),
            parsed: None,
        }
    }

    /// Returns the bound expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl ConditionEvaluator for ExpressionRunner {
    fn set_expression(&mut self, expression: &str) {
        if self.expression != expression {
            self.expression = expression.to_owned();
            self.parsed = None;
        }
    }

    fn run(&mut self, values: &Values) -> Result<bool, ConditionError> {
        let expr = match self.parsed.take() {
            Some(expr) => expr,
            None => self.parse()?,
        };
        let result = expr.eval(values);
        self.parsed = Some(expr);
        let value = result.map_err(|message| ConditionError::Evaluation {
            expression: self.expression.clone(),
            message,
        })?;
        Ok(truthy(&value))
    }
}

impl ExpressionRunner {
    fn parse(&self) -> Result<Expr, ConditionError> {
        parse_condition(&self.expression).map_err(|message| ConditionError::Parse {
            expression: self.expression.clone(),
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Syntax tree
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Clone, Debug)]
enum Expr {
    Literal(Value),
    Variable(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    /// `expr empty` (`false`) or `expr notempty` (`true`).
    Empty(Box<Expr>, bool),
}

impl Expr {
    fn eval(&self, values: &Values) -> Result<Value, String> {
        Ok(match self {
            Self::Literal(v) => v.clone(),
            Self::Variable(name) => lookup(values, name).cloned().unwrap_or(Value::Null),
            Self::Not(inner) => Value::Bool(!truthy(&inner.eval(values)?)),
            Self::And(a, b) => Value::Bool(truthy(&a.eval(values)?) && truthy(&b.eval(values)?)),
            Self::Or(a, b) => Value::Bool(truthy(&a.eval(values)?) || truthy(&b.eval(values)?)),
            Self::Empty(inner, negated) => Value::Bool(is_empty(&inner.eval(values)?) != *negated),
            Self::Compare(a, op, b) => {
                let (a, b) = (a.eval(values)?, b.eval(values)?);
                Value::Bool(compare(&a, *op, &b)?)
            }
        })
    }
}

fn lookup<'a>(values: &'a Values, name: &str) -> Option<&'a Value> {
    if let Some(v) = values.get(name) {
        return Some(v);
    }
    let mut parts = name.split('.');
    let mut current = values.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Numeric view of a value. Numeric strings count.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn compare(a: &Value, op: CompareOp, b: &Value) -> Result<bool, String> {
    let ordering = match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    match (op, ordering) {
        (_, Some(o)) => Ok(op.accepts(o)),
        (CompareOp::Eq, None) => Ok(a == b),
        (CompareOp::Ne, None) => Ok(a != b),
        // A missing answer is never ordered against anything.
        (_, None) if a.is_null() || b.is_null() => Ok(false),
        (_, None) => Err(format!("cannot order {a} against {b}")),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

mod grammar {
    #![allow(missing_docs, unreachable_pub, reason = "generated by pest_derive")]

    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "condition.pest"]
    pub(super) struct ConditionParser;
}

/// Parses a whole expression into a syntax tree.
fn parse_condition(src: &str) -> Result<Expr, String> {
    let mut pairs = ConditionParser::parse(Rule::condition, src).map_err(|err| {
        let (line, col) = match err.line_col {
            LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
        };
        format!("{} at {line}:{col}", err.variant.message())
    })?;
    let condition = child(&mut pairs)?;
    build_or(child(&mut condition.into_inner())?)
}

/// Next pair of a parse tree whose shape the grammar guarantees.
fn child<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, String> {
    pairs
        .next()
        .ok_or_else(|| "malformed parse tree".to_string())
}

fn build_or(pair: Pair<'_, Rule>) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let mut lhs = build_and(child(&mut inner)?)?;
    while inner.next().is_some() {
        let rhs = build_and(child(&mut inner)?)?;
        lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn build_and(pair: Pair<'_, Rule>) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let mut lhs = build_unary(child(&mut inner)?)?;
    while inner.next().is_some() {
        let rhs = build_unary(child(&mut inner)?)?;
        lhs = Expr::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn build_unary(pair: Pair<'_, Rule>) -> Result<Expr, String> {
    let mut negations = 0;
    for part in pair.into_inner() {
        if part.as_rule() == Rule::not_op {
            negations += 1;
            continue;
        }
        let mut expr = build_comparison(part)?;
        for _ in 0..negations {
            expr = Expr::Not(Box::new(expr));
        }
        return Ok(expr);
    }
    Err("malformed parse tree".to_string())
}

fn build_comparison(pair: Pair<'_, Rule>) -> Result<Expr, String> {
    let mut inner = pair.into_inner();
    let lhs = build_operand(child(&mut inner)?)?;
    let Some(op) = inner.next() else {
        return Ok(lhs);
    };
    if op.as_rule() == Rule::empty_test {
        let negated = op.as_str().eq_ignore_ascii_case("notempty");
        return Ok(Expr::Empty(Box::new(lhs), negated));
    }
    let op = match op.as_str() {
        "=" | "==" => CompareOp::Eq,
        "!=" | "<>" => CompareOp::Ne,
        "<" => CompareOp::Lt,
        "<=" => CompareOp::Le,
        ">" => CompareOp::Gt,
        ">=" => CompareOp::Ge,
        other => return Err(format!("unknown operator '{other}'")),
    };
    let rhs = build_operand(child(&mut inner)?)?;
    Ok(Expr::Compare(Box::new(lhs), op, Box::new(rhs)))
}

fn build_operand(pair: Pair<'_, Rule>) -> Result<Expr, String> {
    match pair.as_rule() {
        Rule::or_expr => build_or(pair),
        Rule::variable => {
            let name = child(&mut pair.into_inner())?.as_str().trim();
            if name.is_empty() {
                return Err("empty '{}' reference".to_string());
            }
            Ok(Expr::Variable(name.to_owned()))
        }
        Rule::string => {
            let text = child(&mut pair.into_inner())?.as_str();
            Ok(Expr::Literal(Value::String(text.to_owned())))
        }
        Rule::number => {
            let text = pair.as_str();
            let n: f64 = text
                .parse()
                .map_err(|_| format!("invalid number '{text}'"))?;
            Ok(Expr::Literal(number(n)))
        }
        Rule::boolean => Ok(Expr::Literal(Value::Bool(
            pair.as_str().eq_ignore_ascii_case("true"),
        ))),
        other => Err(format!("unexpected {other:?}")),
    }
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}
