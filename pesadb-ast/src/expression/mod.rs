mod function;
mod operator;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::{
    function::{AggregateFunction, DateTimeFunction},
    operator::{ComparisonOp, LogicalOp},
};
use crate::{
    types::{ColumnRef, Literal},
    utils::display_comma_separated,
};

/// An expression, as used in `WHERE` and `HAVING` clauses and projections.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),
    /// A column reference, e.g. `id` or `users.id`.
    Column(ColumnRef),
    /// A comparison, e.g. `age >= 18`.
    Comparison(ComparisonExpr),
    /// A logical combination, e.g. `a AND b`, `NOT c`.
    Logical(LogicalExpr),
    /// `<expr> IS [NOT] NULL`
    IsNull(IsNullExpr),
    /// `<expr> [NOT] BETWEEN <low> AND <high>`
    Between(BetweenExpr),
    /// `<expr> [NOT] IN (val1, val2, ...)`
    InList(InListExpr),
    /// `<expr> [NOT] LIKE '<pattern>'`
    Like(LikeExpr),
    /// An aggregate call, e.g. `COUNT(*)` or `AVG(salary)`.
    ///
    /// Aggregates consume a set of rows; the executor lifts them out of
    /// row-by-row evaluation, and evaluating one against a single row is
    /// an error.
    Aggregate(AggregateExpr),
    /// A datetime function call, e.g. `NOW()` or `DATEDIFF(a, b)`.
    DateTimeFn(DateTimeFnExpr),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{}", literal),
            Self::Column(column) => write!(f, "{}", column),
            Self::Comparison(expr) => write!(f, "{}", expr),
            Self::Logical(expr) => write!(f, "{}", expr),
            Self::IsNull(expr) => write!(f, "{}", expr),
            Self::Between(expr) => write!(f, "{}", expr),
            Self::InList(expr) => write!(f, "{}", expr),
            Self::Like(expr) => write!(f, "{}", expr),
            Self::Aggregate(expr) => write!(f, "{}", expr),
            Self::DateTimeFn(expr) => write!(f, "{}", expr),
        }
    }
}

/// A comparison, e.g. `foo > bar`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonExpr {
    /// The comparison operator.
    pub op: ComparisonOp,
    /// Left operand.
    pub left: Box<Expr>,
    /// Right operand.
    pub right: Box<Expr>,
}

impl fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// A logical combination of expressions.
///
/// `NOT` carries exactly one operand; `AND` and `OR` carry two or more and
/// evaluate with short-circuiting, left to right.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogicalExpr {
    /// The logical operator.
    pub op: LogicalOp,
    /// The operands.
    pub operands: Vec<Expr>,
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            LogicalOp::Not => write!(f, "NOT {}", self.operands[0]),
            LogicalOp::And => write!(f, "({})", crate::utils::display_separated(&self.operands, " AND ")),
            LogicalOp::Or => write!(f, "({})", crate::utils::display_separated(&self.operands, " OR ")),
        }
    }
}

/// `<expr> IS [NOT] NULL` operator.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IsNullExpr {
    /// True for `IS NOT NULL`.
    pub negated: bool,
    /// The tested expression.
    pub expr: Box<Expr>,
}

impl fmt::Display for IsNullExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} IS {}NULL",
            self.expr,
            if self.negated { "NOT " } else { "" }
        )
    }
}

/// `<expr> [NOT] BETWEEN <low> AND <high>`
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BetweenExpr {
    /// The tested expression.
    pub expr: Box<Expr>,
    /// True for `NOT BETWEEN`.
    pub negated: bool,
    /// Lower bound (inclusive).
    pub low: Box<Expr>,
    /// Upper bound (inclusive).
    pub high: Box<Expr>,
}

impl fmt::Display for BetweenExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}BETWEEN {} AND {}",
            self.expr,
            if self.negated { "NOT " } else { "" },
            self.low,
            self.high
        )
    }
}

/// `<expr> [NOT] IN (val1, val2, ...)`
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InListExpr {
    /// The tested expression.
    pub expr: Box<Expr>,
    /// True for `NOT IN`.
    pub negated: bool,
    /// The candidate values.
    pub list: Vec<Expr>,
}

impl fmt::Display for InListExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}IN ({})",
            self.expr,
            if self.negated { "NOT " } else { "" },
            display_comma_separated(&self.list)
        )
    }
}

/// `<expr> [NOT] LIKE '<pattern>'`
///
/// `%` matches any run of characters, `_` a single character; matching is
/// case-insensitive and anchored at both ends.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LikeExpr {
    /// The tested expression.
    pub expr: Box<Expr>,
    /// True for `NOT LIKE`.
    pub negated: bool,
    /// The pattern, as written (quotes stripped).
    pub pattern: String,
}

impl fmt::Display for LikeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}LIKE '{}'",
            self.expr,
            if self.negated { "NOT " } else { "" },
            self.pattern
        )
    }
}

/// An aggregate function call.
///
/// `arg` is `None` only for `COUNT(*)`. The `Display` rendering is the
/// canonical result-column name (`COUNT(*)`, `AVG(salary)`, ...).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggregateExpr {
    /// The aggregate function.
    pub func: AggregateFunction,
    /// The aggregated expression, `None` for `COUNT(*)`.
    pub arg: Option<Box<Expr>>,
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}({})", self.func, arg),
            None => write!(f, "{}(*)", self.func),
        }
    }
}

/// A datetime function call.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateTimeFnExpr {
    /// The function.
    pub func: DateTimeFunction,
    /// The arguments.
    pub args: Vec<Expr>,
}

impl fmt::Display for DateTimeFnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.func, display_comma_separated(&self.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_structure() {
        let expr = Expr::Logical(LogicalExpr {
            op: LogicalOp::And,
            operands: vec![
                Expr::Comparison(ComparisonExpr {
                    op: ComparisonOp::GreaterOrEqual,
                    left: Box::new(Expr::Column(ColumnRef::unqualified("age"))),
                    right: Box::new(Expr::Literal(Literal::Number("18".into()))),
                }),
                Expr::IsNull(IsNullExpr {
                    negated: true,
                    expr: Box::new(Expr::Column(ColumnRef::unqualified("email"))),
                }),
            ],
        });
        assert_eq!(expr.to_string(), "(age >= 18 AND email IS NOT NULL)");
    }

    #[test]
    fn aggregate_canonical_names() {
        let count_star = AggregateExpr {
            func: AggregateFunction::Count,
            arg: None,
        };
        assert_eq!(count_star.to_string(), "COUNT(*)");

        let avg = AggregateExpr {
            func: AggregateFunction::Avg,
            arg: Some(Box::new(Expr::Column(ColumnRef::unqualified("salary")))),
        };
        assert_eq!(avg.to_string(), "AVG(salary)");
    }
}
