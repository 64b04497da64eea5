#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    expression::Expr,
    types::ColumnRef,
    utils::display_comma_separated,
};

/// The `SELECT ...` statement.
///
/// ```txt
/// SELECT [ DISTINCT ] <projection> FROM <table>
///     [ <join clause> ]
///     [ WHERE <search condition> ]
///     [ GROUP BY <column> { , <column> } ]
///     [ HAVING <search condition> ]
///     [ ORDER BY <column> [ ASC | DESC ] { , ... } ]
///     [ LIMIT <n> ] [ OFFSET <n> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectStmt {
    /// `DISTINCT` flag.
    pub distinct: bool,
    /// Projection list.
    pub projection: Vec<SelectItem>,
    /// Source table name.
    pub from: String,
    /// At most one join.
    pub join: Option<JoinClause>,
    /// `WHERE` condition.
    pub selection: Option<Expr>,
    /// `GROUP BY` columns.
    pub group_by: Vec<ColumnRef>,
    /// `HAVING` condition, evaluated on grouped rows.
    pub having: Option<Expr>,
    /// `ORDER BY` keys.
    pub order_by: Vec<OrderBy>,
    /// `LIMIT` row count.
    pub limit: Option<u64>,
    /// `OFFSET` row count.
    pub offset: Option<u64>,
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT{}", if self.distinct { " DISTINCT" } else { "" })?;
        write!(f, " {}", display_comma_separated(&self.projection))?;
        write!(f, " FROM {}", self.from)?;
        if let Some(join) = &self.join {
            write!(f, "{}", join)?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {}", selection)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", display_comma_separated(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", display_comma_separated(&self.order_by))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

/// One item of the comma-separated list following `SELECT`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectItem {
    /// An unqualified `*`.
    Wildcard,
    /// An expression, optionally followed by `AS <alias>`.
    Expr {
        /// The projected expression.
        expr: Expr,
        /// The `AS` alias, if any.
        alias: Option<String>,
    },
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Expr { expr, alias: None } => write!(f, "{}", expr),
            Self::Expr {
                expr,
                alias: Some(alias),
            } => write!(f, "{} AS {}", expr, alias),
        }
    }
}

/// A join clause.
///
/// ```txt
/// [ INNER | LEFT [OUTER] | RIGHT [OUTER] | FULL OUTER ] JOIN <table>
///     ON <table>.<column> = <table>.<column>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinClause {
    /// The join type.
    pub join_type: JoinType,
    /// The joined (right) table name.
    pub table: String,
    /// Left side of the equality condition (table-qualified).
    pub left: ColumnRef,
    /// Right side of the equality condition (table-qualified).
    pub right: ColumnRef,
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " {} {} ON {} = {}",
            self.join_type, self.table, self.left, self.right
        )
    }
}

/// The join type. A bare `JOIN` is inner.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinType {
    /// `INNER JOIN`
    #[default]
    Inner,
    /// `LEFT [OUTER] JOIN`
    LeftOuter,
    /// `RIGHT [OUTER] JOIN`
    RightOuter,
    /// `FULL OUTER JOIN`
    FullOuter,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT JOIN",
            Self::RightOuter => "RIGHT JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
        })
    }
}

/// One `ORDER BY` key.
///
/// ```txt
/// <column> [ ASC | DESC ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBy {
    /// The sort key.
    pub column: ColumnRef,
    /// True for descending order.
    pub descending: bool,
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.column,
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}
