#[cfg(not(feature = "std"))]
use alloc::vec;

use pesadb_ast::{statement::*, types::ColumnRef};
use pesadb_core::Keyword;
use pesadb_lexer::Token;

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses a `SELECT` statement.
    pub(crate) fn parse_select_stmt(&mut self) -> Result<SelectStmt, ParserError> {
        self.expect_keyword(Keyword::SELECT)?;
        let distinct = self.parse_keyword(Keyword::DISTINCT);

        let projection = if self.next_token_if_is(&Token::Asterisk) {
            vec![SelectItem::Wildcard]
        } else {
            self.parse_comma_separated(Parser::parse_select_item)?
        };

        self.expect_keyword(Keyword::FROM)?;
        let from = self.parse_identifier()?;

        let join = self.parse_join_clause()?;
        let selection = self.parse_where_clause()?;

        let group_by = if self.parse_keywords(&[Keyword::GROUP, Keyword::BY]) {
            self.parse_comma_separated(Parser::parse_column_ref)?
        } else {
            vec![]
        };

        let having = if self.parse_keyword(Keyword::HAVING) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let order_by = if self.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
            self.parse_comma_separated(Parser::parse_order_by_item)?
        } else {
            vec![]
        };

        let limit = if self.parse_keyword(Keyword::LIMIT) {
            Some(self.parse_row_count(Keyword::LIMIT)?)
        } else {
            None
        };
        let offset = if self.parse_keyword(Keyword::OFFSET) {
            Some(self.parse_row_count(Keyword::OFFSET)?)
        } else {
            None
        };

        Ok(SelectStmt {
            distinct,
            projection,
            from,
            join,
            selection,
            group_by,
            having,
            order_by,
            limit,
            offset,
        })
    }

    /// Parses one projection item: an expression with an optional `AS` alias.
    fn parse_select_item(&mut self) -> Result<SelectItem, ParserError> {
        let expr = self.parse_expr()?;
        let alias = if self.parse_keyword(Keyword::AS) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        Ok(SelectItem::Expr { expr, alias })
    }

    /// Parses an optional join clause. At most one join is supported.
    fn parse_join_clause(&mut self) -> Result<Option<JoinClause>, ParserError> {
        let join_type = if self.parse_keyword(Keyword::INNER) {
            self.expect_keyword(Keyword::JOIN)?;
            JoinType::Inner
        } else if self.parse_keyword(Keyword::LEFT) {
            self.parse_keyword(Keyword::OUTER);
            self.expect_keyword(Keyword::JOIN)?;
            JoinType::LeftOuter
        } else if self.parse_keyword(Keyword::RIGHT) {
            self.parse_keyword(Keyword::OUTER);
            self.expect_keyword(Keyword::JOIN)?;
            JoinType::RightOuter
        } else if self.parse_keyword(Keyword::FULL) {
            self.expect_keywords(&[Keyword::OUTER, Keyword::JOIN])?;
            JoinType::FullOuter
        } else if self.parse_keyword(Keyword::JOIN) {
            JoinType::Inner
        } else {
            return Ok(None);
        };

        let table = self.parse_identifier()?;
        self.expect_keyword(Keyword::ON)?;
        let left = self.parse_qualified_column_ref()?;
        self.expect_token(&Token::Equal)?;
        let right = self.parse_qualified_column_ref()?;

        Ok(Some(JoinClause {
            join_type,
            table,
            left,
            right,
        }))
    }

    /// Parses a column reference that must be table-qualified, as required
    /// by join conditions.
    fn parse_qualified_column_ref(&mut self) -> Result<ColumnRef, ParserError> {
        let column = self.parse_column_ref()?;
        if column.table.is_none() {
            return Err(ParserError::ParseError(
                "JOIN condition must use table.column format".into(),
            ));
        }
        Ok(column)
    }

    /// Parses one `ORDER BY` key: a column with an optional direction.
    fn parse_order_by_item(&mut self) -> Result<OrderBy, ParserError> {
        let column = self.parse_column_ref()?;
        let descending =
            self.parse_one_of_keywords(&[Keyword::ASC, Keyword::DESC]) == Some(Keyword::DESC);
        Ok(OrderBy { column, descending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_query;
    use pesadb_ast::{expression::*, statement::Stmt};

    fn parse_select(input: &str) -> SelectStmt {
        match parse_query(input).unwrap() {
            Stmt::Select(stmt) => *stmt,
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn parse_select_star() {
        let stmt = parse_select("SELECT * FROM t;");
        assert_eq!(stmt.projection, vec![SelectItem::Wildcard]);
        assert_eq!(stmt.from, "t");
        assert!(!stmt.distinct);
        assert!(stmt.join.is_none() && stmt.selection.is_none());
    }

    #[test]
    fn parse_select_full_pipeline() {
        let stmt = parse_select(
            "SELECT DISTINCT dept, COUNT(*) AS n FROM emp \
             WHERE salary > 50 GROUP BY dept HAVING COUNT(*) >= 2 \
             ORDER BY dept ASC, n DESC LIMIT 10 OFFSET 5",
        );
        assert!(stmt.distinct);
        assert_eq!(stmt.projection.len(), 2);
        assert_eq!(
            stmt.projection[1],
            SelectItem::Expr {
                expr: Expr::Aggregate(AggregateExpr {
                    func: AggregateFunction::Count,
                    arg: None,
                }),
                alias: Some("n".into()),
            }
        );
        assert_eq!(stmt.group_by, vec![ColumnRef::unqualified("dept")]);
        assert!(stmt.having.is_some());
        assert_eq!(
            stmt.order_by,
            vec![
                OrderBy {
                    column: ColumnRef::unqualified("dept"),
                    descending: false,
                },
                OrderBy {
                    column: ColumnRef::unqualified("n"),
                    descending: true,
                },
            ]
        );
        assert_eq!(stmt.limit, Some(10));
        assert_eq!(stmt.offset, Some(5));
    }

    #[test]
    fn parse_join_variants() {
        let stmt = parse_select(
            "SELECT users.name, orders.oid FROM users \
             LEFT JOIN orders ON users.id = orders.uid",
        );
        assert_eq!(
            stmt.join,
            Some(JoinClause {
                join_type: JoinType::LeftOuter,
                table: "orders".into(),
                left: ColumnRef::qualified("users", "id"),
                right: ColumnRef::qualified("orders", "uid"),
            })
        );

        let stmt = parse_select("SELECT * FROM a JOIN b ON a.x = b.y");
        assert_eq!(stmt.join.as_ref().unwrap().join_type, JoinType::Inner);

        let stmt = parse_select("SELECT * FROM a FULL OUTER JOIN b ON a.x = b.y");
        assert_eq!(stmt.join.as_ref().unwrap().join_type, JoinType::FullOuter);

        let stmt = parse_select("SELECT * FROM a RIGHT OUTER JOIN b ON a.x = b.y");
        assert_eq!(stmt.join.as_ref().unwrap().join_type, JoinType::RightOuter);
    }

    #[test]
    fn join_condition_requires_qualified_columns() {
        let err = parse_query("SELECT * FROM a JOIN b ON x = y").unwrap_err();
        assert!(err
            .to_string()
            .contains("JOIN condition must use table.column format"));
    }

    #[test]
    fn full_join_requires_outer() {
        assert!(parse_query("SELECT * FROM a FULL JOIN b ON a.x = b.y").is_err());
    }

    #[test]
    fn parse_where_expression_tree() {
        let stmt = parse_select(
            "SELECT id FROM u WHERE (age BETWEEN 25 AND 35 AND active = TRUE) OR id IN (100, 200)",
        );
        match stmt.selection.unwrap() {
            Expr::Logical(LogicalExpr {
                op: LogicalOp::Or,
                operands,
            }) => {
                assert!(matches!(
                    &operands[0],
                    Expr::Logical(LogicalExpr {
                        op: LogicalOp::And,
                        ..
                    })
                ));
                assert!(matches!(&operands[1], Expr::InList(_)));
            }
            other => panic!("expected OR at the top, got {:?}", other),
        }
    }

    #[test]
    fn repeated_parsing_is_deterministic() {
        let query = "SELECT dept, COUNT(*) FROM emp GROUP BY dept ORDER BY dept LIMIT 3";
        assert_eq!(parse_query(query).unwrap(), parse_query(query).unwrap());
    }

    #[test]
    fn negative_limit_is_rejected() {
        // `-1` lexes as a signed number; LIMIT requires a non-negative count.
        let err = parse_query("SELECT * FROM t LIMIT -1").unwrap_err();
        assert!(err.to_string().contains("LIMIT"));
    }

    #[test]
    fn parse_datetime_projection() {
        let stmt = parse_select("SELECT NOW() AS at FROM t");
        assert_eq!(
            stmt.projection[0],
            SelectItem::Expr {
                expr: Expr::DateTimeFn(DateTimeFnExpr {
                    func: DateTimeFunction::Now,
                    args: vec![],
                }),
                alias: Some("at".into()),
            }
        );
    }
}
