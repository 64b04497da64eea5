#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, vec};

use pesadb_ast::{expression::*, types::*};
use pesadb_core::Keyword;
use pesadb_lexer::{Token, Word};

use crate::{
    error::{parse_error, ParserError},
    parser::Parser,
};

impl Parser {
    /// Parses a new expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_subexpr(0)
    }

    /// Parses tokens until the precedence changes.
    pub(crate) fn parse_subexpr(&mut self, precedence: u8) -> Result<Expr, ParserError> {
        let mut expr = self.parse_prefix()?;
        loop {
            let next_precedence = self.next_precedence();
            if precedence >= next_precedence {
                break;
            }
            expr = self.parse_infix(Box::new(expr), next_precedence)?;
        }
        Ok(expr)
    }

    const OR_PREC: u8 = 5;
    const AND_PREC: u8 = 10;
    const UNARY_NOT_PREC: u8 = 15;
    const IS_PREC: u8 = 17;
    const COMPARISON_PREC: u8 = 20;

    /// Parses an expression prefix.
    fn parse_prefix(&mut self) -> Result<Expr, ParserError> {
        let token = match self.peek_token() {
            Some(token) => token.clone(),
            None => return self.expected("an expression", Option::<Token>::None),
        };
        match token {
            Token::Number(_) | Token::String(_) => Ok(Expr::Literal(self.parse_literal()?)),
            Token::Word(word) => match word.keyword {
                Some(Keyword::NULL) | Some(Keyword::TRUE) | Some(Keyword::FALSE) => {
                    Ok(Expr::Literal(self.parse_literal()?))
                }
                Some(Keyword::NOT) => {
                    self.next_token(); // consume the `NOT` keyword
                    Ok(Expr::Logical(LogicalExpr {
                        op: LogicalOp::Not,
                        operands: vec![self.parse_subexpr(Self::UNARY_NOT_PREC)?],
                    }))
                }
                // `DATE(...)` and `TIME(...)` name datetime functions even
                // though their spellings are reserved as type names.
                Some(Keyword::DATE) if self.peek_nth_token(1) == Some(&Token::LeftParen) => {
                    self.parse_datetime_fn_expr(DateTimeFunction::Date)
                }
                Some(Keyword::TIME) if self.peek_nth_token(1) == Some(&Token::LeftParen) => {
                    self.parse_datetime_fn_expr(DateTimeFunction::Time)
                }
                Some(_) => self.expected("an expression", Some(Token::Word(word))),
                None => {
                    if self.peek_nth_token(1) == Some(&Token::LeftParen) {
                        if let Some(func) = AggregateFunction::from_name(&word.value) {
                            return self.parse_aggregate_expr(func);
                        }
                        if let Some(func) = DateTimeFunction::from_name(&word.value) {
                            return self.parse_datetime_fn_expr(func);
                        }
                    }
                    Ok(Expr::Column(self.parse_column_ref()?))
                }
            },
            Token::LeftParen => {
                self.next_token(); // consume `(`
                let expr = self.parse_expr()?;
                self.expect_token(&Token::RightParen)?;
                Ok(expr)
            }
            unexpected => self.expected("an expression", Some(unexpected)),
        }
    }

    /// Gets the precedence of the next token.
    fn next_precedence(&self) -> u8 {
        match self.peek_token() {
            Some(token) if token.is_keyword(Keyword::OR) => Self::OR_PREC,
            Some(token) if token.is_keyword(Keyword::AND) => Self::AND_PREC,
            Some(token) if token.is_keyword(Keyword::NOT) => {
                // The precedence of NOT varies depending on the keyword that
                // follows it: as a prefix of IN, BETWEEN or LIKE it takes on
                // their precedence; otherwise it is not an infix operator.
                match self.peek_nth_token(1) {
                    Some(token)
                        if token
                            .is_one_of_keywords(&[Keyword::IN, Keyword::BETWEEN, Keyword::LIKE])
                            .is_some() =>
                    {
                        Self::COMPARISON_PREC
                    }
                    _ => 0,
                }
            }
            Some(token) if token.is_keyword(Keyword::IS) => Self::IS_PREC,
            Some(token)
                if token
                    .is_one_of_keywords(&[Keyword::IN, Keyword::BETWEEN, Keyword::LIKE])
                    .is_some() =>
            {
                Self::COMPARISON_PREC
            }
            Some(
                Token::Equal
                | Token::NotEqual
                | Token::LessThan
                | Token::LessThanOrEqual
                | Token::GreaterThan
                | Token::GreaterThanOrEqual,
            ) => Self::COMPARISON_PREC,
            _ => 0,
        }
    }

    /// Parses an operator following an expression.
    fn parse_infix(&mut self, expr: Box<Expr>, precedence: u8) -> Result<Expr, ParserError> {
        let token = match self.next_token() {
            Some(token) => token,
            None => return self.expected("an expression infix", Option::<Token>::None),
        };

        let comparison_op = match &token {
            Token::Equal => Some(ComparisonOp::Equal),
            Token::NotEqual => Some(ComparisonOp::NotEqual),
            Token::LessThan => Some(ComparisonOp::Less),
            Token::LessThanOrEqual => Some(ComparisonOp::LessOrEqual),
            Token::GreaterThan => Some(ComparisonOp::Greater),
            Token::GreaterThanOrEqual => Some(ComparisonOp::GreaterOrEqual),
            _ => None,
        };
        if let Some(op) = comparison_op {
            let right = self.parse_subexpr(precedence)?;
            return Ok(Expr::Comparison(ComparisonExpr {
                op,
                left: expr,
                right: Box::new(right),
            }));
        }

        if let Token::Word(Word {
            keyword: Some(keyword),
            ..
        }) = token
        {
            match keyword {
                Keyword::AND => Ok(Expr::Logical(LogicalExpr {
                    op: LogicalOp::And,
                    operands: vec![*expr, self.parse_subexpr(precedence)?],
                })),
                Keyword::OR => Ok(Expr::Logical(LogicalExpr {
                    op: LogicalOp::Or,
                    operands: vec![*expr, self.parse_subexpr(precedence)?],
                })),
                Keyword::IS => {
                    let negated = self.parse_keyword(Keyword::NOT);
                    self.expect_keyword(Keyword::NULL)?;
                    Ok(Expr::IsNull(IsNullExpr { negated, expr }))
                }
                Keyword::NOT => {
                    if self.parse_keyword(Keyword::IN) {
                        self.parse_in(expr, true)
                    } else if self.parse_keyword(Keyword::BETWEEN) {
                        self.parse_between(expr, true)
                    } else if self.parse_keyword(Keyword::LIKE) {
                        self.parse_like(expr, true)
                    } else {
                        let found = self.peek_token().cloned();
                        self.expected("IN, BETWEEN or LIKE after NOT", found)
                    }
                }
                Keyword::IN => self.parse_in(expr, false),
                Keyword::BETWEEN => self.parse_between(expr, false),
                Keyword::LIKE => self.parse_like(expr, false),
                // Can only happen if `next_precedence` got out of sync with this function
                _ => parse_error(format!("No infix parser for token {}", keyword)),
            }
        } else {
            self.expected("an expression infix", Some(token))
        }
    }

    /// Parses the parens following the `[NOT] IN` operator,
    /// assuming the `[NOT] IN` keywords have already been consumed.
    fn parse_in(&mut self, expr: Box<Expr>, negated: bool) -> Result<Expr, ParserError> {
        self.expect_token(&Token::LeftParen)?;
        let list = self.parse_comma_separated(Parser::parse_expr)?;
        self.expect_token(&Token::RightParen)?;
        Ok(Expr::InList(InListExpr {
            expr,
            negated,
            list,
        }))
    }

    /// Parses `[NOT] BETWEEN <low> AND <high>`,
    /// assuming the `[NOT] BETWEEN` keywords have already been consumed.
    fn parse_between(&mut self, expr: Box<Expr>, negated: bool) -> Result<Expr, ParserError> {
        // Stop parsing subexpressions for <low> and <high> on tokens with
        // precedence lower than that of `BETWEEN`, such as `AND`.
        let low = self.parse_subexpr(Self::COMPARISON_PREC)?;
        self.expect_keyword(Keyword::AND)?;
        let high = self.parse_subexpr(Self::COMPARISON_PREC)?;
        Ok(Expr::Between(BetweenExpr {
            expr,
            negated,
            low: Box::new(low),
            high: Box::new(high),
        }))
    }

    /// Parses `[NOT] LIKE '<pattern>'`,
    /// assuming the `[NOT] LIKE` keywords have already been consumed.
    fn parse_like(&mut self, expr: Box<Expr>, negated: bool) -> Result<Expr, ParserError> {
        match self.next_token_if(|token| matches!(token, Token::String(_))) {
            Some(Token::String(pattern)) => Ok(Expr::Like(LikeExpr {
                expr,
                negated,
                pattern,
            })),
            _ => {
                let found = self.peek_token().cloned();
                self.expected("a string pattern after LIKE", found)
            }
        }
    }

    /// Parses a literal value.
    pub fn parse_literal(&mut self) -> Result<Literal, ParserError> {
        match self.next_token() {
            Some(Token::Number(number)) => Ok(Literal::Number(number)),
            Some(Token::String(string)) => Ok(Literal::String(string)),
            Some(token) if token.is_keyword(Keyword::TRUE) => Ok(Literal::Boolean(true)),
            Some(token) if token.is_keyword(Keyword::FALSE) => Ok(Literal::Boolean(false)),
            Some(token) if token.is_keyword(Keyword::NULL) => Ok(Literal::Null),
            found => self.expected("a literal value", found),
        }
    }

    /// Parses a column reference, optionally qualified (`table.column`).
    pub fn parse_column_ref(&mut self) -> Result<ColumnRef, ParserError> {
        let first = self.parse_identifier()?;
        if self.next_token_if_is(&Token::Period) {
            let column = self.parse_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::unqualified(first))
        }
    }

    /// Parses an aggregate call, assuming the function name is next.
    fn parse_aggregate_expr(&mut self, func: AggregateFunction) -> Result<Expr, ParserError> {
        self.next_token(); // consume the function name
        self.expect_token(&Token::LeftParen)?;
        let arg = if self.next_token_if_is(&Token::Asterisk) {
            if func != AggregateFunction::Count {
                return parse_error(format!(
                    "{}(*) is not valid, only COUNT(*) is allowed",
                    func
                ));
            }
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect_token(&Token::RightParen)?;
        Ok(Expr::Aggregate(AggregateExpr { func, arg }))
    }

    /// Parses a datetime function call, assuming the function name is next.
    fn parse_datetime_fn_expr(&mut self, func: DateTimeFunction) -> Result<Expr, ParserError> {
        self.next_token(); // consume the function name
        self.expect_token(&Token::LeftParen)?;
        let args = if self.peek_token() == Some(&Token::RightParen) {
            vec![]
        } else {
            self.parse_comma_separated(Parser::parse_expr)?
        };
        self.expect_token(&Token::RightParen)?;
        if args.len() != func.arity() {
            return parse_error(format!(
                "{}() takes {} argument(s), got {}",
                func,
                func.arity(),
                args.len()
            ));
        }
        Ok(Expr::DateTimeFn(DateTimeFnExpr { func, args }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expr {
        let mut parser = Parser::new_with_query(input).unwrap();
        let expr = parser.parse_expr().unwrap();
        assert_eq!(parser.peek_token(), None, "expression not fully consumed");
        expr
    }

    fn column(name: &str) -> Expr {
        Expr::Column(ColumnRef::unqualified(name))
    }

    fn number(value: &str) -> Expr {
        Expr::Literal(Literal::Number(value.into()))
    }

    #[test]
    fn parse_comparison() {
        assert_eq!(
            parse("age >= 18"),
            Expr::Comparison(ComparisonExpr {
                op: ComparisonOp::GreaterOrEqual,
                left: Box::new(column("age")),
                right: Box::new(number("18")),
            })
        );
    }

    #[test]
    fn parse_precedence_or_and() {
        // `a = 1 OR b = 2 AND c = 3` groups as `a = 1 OR (b = 2 AND c = 3)`.
        let expr = parse("a = 1 OR b = 2 AND c = 3");
        match expr {
            Expr::Logical(LogicalExpr {
                op: LogicalOp::Or,
                operands,
            }) => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    &operands[1],
                    Expr::Logical(LogicalExpr {
                        op: LogicalOp::And,
                        ..
                    })
                ));
            }
            other => panic!("expected OR at the top, got {:?}", other),
        }
    }

    #[test]
    fn parse_not_prefix_binds_tighter_than_and() {
        let expr = parse("NOT a = 1 AND b = 2");
        assert!(matches!(
            expr,
            Expr::Logical(LogicalExpr {
                op: LogicalOp::And,
                ..
            })
        ));
    }

    #[test]
    fn parse_is_null_variants() {
        assert_eq!(
            parse("email IS NULL"),
            Expr::IsNull(IsNullExpr {
                negated: false,
                expr: Box::new(column("email")),
            })
        );
        assert_eq!(
            parse("email IS NOT NULL"),
            Expr::IsNull(IsNullExpr {
                negated: true,
                expr: Box::new(column("email")),
            })
        );
    }

    #[test]
    fn parse_between_and_not_between() {
        assert_eq!(
            parse("age BETWEEN 25 AND 35"),
            Expr::Between(BetweenExpr {
                expr: Box::new(column("age")),
                negated: false,
                low: Box::new(number("25")),
                high: Box::new(number("35")),
            })
        );
        // The AND after the upper bound belongs to the enclosing expression.
        let expr = parse("age BETWEEN 25 AND 35 AND active = TRUE");
        assert!(matches!(
            expr,
            Expr::Logical(LogicalExpr {
                op: LogicalOp::And,
                ..
            })
        ));
        assert!(matches!(
            parse("age NOT BETWEEN 25 AND 35"),
            Expr::Between(BetweenExpr { negated: true, .. })
        ));
    }

    #[test]
    fn parse_in_list() {
        assert_eq!(
            parse("id IN (100, 200)"),
            Expr::InList(InListExpr {
                expr: Box::new(column("id")),
                negated: false,
                list: vec![number("100"), number("200")],
            })
        );
        assert!(matches!(
            parse("id NOT IN (1)"),
            Expr::InList(InListExpr { negated: true, .. })
        ));
    }

    #[test]
    fn parse_like_patterns() {
        assert_eq!(
            parse("name LIKE 'A%'"),
            Expr::Like(LikeExpr {
                expr: Box::new(column("name")),
                negated: false,
                pattern: "A%".into(),
            })
        );
        assert!(matches!(
            parse("name NOT LIKE '_bc'"),
            Expr::Like(LikeExpr { negated: true, .. })
        ));
        // LIKE requires a string literal pattern.
        let mut parser = Parser::new_with_query("name LIKE 5").unwrap();
        assert!(parser.parse_expr().is_err());
    }

    #[test]
    fn parse_aggregate_calls() {
        assert_eq!(
            parse("COUNT(*)"),
            Expr::Aggregate(AggregateExpr {
                func: AggregateFunction::Count,
                arg: None,
            })
        );
        assert_eq!(
            parse("AVG(salary)"),
            Expr::Aggregate(AggregateExpr {
                func: AggregateFunction::Avg,
                arg: Some(Box::new(column("salary"))),
            })
        );
        let mut parser = Parser::new_with_query("SUM(*)").unwrap();
        assert!(parser.parse_expr().is_err());
    }

    #[test]
    fn parse_datetime_functions() {
        assert_eq!(
            parse("NOW()"),
            Expr::DateTimeFn(DateTimeFnExpr {
                func: DateTimeFunction::Now,
                args: vec![],
            })
        );
        assert_eq!(
            parse("YEAR(created_at)"),
            Expr::DateTimeFn(DateTimeFnExpr {
                func: DateTimeFunction::Year,
                args: vec![column("created_at")],
            })
        );
        // DATE is a type keyword, but DATE( opens a function call.
        assert_eq!(
            parse("DATE(created_at)"),
            Expr::DateTimeFn(DateTimeFnExpr {
                func: DateTimeFunction::Date,
                args: vec![column("created_at")],
            })
        );
        let mut parser = Parser::new_with_query("DATEDIFF(a)").unwrap();
        assert!(parser.parse_expr().is_err());
    }

    #[test]
    fn parse_qualified_column() {
        assert_eq!(
            parse("users.id = 1"),
            Expr::Comparison(ComparisonExpr {
                op: ComparisonOp::Equal,
                left: Box::new(Expr::Column(ColumnRef::qualified("users", "id"))),
                right: Box::new(number("1")),
            })
        );
    }

    #[test]
    fn parse_parenthesized_groups() {
        // `(a = 1 OR b = 2) AND c = 3` keeps OR below AND.
        let expr = parse("(a = 1 OR b = 2) AND c = 3");
        match expr {
            Expr::Logical(LogicalExpr {
                op: LogicalOp::And,
                operands,
            }) => {
                assert!(matches!(
                    &operands[0],
                    Expr::Logical(LogicalExpr {
                        op: LogicalOp::Or,
                        ..
                    })
                ));
            }
            other => panic!("expected AND at the top, got {:?}", other),
        }
    }
}
