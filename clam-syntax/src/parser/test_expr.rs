// This file is part of clam, a POSIX-compatible shell.
// Copyright (C) 2026 The clam developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Syntax parser for `[[ ... ]]` test expressions
//!
//! Grammar inside the brackets: `||` binds loosest, then `&&`, then `!`
//! and parenthesised groups, then binary and unary primaries. Inside the
//! brackets `<` and `>` compare strings; the lexer already classified them
//! as test operators.

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::syntax::{AndOr, CompoundCommandKind, TestExpr};

/// Unary test operators, from file tests to string and variable tests.
const UNARY_OPERATORS: [&str; 26] = [
    "-a", "-b", "-c", "-d", "-e", "-f", "-g", "-h", "-k", "-p", "-r", "-s", "-t", "-u", "-w",
    "-x", "-G", "-L", "-N", "-O", "-S", "-z", "-n", "-o", "-v", "-R",
];

/// Binary operators spelled as words.
const BINARY_WORD_OPERATORS: [&str; 9] = [
    "-eq", "-ne", "-lt", "-le", "-gt", "-ge", "-nt", "-ot", "-ef",
];

impl Parser<'_> {
    /// Parses a `[[ ... ]]` conditional. The current token must be `[[`.
    pub(super) fn test_command(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();

        let was_in_test_expr = self.in_test_expr;
        self.in_test_expr = true;
        let expr = self.test_or();
        self.in_test_expr = was_in_test_expr;
        let expr = expr?;

        self.skip_newlines();
        if self.accept(TokenKind::DoubleCloseBracket).is_none() {
            return Err(self.error(SyntaxError::UnclosedTestExpression { opening: open.span }));
        }
        Ok(CompoundCommandKind::Test(expr))
    }

    fn test_or(&mut self) -> Result<TestExpr> {
        let mut left = self.test_and()?;
        while self.accept(TokenKind::OrOr).is_some() {
            self.skip_newlines();
            let right = self.test_and()?;
            left = TestExpr::Compound {
                left: Box::new(left),
                op: AndOr::OrElse,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn test_and(&mut self) -> Result<TestExpr> {
        let mut left = self.test_primary()?;
        while self.accept(TokenKind::AndAnd).is_some() {
            self.skip_newlines();
            let right = self.test_primary()?;
            left = TestExpr::Compound {
                left: Box::new(left),
                op: AndOr::AndThen,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn test_primary(&mut self) -> Result<TestExpr> {
        self.skip_newlines();

        if self.check(TokenKind::Exclamation)
            || (self.peek_kind() == TokenKind::Word && self.peek().value == "!")
        {
            self.advance();
            let inner = self.test_primary()?;
            return Ok(TestExpr::Negated(Box::new(inner)));
        }

        if self.accept(TokenKind::OpenParen).is_some() {
            let inner = self.test_or()?;
            self.skip_newlines();
            if self.accept(TokenKind::CloseParen).is_none() {
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: self.peek().value.clone(),
                    expected: Some("')'".to_string()),
                }));
            }
            return Ok(inner);
        }

        if self.peek_kind() == TokenKind::Word
            && UNARY_OPERATORS.contains(&self.peek().value.as_str())
            && self.peek_at(1).is_word_like()
        {
            let operator = self.advance().value;
            let operand = self.word()?;
            return Ok(TestExpr::Unary { operator, operand });
        }

        if !self.peek().is_word_like() {
            let token = self.peek();
            return Err(if token.kind == TokenKind::DoubleCloseBracket {
                self.error(SyntaxError::UnexpectedToken {
                    found: token.value.clone(),
                    expected: Some("a test expression".to_string()),
                })
            } else {
                self.error(SyntaxError::InvalidTestOperator {
                    found: token.value.clone(),
                })
            });
        }
        let left = self.word()?;

        if let Some(operator) = self.binary_test_operator() {
            self.advance();
            if !self.peek().is_word_like() {
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: self.peek().value.clone(),
                    expected: Some("a word after the test operator".to_string()),
                }));
            }
            let right = self.word()?;
            return Ok(TestExpr::Binary {
                operator,
                left,
                right,
            });
        }

        // A bare word tests for a non-empty string.
        Ok(TestExpr::Unary {
            operator: "-n".to_string(),
            operand: left,
        })
    }

    /// Returns the binary operator at the cursor, if there is one.
    fn binary_test_operator(&self) -> Option<String> {
        use TokenKind::*;
        match self.peek_kind() {
            Equal | NotEqual | RegexMatch | LessThanTest | GreaterThanTest | LessEqualTest
            | GreaterEqualTest => Some(self.peek().value.clone()),
            Word if BINARY_WORD_OPERATORS.contains(&self.peek().value.as_str()) => {
                Some(self.peek().value.clone())
            }
            _ => None,
        }
    }
}
