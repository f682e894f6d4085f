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

//! Syntax parser for compound commands
//!
//! Dispatches to the construct parsers and attaches trailing redirections.
//! The execution context starts as [`Statement`]; the pipeline rule stamps
//! [`Pipeline`] on components of multi-command pipelines.
//!
//! [`Statement`]: crate::syntax::ExecutionContext::Statement
//! [`Pipeline`]: crate::syntax::ExecutionContext::Pipeline

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::{CompoundCommand, ExecutionContext};

impl Parser<'_> {
    /// Parses a compound command with its trailing redirections.
    pub(super) fn compound_command(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().span.start;
        let kind = match self.peek_kind() {
            TokenKind::If => self.if_command()?,
            TokenKind::While | TokenKind::Until => self.while_loop()?,
            TokenKind::For => self.for_loop()?,
            TokenKind::Case => self.case_command()?,
            TokenKind::Select => self.select_loop()?,
            TokenKind::DoubleOpenBracket => self.test_command()?,
            TokenKind::DoubleOpenParen => {
                if !self.config.allow_bash_arithmetic {
                    return Err(self.error(SyntaxError::UnexpectedToken {
                        found: "((".to_string(),
                        expected: Some("a command".to_string()),
                    }));
                }
                self.arithmetic_command()?
            }
            TokenKind::OpenParen => self.subshell()?,
            TokenKind::OpenBrace => self.brace_group()?,
            _ => {
                let token = self.peek();
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: token.value.clone(),
                    expected: Some("a compound command".to_string()),
                }));
            }
        };

        let redirects = self.trailing_redirects()?;
        Ok(CompoundCommand {
            kind,
            redirects,
            execution_context: ExecutionContext::Statement,
            background: false,
            span: Span::new(start, self.previous_end()),
        })
    }
}
