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

//! Syntax parser for function definition commands
//!
//! Both forms are recognised: `function NAME [()] body` and the POSIX
//! `NAME() body`. The body is a brace group or any other compound command;
//! its statements become the function's [`CommandList`].
//!
//! [`CommandList`]: crate::syntax::CommandList

use super::core::{Parser, Result, ScopeKind};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::{CommandList, FunctionDef, Redirect, Statement};

/// Tests whether a string is a valid function name.
fn is_function_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl Parser<'_> {
    /// Tests whether the current position starts a POSIX-style function
    /// definition: `NAME()` in command position.
    pub(super) fn is_posix_function_start(&self) -> bool {
        self.config.enable_functions
            && self.peek_kind() == TokenKind::Word
            && self.peek().is_command_position()
            && self.peek_at(1).kind == TokenKind::OpenParen
            && self.peek_at(2).kind == TokenKind::CloseParen
    }

    /// Parses a function definition command.
    pub(super) fn function_definition(&mut self) -> Result<FunctionDef> {
        let start = self.peek().span.start;

        let name = if self.accept(TokenKind::Function).is_some() {
            let token = self.peek().clone();
            if token.kind != TokenKind::Word {
                return Err(self.error(SyntaxError::InvalidFunctionName { name: token.value }));
            }
            self.advance();
            // The parentheses are optional after the `function` keyword.
            if self.accept(TokenKind::OpenParen).is_some()
                && self.accept(TokenKind::CloseParen).is_none()
            {
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: self.peek().value.clone(),
                    expected: Some("')'".to_string()),
                }));
            }
            token.value
        } else {
            let token = self.advance();
            if self.accept(TokenKind::OpenParen).is_none()
                || self.accept(TokenKind::CloseParen).is_none()
            {
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: self.peek().value.clone(),
                    expected: Some("'()'".to_string()),
                }));
            }
            token.value
        };

        if !is_function_name(&name) {
            return Err(self.error(SyntaxError::InvalidFunctionName { name }));
        }

        self.skip_newlines();

        let was_in_function = self.in_function_body;
        self.in_function_body = true;
        self.enter_scope(ScopeKind::Function);
        let body = self.function_body();
        self.exit_scope();
        self.in_function_body = was_in_function;
        let (body, redirects) = body?;

        Ok(FunctionDef {
            name,
            body,
            redirects,
            span: Span::new(start, self.previous_end()),
        })
    }

    /// Parses the function body: a brace group, or any other compound
    /// command wrapped in a single-statement list.
    fn function_body(&mut self) -> Result<(CommandList, Vec<Redirect>)> {
        match self.peek_kind() {
            TokenKind::OpenBrace => {
                let open = self.advance();
                let body = self.command_list()?;
                if self.accept(TokenKind::CloseBrace).is_none() {
                    return Err(self.error(SyntaxError::UnclosedBraceGroup { opening: open.span }));
                }
                let redirects = self.trailing_redirects()?;
                Ok((body, redirects))
            }
            TokenKind::If
            | TokenKind::While
            | TokenKind::Until
            | TokenKind::For
            | TokenKind::Case
            | TokenKind::Select
            | TokenKind::DoubleOpenBracket
            | TokenKind::DoubleOpenParen
            | TokenKind::OpenParen => {
                let compound = self.compound_command()?;
                let span = compound.span;
                let body = CommandList {
                    statements: vec![Statement::Compound(compound)],
                    span,
                };
                Ok((body, Vec::new()))
            }
            _ => Err(self.error(SyntaxError::MissingFunctionBody)),
        }
    }
}
