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

//! Syntax parser for select loops
//!
//! `select` shares the shape of the traditional `for` loop: a variable, an
//! optional `in` word list, and a `do ... done` body.

use super::core::{Parser, Result};
use crate::lexer::{Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::syntax::CompoundCommandKind;

impl Parser<'_> {
    /// Parses a select loop. The current token must be the `select`
    /// reserved word.
    pub(super) fn select_loop(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();

        let name_token = self.peek().clone();
        if name_token.kind != TokenKind::Word {
            return Err(self.error(SyntaxError::MissingForVariable {
                found: name_token.value,
            }));
        }
        self.advance();
        let variable = name_token.value;
        self.skip_newlines();

        let items = if self.accept(TokenKind::In).is_some() {
            let mut items = Vec::new();
            while self.peek().is_word_like() {
                items.push(self.word()?);
            }
            Some(items)
        } else {
            None
        };

        let _ = self.accept(TokenKind::Semicolon);
        self.skip_newlines();

        if self.accept(TokenKind::Do).is_none() {
            return Err(self.error(SyntaxError::MissingDo {
                construct: Keyword::Select,
                opening: open.span,
            }));
        }

        let body = self.loop_body(Keyword::Select, open.span)?;
        Ok(CompoundCommandKind::Select {
            variable,
            items,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_select(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.select_loop()
    }

    #[test]
    fn select_with_items() {
        let config = ParserConfig::new();
        let kind = parse_select("select opt in red green; do echo $opt; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Select { variable, items, body } => {
            assert_eq!(variable, "opt");
            assert_eq!(items.unwrap().len(), 2);
            assert_eq!(body.statements.len(), 1);
        });
    }

    #[test]
    fn select_without_items() {
        let config = ParserConfig::new();
        let kind = parse_select("select opt; do echo; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Select { items, .. } => {
            assert!(items.is_none());
        });
    }

    #[test]
    fn unclosed_select() {
        let config = ParserConfig::new();
        let error = parse_select("select o in a; do echo;", &config).unwrap_err();
        assert_eq!(error.code(), "E005");
    }
}
