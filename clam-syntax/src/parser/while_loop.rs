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

//! Syntax parser for while and until loops

use super::core::{Parser, Result, ScopeKind};
use crate::lexer::{Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::syntax::CompoundCommandKind;

impl Parser<'_> {
    /// Parses a while or until loop. The current token must be the `while`
    /// or `until` reserved word.
    pub(super) fn while_loop(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();
        let construct = if open.kind == TokenKind::While {
            Keyword::While
        } else {
            Keyword::Until
        };

        let condition = self.condition_list(Keyword::Do, construct)?;
        if condition.is_empty() {
            return Err(self.error(SyntaxError::EmptyCondition { construct }));
        }

        if self.accept(TokenKind::Do).is_none() {
            return Err(self.error(SyntaxError::MissingDo {
                construct,
                opening: open.span,
            }));
        }

        self.enter_scope(ScopeKind::Loop);
        let body = self.command_list();
        self.exit_scope();
        let body = body?;
        if body.is_empty() {
            return Err(self.error(SyntaxError::EmptyBody {
                construct: Keyword::Do,
            }));
        }

        if self.accept(TokenKind::Done).is_none() {
            return Err(self.error(SyntaxError::UnclosedLoop {
                construct,
                opening: open.span,
            }));
        }

        Ok(if construct == Keyword::While {
            CompoundCommandKind::While { condition, body }
        } else {
            CompoundCommandKind::Until { condition, body }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_loop(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.while_loop()
    }

    #[test]
    fn minimal_while() {
        let config = ParserConfig::new();
        let kind = parse_loop("while a; do b; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::While { condition, body } => {
            assert_eq!(condition.statements.len(), 1);
            assert_eq!(body.statements.len(), 1);
        });
    }

    #[test]
    fn minimal_until() {
        let config = ParserConfig::new();
        let kind = parse_loop("until a; do b; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Until { .. });
    }

    #[test]
    fn missing_do_in_while() {
        let config = ParserConfig::new();
        let error = parse_loop("while true do echo; done", &config).unwrap_err();
        assert_eq!(error.code(), "E003");
    }

    #[test]
    fn unclosed_while() {
        let config = ParserConfig::new();
        let error = parse_loop("while a; do b;", &config).unwrap_err();
        assert_eq!(error.code(), "E006");
        assert_matches!(
            error.cause,
            SyntaxError::UnclosedLoop {
                construct: Keyword::While,
                ..
            }
        );
    }

    #[test]
    fn empty_while_condition() {
        let config = ParserConfig::new();
        let error = parse_loop("while do b; done", &config).unwrap_err();
        assert_matches!(error.cause, SyntaxError::EmptyCondition { .. });
    }
}
