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

//! Syntax parser for subshells and brace groups

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::syntax::CompoundCommandKind;

impl Parser<'_> {
    /// Parses a subshell. The current token must be `(`.
    pub(super) fn subshell(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();
        let body = self.command_list()?;
        if body.is_empty() {
            let found = self.peek().value.clone();
            return Err(self.error(SyntaxError::UnexpectedToken {
                found,
                expected: Some("a command".to_string()),
            }));
        }
        if self.accept(TokenKind::CloseParen).is_none() {
            return Err(self.error(SyntaxError::UnclosedSubshell { opening: open.span }));
        }
        Ok(CompoundCommandKind::Subshell(body))
    }

    /// Parses a brace group. The current token must be `{`.
    pub(super) fn brace_group(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();
        let body = self.command_list()?;
        if body.is_empty() {
            let found = self.peek().value.clone();
            return Err(self.error(SyntaxError::UnexpectedToken {
                found,
                expected: Some("a command".to_string()),
            }));
        }
        if self.accept(TokenKind::CloseBrace).is_none() {
            return Err(self.error(SyntaxError::UnclosedBraceGroup { opening: open.span }));
        }
        Ok(CompoundCommandKind::BraceGroup(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_compound(
        source: &str,
        config: &ParserConfig,
    ) -> Result<crate::syntax::CompoundCommand> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.compound_command()
    }

    #[test]
    fn subshell() {
        let config = ParserConfig::new();
        let compound = parse_compound("(cd /tmp; ls)", &config).unwrap();
        assert_matches!(&compound.kind, CompoundCommandKind::Subshell(body) => {
            assert_eq!(body.statements.len(), 2);
        });
    }

    #[test]
    fn brace_group_with_redirect() {
        let config = ParserConfig::new();
        let compound = parse_compound("{ echo a; echo b; } > log", &config).unwrap();
        assert_matches!(&compound.kind, CompoundCommandKind::BraceGroup(body) => {
            assert_eq!(body.statements.len(), 2);
        });
        assert_eq!(compound.redirects.len(), 1);
    }

    #[test]
    fn unclosed_subshell() {
        let config = ParserConfig::new();
        let error = parse_compound("(echo hi", &config).unwrap_err();
        assert_matches!(error.cause, SyntaxError::UnclosedSubshell { .. });
    }

    #[test]
    fn unclosed_brace_group() {
        let config = ParserConfig::new();
        let error = parse_compound("{ echo hi;", &config).unwrap_err();
        assert_eq!(error.code(), "E032");
    }

    #[test]
    fn empty_subshell_is_an_error() {
        let config = ParserConfig::new();
        let error = parse_compound("()", &config).unwrap_err();
        assert_eq!(error.code(), "E080");
    }
}
