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

//! Syntax parser for the if command

use super::core::{Parser, Result};
use crate::lexer::{Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::syntax::{CompoundCommandKind, ElifClause};

impl Parser<'_> {
    /// Parses an if conditional construct. The current token must be the
    /// `if` reserved word.
    pub(super) fn if_command(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();

        let condition = self.condition_list(Keyword::Then, Keyword::If)?;
        if condition.is_empty() {
            return Err(self.error(SyntaxError::EmptyCondition {
                construct: Keyword::If,
            }));
        }
        if self.accept(TokenKind::Then).is_none() {
            return Err(self.error(SyntaxError::MissingThen { opening: open.span }));
        }

        let then_part = self.command_list()?;
        if then_part.is_empty() {
            return Err(self.error(SyntaxError::EmptyBody {
                construct: Keyword::Then,
            }));
        }

        let mut elif_parts = Vec::new();
        while self.accept(TokenKind::Elif).is_some() {
            let condition = self.condition_list(Keyword::Then, Keyword::Elif)?;
            if condition.is_empty() {
                return Err(self.error(SyntaxError::EmptyCondition {
                    construct: Keyword::Elif,
                }));
            }
            if self.accept(TokenKind::Then).is_none() {
                return Err(self.error(SyntaxError::MissingThen { opening: open.span }));
            }
            let body = self.command_list()?;
            if body.is_empty() {
                return Err(self.error(SyntaxError::EmptyBody {
                    construct: Keyword::Elif,
                }));
            }
            elif_parts.push(ElifClause { condition, body });
        }

        let else_part = if self.accept(TokenKind::Else).is_some() {
            let body = self.command_list()?;
            if body.is_empty() {
                return Err(self.error(SyntaxError::EmptyBody {
                    construct: Keyword::Else,
                }));
            }
            Some(body)
        } else {
            None
        };

        if self.accept(TokenKind::Fi).is_none() {
            return Err(self.error(SyntaxError::UnclosedIf { opening: open.span }));
        }

        Ok(CompoundCommandKind::If {
            condition,
            then_part,
            elif_parts,
            else_part,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_if(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.if_command()
    }

    #[test]
    fn minimal_if() {
        let config = ParserConfig::new();
        let kind = parse_if("if a; then b; fi", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::If { condition, then_part, elif_parts, else_part } => {
            assert_eq!(condition.statements.len(), 1);
            assert_eq!(then_part.statements.len(), 1);
            assert!(elif_parts.is_empty());
            assert!(else_part.is_none());
        });
    }

    #[test]
    fn if_with_elifs_and_else() {
        let config = ParserConfig::new();
        let kind = parse_if(
            "if a; then b; elif c; then d; elif e; then f; else g; fi",
            &config,
        )
        .unwrap();
        assert_matches!(kind, CompoundCommandKind::If { elif_parts, else_part, .. } => {
            assert_eq!(elif_parts.len(), 2);
            assert_eq!(elif_parts[0].condition.statements.len(), 1);
            assert_eq!(elif_parts[0].body.statements.len(), 1);
            assert!(else_part.is_some());
        });
    }

    #[test]
    fn newline_separators() {
        let config = ParserConfig::new();
        let kind = parse_if("if a\nthen\nb\nc\nfi", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::If { then_part, .. } => {
            assert_eq!(then_part.statements.len(), 2);
        });
    }

    #[test]
    fn missing_semicolon_before_then() {
        let config = ParserConfig::new();
        let error = parse_if("if true then echo hi fi", &config).unwrap_err();
        assert_eq!(error.code(), "E001");
        assert_eq!(error.suggestion.as_deref(), Some("Add ';' before 'then'"));
    }

    #[test]
    fn unclosed_if() {
        let config = ParserConfig::new();
        let error = parse_if("if a; then b;", &config).unwrap_err();
        assert_eq!(error.code(), "E004");
        assert_matches!(error.cause, SyntaxError::UnclosedIf { .. });
    }

    #[test]
    fn missing_then() {
        let config = ParserConfig::new();
        let error = parse_if("if a; b; fi", &config).unwrap_err();
        assert_matches!(error.cause, SyntaxError::MissingThen { .. });
    }

    #[test]
    fn empty_condition() {
        let config = ParserConfig::new();
        let error = parse_if("if ; then b; fi", &config).unwrap_err();
        assert_matches!(
            error.cause,
            SyntaxError::EmptyCondition {
                construct: Keyword::If
            }
        );
    }

    #[test]
    fn empty_then_body() {
        let config = ParserConfig::new();
        let error = parse_if("if a; then fi", &config).unwrap_err();
        assert_matches!(
            error.cause,
            SyntaxError::EmptyBody {
                construct: Keyword::Then
            }
        );
    }

    #[test]
    fn permissive_mode_repairs_missing_semicolon() {
        let config = ParserConfig::permissive();
        let output = tokenize("if true then echo hi; fi", &config);
        let mut parser = Parser::new(output.tokens, output.heredocs, &config);
        let kind = parser.if_command().unwrap();
        assert_matches!(kind, CompoundCommandKind::If { .. });
        assert_eq!(parser.report.warnings.len(), 1);
        assert_eq!(parser.report.warnings[0].code(), "E001");
    }
}
