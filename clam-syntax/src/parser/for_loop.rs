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

//! Syntax parser for for loops
//!
//! Both forms are parsed here: the traditional `for name [in words]` loop
//! and the C-style `for ((init; condition; update))` loop, distinguished
//! by the `((` that follows `for`.

use super::arith::ArithEnd;
use super::core::{Parser, Result, ScopeKind};
use crate::lexer::{Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::syntax::{CommandList, CompoundCommandKind, Word};

/// Tests whether a string is a valid variable name.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl Parser<'_> {
    /// Parses a for loop. The current token must be the `for` reserved
    /// word.
    pub(super) fn for_loop(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();

        if self.check(TokenKind::DoubleOpenParen) {
            return self.c_style_for(open.span);
        }

        let name_token = self.peek().clone();
        if name_token.kind != TokenKind::Word || !is_identifier(&name_token.value) {
            return Err(self.error(SyntaxError::MissingForVariable {
                found: name_token.value,
            }));
        }
        self.advance();
        let variable = name_token.value;
        self.skip_newlines();

        let items = if self.accept(TokenKind::In).is_some() {
            Some(self.for_loop_items()?)
        } else {
            None
        };

        let _ = self.accept(TokenKind::Semicolon);
        self.skip_newlines();

        if self.accept(TokenKind::Do).is_none() {
            return Err(self.error(SyntaxError::MissingDo {
                construct: Keyword::For,
                opening: open.span,
            }));
        }

        let body = self.loop_body(Keyword::For, open.span)?;
        Ok(CompoundCommandKind::For {
            variable,
            items,
            body,
        })
    }

    /// Parses the word list after `in`, watching for a `do` that reveals a
    /// missing separator.
    fn for_loop_items(&mut self) -> Result<Vec<Word>> {
        let mut items = Vec::new();
        loop {
            if self.peek_kind() == TokenKind::Word && self.peek().value == "do" {
                let cause = SyntaxError::MissingDoAfter {
                    construct: Keyword::For,
                };
                if self.config.relaxes_separators() {
                    let warning = self.error(cause);
                    self.warn(warning);
                    self.tokens[self.index].kind = TokenKind::Do;
                    break;
                }
                return Err(self.error(cause));
            }
            if !self.peek().is_word_like() {
                break;
            }
            items.push(self.word()?);
        }
        Ok(items)
    }

    /// Parses `do ... done` with the loop scope active.
    pub(super) fn loop_body(&mut self, construct: Keyword, opening: crate::source::Span) -> Result<CommandList> {
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
            return Err(self.error(SyntaxError::UnclosedLoop { construct, opening }));
        }
        Ok(body)
    }

    /// Parses the C-style form after the `for` keyword; the current token
    /// must be `((`.
    fn c_style_for(&mut self, opening: crate::source::Span) -> Result<CompoundCommandKind> {
        let open = self.advance();

        let (init, end) = self.arith_text(open.span, true)?;
        if end != ArithEnd::Semicolon {
            return Err(self.error(SyntaxError::UnexpectedToken {
                found: ")".repeat(2),
                expected: Some("';' in the for header".to_string()),
            }));
        }
        let (condition, end) = self.arith_text(open.span, true)?;
        if end != ArithEnd::Semicolon {
            return Err(self.error(SyntaxError::UnexpectedToken {
                found: ")".repeat(2),
                expected: Some("';' in the for header".to_string()),
            }));
        }
        let (update, _) = self.arith_text(open.span, false)?;

        let _ = self.accept(TokenKind::Semicolon);
        self.skip_newlines();
        if self.accept(TokenKind::Do).is_none() {
            return Err(self.error(SyntaxError::MissingDo {
                construct: Keyword::For,
                opening,
            }));
        }

        let body = self.loop_body(Keyword::For, opening)?;
        Ok(CompoundCommandKind::CStyleFor {
            init,
            condition,
            update,
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

    fn parse_for(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.for_loop()
    }

    #[test]
    fn traditional_for_with_items() {
        let config = ParserConfig::new();
        let kind = parse_for("for f in a b c; do echo $f; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::For { variable, items, body } => {
            assert_eq!(variable, "f");
            let items = items.unwrap();
            assert_eq!(items.len(), 3);
            assert_eq!(items[1].to_string(), "b");
            assert_eq!(body.statements.len(), 1);
        });
    }

    #[test]
    fn for_without_in_iterates_positional_parameters() {
        let config = ParserConfig::new();
        let kind = parse_for("for arg; do echo $arg; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::For { items, .. } => {
            assert!(items.is_none());
        });
    }

    #[test]
    fn for_items_keep_quote_information() {
        let config = ParserConfig::new();
        let kind = parse_for("for x in 'a b' c; do echo; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::For { items, .. } => {
            let items = items.unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].quote_char(), Some('\''));
            assert_eq!(items[1].quote_char(), None);
        });
    }

    #[test]
    fn c_style_for() {
        let config = ParserConfig::new();
        let kind =
            parse_for("for ((i=0; i<10; i++)); do echo $i; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::CStyleFor { init, condition, update, body } => {
            assert_eq!(init, "i=0");
            assert_eq!(condition, "i<10");
            assert_eq!(update, "i++");
            assert_eq!(body.statements.len(), 1);
        });
    }

    #[test]
    fn c_style_for_without_semicolon_before_do() {
        let config = ParserConfig::new();
        let kind = parse_for("for ((;;)) do :; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::CStyleFor { init, condition, update, .. } => {
            assert_eq!(init, "");
            assert_eq!(condition, "");
            assert_eq!(update, "");
        });
    }

    #[test]
    fn c_style_for_with_empty_condition_section() {
        let config = ParserConfig::new();
        let kind = parse_for("for ((i=0;;i++)); do echo; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::CStyleFor { init, condition, update, .. } => {
            assert_eq!(init, "i=0");
            assert_eq!(condition, "");
            assert_eq!(update, "i++");
        });
    }

    #[test]
    fn c_style_for_with_empty_update_section() {
        let config = ParserConfig::new();
        let kind = parse_for("for ((;i<3;)); do echo; done", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::CStyleFor { init, condition, update, .. } => {
            assert_eq!(init, "");
            assert_eq!(condition, "i<3");
            assert_eq!(update, "");
        });
    }

    #[test]
    fn invalid_for_variable() {
        let config = ParserConfig::new();
        let error = parse_for("for 1x in a; do :; done", &config).unwrap_err();
        assert_eq!(error.code(), "E082");
        assert_matches!(error.cause, SyntaxError::MissingForVariable { .. });
    }

    #[test]
    fn missing_do_in_for() {
        let config = ParserConfig::new();
        let error = parse_for("for x in a b do echo; done", &config).unwrap_err();
        assert_eq!(error.code(), "E002");
    }

    #[test]
    fn unclosed_for() {
        let config = ParserConfig::new();
        let error = parse_for("for x in a; do echo;", &config).unwrap_err();
        assert_eq!(error.code(), "E005");
    }
}
