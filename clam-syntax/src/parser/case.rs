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

//! Syntax parser for case commands
//!
//! A case item is `[(] pattern (| pattern)* ) commands terminator`. The
//! terminators decide what happens after a matching body: `;;` stops,
//! `;&` falls through unconditionally, and `;;&` resumes pattern matching.
//! Reserved words are accepted as literal patterns in pattern position.

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::parser::word::build_word;
use crate::syntax::{CaseContinuation, CaseItem, CompoundCommandKind, Word};

impl Parser<'_> {
    /// Parses a case command. The current token must be the `case`
    /// reserved word.
    pub(super) fn case_command(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();

        if !self.peek().is_word_like() {
            return Err(self.error(SyntaxError::MissingCaseSubject));
        }
        let subject = self.word()?;
        self.skip_newlines();

        if self.accept(TokenKind::In).is_none() {
            return Err(self.error(SyntaxError::MissingInAfterCase { opening: open.span }));
        }
        self.skip_newlines();

        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.accept(TokenKind::Esac).is_some() {
                break;
            }
            if self.at_end() {
                return Err(self.error(SyntaxError::UnclosedCase { opening: open.span }));
            }
            items.push(self.case_item()?);
        }

        Ok(CompoundCommandKind::Case { subject, items })
    }

    fn case_item(&mut self) -> Result<CaseItem> {
        let _ = self.accept(TokenKind::OpenParen);

        let mut patterns = Vec::new();
        loop {
            patterns.push(self.pattern_word()?);
            if self.accept(TokenKind::Pipe).is_none() {
                break;
            }
        }

        if self.accept(TokenKind::CloseParen).is_none() {
            return Err(self.error(SyntaxError::UnexpectedToken {
                found: self.peek().value.clone(),
                expected: Some("')' after the pattern list".to_string()),
            }));
        }

        let was_in_case_pattern = self.in_case_pattern;
        self.in_case_pattern = false;
        let body = self.command_list();
        self.in_case_pattern = was_in_case_pattern;
        let body = body?;

        let continuation = if self.accept(TokenKind::DoubleSemicolon).is_some() {
            CaseContinuation::Break
        } else if self.accept(TokenKind::SemicolonAmp).is_some() {
            CaseContinuation::FallThrough
        } else if self.accept(TokenKind::AmpSemicolon).is_some() {
            CaseContinuation::Continue
        } else {
            // The last item may omit its terminator before `esac`.
            CaseContinuation::Break
        };

        Ok(CaseItem {
            patterns,
            body,
            continuation,
        })
    }

    /// Parses one pattern, accepting reserved words as literal patterns.
    fn pattern_word(&mut self) -> Result<Word> {
        self.in_case_pattern = true;
        let token = self.peek().clone();
        if token.is_word_like() || token.kind.is_keyword() {
            self.advance();
            self.in_case_pattern = false;
            Ok(build_word(&token))
        } else {
            self.in_case_pattern = false;
            Err(self.error(SyntaxError::MissingPattern))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_case(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.case_command()
    }

    #[test]
    fn single_item() {
        let config = ParserConfig::new();
        let kind = parse_case("case $x in a) echo a;; esac", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { subject, items } => {
            assert_eq!(subject.to_string(), "$x");
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].patterns.len(), 1);
            assert_eq!(items[0].continuation, CaseContinuation::Break);
        });
    }

    #[test]
    fn alternative_patterns_and_optional_paren() {
        let config = ParserConfig::new();
        let kind = parse_case("case $x in (a|b) echo ab;; *) echo other;; esac", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { items, .. } => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].patterns.len(), 2);
            assert_eq!(items[1].patterns[0].to_string(), "*");
        });
    }

    #[test]
    fn fall_through_and_continue_terminators() {
        let config = ParserConfig::new();
        let kind = parse_case(
            "case $x in a) echo a;& b) echo b;;& c) echo c;; esac",
            &config,
        )
        .unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { items, .. } => {
            assert_eq!(items[0].continuation, CaseContinuation::FallThrough);
            assert_eq!(items[1].continuation, CaseContinuation::Continue);
            assert_eq!(items[2].continuation, CaseContinuation::Break);
        });
    }

    #[test]
    fn keyword_as_pattern() {
        let config = ParserConfig::new();
        let kind = parse_case("case $x in if) echo kw;; esac", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { items, .. } => {
            assert_eq!(items[0].patterns[0].to_string(), "if");
        });
    }

    #[test]
    fn last_item_without_terminator() {
        let config = ParserConfig::new();
        let kind = parse_case("case $x in a) echo a\nesac", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { items, .. } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].continuation, CaseContinuation::Break);
        });
    }

    #[test]
    fn empty_item_bodies() {
        let config = ParserConfig::new();
        let kind = parse_case("case $x in a) ;; b) ;; esac", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Case { items, .. } => {
            assert_eq!(items.len(), 2);
            assert!(items[0].body.is_empty());
        });
    }

    #[test]
    fn missing_in_keyword() {
        let config = ParserConfig::new();
        let error = parse_case("case $x a) echo;; esac", &config).unwrap_err();
        assert_matches!(error.cause, SyntaxError::MissingInAfterCase { .. });
    }

    #[test]
    fn unclosed_case() {
        let config = ParserConfig::new();
        let error = parse_case("case $x in a) echo a;;", &config).unwrap_err();
        assert_eq!(error.code(), "E007");
    }

    #[test]
    fn missing_subject() {
        let config = ParserConfig::new();
        let error = parse_case("case in a) echo;; esac", &config).unwrap_err();
        assert_matches!(error.cause, SyntaxError::MissingCaseSubject);
    }
}
