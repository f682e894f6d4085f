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

//! Syntax parser for arithmetic commands
//!
//! `((expression))` stores the expression text verbatim; the arithmetic
//! grammar itself is parsed by the evaluator at runtime. The collector
//! reassembles the text from the token values between `((` and the
//! matching `))`, which also restores `<` and `>` from their redirect
//! tokens to plain characters.

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::CompoundCommandKind;

/// What ended an arithmetic section
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum ArithEnd {
    /// `))` at depth zero
    Close,
    /// `;` at depth zero, when the caller asked to stop there
    Semicolon,
}

impl Parser<'_> {
    /// Parses a `((expression))` command. The current token must be `((`.
    pub(super) fn arithmetic_command(&mut self) -> Result<CompoundCommandKind> {
        let open = self.advance();
        let (expression, _) = self.arith_text(open.span, false)?;
        Ok(CompoundCommandKind::Arithmetic { expression })
    }

    /// Collects raw text until the `))` matching an already-consumed `((`,
    /// or until a top-level `;` when `stop_at_semicolon` is set.
    ///
    /// Token values are joined with a single space wherever the original
    /// spans have a gap.
    pub(super) fn arith_text(
        &mut self,
        opening: Span,
        stop_at_semicolon: bool,
    ) -> Result<(String, ArithEnd)> {
        let was_in_arithmetic = self.in_arithmetic;
        self.in_arithmetic = true;
        let result = self.arith_text_inner(opening, stop_at_semicolon);
        self.in_arithmetic = was_in_arithmetic;
        result
    }

    fn arith_text_inner(
        &mut self,
        opening: Span,
        stop_at_semicolon: bool,
    ) -> Result<(String, ArithEnd)> {
        let mut depth = 0usize;
        let mut text = String::new();
        let mut last_end: Option<usize> = None;

        loop {
            match self.peek_kind() {
                TokenKind::Eof => {
                    return Err(self.error(SyntaxError::UnclosedArithmetic { opening }));
                }
                TokenKind::DoubleCloseParen if depth == 0 => {
                    self.advance();
                    return Ok((text, ArithEnd::Close));
                }
                TokenKind::DoubleCloseParen if depth == 1 => {
                    // The first `)` closes an inner parenthesis and the
                    // second ends the construct.
                    let token = self.advance();
                    push_text(&mut text, &mut last_end, ")", token.span);
                    return Ok((text, ArithEnd::Close));
                }
                TokenKind::Semicolon if depth == 0 && stop_at_semicolon => {
                    self.advance();
                    return Ok((text, ArithEnd::Semicolon));
                }
                TokenKind::Newline => {
                    let token = self.advance();
                    push_text(&mut text, &mut last_end, " ", token.span);
                }
                kind => {
                    let token = self.advance();
                    match kind {
                        TokenKind::OpenParen => depth += 1,
                        TokenKind::CloseParen => depth = depth.saturating_sub(1),
                        TokenKind::DoubleOpenParen => depth += 2,
                        TokenKind::DoubleCloseParen => depth = depth.saturating_sub(2),
                        _ => {}
                    }
                    push_text(&mut text, &mut last_end, &token.value, token.span);
                }
            }
        }
    }
}

fn push_text(text: &mut String, last_end: &mut Option<usize>, value: &str, span: Span) {
    if let Some(end) = *last_end {
        if span.start > end && !text.ends_with(' ') && !value.starts_with(' ') {
            text.push(' ');
        }
    }
    if !(value == " " && text.ends_with(' ')) {
        text.push_str(value.trim_matches('\n'));
    }
    *last_end = Some(span.end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;
    use assert_matches::assert_matches;

    fn parse_arith(source: &str, config: &ParserConfig) -> Result<CompoundCommandKind> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.arithmetic_command()
    }

    #[test]
    fn simple_expression() {
        let config = ParserConfig::new();
        let kind = parse_arith("((x + 1))", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Arithmetic { expression } => {
            assert_eq!(expression, "x + 1");
        });
    }

    #[test]
    fn comparison_operators_are_restored() {
        let config = ParserConfig::new();
        let kind = parse_arith("((i<10))", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Arithmetic { expression } => {
            assert_eq!(expression, "i<10");
        });
    }

    #[test]
    fn nested_parentheses() {
        let config = ParserConfig::new();
        let kind = parse_arith("(((a+b) * c))", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Arithmetic { expression } => {
            assert_eq!(expression, "(a+b) * c");
        });
    }

    #[test]
    fn assignment_inside_arithmetic() {
        let config = ParserConfig::new();
        let kind = parse_arith("((i+=2))", &config).unwrap();
        assert_matches!(kind, CompoundCommandKind::Arithmetic { expression } => {
            assert_eq!(expression, "i+=2");
        });
    }

    #[test]
    fn unclosed_arithmetic() {
        let config = ParserConfig::new();
        let error = parse_arith("((x + 1", &config).unwrap_err();
        assert_eq!(error.code(), "E053");
        assert_matches!(error.cause, SyntaxError::UnclosedArithmetic { .. });
    }
}
