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

//! Part of the lexer that parses expansions
//!
//! On `$` this dispatches to `${...}`, `$((...))`, `$(...)`, or a bare
//! variable; backquotes become backtick command substitutions, and
//! `<(...)`/`>(...)` become process substitutions. Each form delegates to
//! the [balance](super::balance) scanners to find the matching closer,
//! honouring nested quotes and inner expansions. An unclosed expansion
//! yields a best-effort token whose metadata carries the structured error.

use super::Lexer;
use super::balance::{find_matching, find_matching_double_paren, skip_backquote};
use super::token::{LexErrorKind, LexerError, Token, TokenKind, TokenPart, TokenPartKind};

/// One scanned expansion lexeme
pub(super) struct ExpansionUnit {
    pub kind: TokenPartKind,
    /// Verbatim text including the introducer and delimiters
    pub text: String,
    pub error: Option<LexerError>,
}

/// Tests whether a character may start a variable name.
fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Tests whether a character may continue a variable name.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tests whether a character is a special parameter after `$`.
fn is_special_param(c: char) -> bool {
    matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!') || c.is_ascii_digit()
}

fn unclosed(expected: &str, what: &str) -> LexerError {
    LexerError {
        kind: LexErrorKind::UnclosedExpansion,
        message: format!("{what} is not closed"),
        expected: Some(expected.to_string()),
        suggestion: Some(format!("Add `{expected}` to close the {what}")),
    }
}

impl Lexer<'_> {
    /// Scans one expansion starting at the current position.
    ///
    /// `c` must be the character at the current position, either `$` or a
    /// backquote. On an unclosed expansion the rest of the input is
    /// consumed and the error is recorded in the returned unit.
    pub(super) fn scan_expansion_unit(&mut self, c: char) -> ExpansionUnit {
        let start = self.index;
        if c == '`' {
            return match skip_backquote(&self.chars, start + 1) {
                Some(end) => {
                    self.index = end + 1;
                    ExpansionUnit {
                        kind: TokenPartKind::Backquote,
                        text: self.text_from(start),
                        error: None,
                    }
                }
                None => {
                    self.index = self.chars.len();
                    ExpansionUnit {
                        kind: TokenPartKind::Backquote,
                        text: self.text_from(start),
                        error: Some(unclosed("`", "backquoted command substitution")),
                    }
                }
            };
        }

        match self.peek_at(1) {
            Some('{') => match find_matching(&self.chars, start + 2, '{', '}') {
                Some(end) => {
                    self.index = end + 1;
                    ExpansionUnit {
                        kind: TokenPartKind::Parameter,
                        text: self.text_from(start),
                        error: None,
                    }
                }
                None => {
                    self.index = self.chars.len();
                    ExpansionUnit {
                        kind: TokenPartKind::Parameter,
                        text: self.text_from(start),
                        error: Some(unclosed("}", "parameter expansion")),
                    }
                }
            },
            Some('(') if self.peek_at(2) == Some('(') && self.config.enable_arithmetic => {
                match find_matching_double_paren(&self.chars, start + 3) {
                    Some(end) => {
                        self.index = end + 1;
                        ExpansionUnit {
                            kind: TokenPartKind::Arithmetic,
                            text: self.text_from(start),
                            error: None,
                        }
                    }
                    None => {
                        self.index = self.chars.len();
                        ExpansionUnit {
                            kind: TokenPartKind::Arithmetic,
                            text: self.text_from(start),
                            error: Some(unclosed("))", "arithmetic expansion")),
                        }
                    }
                }
            }
            Some('(') => match find_matching(&self.chars, start + 2, '(', ')') {
                Some(end) => {
                    self.index = end + 1;
                    ExpansionUnit {
                        kind: TokenPartKind::Command,
                        text: self.text_from(start),
                        error: None,
                    }
                }
                None => {
                    self.index = self.chars.len();
                    ExpansionUnit {
                        kind: TokenPartKind::Command,
                        text: self.text_from(start),
                        error: Some(unclosed(")", "command substitution")),
                    }
                }
            },
            Some(next) if is_name_start(next) => {
                self.index = start + 2;
                while self.peek().is_some_and(is_name_char) {
                    self.index += 1;
                }
                ExpansionUnit {
                    kind: TokenPartKind::Variable,
                    text: self.text_from(start),
                    error: None,
                }
            }
            Some(next) if is_special_param(next) => {
                self.index = start + 2;
                ExpansionUnit {
                    kind: TokenPartKind::Variable,
                    text: self.text_from(start),
                    error: None,
                }
            }
            _ => {
                // A lone dollar is a literal.
                self.index = start + 1;
                ExpansionUnit {
                    kind: TokenPartKind::Literal,
                    text: "$".to_string(),
                    error: None,
                }
            }
        }
    }

    /// Produces a standalone expansion token.
    pub(super) fn expansion_token(&mut self, c: char) -> Token {
        let start = self.index;
        let unit = self.scan_expansion_unit(c);
        let kind = match unit.kind {
            TokenPartKind::Variable => TokenKind::Variable,
            TokenPartKind::Parameter => TokenKind::ParamExpansion,
            TokenPartKind::Command => TokenKind::CommandSub,
            TokenPartKind::Arithmetic => TokenKind::ArithExpansion,
            TokenPartKind::Backquote => TokenKind::CommandSubBacktick,
            TokenPartKind::ProcessSubIn => TokenKind::ProcessSubIn,
            TokenPartKind::ProcessSubOut => TokenKind::ProcessSubOut,
            TokenPartKind::Literal => TokenKind::Word,
        };
        let mut token = Token::new(kind, unit.text.clone(), self.span_from(start));
        token.parts.push(TokenPart {
            kind: unit.kind,
            text: unit.text,
            quoted: false,
            quote_char: None,
        });
        if let Some(error) = unit.error {
            self.report_unclosed_expansion(&error, token.span);
            token.metadata.error = Some(error);
        }
        token
    }

    /// Produces a `<(...)` or `>(...)` process-substitution token.
    ///
    /// The current character must be `<` or `>` and the next one `(`.
    pub(super) fn process_substitution_token(&mut self, c: char) -> Token {
        let start = self.index;
        let kind = if c == '<' {
            TokenPartKind::ProcessSubIn
        } else {
            TokenPartKind::ProcessSubOut
        };
        let error = match find_matching(&self.chars, start + 2, '(', ')') {
            Some(end) => {
                self.index = end + 1;
                None
            }
            None => {
                self.index = self.chars.len();
                Some(unclosed(")", "process substitution"))
            }
        };
        let text = self.text_from(start);
        let token_kind = if c == '<' {
            TokenKind::ProcessSubIn
        } else {
            TokenKind::ProcessSubOut
        };
        let mut token = Token::new(token_kind, text.clone(), self.span_from(start));
        token.parts.push(TokenPart {
            kind,
            text,
            quoted: false,
            quote_char: None,
        });
        if let Some(error) = error {
            self.report_unclosed_expansion(&error, token.span);
            token.metadata.error = Some(error);
        }
        token
    }
}
