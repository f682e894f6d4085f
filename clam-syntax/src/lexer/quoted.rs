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

//! Part of the lexer that parses quoted strings
//!
//! Single quotes consume everything literally until the next single quote.
//! Double quotes honour backslash escapes and embedded expansions; the
//! token's content is decomposed into [parts](super::token::TokenPart). An
//! unclosed quote produces a best-effort token whose value runs from the
//! opening quote to the end of input, with an `UNCLOSED_QUOTE` error.

use super::Lexer;
use super::balance::skip_single_quote;
use super::token::{LexErrorKind, LexerError, Token, TokenKind, TokenPart};

fn unclosed_quote(quote: char) -> LexerError {
    let name = if quote == '\'' { "single" } else { "double" };
    LexerError {
        kind: LexErrorKind::UnclosedQuote,
        message: format!("the {name} quote is not closed"),
        expected: Some(quote.to_string()),
        suggestion: Some(format!("Add a closing {name} quote: {quote}text{quote}")),
    }
}

impl Lexer<'_> {
    /// Produces a quoted-string token. The current character must be a
    /// single or double quote.
    pub(super) fn quoted_token(&mut self, quote: char) -> Token {
        if quote == '\'' {
            self.single_quoted_token()
        } else {
            self.double_quoted_token()
        }
    }

    fn single_quoted_token(&mut self) -> Token {
        let start = self.index;
        match skip_single_quote(&self.chars, start + 1) {
            Some(end) => {
                self.index = end + 1;
                let content: String = self.chars[start + 1..end].iter().collect();
                let mut token =
                    Token::new(TokenKind::String, content.clone(), self.span_from(start));
                token.quote = Some('\'');
                token.parts.push(TokenPart::quoted_literal(content, '\''));
                token.metadata.quote_depth = 1;
                token
            }
            None => {
                self.index = self.chars.len();
                // The damaged token keeps the text from the opening quote
                // to the end of input.
                let content = self.text_from(start);
                let error = unclosed_quote('\'');
                self.report_lex_error("E050", &error, self.span_from(start));
                let mut token = Token::new(TokenKind::String, content, self.span_from(start));
                token.quote = Some('\'');
                token.metadata.error = Some(error);
                token
            }
        }
    }

    fn double_quoted_token(&mut self) -> Token {
        let start = self.index;
        self.index += 1;
        let mut parts: Vec<TokenPart> = Vec::new();
        let mut literal = String::new();
        let mut error = None;
        let mut closed = false;

        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.index += 1;
                    closed = true;
                    break;
                }
                '\\' => {
                    // Backslash only escapes characters that are special
                    // inside double quotes; otherwise it stays literal.
                    match self.peek_at(1) {
                        Some(next @ ('"' | '$' | '`' | '\\')) => {
                            literal.push(next);
                            self.index += 2;
                        }
                        Some(next) => {
                            literal.push('\\');
                            literal.push(next);
                            self.index += 2;
                        }
                        None => {
                            literal.push('\\');
                            self.index += 1;
                        }
                    }
                }
                '$' | '`' => {
                    if !literal.is_empty() {
                        parts.push(TokenPart::quoted_literal(std::mem::take(&mut literal), '"'));
                    }
                    let unit = self.scan_expansion_unit(c);
                    if unit.kind == super::token::TokenPartKind::Literal {
                        literal.push_str(&unit.text);
                    } else {
                        parts.push(TokenPart {
                            kind: unit.kind,
                            text: unit.text,
                            quoted: true,
                            quote_char: Some('"'),
                        });
                    }
                    if let Some(e) = unit.error {
                        error.get_or_insert(e);
                    }
                }
                _ => {
                    literal.push(c);
                    self.index += 1;
                }
            }
        }

        if !literal.is_empty() || (parts.is_empty() && closed) {
            parts.push(TokenPart::quoted_literal(literal, '"'));
        }

        if !closed && error.is_none() {
            error = Some(unclosed_quote('"'));
        }

        let value = if closed {
            parts.iter().map(|p| p.text.as_str()).collect()
        } else {
            self.text_from(start)
        };
        let mut token = Token::new(TokenKind::String, value, self.span_from(start));
        token.quote = Some('"');
        token.parts = parts;
        token.metadata.quote_depth = 1;
        if let Some(error) = error {
            match error.kind {
                LexErrorKind::UnclosedQuote => self.report_lex_error("E051", &error, token.span),
                _ => self.report_unclosed_expansion(&error, token.span),
            }
            token.metadata.error = Some(error);
        }
        token
    }
}
