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

//! Syntax parser for redirections
//!
//! Covers file redirections with optional descriptor prefixes, descriptor
//! duplication, here-documents (whose bodies were collected during lexing
//! and are attached here), and here-strings.

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::syntax::{DupDirection, DupTarget, Fd, HereDoc, RedirBody, RedirOp, Redirect};

/// Extracts the leading digits of an operator lexeme as a file descriptor.
fn fd_prefix(value: &str) -> Option<Fd> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok().map(Fd)
    }
}

impl Parser<'_> {
    /// Tests whether the current token starts a redirection.
    pub(super) fn at_redirect(&self) -> bool {
        self.peek_kind().is_redirect()
    }

    /// Parses one redirection. The current token must be a redirection
    /// operator.
    pub(super) fn redirect(&mut self) -> Result<Redirect> {
        let op = self.advance();
        let span_start = op.span;
        let fd = fd_prefix(&op.value);

        let body = match op.kind {
            TokenKind::RedirectIn => self.file_redirect_body(RedirOp::In)?,
            TokenKind::RedirectOut | TokenKind::RedirectErr => {
                self.file_redirect_body(RedirOp::Out)?
            }
            TokenKind::RedirectAppend | TokenKind::RedirectErrAppend => {
                self.file_redirect_body(RedirOp::Append)?
            }
            TokenKind::RedirectDup => self.dup_redirect_body(&op.value)?,
            TokenKind::Heredoc | TokenKind::HeredocStrip => self.heredoc_body(&op)?,
            TokenKind::HereString => {
                if !self.peek().is_word_like() {
                    return Err(self.error(SyntaxError::MissingRedirectTarget));
                }
                let word = self.word()?;
                RedirBody::HereString { word }
            }
            _ => {
                return Err(self.error(SyntaxError::UnexpectedToken {
                    found: op.value,
                    expected: Some("a redirection operator".to_string()),
                }));
            }
        };

        Ok(Redirect {
            fd,
            body,
            span: crate::source::Span::new(span_start.start, self.previous_end()),
        })
    }

    fn file_redirect_body(&mut self, operator: RedirOp) -> Result<RedirBody> {
        if !self.peek().is_word_like() {
            return Err(self.error(SyntaxError::MissingRedirectTarget));
        }
        let target = self.word()?;
        Ok(RedirBody::Normal { operator, target })
    }

    /// Decodes `>&N`, `<&N`, `N>&M`, `>&-`, and `<&-`. The lexer folds a
    /// directly-adjacent target into the operator lexeme; a separated
    /// target arrives as the next word.
    fn dup_redirect_body(&mut self, value: &str) -> Result<RedirBody> {
        let direction = if value.contains('<') {
            DupDirection::In
        } else {
            DupDirection::Out
        };
        let after_amp = value
            .split_once('&')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default();
        let target_text = if after_amp.is_empty() {
            if !self.peek().is_word_like() {
                return Err(self.error(SyntaxError::MissingRedirectTarget));
            }
            self.advance().value
        } else {
            after_amp
        };

        let target = if target_text == "-" {
            DupTarget::Close
        } else {
            match target_text.parse::<i32>() {
                Ok(fd) if fd >= 0 => DupTarget::Fd(Fd(fd)),
                _ => {
                    return Err(self.error(SyntaxError::InvalidFileDescriptor {
                        text: target_text,
                    }));
                }
            }
        };
        Ok(RedirBody::Dup { direction, target })
    }

    /// Attaches the here-document body collected by the lexer.
    fn heredoc_body(&mut self, op: &crate::lexer::Token) -> Result<RedirBody> {
        // The delimiter word follows the operator in the token stream.
        let delimiter_token = if self.peek().is_word_like() {
            Some(self.advance())
        } else {
            None
        };
        let body = op
            .metadata
            .heredoc_key
            .and_then(|key| self.heredocs.get(&key))
            .cloned();
        match body {
            Some(body) => Ok(RedirBody::HereDoc(HereDoc {
                delimiter: body.delimiter,
                quoted: body.quoted,
                remove_tabs: body.remove_tabs,
                content: body.content,
            })),
            None => {
                let delimiter = delimiter_token
                    .map(|t| t.value)
                    .unwrap_or_else(|| "?".to_string());
                Err(self.error(SyntaxError::UnclosedHereDocument { delimiter }))
            }
        }
    }

    /// Parses redirections following a compound command.
    pub(super) fn trailing_redirects(&mut self) -> Result<Vec<Redirect>> {
        let mut redirects = Vec::new();
        while self.at_redirect() {
            redirects.push(self.redirect()?);
        }
        Ok(redirects)
    }
}
