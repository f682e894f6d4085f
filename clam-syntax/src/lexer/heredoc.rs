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

//! Here-document registration and body collection
//!
//! When the driver sees `<<` or `<<-` it registers a pending here-document
//! keyed by a fresh identifier that is stamped into the operator token's
//! metadata. After the next newline token, the driver consumes source lines
//! up to (and not including) the delimiter line and stores the body in the
//! [`HeredocMap`]. Bodies are never tokenised. Multiple pending
//! here-documents are collected in FIFO order.

use super::Lexer;
use super::core::LexDiagnostic;
use super::token::{LexErrorKind, LexerError};
use crate::source::Span;
use std::collections::HashMap;

/// Collected body of one here-document
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HeredocBody {
    /// Body text; ends with a newline unless empty
    pub content: String,
    /// Whether the delimiter was quoted, suppressing expansions in the body
    pub quoted: bool,
    /// The delimiter word, unquoted
    pub delimiter: String,
    /// Whether leading tabs were stripped (`<<-`)
    pub remove_tabs: bool,
}

/// Map from the key stamped on a `<<`/`<<-` operator token to its body
pub type HeredocMap = HashMap<usize, HeredocBody>;

/// A here-document whose body has not been collected yet
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct PendingHeredoc {
    pub key: usize,
    pub delimiter: String,
    pub quoted: bool,
    pub remove_tabs: bool,
    /// Index of the operator token, for error attachment
    pub op_token_index: usize,
    pub op_span: Span,
}

impl Lexer<'_> {
    /// Registers a pending here-document for the operator token at
    /// `op_token_index` and stamps the fresh key into its metadata.
    pub(super) fn register_heredoc(
        &mut self,
        op_token_index: usize,
        delimiter: String,
        quoted: bool,
    ) {
        let key = self.next_heredoc_key;
        self.next_heredoc_key += 1;
        let op = &mut self.tokens[op_token_index];
        op.metadata.heredoc_key = Some(key);
        let remove_tabs = op.kind == super::token::TokenKind::HeredocStrip;
        self.pending_heredocs.push_back(PendingHeredoc {
            key,
            delimiter,
            quoted,
            remove_tabs,
            op_token_index,
            op_span: op.span,
        });
    }

    /// Collects the bodies of all pending here-documents from the current
    /// position, in FIFO order.
    pub(super) fn collect_heredoc_bodies(&mut self) {
        while let Some(pending) = self.pending_heredocs.pop_front() {
            let mut content = String::new();
            let mut terminated = false;
            while self.index < self.chars.len() {
                let mut line = String::new();
                while let Some(c) = self.peek() {
                    self.consume_char();
                    if c == '\n' {
                        break;
                    }
                    line.push(c);
                }
                let body_line = if pending.remove_tabs {
                    line.trim_start_matches('\t')
                } else {
                    &line[..]
                };
                if body_line == pending.delimiter {
                    terminated = true;
                    break;
                }
                content.push_str(body_line);
                content.push('\n');
            }
            if !terminated {
                let error = LexerError {
                    kind: LexErrorKind::UnclosedHeredoc,
                    message: format!(
                        "here-document delimited by `{}` is not closed",
                        pending.delimiter
                    ),
                    expected: Some(pending.delimiter.clone()),
                    suggestion: Some(format!(
                        "Add a line containing only `{}` to close the here-document",
                        pending.delimiter
                    )),
                };
                self.report.errors.push(LexDiagnostic {
                    code: Some("E022"),
                    message: error.message.clone(),
                    span: pending.op_span,
                    suggestion: error.suggestion.clone(),
                });
                self.tokens[pending.op_token_index].metadata.error = Some(error);
            }
            self.heredocs.insert(
                pending.key,
                HeredocBody {
                    content,
                    quoted: pending.quoted,
                    delimiter: pending.delimiter,
                    remove_tabs: pending.remove_tabs,
                },
            );
        }
    }
}
