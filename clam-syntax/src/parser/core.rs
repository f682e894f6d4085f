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

//! Fundamentals for implementing the parser
//!
//! [`Parser`] owns the token stream for the duration of parsing and holds
//! the shared state the grammar rules operate on: the cursor, the scope
//! stack, context flags, the here-document registry, and the error buffer.
//! Panic-mode recovery lives here as well: on a collected error the parser
//! skips to the next statement boundary and resumes.

use super::error::{Error, ParseReport, SyntaxError, suggest};
use crate::config::ParserConfig;
use crate::lexer::{HeredocMap, Keyword, Token, TokenKind};
use crate::source::SourceCode;

/// Entire result of parsing one construct
pub(super) type Result<T> = std::result::Result<T, Error>;

/// What kind of construct a scope-stack entry represents
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum ScopeKind {
    Function,
    Loop,
    Conditional,
}

/// The shell syntax parser
///
/// A parser consumes the token stream produced by
/// [`tokenize`](crate::lexer::tokenize) and builds the AST. Use
/// [`parse`](super::parse) rather than driving this type directly.
#[derive(Debug)]
#[must_use = "Parser must be used to parse syntax"]
pub struct Parser<'a> {
    pub(super) tokens: Vec<Token>,
    pub(super) index: usize,
    pub(super) config: &'a ParserConfig,
    pub(super) heredocs: HeredocMap,
    pub(super) report: ParseReport,
    pub(super) scopes: Vec<ScopeKind>,
    /// Set inside `[[ ... ]]`
    pub(super) in_test_expr: bool,
    /// Set inside `((...))` and C-style `for` headers
    pub(super) in_arithmetic: bool,
    /// Set while collecting a case pattern list
    pub(super) in_case_pattern: bool,
    /// Set while parsing a function body
    pub(super) in_function_body: bool,
    /// Block keyword that would indicate a missing separator, with the
    /// construct that expects it; consulted by the simple-command rule
    pub(super) pending_block: Option<(Keyword, Keyword)>,
    pub(super) source: Option<SourceCode>,
    /// Set when `max_errors` is exceeded; stops further parsing
    pub(super) fatal: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a token stream.
    ///
    /// The stream is expected to end with an `Eof` token, as produced by
    /// the lexer; one is appended if missing so the cursor always has a
    /// token to rest on.
    pub fn new(tokens: Vec<Token>, heredocs: HeredocMap, config: &'a ParserConfig) -> Self {
        let mut tokens = tokens;
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(
                TokenKind::Eof,
                "",
                crate::source::Span::new(end, end),
            ));
        }
        Parser {
            tokens,
            index: 0,
            config,
            heredocs,
            report: ParseReport::default(),
            scopes: Vec::new(),
            in_test_expr: false,
            in_arithmetic: false,
            in_case_pattern: false,
            in_function_body: false,
            pending_block: None,
            source: None,
            fatal: false,
        }
    }

    /// Provides the source text so errors can carry caret snippets.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(SourceCode::new(source));
        self
    }

    /// Returns a reference to the current token.
    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub(super) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Returns a reference to the token `offset` positions ahead.
    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.index + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consumes and returns the current token. The cursor never moves past
    /// the final `Eof` token.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    /// Tests whether the cursor is at the end of input.
    pub(super) fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Tests whether the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Skips newline tokens.
    pub(super) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skips newline and semicolon tokens.
    pub(super) fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Returns the end offset of the last consumed token, or of the
    /// current token when nothing was consumed yet.
    pub(super) fn previous_end(&self) -> usize {
        if self.index == 0 {
            self.peek().span.start
        } else {
            self.tokens[self.index - 1].span.end
        }
    }

    /// Builds a located error at the current token, enriching the
    /// suggestion with typo and context hints.
    pub(super) fn error(&self, cause: SyntaxError) -> Error {
        self.error_at_index(cause, self.index)
    }

    fn error_at_index(&self, cause: SyntaxError, index: usize) -> Error {
        let index = index.min(self.tokens.len() - 1);
        let token = &self.tokens[index];
        let context: Vec<String> = self.tokens[..index]
            .iter()
            .rev()
            .filter(|t| t.kind != TokenKind::Newline)
            .take(3)
            .map(|t| t.value.clone())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let mut suggestion = cause.suggestion();
        if let SyntaxError::UnexpectedToken { found, expected } = &cause {
            if let Some(hint) = suggest::typo_hint(found) {
                suggestion = Some(hint);
            } else if let Some(hint) = expected
                .as_deref()
                .zip(context.last())
                .and_then(|(expected, last)| suggest::missing_token_hint(expected, last))
            {
                suggestion = Some(hint);
            } else if let Some(hint) = suggest::context_hint(&context) {
                suggestion = Some(hint);
            }
        }

        Error {
            cause,
            span: token.span,
            line: token.line,
            column: token.column,
            suggestion,
            context,
            snippet: self.source.as_ref().map(|s| s.snippet(token.span)),
        }
    }

    /// Records a collected error, tripping the fatal flag when the
    /// configured `max_errors` is reached.
    pub(super) fn record(&mut self, error: Error) {
        if self.report.errors.len() + 1 >= self.config.max_errors {
            self.fatal = true;
        }
        self.report.errors.push(error);
    }

    /// Records a relaxed-check warning.
    pub(super) fn warn(&mut self, error: Error) {
        self.report.warnings.push(error);
    }

    /// Panic-mode recovery: skips tokens until a statement boundary.
    ///
    /// The boundary tokens are `;`, newline, and the block-closing keywords
    /// `fi`, `done`, `esac`, and `}`. Separators are consumed; closers are
    /// left for the enclosing rule to match.
    pub(super) fn synchronize(&mut self) {
        use TokenKind::*;
        loop {
            match self.peek_kind() {
                Eof | Fi | Done | Esac | CloseBrace | CloseParen | DoubleSemicolon
                | SemicolonAmp | AmpSemicolon => return,
                Semicolon | Newline => {
                    self.skip_separators();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Pushes a scope-stack entry for the duration of a construct.
    pub(super) fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(kind);
    }

    /// Pops the innermost scope-stack entry.
    pub(super) fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Counts enclosing loops.
    pub(super) fn loop_depth(&self) -> usize {
        self.scopes
            .iter()
            .filter(|&&s| s == ScopeKind::Loop)
            .count()
    }

    /// Counts enclosing functions.
    pub(super) fn function_depth(&self) -> usize {
        self.scopes
            .iter()
            .filter(|&&s| s == ScopeKind::Function)
            .count()
    }
}
