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

//! Fundamental building blocks for the lexical analyzer
//!
//! The [`Lexer`] walks the source text once, dispatching at each position to
//! the highest-priority recogniser whose first character matches: assignment
//! (command position only), operator, expansion, quoted string, and finally
//! word. A parallel state machine tracks command position, test and
//! arithmetic contexts, case patterns, and pending here-documents, and the
//! resulting contexts are written into each token's metadata.

use super::brackets::{BracketKind, BracketTracker};
use super::heredoc::{HeredocMap, PendingHeredoc};
use super::keyword::enters_command_position;
use super::op::{OPERATORS, TEST_OPERATORS, is_operator_char, match_operator};
use super::token::{
    LexErrorKind, LexerError, SemanticType, Token, TokenContext, TokenKind, TokenPart,
};
use crate::config::ParserConfig;
use crate::source::{SourceCode, Span};
use std::collections::VecDeque;

/// Returns true if the character is a blank character.
pub fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

/// One diagnostic produced during lexing
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LexDiagnostic {
    /// Stable error code, when the catalogue has one
    pub code: Option<&'static str>,
    pub message: String,
    pub span: Span,
    pub suggestion: Option<String>,
}

/// Validation result of the lexing phase
///
/// Lexing never aborts; everything it finds wrong lands here while the
/// token stream stays complete and best-effort.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LexReport {
    pub errors: Vec<LexDiagnostic>,
    pub warnings: Vec<LexDiagnostic>,
    pub notes: Vec<LexDiagnostic>,
}

impl LexReport {
    /// Tests whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Tests whether the report is completely empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.notes.is_empty()
    }
}

/// Lexical analyzer
///
/// A lexer owns the character buffer of one source text and produces the
/// complete token stream in a single pass. Use [`tokenize`](super::tokenize)
/// rather than driving this type directly.
pub struct Lexer<'a> {
    pub(super) config: &'a ParserConfig,
    pub(super) chars: Vec<char>,
    /// Byte offset of each character, plus a final entry holding the total
    /// length
    pub(super) offsets: Vec<usize>,
    pub(super) code: SourceCode,
    pub(super) index: usize,
    pub(super) tokens: Vec<Token>,
    pub(super) report: LexReport,
    pub(super) brackets: BracketTracker,
    pub(super) pending_heredocs: VecDeque<PendingHeredoc>,
    pub(super) heredocs: HeredocMap,
    pub(super) next_heredoc_key: usize,
    pub(super) command_position: bool,
    pub(super) in_test_expr: bool,
    pub(super) arith_depth: usize,
    pub(super) case_depth: usize,
    pub(super) in_case_pattern: bool,
    pub(super) pending_case_in: bool,
    pub(super) in_condition: bool,
    pub(super) function_pending: bool,
    pub(super) function_brace_depth: usize,
    pub(super) after_redirect: bool,
    pub(super) awaiting_heredoc_delim: Option<usize>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over the given source text.
    #[must_use]
    pub fn new(source: &str, config: &'a ParserConfig) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut offsets = Vec::with_capacity(chars.len() + 1);
        let mut offset = 0;
        for &c in &chars {
            offsets.push(offset);
            offset += c.len_utf8();
        }
        offsets.push(offset);
        Lexer {
            config,
            chars,
            offsets,
            code: SourceCode::new(source),
            index: 0,
            tokens: Vec::new(),
            report: LexReport::default(),
            brackets: BracketTracker::default(),
            pending_heredocs: VecDeque::new(),
            heredocs: HeredocMap::new(),
            next_heredoc_key: 0,
            command_position: true,
            in_test_expr: false,
            arith_depth: 0,
            case_depth: 0,
            in_case_pattern: false,
            pending_case_in: false,
            in_condition: false,
            function_pending: false,
            function_brace_depth: 0,
            after_redirect: false,
            awaiting_heredoc_delim: None,
        }
    }

    /// Peeks the character at the current position.
    pub(super) fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Peeks the character `n` positions ahead.
    pub(super) fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).copied()
    }

    /// Consumes the current character.
    pub(super) fn consume_char(&mut self) {
        self.index += 1;
    }

    /// Returns the text from the given character index to the current
    /// position.
    pub(super) fn text_from(&self, start: usize) -> String {
        self.chars[start..self.index.min(self.chars.len())]
            .iter()
            .collect()
    }

    /// Returns the byte span from the given character index to the current
    /// position.
    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(
            self.offsets[start],
            self.offsets[self.index.min(self.chars.len())],
        )
    }

    /// Appends a lexer error to the report.
    pub(super) fn report_lex_error(&mut self, code: &'static str, error: &LexerError, span: Span) {
        self.report.errors.push(LexDiagnostic {
            code: Some(code),
            message: error.message.clone(),
            span,
            suggestion: error.suggestion.clone(),
        });
    }

    /// Appends an unclosed-expansion error, picking the catalogue code from
    /// the expected closer.
    pub(super) fn report_unclosed_expansion(&mut self, error: &LexerError, span: Span) {
        let code = match error.expected.as_deref() {
            Some("}") => "E054",
            Some("))") => "E053",
            _ => "E052",
        };
        self.report_lex_error(code, error, span);
    }

    /// Skips blanks and line continuations, returning whether anything was
    /// skipped.
    fn skip_blanks(&mut self) -> bool {
        let start = self.index;
        loop {
            match self.peek() {
                Some(c) if is_blank(c) => self.index += 1,
                Some('\\') if self.peek_at(1) == Some('\n') => self.index += 2,
                _ => break,
            }
        }
        self.index != start
    }

    /// Skips a comment up to, but not including, the next newline.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.index += 1;
        }
    }

    /// Tests whether `#` at the current position starts a comment.
    ///
    /// A `#` begins a comment only at the start of a word; adjacent to a
    /// preceding word-like token it is literal.
    fn comment_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(prev) => {
                !(prev.is_word_like() || prev.kind.is_assignment())
                    || prev.span.end != self.offsets[self.index]
            }
        }
    }

    /// Runs the lexer to completion.
    pub(super) fn run(&mut self) {
        loop {
            let skipped = self.skip_blanks();
            let Some(c) = self.peek() else { break };
            if c == '#' && (skipped || self.comment_allowed()) {
                self.skip_comment();
                continue;
            }
            let token = self.dispatch(c);
            self.push_token(token);
        }
        self.finish();
    }

    /// Selects and runs the highest-priority recogniser for the character
    /// at the current position.
    fn dispatch(&mut self, c: char) -> Token {
        let start = self.index;

        if c == '\n' {
            self.index += 1;
            return Token::new(TokenKind::Newline, "\n", self.span_from(start));
        }

        if self.in_test_expr {
            if c == ']' && self.peek_at(1) == Some(']') {
                self.index += 2;
                return Token::new(TokenKind::DoubleCloseBracket, "]]", self.span_from(start));
            }
            if let Some((kind, len)) = match_operator(&self.chars, start, &TEST_OPERATORS) {
                self.index += len;
                return Token::new(kind, self.text_from(start), self.span_from(start));
            }
        }

        if self.command_position
            && c == '['
            && self.peek_at(1) == Some('[')
            && self.peek_at(2).is_none_or(|c| is_blank(c) || c == '\n')
            && self.config.allow_bash_conditionals
        {
            self.index += 2;
            return Token::new(TokenKind::DoubleOpenBracket, "[[", self.span_from(start));
        }

        if self.command_position && (c.is_alphabetic() || c == '_') {
            if let Some(token) = self.try_assignment_token() {
                return token;
            }
        }

        if c.is_ascii_digit() && matches!(self.peek_at(1), Some('<' | '>')) {
            return self.digit_redirect_token();
        }

        if (c == '<' || c == '>')
            && self.peek_at(1) == Some('(')
            && self.config.enable_process_substitution
            && !self.in_test_expr
        {
            return self.process_substitution_token(c);
        }

        if is_operator_char(c) {
            return self.operator_token();
        }

        if c == '$' || c == '`' {
            return self.expansion_token(c);
        }

        if c == '\'' || c == '"' {
            return self.quoted_token(c);
        }

        self.word_token()
    }

    /// Recognises an operator with longest-match over the operator trie.
    fn operator_token(&mut self) -> Token {
        let start = self.index;
        let Some((mut kind, mut len)) = match_operator(&self.chars, start, &OPERATORS) else {
            // The dispatcher only calls this when an operator character is
            // current, and every top-level trie edge carries a value.
            return self.word_token();
        };
        // Case terminators do not exist inside `((...))`; adjacent `;`
        // there are section separators, as in `for ((;;))`.
        if self.arith_depth > 0
            && matches!(
                kind,
                TokenKind::DoubleSemicolon | TokenKind::SemicolonAmp | TokenKind::AmpSemicolon
            )
        {
            kind = TokenKind::Semicolon;
            len = 1;
        }
        self.index += len;
        if kind == TokenKind::RedirectDup {
            self.consume_dup_target();
        }
        Token::new(kind, self.text_from(start), self.span_from(start))
    }

    /// Consumes the `N` or `-` that completes `>&N`, `<&N`, `>&-`, `<&-`.
    fn consume_dup_target(&mut self) {
        if self.peek() == Some('-') {
            self.index += 1;
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                // Stop if the digits are themselves a redirect prefix, as in
                // `>&2>err`.
                self.index += 1;
            }
        }
    }

    /// Recognises a redirect with a leading file-descriptor digit, such as
    /// `2>`, `2>>`, or `0<&3`.
    fn digit_redirect_token(&mut self) -> Token {
        let start = self.index;
        let digit = self.chars[start];
        self.index += 1;
        let Some((kind, len)) = match_operator(&self.chars, self.index, &OPERATORS) else {
            self.index = start;
            return self.word_token();
        };
        self.index += len;
        let kind = match kind {
            TokenKind::RedirectOut if digit == '2' => TokenKind::RedirectErr,
            TokenKind::RedirectAppend if digit == '2' => TokenKind::RedirectErrAppend,
            other => other,
        };
        if kind == TokenKind::RedirectDup {
            self.consume_dup_target();
        }
        Token::new(kind, self.text_from(start), self.span_from(start))
    }

    /// Recognises a word: a maximal run of characters that no other
    /// recogniser claims.
    fn word_token(&mut self) -> Token {
        let start = self.index;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.index += if self.peek_at(1).is_some() { 2 } else { 1 };
                continue;
            }
            if is_blank(c)
                || c == '\n'
                || is_operator_char(c)
                || c == '\''
                || c == '"'
                || c == '$'
                || c == '`'
            {
                break;
            }
            if self.in_test_expr && c == ']' && self.peek_at(1) == Some(']') && self.index > start {
                break;
            }
            self.index += 1;
        }
        if self.index == start {
            // No recogniser accepted this character; consume it so lexing
            // always makes progress.
            self.index += 1;
            let value = self.text_from(start);
            let error = LexerError {
                kind: LexErrorKind::UnrecognizedCharacter,
                message: format!("unrecognized character `{value}`"),
                expected: None,
                suggestion: None,
            };
            self.report.errors.push(LexDiagnostic {
                code: None,
                message: error.message.clone(),
                span: self.span_from(start),
                suggestion: None,
            });
            let mut token = Token::new(TokenKind::Word, value.clone(), self.span_from(start));
            token.parts.push(TokenPart::literal(value));
            token.metadata.error = Some(error);
            return token;
        }
        let value = self.text_from(start);
        let kind = if self.in_case_pattern {
            match value.as_str() {
                "*" => TokenKind::GlobStar,
                "?" => TokenKind::GlobQuestion,
                _ if value.len() >= 2 && value.starts_with('[') && value.ends_with(']') => {
                    TokenKind::GlobBracket
                }
                _ => TokenKind::Word,
            }
        } else {
            TokenKind::Word
        };
        let mut token = Token::new(kind, value.clone(), self.span_from(start));
        token.parts.push(TokenPart::literal(value));
        token
    }

    /// Applies contexts, tracks brackets and here-documents, advances the
    /// position state machine, and appends the token, fusing it with an
    /// adjacent word-like predecessor into a composite.
    fn push_token(&mut self, mut token: Token) {
        let (line, column) = self.code.line_column(token.span.start);
        token.line = line;
        token.column = column;

        let was_command_position = self.command_position;

        // A pending here-document operator captures the next word as its
        // delimiter.
        if let Some(op_index) = self.awaiting_heredoc_delim.take() {
            if token.is_word_like() {
                let delimiter = token.value.clone();
                let quoted = token.quote.is_some();
                self.register_heredoc(op_index, delimiter, quoted);
                token.metadata.contexts |= TokenContext::RedirectTarget;
            } else {
                let error = LexerError {
                    kind: LexErrorKind::MissingHeredocDelimiter,
                    message: "the here-document operator is missing its delimiter".to_string(),
                    expected: Some("delimiter word".to_string()),
                    suggestion: Some("Add a delimiter word after `<<`".to_string()),
                };
                let span = self.tokens[op_index].span;
                self.report_lex_error("E022", &error, span);
                self.tokens[op_index].metadata.error = Some(error);
            }
        }

        self.apply_contexts(&mut token, was_command_position);
        self.track_brackets(&mut token, was_command_position);

        if matches!(token.kind, TokenKind::Heredoc | TokenKind::HeredocStrip) {
            self.awaiting_heredoc_delim = Some(self.tokens.len());
        }

        self.advance_state(&token, was_command_position);

        let is_newline = token.kind == TokenKind::Newline;

        // Composite synthesis: adjacent word-like tokens fuse into one.
        if token.is_word_like() {
            if let Some(prev) = self.tokens.last_mut() {
                if prev.is_word_like() && prev.span.end == token.span.start {
                    prev.span.end = token.span.end;
                    prev.value.push_str(&token.value);
                    prev.parts.append(&mut token.parts);
                    prev.kind = TokenKind::Composite;
                    prev.metadata.contexts |= token.metadata.contexts;
                    if prev.quote != token.quote {
                        prev.quote = None;
                    }
                    if prev.metadata.error.is_none() {
                        prev.metadata.error = token.metadata.error;
                    }
                    return;
                }
            }
        }

        self.tokens.push(token);

        if is_newline && !self.pending_heredocs.is_empty() {
            self.collect_heredoc_bodies();
        }
    }

    /// Writes the current lexical contexts into the token metadata.
    fn apply_contexts(&mut self, token: &mut Token, was_command_position: bool) {
        if token.is_word_like() || token.kind.is_assignment() {
            if was_command_position {
                token.metadata.contexts |= TokenContext::CommandPosition;
            } else {
                token.metadata.contexts |= TokenContext::ArgumentPosition;
            }
        }
        if self.in_test_expr {
            token.metadata.contexts |= TokenContext::TestExpression;
        }
        if self.arith_depth > 0 {
            token.metadata.contexts |= TokenContext::ArithmeticExpression;
        }
        if self.in_case_pattern {
            token.metadata.contexts |= TokenContext::CasePattern;
        }
        if self.in_condition {
            token.metadata.contexts |= TokenContext::ConditionalExpression;
        }
        if self.function_brace_depth > 0 {
            token.metadata.contexts |= TokenContext::FunctionBody;
        }
        if self.after_redirect && token.is_word_like() {
            token.metadata.contexts |= TokenContext::RedirectTarget;
        }
        if token.kind.is_assignment() {
            token.metadata.contexts |= TokenContext::AssignmentRhs;
        }

        if token.metadata.semantic.is_none() {
            use TokenKind::*;
            token.metadata.semantic = match token.kind {
                Word | String => Some(SemanticType::Literal),
                Variable | CommandSub | CommandSubBacktick | ArithExpansion | ParamExpansion
                | ProcessSubIn | ProcessSubOut | Composite => Some(SemanticType::Expansion),
                GlobStar | GlobQuestion | GlobBracket => Some(SemanticType::Pattern),
                Newline | Semicolon | Eof => Some(SemanticType::Delimiter),
                kind if kind.is_redirect() => Some(SemanticType::Redirect),
                kind if kind.is_keyword() => Some(SemanticType::Keyword),
                _ => Some(SemanticType::Operator),
            };
        }
    }

    /// Pushes and pops the bracket stack, linking paired token indices.
    fn track_brackets(&mut self, token: &mut Token, was_command_position: bool) {
        use TokenKind::*;
        let index = self.tokens.len();
        match token.kind {
            OpenParen if !self.in_case_pattern => {
                self.brackets.open(BracketKind::Paren, index, token.span);
            }
            DoubleOpenParen => {
                self.brackets.open(BracketKind::DoubleParen, index, token.span);
                self.arith_depth += 1;
            }
            OpenBracket => self.brackets.open(BracketKind::Bracket, index, token.span),
            DoubleOpenBracket => {
                self.brackets
                    .open(BracketKind::DoubleBracket, index, token.span);
                self.in_test_expr = true;
            }
            CloseParen if self.in_case_pattern => {
                // Closes a pattern list, which has no tracked opener.
                self.in_case_pattern = false;
            }
            CloseParen => self.close_bracket(BracketKind::Paren, token, index),
            DoubleCloseParen => {
                self.close_bracket(BracketKind::DoubleParen, token, index);
                self.arith_depth = self.arith_depth.saturating_sub(1);
            }
            CloseBracket => self.close_bracket(BracketKind::Bracket, token, index),
            DoubleCloseBracket => {
                self.close_bracket(BracketKind::DoubleBracket, token, index);
                self.in_test_expr = false;
            }
            Word if was_command_position && token.value == "{" => {
                self.brackets.open(BracketKind::Brace, index, token.span);
            }
            Word if was_command_position && token.value == "}" => {
                self.close_bracket(BracketKind::Brace, token, index);
            }
            _ => {}
        }
    }

    fn close_bracket(&mut self, kind: BracketKind, token: &mut Token, index: usize) {
        match self.brackets.close(kind) {
            Ok(open) => {
                self.tokens[open.token_index].metadata.paired_with = Some(index);
                token.metadata.paired_with = Some(open.token_index);
            }
            Err(top) => {
                let (message, suggestion) = match top {
                    Some(open) => (
                        format!(
                            "unexpected `{}`; the innermost open {} expects `{}`",
                            token.value,
                            open.kind.describe(),
                            open.kind.expected_close(),
                        ),
                        Some(format!("Add `{}` first", open.kind.expected_close())),
                    ),
                    None => (
                        format!("`{}` without a matching opener", token.value),
                        Some(format!("Remove the `{}`", token.value)),
                    ),
                };
                let error = LexerError {
                    kind: LexErrorKind::UnmatchedBracket,
                    message,
                    expected: top.map(|open| open.kind.expected_close().to_string()),
                    suggestion,
                };
                self.report.errors.push(LexDiagnostic {
                    code: None,
                    message: error.message.clone(),
                    span: token.span,
                    suggestion: error.suggestion.clone(),
                });
                token.metadata.error = Some(error);
            }
        }
    }

    /// Advances the command-position machine and the case, condition, and
    /// function trackers.
    fn advance_state(&mut self, token: &Token, was_command_position: bool) {
        use TokenKind::*;

        if token.kind == Word {
            match token.value.as_str() {
                "case" if was_command_position => {
                    self.case_depth += 1;
                    self.pending_case_in = true;
                }
                "esac" if was_command_position => {
                    self.case_depth = self.case_depth.saturating_sub(1);
                    self.in_case_pattern = false;
                    self.pending_case_in = false;
                }
                "in" if self.pending_case_in => {
                    self.in_case_pattern = true;
                    self.pending_case_in = false;
                }
                "if" | "elif" | "while" | "until" if was_command_position => {
                    self.in_condition = true;
                }
                "then" | "do" if was_command_position => self.in_condition = false,
                "function" if was_command_position => self.function_pending = true,
                "{" if self.function_pending => {
                    self.function_pending = false;
                    self.function_brace_depth += 1;
                }
                "}" if was_command_position && self.function_brace_depth > 0 => {
                    self.function_brace_depth -= 1;
                }
                _ => {}
            }
        }

        if token.kind.is_case_terminator() && self.case_depth > 0 {
            self.in_case_pattern = true;
        }

        self.after_redirect =
            token.kind.is_redirect() && !matches!(token.kind, Heredoc | HeredocStrip);

        self.command_position = enters_command_position(token.kind, &token.value);
    }

    /// Emits the end-of-input token and the unclosed-delimiter diagnostics.
    fn finish(&mut self) {
        if !self.pending_heredocs.is_empty() {
            self.collect_heredoc_bodies();
        }

        let end = *self.offsets.last().unwrap_or(&0);
        let mut eof = Token::new(TokenKind::Eof, "", Span::new(end, end));
        let (line, column) = self.code.line_column(end);
        eof.line = line;
        eof.column = column;
        eof.metadata.semantic = Some(SemanticType::Delimiter);
        self.tokens.push(eof);

        let unclosed = std::mem::take(&mut self.brackets).finish();
        for open in unclosed {
            let error = LexerError {
                kind: LexErrorKind::UnmatchedBracket,
                message: format!(
                    "the {} opened here is not closed",
                    open.kind.describe()
                ),
                expected: Some(open.kind.expected_close().to_string()),
                suggestion: Some(format!(
                    "Add `{}` to close the {}",
                    open.kind.expected_close(),
                    open.kind.describe(),
                )),
            };
            let code = match open.kind {
                BracketKind::DoubleBracket => Some("E070"),
                BracketKind::Bracket => Some("E061"),
                BracketKind::Brace => Some("E032"),
                BracketKind::DoubleParen => Some("E053"),
                BracketKind::Paren => None,
            };
            self.report.errors.push(LexDiagnostic {
                code,
                message: error.message.clone(),
                span: open.span,
                suggestion: error.suggestion.clone(),
            });
            let token = &mut self.tokens[open.token_index];
            if token.metadata.error.is_none() {
                token.metadata.error = Some(error);
            }
        }
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("index", &self.index)
            .field("tokens", &self.tokens.len())
            .finish_non_exhaustive()
    }
}
