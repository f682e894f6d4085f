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

//! Part of the lexer that recognises assignments
//!
//! Active only in command position. Three patterns are matched:
//! `NAME=VALUE`, compound `NAME op= VALUE` (`+=`, `-=`, `*=`, `/=`, `%=`,
//! `&=`, `|=`, `^=`, `<<=`, `>>=`), and `NAME[INDEX]=VALUE`. The value may
//! contain quoted regions and expansions, which are skipped as units. The
//! parsed name, operator, index, and value land in the token's
//! [`AssignmentMeta`].

use super::Lexer;
use super::balance::{
    find_matching, find_matching_double_paren, skip_backquote, skip_double_quote,
    skip_single_quote,
};
use super::core::is_blank;
use super::op::is_operator_char;
use super::token::{AssignOp, AssignmentMeta, SemanticType, Token, TokenPart};

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Lexer<'_> {
    /// Tries to recognise an assignment at the current position.
    ///
    /// Returns `None` without consuming anything when the text does not
    /// match an assignment pattern; the driver then falls through to the
    /// lower-priority recognisers.
    pub(super) fn try_assignment_token(&mut self) -> Option<Token> {
        let chars = &self.chars;
        let start = self.index;
        if !chars.get(start).copied().is_some_and(is_name_start) {
            return None;
        }

        let mut i = start + 1;
        while chars.get(i).copied().is_some_and(is_name_char) {
            i += 1;
        }
        let name: String = chars[start..i].iter().collect();

        let mut index_text = None;
        if chars.get(i) == Some(&'[') && self.config.allow_bash_arrays {
            let close = find_matching(chars, i + 1, '[', ']')?;
            index_text = Some(chars[i + 1..close].iter().collect::<String>());
            i = close + 1;
        }

        let operator = match *chars.get(i)? {
            '=' => {
                i += 1;
                AssignOp::Assign
            }
            c @ ('+' | '-' | '*' | '/' | '%' | '&' | '|' | '^') if chars.get(i + 1) == Some(&'=') => {
                i += 2;
                match c {
                    '+' => AssignOp::Plus,
                    '-' => AssignOp::Minus,
                    '*' => AssignOp::Mult,
                    '/' => AssignOp::Div,
                    '%' => AssignOp::Mod,
                    '&' => AssignOp::And,
                    '|' => AssignOp::Or,
                    _ => AssignOp::Xor,
                }
            }
            c @ ('<' | '>')
                if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&'=') =>
            {
                i += 3;
                if c == '<' {
                    AssignOp::Lshift
                } else {
                    AssignOp::Rshift
                }
            }
            _ => return None,
        };

        // Compound operators and subscripts only make sense for existing
        // variables; a plain `=` is always an assignment in command position.
        let value_start = i;
        let mut end_of_input_in_quotes = false;
        loop {
            let Some(&c) = chars.get(i) else { break };
            match c {
                '\\' => i += 2,
                '\'' => match skip_single_quote(chars, i + 1) {
                    Some(close) => i = close + 1,
                    None => {
                        i = chars.len();
                        end_of_input_in_quotes = true;
                    }
                },
                '"' => match skip_double_quote(chars, i + 1) {
                    Some(close) => i = close + 1,
                    None => {
                        i = chars.len();
                        end_of_input_in_quotes = true;
                    }
                },
                '`' => match skip_backquote(chars, i + 1) {
                    Some(close) => i = close + 1,
                    None => i = chars.len(),
                },
                '$' => i = self.skip_dollar_unit(i),
                '(' if i == value_start
                    && operator == AssignOp::Assign
                    && index_text.is_none()
                    && self.config.enable_arrays =>
                {
                    match find_matching(chars, i + 1, '(', ')') {
                        Some(close) => i = close + 1,
                        None => i = chars.len(),
                    }
                }
                c if is_blank(c) || c == '\n' || is_operator_char(c) => break,
                _ => i += 1,
            }
        }

        let chars = &self.chars;
        let i = i.min(chars.len());
        let value: String = chars[value_start..i].iter().collect();
        let lexeme: String = chars[start..i].iter().collect();
        self.index = i;

        let kind = if index_text.is_some() {
            super::token::TokenKind::ArrayAssignmentWord
        } else {
            operator.token_kind()
        };
        let mut token = Token::new(kind, lexeme.clone(), self.span_from(start));
        token.parts.push(TokenPart::literal(lexeme));
        token.metadata.semantic = Some(SemanticType::Assignment);
        token.metadata.assignment = Some(AssignmentMeta {
            name,
            operator,
            index: index_text,
            value,
        });
        if end_of_input_in_quotes {
            let error = super::token::LexerError {
                kind: super::token::LexErrorKind::UnclosedQuote,
                message: "the quote in the assignment value is not closed".to_string(),
                expected: None,
                suggestion: Some("Close the quote in the assignment value".to_string()),
            };
            self.report_lex_error("E050", &error, token.span);
            token.metadata.error = Some(error);
        }
        Some(token)
    }

    /// Skips a `$`-introduced unit inside an assignment value, returning
    /// the index just after it.
    fn skip_dollar_unit(&self, i: usize) -> usize {
        let chars = &self.chars;
        match chars.get(i + 1) {
            Some('{') => match find_matching(chars, i + 2, '{', '}') {
                Some(close) => close + 1,
                None => chars.len(),
            },
            Some('(') if chars.get(i + 2) == Some(&'(') => {
                match find_matching_double_paren(chars, i + 3) {
                    Some(close) => close + 1,
                    None => chars.len(),
                }
            }
            Some('(') => match find_matching(chars, i + 2, '(', ')') {
                Some(close) => close + 1,
                None => chars.len(),
            },
            _ => i + 1,
        }
    }
}
