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

//! Word construction
//!
//! Turns word-like tokens into [`Word`] AST nodes. Each token part becomes
//! a literal or expansion [`WordPart`]; the inner text of `${...}` is
//! matched against the parameter-expansion operators in a fixed order in
//! which longer operators precede their prefixes and `/#` precedes both
//! `/` and `#`.

use super::core::{Parser, Result};
use crate::lexer::{Token, TokenPart, TokenPartKind};
use crate::syntax::{Expansion, ParamOperator, ProcessSubstDirection, Word, WordPart};

/// Parameter-expansion operators in match order.
const PARAM_OPERATORS: [ParamOperator; 13] = [
    ParamOperator::SubstPrefix,
    ParamOperator::SubstSuffix,
    ParamOperator::SubstAll,
    ParamOperator::Subst,
    ParamOperator::RemovePrefixLong,
    ParamOperator::RemovePrefixShort,
    ParamOperator::RemoveSuffixLong,
    ParamOperator::RemoveSuffixShort,
    ParamOperator::UseDefault,
    ParamOperator::AssignDefault,
    ParamOperator::ErrorIfUnset,
    ParamOperator::UseAlternative,
    ParamOperator::Substring,
];

/// Parses the inner text of a `${...}` expansion.
///
/// `text` is the whole lexeme including the `${` and `}` delimiters; a
/// lexeme damaged by an unclosed brace is accepted without the suffix.
#[must_use]
pub(super) fn parse_parameter_expansion(text: &str) -> Expansion {
    let inner = text
        .strip_prefix("${")
        .map(|rest| rest.strip_suffix('}').unwrap_or(rest))
        .unwrap_or(text);

    // Length first: `${#parameter}`.
    if let Some(rest) = inner.strip_prefix('#') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Expansion::Parameter {
                parameter: rest.to_string(),
                operator: Some(ParamOperator::Length),
                word: None,
            };
        }
    }

    for operator in PARAM_OPERATORS {
        if let Some(index) = inner.find(operator.as_str()) {
            if index > 0 {
                let word = &inner[index + operator.as_str().len()..];
                return Expansion::Parameter {
                    parameter: inner[..index].to_string(),
                    operator: Some(operator),
                    word: Some(word.to_string()),
                };
            }
        }
    }

    Expansion::Parameter {
        parameter: inner.to_string(),
        operator: None,
        word: None,
    }
}

/// Converts one expansion token part into an [`Expansion`].
fn expansion_from_part(part: &TokenPart) -> Expansion {
    let text = part.text.as_str();
    match part.kind {
        TokenPartKind::Variable => Expansion::Variable {
            name: text.strip_prefix('$').unwrap_or(text).to_string(),
        },
        TokenPartKind::Parameter => parse_parameter_expansion(text),
        TokenPartKind::Command => Expansion::CommandSubst {
            command: text
                .strip_prefix("$(")
                .map(|rest| rest.strip_suffix(')').unwrap_or(rest))
                .unwrap_or(text)
                .to_string(),
            backquote: false,
        },
        TokenPartKind::Backquote => Expansion::CommandSubst {
            command: text
                .strip_prefix('`')
                .map(|rest| rest.strip_suffix('`').unwrap_or(rest))
                .unwrap_or(text)
                .to_string(),
            backquote: true,
        },
        TokenPartKind::Arithmetic => Expansion::Arithmetic {
            expression: text
                .strip_prefix("$((")
                .map(|rest| rest.strip_suffix("))").unwrap_or(rest))
                .unwrap_or(text)
                .to_string(),
        },
        TokenPartKind::ProcessSubIn | TokenPartKind::ProcessSubOut => Expansion::ProcessSubst {
            command: text[1..]
                .strip_prefix('(')
                .map(|rest| rest.strip_suffix(')').unwrap_or(rest))
                .unwrap_or(&text[1..])
                .to_string(),
            direction: if part.kind == TokenPartKind::ProcessSubIn {
                ProcessSubstDirection::In
            } else {
                ProcessSubstDirection::Out
            },
        },
        TokenPartKind::Literal => Expansion::Variable {
            name: text.to_string(),
        },
    }
}

/// Builds a [`Word`] from one word-like token.
///
/// Composite tokens carry one part per fused lexeme; keyword tokens used
/// as literal words carry no parts and fall back to their verbatim value.
#[must_use]
pub(super) fn build_word(token: &Token) -> Word {
    let mut parts = Vec::with_capacity(token.parts.len().max(1));
    if token.parts.is_empty() {
        parts.push(WordPart::Literal {
            text: token.value.clone(),
            quoted: token.quote.is_some(),
            quote_char: token.quote,
        });
    } else {
        for part in &token.parts {
            if part.kind == TokenPartKind::Literal {
                parts.push(WordPart::Literal {
                    text: part.text.clone(),
                    quoted: part.quoted,
                    quote_char: part.quote_char,
                });
            } else {
                parts.push(WordPart::Expansion {
                    expansion: expansion_from_part(part),
                    quote_char: part.quote_char,
                });
            }
        }
    }
    Word {
        parts,
        span: token.span,
    }
}

impl Parser<'_> {
    /// Consumes the current word-like token and builds its [`Word`].
    pub(super) fn word(&mut self) -> Result<Word> {
        let token = self.advance();
        Ok(build_word(&token))
    }

    /// Tokenizes embedded source text (such as the element list of an
    /// array initialisation) into words. Spans are shifted by
    /// `base_offset` so they point into the enclosing source.
    pub(super) fn words_from_source(&self, text: &str, base_offset: usize) -> Vec<Word> {
        let output = crate::lexer::tokenize(text, self.config);
        output
            .tokens
            .iter()
            .filter(|token| token.is_word_like())
            .map(|token| {
                let mut word = build_word(token);
                word.span.start += base_offset;
                word.span.end += base_offset;
                word
            })
            .collect()
    }
}
