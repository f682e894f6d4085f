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

//! Part of the lexer that parses operators
//!
//! Operators are matched longest-first by walking a static trie. A second
//! trie holds the comparison operators that are only recognised inside
//! `[[ ... ]]`, where `<` and `>` compare rather than redirect.

use super::token::TokenKind;

/// Trie data structure that defines a set of operator tokens.
///
/// This struct represents a node of the trie. A node is a sorted array of
/// [`Edge`]s.
#[derive(Copy, Clone, Debug)]
pub(super) struct Trie(&'static [Edge]);

/// Edge of a [`Trie`].
#[derive(Copy, Clone, Debug)]
pub(super) struct Edge {
    /// Character value of this edge.
    key: char,
    /// Token kind that is delimited after taking this edge if there are no
    /// longer matches.
    value: Option<TokenKind>,
    /// Sub-trie containing values for keys that have the common prefix.
    next: Trie,
}

impl Trie {
    /// Finds an edge for the given key.
    fn edge(&self, key: char) -> Option<&Edge> {
        self.0
            .binary_search_by_key(&key, |edge| edge.key)
            .ok()
            .map(|i| &self.0[i])
    }
}

/// Trie containing nothing.
const NONE: Trie = Trie(&[]);

/// Trie of the operators that start with `&`.
const AND: Trie = Trie(&[Edge {
    key: '&',
    value: Some(TokenKind::AndAnd),
    next: NONE,
}]);

/// Trie of the operators that start with `(`.
const OPEN_PAREN: Trie = Trie(&[Edge {
    key: '(',
    value: Some(TokenKind::DoubleOpenParen),
    next: NONE,
}]);

/// Trie of the operators that start with `)`.
const CLOSE_PAREN: Trie = Trie(&[Edge {
    key: ')',
    value: Some(TokenKind::DoubleCloseParen),
    next: NONE,
}]);

/// Trie of the operators that start with `;;`.
const SEMICOLON_SEMICOLON: Trie = Trie(&[Edge {
    key: '&',
    value: Some(TokenKind::AmpSemicolon),
    next: NONE,
}]);

/// Trie of the operators that start with `;`.
const SEMICOLON: Trie = Trie(&[
    Edge {
        key: '&',
        value: Some(TokenKind::SemicolonAmp),
        next: NONE,
    },
    Edge {
        key: ';',
        value: Some(TokenKind::DoubleSemicolon),
        next: SEMICOLON_SEMICOLON,
    },
]);

/// Trie of the operators that start with `<<`.
const LESS_LESS: Trie = Trie(&[
    Edge {
        key: '-',
        value: Some(TokenKind::HeredocStrip),
        next: NONE,
    },
    Edge {
        key: '<',
        value: Some(TokenKind::HereString),
        next: NONE,
    },
]);

/// Trie of the operators that start with `<`.
const LESS: Trie = Trie(&[
    Edge {
        key: '&',
        value: Some(TokenKind::RedirectDup),
        next: NONE,
    },
    Edge {
        key: '<',
        value: Some(TokenKind::Heredoc),
        next: LESS_LESS,
    },
]);

/// Trie of the operators that start with `>`.
const GREATER: Trie = Trie(&[
    Edge {
        key: '&',
        value: Some(TokenKind::RedirectDup),
        next: NONE,
    },
    Edge {
        key: '>',
        value: Some(TokenKind::RedirectAppend),
        next: NONE,
    },
]);

/// Trie of the operators that start with `|`.
const BAR: Trie = Trie(&[Edge {
    key: '|',
    value: Some(TokenKind::OrOr),
    next: NONE,
}]);

/// Trie containing all the ordinary operators.
pub(super) const OPERATORS: Trie = Trie(&[
    Edge {
        key: '\n',
        value: Some(TokenKind::Newline),
        next: NONE,
    },
    Edge {
        key: '&',
        value: Some(TokenKind::Ampersand),
        next: AND,
    },
    Edge {
        key: '(',
        value: Some(TokenKind::OpenParen),
        next: OPEN_PAREN,
    },
    Edge {
        key: ')',
        value: Some(TokenKind::CloseParen),
        next: CLOSE_PAREN,
    },
    Edge {
        key: ';',
        value: Some(TokenKind::Semicolon),
        next: SEMICOLON,
    },
    Edge {
        key: '<',
        value: Some(TokenKind::RedirectIn),
        next: LESS,
    },
    Edge {
        key: '>',
        value: Some(TokenKind::RedirectOut),
        next: GREATER,
    },
    Edge {
        key: '|',
        value: Some(TokenKind::Pipe),
        next: BAR,
    },
]);

/// Trie of the operators that start with `!` in test context.
const TEST_BANG: Trie = Trie(&[Edge {
    key: '=',
    value: Some(TokenKind::NotEqual),
    next: NONE,
}]);

/// Trie of the operators that start with `<` in test context.
const TEST_LESS: Trie = Trie(&[Edge {
    key: '=',
    value: Some(TokenKind::LessEqualTest),
    next: NONE,
}]);

/// Trie of the operators that start with `=` in test context.
const TEST_EQUAL: Trie = Trie(&[
    Edge {
        key: '=',
        value: Some(TokenKind::Equal),
        next: NONE,
    },
    Edge {
        key: '~',
        value: Some(TokenKind::RegexMatch),
        next: NONE,
    },
]);

/// Trie of the operators that start with `>` in test context.
const TEST_GREATER: Trie = Trie(&[Edge {
    key: '=',
    value: Some(TokenKind::GreaterEqualTest),
    next: NONE,
}]);

/// Trie of the comparison operators recognised inside `[[ ... ]]`.
pub(super) const TEST_OPERATORS: Trie = Trie(&[
    Edge {
        key: '!',
        value: None,
        next: TEST_BANG,
    },
    Edge {
        key: '<',
        value: Some(TokenKind::LessThanTest),
        next: TEST_LESS,
    },
    Edge {
        key: '=',
        value: Some(TokenKind::Equal),
        next: TEST_EQUAL,
    },
    Edge {
        key: '>',
        value: Some(TokenKind::GreaterThanTest),
        next: TEST_GREATER,
    },
]);

/// Tests whether the given character is the first character of an operator.
pub(super) fn is_operator_char(c: char) -> bool {
    OPERATORS.edge(c).is_some()
}

/// Matches the longest operator at `start`, returning its kind and length
/// in characters.
pub(super) fn match_operator(
    chars: &[char],
    start: usize,
    trie: &Trie,
) -> Option<(TokenKind, usize)> {
    let mut node = *trie;
    let mut best = None;
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        let Some(edge) = node.edge(c) else { break };
        i += 1;
        if let Some(kind) = edge.value {
            best = Some((kind, i - start));
        }
        node = edge.next;
    }
    best
}
