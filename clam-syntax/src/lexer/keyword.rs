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

//! Reserved words and the keyword normalisation pass
//!
//! The primary tokenisation pass emits every word as a [`Word`] token. The
//! [`normalize_keywords`] pass then rewrites words to reserved-word kinds,
//! but only where they appear in command position. A word such as `then` in
//! argument position stays a plain word. `in` is special: it becomes a
//! keyword only after `for NAME`, `select NAME`, or `case WORD`.
//!
//! [`Word`]: TokenKind::Word

use super::token::{SemanticType, Token, TokenKind};
use crate::config::ParserConfig;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error value indicating that a string is not a keyword
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub struct ParseKeywordError;

impl fmt::Display for ParseKeywordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a keyword")
    }
}

/// Reserved words of the shell language
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Keyword {
    If,
    Then,
    Else,
    Elif,
    Fi,
    While,
    Until,
    Do,
    Done,
    For,
    In,
    Case,
    Esac,
    Select,
    Function,
    Break,
    Continue,
    Return,
}

impl Keyword {
    /// Returns the literal string representation of the keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            If => "if",
            Then => "then",
            Else => "else",
            Elif => "elif",
            Fi => "fi",
            While => "while",
            Until => "until",
            Do => "do",
            Done => "done",
            For => "for",
            In => "in",
            Case => "case",
            Esac => "esac",
            Select => "select",
            Function => "function",
            Break => "break",
            Continue => "continue",
            Return => "return",
        }
    }

    /// Returns the token kind for this keyword.
    #[must_use]
    pub const fn token_kind(self) -> TokenKind {
        use Keyword::*;
        match self {
            If => TokenKind::If,
            Then => TokenKind::Then,
            Else => TokenKind::Else,
            Elif => TokenKind::Elif,
            Fi => TokenKind::Fi,
            While => TokenKind::While,
            Until => TokenKind::Until,
            Do => TokenKind::Do,
            Done => TokenKind::Done,
            For => TokenKind::For,
            In => TokenKind::In,
            Case => TokenKind::Case,
            Esac => TokenKind::Esac,
            Select => TokenKind::Select,
            Function => TokenKind::Function,
            Break => TokenKind::Break,
            Continue => TokenKind::Continue,
            Return => TokenKind::Return,
        }
    }

    /// Determines if this keyword closes or continues a clause.
    ///
    /// Returns `true` for `then`, `else`, `elif`, `fi`, `do`, `done`, and
    /// `esac`.
    #[must_use]
    pub const fn is_clause_delimiter(self) -> bool {
        use Keyword::*;
        matches!(self, Then | Else | Elif | Fi | Do | Done | Esac)
    }

    /// Lists every keyword, for the typo suggester.
    pub const ALL: [Keyword; 18] = [
        Keyword::If,
        Keyword::Then,
        Keyword::Else,
        Keyword::Elif,
        Keyword::Fi,
        Keyword::While,
        Keyword::Until,
        Keyword::Do,
        Keyword::Done,
        Keyword::For,
        Keyword::In,
        Keyword::Case,
        Keyword::Esac,
        Keyword::Select,
        Keyword::Function,
        Keyword::Break,
        Keyword::Continue,
        Keyword::Return,
    ];
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ParseKeywordError;
    fn from_str(s: &str) -> Result<Keyword, ParseKeywordError> {
        use Keyword::*;
        match s {
            "if" => Ok(If),
            "then" => Ok(Then),
            "else" => Ok(Else),
            "elif" => Ok(Elif),
            "fi" => Ok(Fi),
            "while" => Ok(While),
            "until" => Ok(Until),
            "do" => Ok(Do),
            "done" => Ok(Done),
            "for" => Ok(For),
            "in" => Ok(In),
            "case" => Ok(Case),
            "esac" => Ok(Esac),
            "select" => Ok(Select),
            "function" => Ok(Function),
            "break" => Ok(Break),
            "continue" => Ok(Continue),
            "return" => Ok(Return),
            _ => Err(ParseKeywordError),
        }
    }
}

/// Looks up a word as a keyword, honouring the configured case rule.
fn keyword_for(value: &str, config: &ParserConfig) -> Option<Keyword> {
    if let Ok(keyword) = value.parse() {
        return Some(keyword);
    }
    if config.case_insensitive_keywords {
        if let Ok(keyword) = value.to_ascii_lowercase().parse() {
            return Some(keyword);
        }
    }
    None
}

/// Tests whether a token puts the next token in command position.
///
/// This drives the finite state machine shared by the lexer driver and the
/// normalisation pass. Word values are consulted because the primary pass
/// has not yet rewritten keywords.
pub(super) fn enters_command_position(kind: TokenKind, value: &str) -> bool {
    use TokenKind::*;
    match kind {
        Semicolon | Newline | AndAnd | OrOr | Pipe | DoubleSemicolon | SemicolonAmp
        | AmpSemicolon | OpenParen | CloseParen | OpenBrace | DoubleOpenParen
        | DoubleCloseParen | Ampersand => true,
        Then | Do | Else | Elif | Fi | Done | Esac | If | While | Until => true,
        Word => matches!(
            value,
            "if" | "then" | "else" | "elif" | "fi" | "while" | "until" | "do" | "done" | "esac"
                | "{" | "!"
        ),
        Exclamation => true,
        _ => false,
    }
}

/// Rewrites command-position words to reserved-word kinds.
///
/// The pass preserves token count, spans, and values; only kinds (and the
/// semantic classification) may change. The delimiter word after a
/// here-document operator is never rewritten, and `{`, `}`, and `!` words
/// become their grouping and negation kinds in command position.
pub fn normalize_keywords(tokens: &mut [Token], config: &ParserConfig) {
    let mut command_position = true;
    // Keyword that makes a following `in` a reserved word: For, Select, Case.
    // `in` is only reserved right after the loop variable or case subject,
    // so the pending state drops once a second word has passed.
    let mut pending_in: Option<Keyword> = None;
    let mut seen_name = false;
    let mut after_heredoc_op = false;
    // Inside `function NAME`, the body follows the name in command position.
    let mut function_name_pending = false;

    for token in tokens.iter_mut() {
        if after_heredoc_op {
            // The delimiter word stays verbatim.
            after_heredoc_op = false;
            command_position = false;
            continue;
        }
        if matches!(token.kind, TokenKind::Heredoc | TokenKind::HeredocStrip) {
            after_heredoc_op = true;
            command_position = false;
            continue;
        }

        if token.kind == TokenKind::Word && token.quote.is_none() {
            let converted = match token.value.as_str() {
                "{" if command_position => Some(TokenKind::OpenBrace),
                "}" if command_position => Some(TokenKind::CloseBrace),
                "!" if command_position => Some(TokenKind::Exclamation),
                "in" if pending_in.is_some() && seen_name => {
                    pending_in = None;
                    Some(TokenKind::In)
                }
                _ => match keyword_for(&token.value, config) {
                    Some(keyword) if command_position && keyword != Keyword::In => {
                        if matches!(keyword, Keyword::For | Keyword::Select | Keyword::Case) {
                            pending_in = Some(keyword);
                            seen_name = false;
                        }
                        Some(keyword.token_kind())
                    }
                    _ => None,
                },
            };
            if let Some(kind) = converted {
                token.kind = kind;
                if kind.is_keyword() {
                    token.metadata.semantic = Some(SemanticType::Keyword);
                }
            }
        }

        // Drop the pending `in` once something other than the single name
        // or subject word intervenes.
        if pending_in.is_some()
            && !matches!(
                token.kind,
                TokenKind::For | TokenKind::Select | TokenKind::Case
            )
        {
            if token.is_word_like() {
                if seen_name {
                    pending_in = None;
                } else {
                    seen_name = true;
                }
            } else if token.kind != TokenKind::Newline {
                pending_in = None;
            }
        }

        command_position = enters_command_position(token.kind, &token.value);
        if token.kind == TokenKind::In {
            // The word list after `in` is not a command.
            command_position = false;
        }
        if token.kind == TokenKind::Function {
            function_name_pending = true;
        } else if function_name_pending && token.kind == TokenKind::Word {
            function_name_pending = false;
            command_position = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Span;

    fn word(value: &str, start: usize) -> Token {
        Token::new(
            TokenKind::Word,
            value,
            Span::new(start, start + value.len()),
        )
    }

    fn op(kind: TokenKind, value: &str, start: usize) -> Token {
        Token::new(kind, value, Span::new(start, start + value.len()))
    }

    #[test]
    fn keyword_from_str() {
        assert_eq!("if".parse(), Ok(Keyword::If));
        assert_eq!("done".parse(), Ok(Keyword::Done));
        assert_eq!("IF".parse::<Keyword>(), Err(ParseKeywordError));
        assert_eq!("iff".parse::<Keyword>(), Err(ParseKeywordError));
    }

    #[test]
    fn normalizes_keyword_in_command_position() {
        let config = ParserConfig::new();
        let mut tokens = vec![word("if", 0), word("true", 3)];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[0].metadata.semantic, Some(SemanticType::Keyword));
        assert_eq!(tokens[1].kind, TokenKind::Word);
    }

    #[test]
    fn keyword_in_argument_position_stays_a_word() {
        let config = ParserConfig::new();
        let mut tokens = vec![word("echo", 0), word("then", 5)];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].value, "then");
    }

    #[test]
    fn separator_restores_command_position() {
        let config = ParserConfig::new();
        let mut tokens = vec![
            word("echo", 0),
            word("x", 5),
            op(TokenKind::Semicolon, ";", 6),
            word("fi", 8),
        ];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[3].kind, TokenKind::Fi);
    }

    #[test]
    fn in_is_a_keyword_only_after_for_name() {
        let config = ParserConfig::new();
        let mut tokens = vec![word("for", 0), word("x", 4), word("in", 6), word("a", 9)];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[0].kind, TokenKind::For);
        assert_eq!(tokens[2].kind, TokenKind::In);
        assert_eq!(tokens[3].kind, TokenKind::Word);

        let mut tokens = vec![word("echo", 0), word("in", 5)];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[1].kind, TokenKind::Word);
    }

    #[test]
    fn heredoc_delimiter_is_not_normalized() {
        let config = ParserConfig::new();
        let mut tokens = vec![
            word("cat", 0),
            op(TokenKind::Heredoc, "<<", 4),
            word("done", 6),
        ];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[2].kind, TokenKind::Word);
        assert_eq!(tokens[2].value, "done");
    }

    #[test]
    fn case_insensitive_mode_accepts_uppercase_keywords() {
        let config = ParserConfig::permissive();
        let mut tokens = vec![word("IF", 0), word("true", 3)];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[0].kind, TokenKind::If);
    }

    #[test]
    fn normalisation_preserves_spans_and_values() {
        let config = ParserConfig::new();
        let mut tokens = vec![word("while", 0), word("true", 6)];
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        let values: Vec<_> = tokens.iter().map(|t| t.value.clone()).collect();
        normalize_keywords(&mut tokens, &config);
        assert_eq!(spans, tokens.iter().map(|t| t.span).collect::<Vec<_>>());
        assert_eq!(
            values,
            tokens.iter().map(|t| t.value.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn brace_and_bang_words_in_command_position() {
        let config = ParserConfig::new();
        let mut tokens = vec![
            word("{", 0),
            word("echo", 2),
            op(TokenKind::Semicolon, ";", 7),
            word("}", 9),
        ];
        normalize_keywords(&mut tokens, &config);
        assert_eq!(tokens[0].kind, TokenKind::OpenBrace);
        assert_eq!(tokens[3].kind, TokenKind::CloseBrace);
    }
}
