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

//! Syntax parser for simple commands
//!
//! A simple command is a run of words, assignment words, and redirections.
//! Array initialisations (`name=(a b c)`) are recognised specially and
//! stored apart from the ordinary words. While a condition is being parsed,
//! this rule also detects the block keyword that reveals a missing `;`
//! before `then` or `do`.

use super::core::{Parser, Result};
use crate::config::ErrorHandling;
use crate::lexer::{AssignOp, Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::{ArrayAssignment, SimpleCommand, Word};

impl Parser<'_> {
    /// Parses a simple command. At least one word, assignment, or
    /// redirection must be present.
    pub(super) fn simple_command(&mut self) -> Result<SimpleCommand> {
        let start = self.peek().span;
        let mut command = SimpleCommand {
            span: start,
            ..SimpleCommand::default()
        };

        loop {
            let kind = self.peek_kind();

            if kind.is_redirect() {
                command.redirects.push(self.redirect()?);
                continue;
            }

            if kind.is_assignment() {
                self.assignment_word(&mut command)?;
                continue;
            }

            if kind == TokenKind::Return && command.words.is_empty() {
                let token = self.advance();
                command
                    .words
                    .push(Word::from_literal(token.value, token.span));
                continue;
            }

            if kind.is_word_like() {
                self.check_missing_separator(&command)?;
                if !self.peek_kind().is_word_like() {
                    // A permissive repair turned the word into its block
                    // keyword; the command ends here.
                    break;
                }
                command.words.push(self.word()?);
                continue;
            }

            break;
        }

        if command.is_empty() {
            let token = self.peek();
            return Err(if token.kind == TokenKind::Eof {
                self.error(SyntaxError::UnexpectedEof {
                    expected: Some("a command".to_string()),
                })
            } else {
                self.error(SyntaxError::UnexpectedToken {
                    found: token.value.clone(),
                    expected: Some("a command".to_string()),
                })
            });
        }

        command.span = Span::new(start.start, self.previous_end());
        Ok(command)
    }

    /// Reports the missing separator when the pending block keyword shows
    /// up as an argument word. Permissive modes repair the token in place
    /// and record a warning instead.
    fn check_missing_separator(&mut self, command: &SimpleCommand) -> Result<()> {
        let Some((expected, construct)) = self.pending_block else {
            return Ok(());
        };
        if command.words.is_empty() && command.array_assignments.is_empty() {
            return Ok(());
        }
        if self.peek_kind() != TokenKind::Word || self.peek().value != expected.as_str() {
            return Ok(());
        }

        let cause = match expected {
            Keyword::Then => SyntaxError::MissingSemicolonBeforeThen,
            _ => SyntaxError::MissingDoAfter { construct },
        };
        if self.config.relaxes_separators() && self.config.error_handling != ErrorHandling::Strict
        {
            let warning = self.error(cause);
            self.warn(warning);
            self.tokens[self.index].kind = expected.token_kind();
            Ok(())
        } else {
            Err(self.error(cause))
        }
    }

    /// Consumes one assignment token, storing an array initialisation
    /// separately from scalar assignment words.
    fn assignment_word(&mut self, command: &mut SimpleCommand) -> Result<()> {
        let token = self.advance();
        let meta = token.metadata.assignment.clone();

        if let Some(meta) = meta {
            let is_array_init = meta.operator == AssignOp::Assign
                && meta.index.is_none()
                && meta.value.starts_with('(')
                && meta.value.ends_with(')')
                && self.config.enable_arrays;
            if is_array_init {
                let inner = &meta.value[1..meta.value.len() - 1];
                let base = token.span.end - meta.value.len() + 1;
                let elements = self.words_from_source(inner, base);
                command.array_assignments.push(ArrayAssignment {
                    name: meta.name,
                    elements,
                    span: token.span,
                });
                return Ok(());
            }
        }

        command
            .words
            .push(Word::from_literal(token.value, token.span));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;

    fn parse_simple(source: &str, config: &ParserConfig) -> Result<SimpleCommand> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.simple_command()
    }

    #[test]
    fn words_and_arguments() {
        let config = ParserConfig::new();
        let command = parse_simple("grep -v pattern file", &config).unwrap();
        assert_eq!(command.arg_texts(), ["grep", "-v", "pattern", "file"]);
        assert!(command.redirects.is_empty());
        assert!(!command.background);
    }

    #[test]
    fn redirects_interleaved_with_words() {
        let config = ParserConfig::new();
        let command = parse_simple("sort <in.txt -r >out.txt", &config).unwrap();
        assert_eq!(command.arg_texts(), ["sort", "-r"]);
        assert_eq!(command.redirects.len(), 2);
    }

    #[test]
    fn scalar_assignment_stays_a_word() {
        let config = ParserConfig::new();
        let command = parse_simple("FOO=bar cmd", &config).unwrap();
        assert_eq!(command.arg_texts(), ["FOO=bar", "cmd"]);
        assert!(command.array_assignments.is_empty());
    }

    #[test]
    fn array_initialisation_is_stored_separately() {
        let config = ParserConfig::new();
        let command = parse_simple("files=(a b $c)", &config).unwrap();
        assert!(command.words.is_empty());
        assert_eq!(command.array_assignments.len(), 1);
        let assignment = &command.array_assignments[0];
        assert_eq!(assignment.name, "files");
        assert_eq!(assignment.elements.len(), 3);
        assert_eq!(assignment.elements[0].to_string(), "a");
        assert_eq!(assignment.elements[2].to_string(), "$c");
    }

    #[test]
    fn empty_command_is_an_error() {
        let config = ParserConfig::new();
        let error = parse_simple("| x", &config).unwrap_err();
        assert_eq!(error.code(), "E080");
    }

    #[test]
    fn heredoc_attaches_collected_body() {
        let config = ParserConfig::new();
        let command = parse_simple("cat <<EOF\nhello\nEOF\n", &config).unwrap();
        assert_eq!(command.redirects.len(), 1);
        assert_matches::assert_matches!(
            &command.redirects[0].body,
            crate::syntax::RedirBody::HereDoc(doc) => {
                assert_eq!(doc.content, "hello\n");
                assert_eq!(doc.delimiter, "EOF");
                assert!(!doc.quoted);
            }
        );
    }
}
