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

//! Syntax parser for pipelines
//!
//! A pipeline is an optional `!` followed by commands separated by `|`. A
//! component may be a control structure; when the pipeline has more than
//! one component, every compound component is stamped with the pipeline
//! execution context.

use super::core::{Parser, Result};
use crate::lexer::TokenKind;
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::{Command, ExecutionContext, Pipeline};

impl Parser<'_> {
    /// Parses a pipeline.
    pub(super) fn pipeline(&mut self) -> Result<Pipeline> {
        let start = self.peek().span;

        let negated = self.accept(TokenKind::Exclamation).is_some();
        if negated && self.check(TokenKind::Exclamation) {
            return Err(self.error(SyntaxError::UnexpectedToken {
                found: "!".to_string(),
                expected: Some("a command".to_string()),
            }));
        }

        let first = self.pipeline_component()?;
        let mut commands = vec![first];

        while self.accept(TokenKind::Pipe).is_some() {
            self.skip_newlines();
            if self.at_end() || !self.starts_command() {
                return Err(self.error(SyntaxError::MissingCommandAfterPipe));
            }
            commands.push(self.pipeline_component()?);
        }

        if commands.len() > 1 {
            for command in &mut commands {
                if let Command::Compound(compound) = command {
                    compound.execution_context = ExecutionContext::Pipeline;
                }
            }
        }

        Ok(Pipeline {
            commands,
            negated,
            span: Span::new(start.start, self.previous_end()),
        })
    }

    /// Tests whether the current token can begin a command.
    pub(super) fn starts_command(&self) -> bool {
        use TokenKind::*;
        let kind = self.peek_kind();
        kind.is_word_like()
            || kind.is_assignment()
            || kind.is_redirect()
            || matches!(
                kind,
                If | While
                    | Until
                    | For
                    | Case
                    | Select
                    | Function
                    | Break
                    | Continue
                    | Return
                    | DoubleOpenBracket
                    | DoubleOpenParen
                    | OpenParen
                    | OpenBrace
            )
    }

    /// Parses one pipeline component: a control structure, a
    /// `break`/`continue`, or a simple command.
    fn pipeline_component(&mut self) -> Result<Command> {
        use TokenKind::*;
        match self.peek_kind() {
            If | While | Until | For | Case | Select | DoubleOpenBracket | DoubleOpenParen
            | OpenParen | OpenBrace => self.compound_command().map(Command::Compound),
            Break | Continue => self.break_continue_command(),
            _ => self.simple_command().map(Command::Simple),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;

    fn parse_pipeline(source: &str, config: &ParserConfig) -> Result<Pipeline> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.pipeline()
    }

    #[test]
    fn single_command_pipeline() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("echo hi", &config).unwrap();
        assert_eq!(pipeline.commands.len(), 1);
        assert!(!pipeline.negated);
    }

    #[test]
    fn two_stage_pipeline() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("cat file | grep pattern", &config).unwrap();
        assert_eq!(pipeline.commands.len(), 2);
        assert_matches::assert_matches!(&pipeline.commands[0], Command::Simple(c) => {
            assert_eq!(c.arg_texts(), ["cat", "file"]);
        });
        assert_matches::assert_matches!(&pipeline.commands[1], Command::Simple(c) => {
            assert_eq!(c.arg_texts(), ["grep", "pattern"]);
        });
    }

    #[test]
    fn negated_pipeline() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("! grep -q x file", &config).unwrap();
        assert!(pipeline.negated);
    }

    #[test]
    fn double_negation_is_an_error() {
        let config = ParserConfig::new();
        let error = parse_pipeline("! ! true", &config).unwrap_err();
        assert_eq!(error.code(), "E080");
    }

    #[test]
    fn missing_command_after_pipe() {
        let config = ParserConfig::new();
        let error = parse_pipeline("echo hi |", &config).unwrap_err();
        assert_eq!(error.code(), "E012");
    }

    #[test]
    fn pipe_continues_after_newline() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("echo hi |\n  wc -l", &config).unwrap();
        assert_eq!(pipeline.commands.len(), 2);
    }

    #[test]
    fn break_as_pipeline_component() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("break 2", &config).unwrap();
        assert_eq!(pipeline.commands.len(), 1);
        assert_matches::assert_matches!(&pipeline.commands[0], Command::Break(b) => {
            assert_eq!(b.level, 2);
        });
    }

    #[test]
    fn compound_component_gets_pipeline_context() {
        let config = ParserConfig::new();
        let pipeline = parse_pipeline("if x; then y; fi | wc -l", &config).unwrap();
        assert_eq!(pipeline.commands.len(), 2);
        assert_matches::assert_matches!(&pipeline.commands[0], Command::Compound(c) => {
            assert_eq!(c.execution_context, ExecutionContext::Pipeline);
        });
    }
}
