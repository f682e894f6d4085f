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

//! Syntax parser for command lists
//!
//! The top level, statement sequences inside blocks, and and-or lists all
//! live here. Under the collecting error modes the top-level loop records
//! each error, synchronises to the next statement boundary, and resumes;
//! the recovering mode does the same inside nested lists.

use super::core::{Parser, Result, ScopeKind};
use crate::config::ErrorHandling;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::error::SyntaxError;
use crate::source::Span;
use crate::syntax::{
    AndOr, AndOrList, BreakStatement, Command, CommandList, ContinueStatement, Pipeline,
    Statement, TopLevel, TopLevelItem,
};

/// Unwraps an and-or list that is exactly one compound command or one
/// `break`/`continue`, so the construct keeps its statement form.
fn into_statement(list: AndOrList) -> Statement {
    let single_special = list.operators.is_empty()
        && list.pipelines.len() == 1
        && !list.pipelines[0].negated
        && list.pipelines[0].commands.len() == 1
        && matches!(
            list.pipelines[0].commands[0],
            Command::Compound(_) | Command::Break(_) | Command::Continue(_)
        );
    if !single_special {
        return Statement::AndOr(list);
    }

    let AndOrList {
        mut pipelines,
        span,
        ..
    } = list;
    let Some(mut pipeline) = pipelines.pop() else {
        return Statement::AndOr(AndOrList {
            pipelines,
            operators: Vec::new(),
            span,
        });
    };
    match pipeline.commands.pop() {
        Some(Command::Compound(compound)) => Statement::Compound(compound),
        Some(Command::Break(statement)) => Statement::Break(statement),
        Some(Command::Continue(statement)) => Statement::Continue(statement),
        Some(command) => {
            pipeline.commands.push(command);
            Statement::AndOr(AndOrList {
                pipelines: vec![pipeline],
                operators: Vec::new(),
                span,
            })
        }
        None => Statement::AndOr(AndOrList {
            pipelines: vec![pipeline],
            operators: Vec::new(),
            span,
        }),
    }
}

impl Parser<'_> {
    /// Parses the whole token stream into a [`TopLevel`].
    ///
    /// Under `Strict` error handling the first error is returned. Under
    /// `Collect` and `Recover` errors are recorded in the report and the
    /// parser resumes at the next statement boundary, producing a
    /// best-effort tree.
    pub(super) fn program(&mut self) -> std::result::Result<TopLevel, super::error::Error> {
        let mut items = Vec::new();
        let mut current: Vec<Statement> = Vec::new();
        let mut current_start: Option<usize> = None;

        fn flush(items: &mut Vec<TopLevelItem>, current: &mut Vec<Statement>, end: usize, start: &mut Option<usize>) {
            if !current.is_empty() {
                let statements = std::mem::take(current);
                let span_start = start.take().unwrap_or(end);
                items.push(TopLevelItem::Statements(CommandList {
                    statements,
                    span: Span::new(span_start, end),
                }));
            }
            *start = None;
        }

        loop {
            self.skip_separators();
            if self.at_end() || self.fatal {
                break;
            }

            let statement_start = self.peek().span.start;
            let index_before = self.index;
            match self.statement() {
                Ok(Statement::Function(function)) => {
                    flush(&mut items, &mut current, statement_start, &mut current_start);
                    items.push(TopLevelItem::Function(function));
                }
                Ok(Statement::Break(statement)) => {
                    flush(&mut items, &mut current, statement_start, &mut current_start);
                    items.push(TopLevelItem::Break(statement));
                }
                Ok(Statement::Continue(statement)) => {
                    flush(&mut items, &mut current, statement_start, &mut current_start);
                    items.push(TopLevelItem::Continue(statement));
                }
                Ok(statement) => {
                    current_start.get_or_insert(statement_start);
                    current.push(statement);
                }
                Err(error) => {
                    if self.config.error_handling == ErrorHandling::Strict {
                        return Err(error);
                    }
                    let recoverable = error.cause.is_recoverable();
                    self.record(error);
                    if !recoverable || self.fatal {
                        break;
                    }
                    self.synchronize();
                    if self.index == index_before {
                        // The offending token is itself a boundary; step
                        // over it so recovery always makes progress.
                        self.advance();
                    }
                }
            }
        }

        let end = self.previous_end();
        flush(&mut items, &mut current, end, &mut current_start);
        Ok(TopLevel { items })
    }

    /// Tests whether the current token terminates a statement list.
    fn at_list_end(&self) -> bool {
        use TokenKind::*;
        matches!(
            self.peek_kind(),
            Eof | Fi
                | Done
                | Else
                | Elif
                | Esac
                | Then
                | Do
                | CloseBrace
                | CloseParen
                | DoubleSemicolon
                | SemicolonAmp
                | AmpSemicolon
        )
    }

    /// Parses a statement sequence until a block terminator.
    pub(super) fn command_list(&mut self) -> Result<CommandList> {
        let start = self.peek().span.start;
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            if self.at_list_end() || self.fatal {
                break;
            }
            let index_before = self.index;
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(error)
                    if self.config.error_handling == ErrorHandling::Recover
                        && error.cause.is_recoverable() =>
                {
                    self.record(error);
                    if self.fatal {
                        break;
                    }
                    self.synchronize();
                    if self.index == index_before {
                        break;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Ok(CommandList {
            statements,
            span: Span::new(start, self.previous_end()),
        })
    }

    /// Parses one statement.
    ///
    /// `break` and `continue` go through the and-or path so they also work
    /// as pipeline components; a lone one is unwrapped back to its
    /// statement form by [`into_statement`].
    pub(super) fn statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            TokenKind::Function => self.function_definition().map(Statement::Function),
            TokenKind::Word if self.is_posix_function_start() => {
                self.function_definition().map(Statement::Function)
            }
            _ => self.and_or_list().map(into_statement),
        }
    }

    /// Parses pipelines joined by `&&` and `||`.
    ///
    /// The short-circuit operators capture the entire following pipeline,
    /// and newlines may follow an operator. A trailing `&` marks the last
    /// command as background.
    pub(super) fn and_or_list(&mut self) -> Result<AndOrList> {
        let start = self.peek().span.start;
        let first = self.pipeline()?;
        let mut pipelines = vec![first];
        let mut operators = Vec::new();

        loop {
            let operator = match self.peek_kind() {
                TokenKind::AndAnd => AndOr::AndThen,
                TokenKind::OrOr => AndOr::OrElse,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            if !self.starts_command() {
                let cause = match operator {
                    AndOr::AndThen => SyntaxError::MissingCommandAfterAnd,
                    AndOr::OrElse => SyntaxError::MissingCommandAfterOr,
                };
                return Err(self.error(cause));
            }
            operators.push(operator);
            pipelines.push(self.pipeline()?);
        }

        if self.accept(TokenKind::Ampersand).is_some() {
            if let Some(pipeline) = pipelines.last_mut() {
                set_background(pipeline);
            }
        }

        Ok(AndOrList {
            pipelines,
            operators,
            span: Span::new(start, self.previous_end()),
        })
    }

    /// Parses `break [n]` or `continue [n]` as a pipeline component.
    pub(super) fn break_continue_command(&mut self) -> Result<Command> {
        let token = self.advance();
        let construct = if token.kind == TokenKind::Break {
            Keyword::Break
        } else {
            Keyword::Continue
        };

        let mut level = 1;
        let mut end = token.span.end;
        if self.peek().is_word_like() {
            let operand = self.peek().value.clone();
            match operand.parse::<u32>() {
                Ok(n) if n >= 1 => {
                    level = n;
                    end = self.peek().span.end;
                    self.advance();
                }
                _ => {
                    return Err(self.error(SyntaxError::InvalidLoopLevel {
                        construct,
                        found: operand,
                    }));
                }
            }
        }

        let span = Span::new(token.span.start, end);
        Ok(if construct == Keyword::Break {
            Command::Break(BreakStatement { level, span })
        } else {
            Command::Continue(ContinueStatement { level, span })
        })
    }

    /// Parses a condition list with the pending-block-keyword detection
    /// armed, restoring the previous state afterwards.
    pub(super) fn condition_list(
        &mut self,
        expected: Keyword,
        construct: Keyword,
    ) -> Result<CommandList> {
        let saved = self.pending_block.replace((expected, construct));
        self.enter_scope(ScopeKind::Conditional);
        let result = self.command_list();
        self.exit_scope();
        self.pending_block = saved;
        result
    }
}

/// Marks the last command of a pipeline as running in the background.
fn set_background(pipeline: &mut Pipeline) {
    match pipeline.commands.last_mut() {
        Some(Command::Simple(simple)) => simple.background = true,
        Some(Command::Compound(compound)) => compound.background = true,
        Some(Command::Break(_)) | Some(Command::Continue(_)) | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexer::tokenize;

    fn parse_list(source: &str, config: &ParserConfig) -> Result<CommandList> {
        let output = tokenize(source, config);
        let mut parser = Parser::new(output.tokens, output.heredocs, config);
        parser.command_list()
    }

    #[test]
    fn statements_separated_by_semicolons_and_newlines() {
        let config = ParserConfig::new();
        let list = parse_list("echo a; echo b\necho c", &config).unwrap();
        assert_eq!(list.statements.len(), 3);
    }

    #[test]
    fn and_or_operator_invariant() {
        let config = ParserConfig::new();
        let list = parse_list("a && b || c && d", &config).unwrap();
        assert_eq!(list.statements.len(), 1);
        assert_matches::assert_matches!(&list.statements[0], Statement::AndOr(and_or) => {
            assert_eq!(and_or.pipelines.len(), 4);
            assert_eq!(and_or.operators.len(), 3);
            assert_eq!(
                and_or.operators,
                [AndOr::AndThen, AndOr::OrElse, AndOr::AndThen]
            );
        });
    }

    #[test]
    fn and_or_continues_after_newline() {
        let config = ParserConfig::new();
        let list = parse_list("a &&\nb", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::AndOr(and_or) => {
            assert_eq!(and_or.pipelines.len(), 2);
        });
    }

    #[test]
    fn missing_command_after_and_or() {
        let config = ParserConfig::new();
        let error = parse_list("a &&", &config).unwrap_err();
        assert_eq!(error.code(), "E013");
        let error = parse_list("a ||", &config).unwrap_err();
        assert_eq!(error.code(), "E014");
    }

    #[test]
    fn background_marks_last_command() {
        let config = ParserConfig::new();
        let list = parse_list("sleep 10 &", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::AndOr(and_or) => {
            assert_matches::assert_matches!(&and_or.pipelines[0].commands[0], Command::Simple(c) => {
                assert!(c.background);
            });
        });
    }

    #[test]
    fn break_with_level() {
        let config = ParserConfig::new();
        let list = parse_list("break 2", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::Break(b) => {
            assert_eq!(b.level, 2);
        });
    }

    #[test]
    fn break_defaults_to_level_one() {
        let config = ParserConfig::new();
        let list = parse_list("break", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::Break(b) => {
            assert_eq!(b.level, 1);
        });
    }

    #[test]
    fn break_with_bad_level_is_an_error() {
        let config = ParserConfig::new();
        let error = parse_list("break x", &config).unwrap_err();
        assert_eq!(error.code(), "E082");
    }

    #[test]
    fn break_after_and_and_is_a_pipeline_component() {
        let config = ParserConfig::new();
        let list = parse_list("true && break", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::AndOr(and_or) => {
            assert_eq!(and_or.pipelines.len(), 2);
            assert_eq!(and_or.operators, [AndOr::AndThen]);
            assert_matches::assert_matches!(&and_or.pipelines[1].commands[0], Command::Break(b) => {
                assert_eq!(b.level, 1);
            });
        });
    }

    #[test]
    fn continue_after_or_or_is_a_pipeline_component() {
        let config = ParserConfig::new();
        let list = parse_list("cmd || continue 2", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::AndOr(and_or) => {
            assert_matches::assert_matches!(
                &and_or.pipelines[1].commands[0],
                Command::Continue(c) => assert_eq!(c.level, 2)
            );
        });
    }

    #[test]
    fn lone_compound_becomes_statement_context() {
        let config = ParserConfig::new();
        let list = parse_list("if a; then b; fi", &config).unwrap();
        assert_matches::assert_matches!(&list.statements[0], Statement::Compound(compound) => {
            assert_eq!(
                compound.execution_context,
                crate::syntax::ExecutionContext::Statement
            );
        });
    }
}
