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

//! Syntax parser
//!
//! [`parse`] builds an AST from a token stream. The grammar is implemented
//! by recursive descent with one method per nonterminal, all defined as
//! `impl` blocks on [`Parser`] across this module's submodules.
//!
//! Error behaviour follows the configured [error
//! handling](crate::config::ErrorHandling): `Strict` returns the first
//! error, `Collect` and `Recover` accumulate errors in the
//! [report](ParseReport) and synchronise to the next statement boundary,
//! returning a best-effort tree.

mod arith;
mod case;
mod compound_command;
pub mod core;
pub mod error;
mod for_loop;
mod function;
mod grouping;
mod r#if;
mod list;
mod pipeline;
mod redir;
mod select;
mod simple_command;
mod test_expr;
mod while_loop;
mod word;

pub use self::core::Parser;
pub use self::error::{Error, ErrorSeverity, ParseReport, SyntaxError};

use crate::config::ParserConfig;
use crate::lexer::{HeredocMap, Token};
use crate::syntax::TopLevel;

/// Everything the parsing phase produces
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOutput {
    /// The syntax tree; best-effort partial when errors were collected
    pub ast: TopLevel,
    /// Collected errors and warnings
    pub report: ParseReport,
}

/// Parses a token stream into an AST.
///
/// `heredocs` is the body map produced by
/// [`tokenize`](crate::lexer::tokenize); bodies are attached to their
/// here-document redirections during parsing.
///
/// Under [`Strict`](crate::config::ErrorHandling::Strict) error handling
/// the first syntax error is returned as `Err`. Under the collecting modes
/// the result is always `Ok`, with errors accumulated in the report and
/// the AST reflecting what could be parsed.
pub fn parse(
    tokens: Vec<Token>,
    heredocs: HeredocMap,
    config: &ParserConfig,
) -> Result<ParseOutput, Error> {
    parse_with_source(tokens, heredocs, config, None)
}

/// Like [`parse`], with the source text supplied so errors carry caret
/// snippets.
pub fn parse_with_source(
    tokens: Vec<Token>,
    heredocs: HeredocMap,
    config: &ParserConfig,
    source: Option<&str>,
) -> Result<ParseOutput, Error> {
    let mut parser = Parser::new(tokens, heredocs, config);
    if let Some(source) = source {
        parser = parser.with_source(source);
    }
    let ast = parser.program()?;
    Ok(ParseOutput {
        ast,
        report: parser.report,
    })
}
