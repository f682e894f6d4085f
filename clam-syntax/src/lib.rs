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

//! Front-end of the clam shell: lexing and parsing of shell script source
//! code
//!
//! The front-end is a pipeline of pure stages, each returning a value and
//! a diagnostic stream:
//!
//! 1. [`tokenize`](lexer::tokenize) turns source text into a token stream
//!    with structural metadata, a here-document body map, and a lex
//!    report.
//! 2. [`parse`](parser::parse) builds the [AST](syntax) by recursive
//!    descent.
//! 3. The separate `clam-lint` crate validates the finished AST.
//!
//! [`parse_source`] is the convenience entry point for callers that do not
//! need the intermediate artefacts:
//!
//! ```
//! use clam_syntax::{ParserConfig, parse_source};
//!
//! let config = ParserConfig::new();
//! let (ast, report) = parse_source("echo hello | tr a-z A-Z", &config).unwrap();
//! assert!(!ast.is_empty());
//! assert!(!report.has_errors());
//! ```
//!
//! The front-end is single-threaded, synchronous, and non-suspending; two
//! source texts may be parsed concurrently on different threads provided
//! each uses its own lexer and parser instances.

pub mod config;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod syntax;

pub use config::{ErrorHandling, ParserConfig, ParsingMode};
pub use lexer::{LexOutput, LexReport, tokenize};
pub use parser::{Error, ParseOutput, ParseReport, parse, parse_with_source};
pub use source::{SourceCode, Span};

/// Combined diagnostics of the lexing and parsing phases
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontEndReport {
    /// Diagnostics from the lexer
    pub lex: LexReport,
    /// Diagnostics from the parser
    pub parse: ParseReport,
}

impl FrontEndReport {
    /// Tests whether either phase recorded an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.lex.has_errors() || self.parse.has_errors()
    }

    /// Tests whether both phases came back clean.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lex.is_empty() && self.parse.is_empty()
    }
}

/// Tokenizes and parses a complete source text in one call.
///
/// Lex diagnostics never abort the pipeline; the tokens are best-effort
/// and parsing proceeds regardless. Under
/// [`Strict`](ErrorHandling::Strict) error handling the first parse error
/// is returned as `Err`; under the collecting modes the AST is
/// best-effort and all errors are in the combined report.
pub fn parse_source(
    source: &str,
    config: &ParserConfig,
) -> Result<(syntax::TopLevel, FrontEndReport), Error> {
    let lex_output = tokenize(source, config);
    let parse_output = parse_with_source(
        lex_output.tokens,
        lex_output.heredocs,
        config,
        Some(source),
    )?;
    Ok((
        parse_output.ast,
        FrontEndReport {
            lex: lex_output.report,
            parse: parse_output.report,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_combines_reports() {
        let config = ParserConfig::new();
        let (ast, report) = parse_source("echo 'unclosed", &config).unwrap();
        assert!(report.lex.has_errors());
        assert!(!report.parse.has_errors());
        assert!(report.has_errors());
        assert!(!ast.is_empty());
    }

    #[test]
    fn parse_source_empty_input() {
        let config = ParserConfig::new();
        let (ast, report) = parse_source("", &config).unwrap();
        assert!(ast.is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn parse_source_strict_propagates_parse_errors() {
        let config = ParserConfig::new();
        let error = parse_source("echo |", &config).unwrap_err();
        assert_eq!(error.code(), "E012");
    }
}
