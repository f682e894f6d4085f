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

//! AST validation for the clam shell
//!
//! Two cooperating sub-systems run on a finished
//! [AST](clam_syntax::syntax::TopLevel):
//!
//! - the [semantic analyser](semantic::SemanticAnalyzer), a tree walk with
//!   a symbol table that finds duplicate functions, misplaced
//!   `break`/`continue`/`return`, unreachable code, and writes to readonly
//!   variables;
//! - the [rule pipeline](rules::RuleSet), a registry of independent
//!   checks invoked on every node.
//!
//! Both accumulate [issues](report::Issue) and never halt. [`validate`]
//! runs whichever of the two the configuration enables:
//!
//! ```
//! use clam_lint::validate;
//! use clam_syntax::{ParserConfig, parse_source};
//!
//! let config = ParserConfig::new();
//! let (ast, _) = parse_source("echo start; break; echo end", &config).unwrap();
//! let report = validate(&ast, &config);
//! assert_eq!(report.warnings().count(), 1);
//! ```

pub mod report;
pub mod rules;
pub mod semantic;
pub mod symbol;
pub mod walk;

pub use report::{Issue, Severity, ValidationReport};
pub use rules::{RuleSet, ValidationRule};
pub use semantic::SemanticAnalyzer;

use clam_syntax::ParserConfig;
use clam_syntax::syntax::TopLevel;

/// Validates an AST, honouring the configuration's validation toggles.
///
/// Validation is a pure function of the AST and configuration: running it
/// twice yields identical reports.
#[must_use]
pub fn validate(ast: &TopLevel, config: &ParserConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    if !config.enable_validation {
        return report;
    }
    if config.enable_semantic_analysis {
        report.extend(SemanticAnalyzer::new().analyze(ast));
    }
    if config.enable_validation_rules {
        report.extend(RuleSet::default().run(ast));
    }
    report
}

/// Parses and validates a source text in one call.
///
/// Lex and parse diagnostics are folded into the validation report as
/// issues attributed to the `lexer` and `parser` producers, so the caller
/// gets one report covering all three phases. Under strict error handling
/// the first parse error is returned as `Err` instead.
pub fn check_source(
    source: &str,
    config: &ParserConfig,
) -> Result<(TopLevel, ValidationReport), clam_syntax::Error> {
    let (ast, front) = clam_syntax::parse_source(source, config)?;
    let mut report = validate(&ast, config);

    for diagnostic in &front.lex.errors {
        let mut issue = Issue::new(
            diagnostic.message.clone(),
            diagnostic.span,
            Severity::Error,
            "lexer",
        );
        issue.suggestion = diagnostic.suggestion.clone();
        report.add(issue);
    }
    for diagnostic in &front.lex.warnings {
        report.add(Issue::new(
            diagnostic.message.clone(),
            diagnostic.span,
            Severity::Warning,
            "lexer",
        ));
    }
    for error in &front.parse.errors {
        let mut issue = Issue::new(
            error.cause.message(),
            error.span,
            Severity::Error,
            "parser",
        );
        issue.suggestion = error.suggestion.clone();
        report.add(issue);
    }
    for warning in &front.parse.warnings {
        report.add(Issue::new(
            warning.cause.message(),
            warning.span,
            Severity::Warning,
            "parser",
        ));
    }

    Ok((ast, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_outside_loop_scenario() {
        let config = ParserConfig::new();
        let (ast, report) = check_source("echo start; break; echo end", &config).unwrap();
        assert!(!ast.is_empty());
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "break: only meaningful in a 'for', 'while', or 'until' loop"
        );
        // The warning points at the `break` statement.
        assert_eq!(warnings[0].span.start, 12);
    }

    #[test]
    fn clean_script_has_empty_report() {
        let config = ParserConfig::new();
        let (_, report) = check_source("for f in a b; do echo $f; done", &config).unwrap();
        assert!(report.is_empty(), "{report}");
    }

    #[test]
    fn heredoc_with_quoted_delimiter_validates_cleanly() {
        let config = ParserConfig::new();
        let (_, report) = check_source("cat <<'END'\n$USER\nEND\n", &config).unwrap();
        assert!(report.is_empty(), "{report}");
    }

    #[test]
    fn validation_can_be_disabled() {
        let mut config = ParserConfig::new();
        config.enable_validation = false;
        let (ast, _) = clam_syntax::parse_source("break", &config).unwrap();
        let report = validate(&ast, &config);
        assert!(report.is_empty());
    }

    #[test]
    fn semantic_analysis_can_be_disabled_separately() {
        let mut config = ParserConfig::new();
        config.enable_semantic_analysis = false;
        let (ast, _) = clam_syntax::parse_source("break", &config).unwrap();
        let report = validate(&ast, &config);
        assert!(report.is_empty());
    }

    #[test]
    fn validation_is_idempotent() {
        let config = ParserConfig::new();
        let (ast, _) =
            clam_syntax::parse_source("helper() { return; }\nbreak", &config).unwrap();
        let first = validate(&ast, &config);
        let second = validate(&ast, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn lex_errors_are_folded_into_the_report() {
        let config = ParserConfig::new();
        let (_, report) = check_source("echo 'unclosed", &config).unwrap();
        assert!(report.has_errors());
        assert!(report.issues.iter().any(|i| i.rule == "lexer"));
    }
}
