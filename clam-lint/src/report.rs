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

//! Validation report
//!
//! Issues accumulate in the order they were produced; the report never
//! halts analysis. The [`Display`] rendering is deterministic: issues are
//! sorted by position, then severity.
//!
//! [`Display`]: std::fmt::Display

use clam_syntax::Span;
use itertools::Itertools;
use std::fmt;

/// Severity of a validation issue
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Returns the lowercase label used in rendered reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding of the validator
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Issue {
    pub message: String,
    /// Position of the offending node in the source
    pub span: Span,
    pub severity: Severity,
    pub suggestion: Option<String>,
    /// Name of the rule or analyser that produced the issue
    pub rule: &'static str,
}

impl Issue {
    /// Creates an issue without a suggestion.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        span: Span,
        severity: Severity,
        rule: &'static str,
    ) -> Self {
        Issue {
            message: message.into(),
            span,
            severity,
            suggestion: None,
            rule,
        }
    }

    /// Attaches a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggestion: {suggestion})")?;
        }
        write!(f, " [{}]", self.rule)
    }
}

/// Report of validation results
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    /// Issues in the order they were produced
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Appends one issue.
    pub fn add(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Appends many issues.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// Returns the error-level issues.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity >= Severity::Error)
    }

    /// Returns the warning-level issues.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Returns the info-level issues.
    pub fn infos(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Info)
    }

    /// Tests whether the report contains any error or fatal issue.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Tests whether the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return f.write_str("No validation issues found");
        }
        let sorted = self
            .issues
            .iter()
            .sorted_by_key(|i| (i.span.start, std::cmp::Reverse(i.severity)));
        for (index, issue) in sorted.enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            issue.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn query_helpers() {
        let mut report = ValidationReport::default();
        report.add(Issue::new("a", Span::new(0, 1), Severity::Error, "r1"));
        report.add(Issue::new("b", Span::new(2, 3), Severity::Warning, "r2"));
        report.add(Issue::new("c", Span::new(4, 5), Severity::Info, "r3"));
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.infos().count(), 1);
        assert!(report.has_errors());
        assert!(!report.is_empty());
    }

    #[test]
    fn display_sorts_by_position_then_severity() {
        let mut report = ValidationReport::default();
        report.add(Issue::new("late", Span::new(9, 10), Severity::Error, "r"));
        report.add(Issue::new("early-warn", Span::new(1, 2), Severity::Warning, "r"));
        report.add(Issue::new("early-err", Span::new(1, 2), Severity::Error, "r"));
        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].contains("early-err"));
        assert!(lines[1].contains("early-warn"));
        assert!(lines[2].contains("late"));
    }

    #[test]
    fn empty_report_display() {
        let report = ValidationReport::default();
        assert_eq!(report.to_string(), "No validation issues found");
    }

    #[test]
    fn issue_display_includes_rule_and_suggestion() {
        let issue = Issue::new("bad thing", Span::new(0, 1), Severity::Warning, "no_empty_body")
            .with_suggestion("do better");
        assert_eq!(
            issue.to_string(),
            "warning: bad thing (suggestion: do better) [no_empty_body]"
        );
    }
}
